//! Token extraction, verification and project authorization.

mod auth_claims;
mod auth_header;
mod auth_provider;
mod auth_state;

pub use self::auth_claims::AuthClaims;
pub use self::auth_header::AuthHeader;
pub use self::auth_provider::AuthProvider;
pub use self::auth_state::AuthState;

impl AuthProvider for AuthClaims {
    fn account_id(&self) -> uuid::Uuid {
        self.account_id
    }
}
