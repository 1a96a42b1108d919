//! Credential token types.

#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Purpose a signed credential token was issued for.
///
/// Endpoint classes accept exactly one token type; presenting any other
/// type is rejected as forbidden.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(Serialize, Deserialize, Display, EnumString)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenType {
    /// Regular API and socket access.
    #[default]
    Access,
    /// Confirms ownership of an email address.
    EmailVerification,
    /// Authorizes a single password reset.
    ResetPassword,
}

impl TokenType {
    /// Returns whether this token grants regular API access.
    #[inline]
    pub const fn is_access(self) -> bool {
        matches!(self, Self::Access)
    }
}
