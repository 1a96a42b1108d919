//! Account model.

use diesel::prelude::*;
use jiff_diesel::Timestamp;
use uuid::Uuid;

use crate::schema::accounts;

/// An account provisioned by the identity service.
///
/// Rows are read-only from this crate's point of view.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = accounts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Account {
    /// Unique account identifier.
    pub id: Uuid,
    /// Login and notification email address.
    pub email_address: String,
    /// Human-readable name.
    pub display_name: String,
    /// Whether the email address has been verified.
    pub email_verified: bool,
    /// Timestamp when the account was created.
    pub created_at: Timestamp,
}
