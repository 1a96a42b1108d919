//! Project member request types.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sprintify_core::ProjectRole;
use validator::Validate;

/// Request to invite an existing account into a project.
#[must_use]
#[derive(Debug, Serialize, Deserialize, Validate, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct InviteMember {
    /// Email address of the account to invite.
    #[validate(email, length(max = 254))]
    pub email: String,
    /// Role granted on joining; defaults to `MEMBER`.
    #[serde(default)]
    pub role: Option<ProjectRole>,
}

impl InviteMember {
    /// Returns the role to grant.
    pub fn role(&self) -> ProjectRole {
        self.role.unwrap_or(ProjectRole::Member)
    }
}

/// Request to change a member's role.
#[must_use]
#[derive(Debug, Serialize, Deserialize, Validate, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMemberRole {
    /// New role for the member.
    pub role: ProjectRole,
}
