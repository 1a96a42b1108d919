//! Project member response types.

use jiff::Timestamp;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sprintify_core::ProjectRole;
use sprintify_postgres::model::{Account, ProjectMember};
use uuid::Uuid;

use super::envelope;

/// A member of a project.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub account_id: Uuid,
    pub project_id: Uuid,
    pub role: ProjectRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_address: Option<String>,
    pub joined_at: Timestamp,
}

impl Member {
    pub fn from_model(member: ProjectMember) -> Self {
        Self {
            account_id: member.account_id,
            project_id: member.project_id,
            role: member.member_role,
            display_name: None,
            email_address: None,
            joined_at: member.created_at.into(),
        }
    }

    pub fn from_model_with_account(member: ProjectMember, account: Account) -> Self {
        Self {
            display_name: Some(account.display_name),
            email_address: Some(account.email_address),
            ..Self::from_model(member)
        }
    }

    pub fn from_models(rows: Vec<(ProjectMember, Account)>) -> Vec<Self> {
        rows.into_iter()
            .map(|(member, account)| Self::from_model_with_account(member, account))
            .collect()
    }
}

envelope!(
    /// Single member response.
    MemberResponse { member: Member }
);

envelope!(
    /// All members of a project.
    MembersResponse { members: Vec<Member> }
);
