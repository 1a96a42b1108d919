//! Project member model.

use diesel::prelude::*;
use jiff_diesel::Timestamp;
use uuid::Uuid;

use crate::schema::project_members;
use crate::types::ProjectRole;

/// An account's membership in a project.
///
/// An account holds at most one role per project.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = project_members)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProjectMember {
    /// Unique membership identifier.
    pub id: Uuid,
    /// Reference to the project.
    pub project_id: Uuid,
    /// Reference to the member's account.
    pub account_id: Uuid,
    /// Member's role in the project.
    pub member_role: ProjectRole,
    /// Timestamp when the membership was created.
    pub created_at: Timestamp,
    /// Timestamp when the membership was last updated.
    pub updated_at: Timestamp,
}

impl ProjectMember {
    /// Returns whether the member administers the project.
    #[inline]
    pub fn is_administrator(&self) -> bool {
        self.member_role.is_administrator()
    }
}

/// Data for creating a new project member.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = project_members)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewProjectMember {
    pub project_id: Uuid,
    pub account_id: Uuid,
    pub member_role: ProjectRole,
}

impl NewProjectMember {
    /// Creates a new membership with the given role.
    pub fn new(project_id: Uuid, account_id: Uuid, member_role: ProjectRole) -> Self {
        Self {
            project_id,
            account_id,
            member_role,
        }
    }

    /// Creates the membership of a project's creator.
    pub fn new_administrator(project_id: Uuid, account_id: Uuid) -> Self {
        Self::new(project_id, account_id, ProjectRole::Administrator)
    }
}

/// Data for updating a project member.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = project_members)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UpdateProjectMember {
    pub member_role: Option<ProjectRole>,
}
