//! Permission matrix for project-scoped actions.

#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

use crate::ProjectRole;

/// Named project action that requires authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(Serialize, Deserialize, Display, EnumIter, EnumString)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Permission {
    // Issue permissions
    CreateTask,
    UpdateTask,
    DeleteTask,

    // Epic permissions
    CreateEpic,
    UpdateEpic,
    DeleteEpic,

    // Sprint permissions
    CreateSprint,
    UpdateSprint,
    DeleteSprint,

    // Board permissions
    ConfigureBoard,
    ConfigureStatus,

    // Member management permissions
    InviteMember,
    RemoveMember,
    EditRole,

    // Project permissions
    EditProject,
    DeleteProject,
}

impl Permission {
    /// Checks if the given project role satisfies this permission requirement.
    pub const fn is_permitted_by_role(self, role: ProjectRole) -> bool {
        use ProjectRole::{Administrator, Member, Moderator};

        match self {
            Self::CreateTask | Self::UpdateTask | Self::DeleteTask => {
                matches!(role, Member | Moderator | Administrator)
            }
            Self::CreateEpic | Self::UpdateEpic | Self::DeleteEpic => {
                matches!(role, Member | Moderator | Administrator)
            }

            Self::CreateSprint | Self::UpdateSprint | Self::DeleteSprint => {
                matches!(role, Moderator | Administrator)
            }
            Self::ConfigureBoard | Self::ConfigureStatus => {
                matches!(role, Moderator | Administrator)
            }
            Self::InviteMember | Self::RemoveMember => matches!(role, Moderator | Administrator),

            Self::EditRole | Self::EditProject | Self::DeleteProject => {
                matches!(role, Administrator)
            }
        }
    }

    /// Returns the minimum role required for this permission.
    #[must_use]
    pub const fn minimum_required_role(self) -> ProjectRole {
        match self {
            Self::CreateTask
            | Self::UpdateTask
            | Self::DeleteTask
            | Self::CreateEpic
            | Self::UpdateEpic
            | Self::DeleteEpic => ProjectRole::Member,

            Self::CreateSprint
            | Self::UpdateSprint
            | Self::DeleteSprint
            | Self::ConfigureBoard
            | Self::ConfigureStatus
            | Self::InviteMember
            | Self::RemoveMember => ProjectRole::Moderator,

            Self::EditRole | Self::EditProject | Self::DeleteProject => ProjectRole::Administrator,
        }
    }

    /// Returns true if this permission manages membership rather than content.
    #[must_use]
    pub const fn is_member_management(self) -> bool {
        matches!(
            self,
            Self::InviteMember | Self::RemoveMember | Self::EditRole
        )
    }
}

/// Returns whether the role, if any, is allowed to perform the action.
///
/// A missing role (not a project member, or a role name that failed to
/// parse) never grants anything.
#[inline]
pub const fn can(role: Option<ProjectRole>, permission: Permission) -> bool {
    match role {
        Some(role) => permission.is_permitted_by_role(role),
        None => false,
    }
}

/// Returns all permissions available to the given role.
pub fn permissions_for_role(role: ProjectRole) -> Vec<Permission> {
    Permission::iter()
        .filter(|perm| perm.is_permitted_by_role(role))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::str::FromStr;

    use super::*;

    #[test]
    fn matrix_is_deterministic() {
        for role in ProjectRole::iter() {
            for permission in Permission::iter() {
                assert_eq!(can(Some(role), permission), can(Some(role), permission));
            }
        }
    }

    #[test]
    fn missing_role_is_fail_closed() {
        for permission in Permission::iter() {
            assert!(!can(None, permission));
        }

        let unknown = ProjectRole::from_str("OWNER").ok();
        assert!(!can(unknown, Permission::CreateTask));
    }

    #[test]
    fn reference_matrix() {
        use ProjectRole::{Administrator, Member, Moderator};

        assert!(can(Some(Member), Permission::DeleteTask));
        assert!(!can(Some(Member), Permission::DeleteSprint));
        assert!(!can(Some(Member), Permission::ConfigureBoard));
        assert!(!can(Some(Member), Permission::InviteMember));

        assert!(can(Some(Moderator), Permission::DeleteSprint));
        assert!(can(Some(Moderator), Permission::ConfigureStatus));
        assert!(can(Some(Moderator), Permission::RemoveMember));
        assert!(!can(Some(Moderator), Permission::EditRole));
        assert!(!can(Some(Moderator), Permission::DeleteProject));

        assert!(can(Some(Administrator), Permission::EditRole));
        assert!(can(Some(Administrator), Permission::EditProject));
        assert!(can(Some(Administrator), Permission::DeleteProject));
    }

    #[test]
    fn matrix_is_monotonic_in_rank() {
        let member: HashSet<_> = permissions_for_role(ProjectRole::Member).into_iter().collect();
        let moderator: HashSet<_> = permissions_for_role(ProjectRole::Moderator)
            .into_iter()
            .collect();
        let administrator: HashSet<_> = permissions_for_role(ProjectRole::Administrator)
            .into_iter()
            .collect();

        assert!(member.is_subset(&moderator));
        assert!(moderator.is_subset(&administrator));
        assert_eq!(administrator.len(), Permission::iter().count());
    }

    #[test]
    fn minimum_role_agrees_with_matrix() {
        for permission in Permission::iter() {
            let minimum = permission.minimum_required_role();
            for role in ProjectRole::iter() {
                assert_eq!(permission.is_permitted_by_role(role), role >= minimum);
            }
        }
    }
}
