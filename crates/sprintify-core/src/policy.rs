//! Membership mutation policy: role changes, removals and the
//! last-administrator guard.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Permission, ProjectRole};

/// Reason a membership mutation was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoleChangeDenial {
    /// The change would leave the project without an administrator.
    LastAdministrator,
    /// The acting role lacks the permission for this kind of change.
    MissingPermission,
    /// The target holds a role equal to or above the acting role.
    InsufficientRank,
    /// The requested role is above the acting role.
    RoleAboveActor,
}

impl RoleChangeDenial {
    /// Returns the user-facing reason for this denial.
    pub const fn reason(self) -> &'static str {
        match self {
            Self::LastAdministrator => {
                "This member is the only administrator of the project; \
                 promote another member to administrator first"
            }
            Self::MissingPermission => "Your role does not allow managing members' roles",
            Self::InsufficientRank => "You cannot modify a member whose role is equal to or above yours",
            Self::RoleAboveActor => "You cannot grant a role above your own",
        }
    }
}

impl fmt::Display for RoleChangeDenial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.reason())
    }
}

/// Structured outcome of a membership policy check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleChange {
    pub allowed: bool,
    pub denial: Option<RoleChangeDenial>,
}

impl RoleChange {
    /// Creates an allowed outcome.
    pub const fn allowed() -> Self {
        Self {
            allowed: true,
            denial: None,
        }
    }

    /// Creates a denied outcome with the given cause.
    pub const fn denied(denial: RoleChangeDenial) -> Self {
        Self {
            allowed: false,
            denial: Some(denial),
        }
    }

    /// Returns the user-facing rejection reason, if denied.
    pub fn reason(&self) -> Option<&'static str> {
        self.denial.map(RoleChangeDenial::reason)
    }

    /// Converts into a `Result`, carrying the denial on failure.
    pub fn into_result(self) -> Result<(), RoleChangeDenial> {
        match self.denial {
            Some(denial) if !self.allowed => Err(denial),
            _ => Ok(()),
        }
    }
}

/// Checks whether `actor` may modify the role of a member holding `target`.
///
/// Requires [`Permission::EditRole`] and a strictly higher rank than the
/// target; peers and superiors are never modifiable.
pub const fn can_modify_user_role(actor: ProjectRole, target: ProjectRole) -> RoleChange {
    if !Permission::EditRole.is_permitted_by_role(actor) {
        return RoleChange::denied(RoleChangeDenial::MissingPermission);
    }

    if !actor.outranks(target) {
        return RoleChange::denied(RoleChangeDenial::InsufficientRank);
    }

    RoleChange::allowed()
}

/// Returns whether moving one member from `current` to `next` would leave
/// the project with zero administrators.
///
/// `administrators` is the number of administrators in the full, current
/// membership set of the project. `next == None` means removal.
const fn strips_last_administrator(
    administrators: usize,
    current: ProjectRole,
    next: Option<ProjectRole>,
) -> bool {
    let stays_administrator = match next {
        Some(role) => role.is_administrator(),
        None => false,
    };

    current.is_administrator() && !stays_administrator && administrators <= 1
}

/// Evaluates a role change of a member from `current` to `requested`.
///
/// The last-administrator guard is evaluated first and applies regardless
/// of who performs the action.
pub const fn evaluate_role_change(
    actor: ProjectRole,
    current: ProjectRole,
    requested: ProjectRole,
    administrators: usize,
) -> RoleChange {
    if strips_last_administrator(administrators, current, Some(requested)) {
        return RoleChange::denied(RoleChangeDenial::LastAdministrator);
    }

    let change = can_modify_user_role(actor, current);
    if !change.allowed {
        return change;
    }

    if requested.rank() > actor.rank() {
        return RoleChange::denied(RoleChangeDenial::RoleAboveActor);
    }

    RoleChange::allowed()
}

/// Evaluates removing a member holding `target` from the project.
///
/// Members may always remove themselves (leave), subject to the
/// last-administrator guard.
pub const fn evaluate_member_removal(
    actor: ProjectRole,
    target: ProjectRole,
    is_self: bool,
    administrators: usize,
) -> RoleChange {
    if strips_last_administrator(administrators, target, None) {
        return RoleChange::denied(RoleChangeDenial::LastAdministrator);
    }

    if is_self {
        return RoleChange::allowed();
    }

    if !Permission::RemoveMember.is_permitted_by_role(actor) {
        return RoleChange::denied(RoleChangeDenial::MissingPermission);
    }

    if !actor.outranks(target) {
        return RoleChange::denied(RoleChangeDenial::InsufficientRank);
    }

    RoleChange::allowed()
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;
    use crate::ProjectRole::{Administrator, Member, Moderator};

    #[test]
    fn higher_rank_with_edit_role_may_modify_lower() {
        for actor in ProjectRole::iter() {
            for target in ProjectRole::iter() {
                let change = can_modify_user_role(actor, target);
                let expected =
                    Permission::EditRole.is_permitted_by_role(actor) && actor.outranks(target);
                assert_eq!(change.allowed, expected, "{actor} -> {target}");
            }
        }
    }

    #[test]
    fn lower_rank_never_modifies_higher() {
        for actor in ProjectRole::iter() {
            for target in ProjectRole::iter().filter(|t| *t > actor) {
                assert!(!can_modify_user_role(actor, target).allowed);
                assert!(!can_modify_user_role(target, target).allowed);
            }
        }
    }

    #[test]
    fn denial_carries_reason() {
        let change = can_modify_user_role(Moderator, Member);
        assert_eq!(change.denial, Some(RoleChangeDenial::MissingPermission));
        assert!(change.reason().is_some());

        let change = can_modify_user_role(Administrator, Administrator);
        assert_eq!(change.denial, Some(RoleChangeDenial::InsufficientRank));
        assert!(change.into_result().is_err());
    }

    #[test]
    fn sole_administrator_cannot_be_demoted_by_anyone() {
        for actor in ProjectRole::iter() {
            for requested in [Member, Moderator] {
                let change = evaluate_role_change(actor, Administrator, requested, 1);
                assert_eq!(change.denial, Some(RoleChangeDenial::LastAdministrator));
                assert!(change.reason().unwrap().contains("only administrator"));
            }
        }
    }

    #[test]
    fn administrator_may_be_demoted_when_another_remains() {
        let change = evaluate_role_change(Administrator, Administrator, Member, 2);
        // Peers still cannot modify each other.
        assert_eq!(change.denial, Some(RoleChangeDenial::InsufficientRank));

        let change = evaluate_role_change(Administrator, Moderator, Member, 1);
        assert!(change.allowed);

        let change = evaluate_role_change(Administrator, Member, Administrator, 1);
        assert!(change.allowed);
    }

    #[test]
    fn removal_rules() {
        assert!(evaluate_member_removal(Moderator, Member, false, 1).allowed);
        assert!(!evaluate_member_removal(Member, Member, false, 1).allowed);
        assert!(!evaluate_member_removal(Moderator, Moderator, false, 1).allowed);
        assert!(evaluate_member_removal(Member, Member, true, 1).allowed);

        let change = evaluate_member_removal(Administrator, Administrator, true, 1);
        assert_eq!(change.denial, Some(RoleChangeDenial::LastAdministrator));

        assert!(evaluate_member_removal(Administrator, Administrator, true, 2).allowed);
    }
}
