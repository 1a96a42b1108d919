//! Project role enumeration shared by the server and its clients.

use std::cmp;

#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// Role a member holds within a single project.
///
/// Corresponds to the `PROJECT_ROLE` PostgreSQL enum. Roles are totally
/// ordered by [`rank`]: `Member < Moderator < Administrator`.
///
/// [`rank`]: ProjectRole::rank
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Hash)]
#[derive(Serialize, Deserialize, Display, EnumIter, EnumString, IntoStaticStr)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[cfg_attr(feature = "diesel", derive(diesel_derive_enum::DbEnum))]
#[cfg_attr(
    feature = "diesel",
    ExistingTypePath = "crate::sql_types::ProjectRole"
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProjectRole {
    /// Works on issues and epics.
    #[cfg_attr(feature = "diesel", db_rename = "member")]
    #[default]
    Member,

    /// Runs sprints, configures the board and manages regular members.
    #[cfg_attr(feature = "diesel", db_rename = "moderator")]
    Moderator,

    /// Full control over the project, its settings and every role.
    #[cfg_attr(feature = "diesel", db_rename = "administrator")]
    Administrator,
}

/// The single role table: every role alongside its rank and wire name.
///
/// Clients that need a numeric ranking (sorting member lists, greying out
/// controls) read it from here instead of keeping their own mapping.
pub const ROLE_TABLE: [(ProjectRole, u8, &str); 3] = [
    (ProjectRole::Member, 1, "MEMBER"),
    (ProjectRole::Moderator, 2, "MODERATOR"),
    (ProjectRole::Administrator, 3, "ADMINISTRATOR"),
];

impl ProjectRole {
    /// Returns the numeric rank of this role (higher number = more authority).
    #[inline]
    pub const fn rank(self) -> u8 {
        match self {
            Self::Member => ROLE_TABLE[0].1,
            Self::Moderator => ROLE_TABLE[1].1,
            Self::Administrator => ROLE_TABLE[2].1,
        }
    }

    /// Looks up a role by its rank.
    pub fn from_rank(rank: u8) -> Option<Self> {
        ROLE_TABLE
            .iter()
            .find(|(_, r, _)| *r == rank)
            .map(|(role, _, _)| *role)
    }

    /// Returns whether this role is an administrator.
    #[inline]
    pub const fn is_administrator(self) -> bool {
        matches!(self, Self::Administrator)
    }

    /// Returns whether this role strictly outranks the other role.
    #[inline]
    pub const fn outranks(self, other: Self) -> bool {
        self.rank() > other.rank()
    }
}

impl PartialOrd for ProjectRole {
    fn partial_cmp(&self, other: &Self) -> Option<cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ProjectRole {
    fn cmp(&self, other: &Self) -> cmp::Ordering {
        self.rank().cmp(&other.rank())
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn ordering_follows_rank() {
        assert!(ProjectRole::Member < ProjectRole::Moderator);
        assert!(ProjectRole::Moderator < ProjectRole::Administrator);
        assert!(ProjectRole::Administrator.outranks(ProjectRole::Moderator));
        assert!(!ProjectRole::Moderator.outranks(ProjectRole::Moderator));
    }

    #[test]
    fn role_table_matches_variants() {
        for role in ProjectRole::iter() {
            assert_eq!(ProjectRole::from_rank(role.rank()), Some(role));
            let name: &'static str = role.into();
            assert!(ROLE_TABLE.iter().any(|(r, _, n)| *r == role && *n == name));
        }
        assert_eq!(ProjectRole::from_rank(0), None);
    }

    #[test]
    fn wire_names_are_screaming_case() {
        let json = serde_json::to_string(&ProjectRole::Administrator).unwrap();
        assert_eq!(json, "\"ADMINISTRATOR\"");

        let parsed: ProjectRole = serde_json::from_str("\"MODERATOR\"").unwrap();
        assert_eq!(parsed, ProjectRole::Moderator);

        assert_eq!(ProjectRole::from_str("MEMBER").unwrap(), ProjectRole::Member);
        assert!(ProjectRole::from_str("OWNER").is_err());
    }
}
