//! Database constraint violations grouped by table.

mod accounts;
mod board_columns;
mod epics;
mod issue_statuses;
mod issues;
mod notifications;
mod project_members;
mod projects;
mod sprints;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use self::accounts::AccountConstraints;
pub use self::board_columns::BoardColumnConstraints;
pub use self::epics::EpicConstraints;
pub use self::issue_statuses::IssueStatusConstraints;
pub use self::issues::IssueConstraints;
pub use self::notifications::NotificationConstraints;
pub use self::project_members::ProjectMemberConstraints;
pub use self::projects::ProjectConstraints;
pub use self::sprints::SprintConstraints;

/// Any named constraint of the schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum ConstraintViolation {
    Account(AccountConstraints),
    Project(ProjectConstraints),
    ProjectMember(ProjectMemberConstraints),
    Epic(EpicConstraints),
    Sprint(SprintConstraints),
    BoardColumn(BoardColumnConstraints),
    IssueStatus(IssueStatusConstraints),
    Issue(IssueConstraints),
    Notification(NotificationConstraints),
}

/// Categories of database constraint violations.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConstraintCategory {
    /// Format, length and range checks.
    Validation,
    /// Timestamp ordering.
    Chronological,
    /// Domain-specific rules.
    BusinessLogic,
    /// Unique keys and indexes.
    Uniqueness,
}

impl ConstraintViolation {
    /// Parses a constraint name reported by PostgreSQL.
    ///
    /// ```
    /// use sprintify_postgres::types::ConstraintViolation;
    ///
    /// assert!(ConstraintViolation::new("project_members_project_account_unique").is_some());
    /// assert!(ConstraintViolation::new("unknown_constraint").is_none());
    /// ```
    pub fn new(constraint: &str) -> Option<Self> {
        let prefix = constraint.split('_').next()?;
        match prefix {
            "accounts" => AccountConstraints::new(constraint).map(Self::Account),
            "projects" => ProjectConstraints::new(constraint).map(Self::Project),
            "project" => ProjectMemberConstraints::new(constraint).map(Self::ProjectMember),
            "epics" => EpicConstraints::new(constraint).map(Self::Epic),
            "sprints" => SprintConstraints::new(constraint).map(Self::Sprint),
            "board" => BoardColumnConstraints::new(constraint).map(Self::BoardColumn),
            "issue" => IssueStatusConstraints::new(constraint).map(Self::IssueStatus),
            "issues" => IssueConstraints::new(constraint).map(Self::Issue),
            "notifications" => NotificationConstraints::new(constraint).map(Self::Notification),
            _ => None,
        }
    }

    /// Returns the table the constraint is declared on.
    pub fn table_name(&self) -> &'static str {
        match self {
            Self::Account(_) => "accounts",
            Self::Project(_) => "projects",
            Self::ProjectMember(_) => "project_members",
            Self::Epic(_) => "epics",
            Self::Sprint(_) => "sprints",
            Self::BoardColumn(_) => "board_columns",
            Self::IssueStatus(_) => "issue_statuses",
            Self::Issue(_) => "issues",
            Self::Notification(_) => "notifications",
        }
    }

    /// Returns the category of this constraint violation.
    pub fn constraint_category(&self) -> ConstraintCategory {
        match self {
            Self::Account(c) => c.categorize(),
            Self::Project(c) => c.categorize(),
            Self::ProjectMember(c) => c.categorize(),
            Self::Epic(c) => c.categorize(),
            Self::Sprint(c) => c.categorize(),
            Self::BoardColumn(c) => c.categorize(),
            Self::IssueStatus(c) => c.categorize(),
            Self::Issue(c) => c.categorize(),
            Self::Notification(c) => c.categorize(),
        }
    }

    /// Returns the constraint name as declared in the schema.
    pub fn constraint_name(&self) -> String {
        match self {
            Self::Account(c) => c.to_string(),
            Self::Project(c) => c.to_string(),
            Self::ProjectMember(c) => c.to_string(),
            Self::Epic(c) => c.to_string(),
            Self::Sprint(c) => c.to_string(),
            Self::BoardColumn(c) => c.to_string(),
            Self::IssueStatus(c) => c.to_string(),
            Self::Issue(c) => c.to_string(),
            Self::Notification(c) => c.to_string(),
        }
    }
}

impl fmt::Display for ConstraintViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.constraint_name())
    }
}

impl From<ConstraintViolation> for String {
    #[inline]
    fn from(val: ConstraintViolation) -> Self {
        val.constraint_name()
    }
}

impl TryFrom<String> for ConstraintViolation {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value).ok_or_else(|| format!("unknown constraint: {value}"))
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn every_constraint_name_parses_back() {
        let names = AccountConstraints::iter()
            .map(|c| c.to_string())
            .chain(ProjectConstraints::iter().map(|c| c.to_string()))
            .chain(ProjectMemberConstraints::iter().map(|c| c.to_string()))
            .chain(EpicConstraints::iter().map(|c| c.to_string()))
            .chain(SprintConstraints::iter().map(|c| c.to_string()))
            .chain(BoardColumnConstraints::iter().map(|c| c.to_string()))
            .chain(IssueStatusConstraints::iter().map(|c| c.to_string()))
            .chain(IssueConstraints::iter().map(|c| c.to_string()))
            .chain(NotificationConstraints::iter().map(|c| c.to_string()));

        for name in names {
            let violation = ConstraintViolation::new(&name);
            assert!(violation.is_some(), "{name} did not parse");
            assert_eq!(violation.map(|v| v.constraint_name()), Some(name));
        }
    }

    #[test]
    fn projects_and_project_members_are_distinguished() {
        assert_eq!(
            ConstraintViolation::new("projects_display_name_length"),
            Some(ConstraintViolation::Project(
                ProjectConstraints::DisplayNameLength
            ))
        );
        assert_eq!(
            ConstraintViolation::new("project_members_project_account_unique")
                .map(|v| v.table_name()),
            Some("project_members")
        );
    }

    #[test]
    fn categories() {
        let unique = ConstraintViolation::new("board_columns_project_name_unique");
        assert_eq!(
            unique.map(|v| v.constraint_category()),
            Some(ConstraintCategory::Uniqueness)
        );

        let chronological = ConstraintViolation::new("sprints_ends_after_starts");
        assert_eq!(
            chronological.map(|v| v.constraint_category()),
            Some(ConstraintCategory::Chronological)
        );
    }
}
