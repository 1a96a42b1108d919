//! Issue statuses table constraint violations.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::ConstraintCategory;

/// Issue statuses table constraint violations.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[derive(Serialize, Deserialize, Display, EnumIter, EnumString)]
#[serde(into = "String", try_from = "String")]
pub enum IssueStatusConstraints {
    #[strum(serialize = "issue_statuses_project_name_unique")]
    ProjectNameUnique,
    #[strum(serialize = "issue_statuses_color_format")]
    ColorFormat,
    #[strum(serialize = "issue_statuses_position_range")]
    PositionRange,
    #[strum(serialize = "issue_statuses_updated_after_created")]
    UpdatedAfterCreated,
}

impl IssueStatusConstraints {
    /// Creates a new [`IssueStatusConstraints`] from the constraint name.
    pub fn new(constraint: &str) -> Option<Self> {
        constraint.parse().ok()
    }

    /// Returns the category of this constraint violation.
    pub fn categorize(&self) -> ConstraintCategory {
        match self {
            Self::ProjectNameUnique => ConstraintCategory::Uniqueness,
            Self::ColorFormat => ConstraintCategory::Validation,
            Self::PositionRange => ConstraintCategory::Validation,
            Self::UpdatedAfterCreated => ConstraintCategory::Chronological,
        }
    }
}

impl From<IssueStatusConstraints> for String {
    #[inline]
    fn from(val: IssueStatusConstraints) -> Self {
        val.to_string()
    }
}

impl TryFrom<String> for IssueStatusConstraints {
    type Error = strum::ParseError;

    #[inline]
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
