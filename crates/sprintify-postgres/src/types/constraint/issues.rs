//! Issues table constraint violations.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::ConstraintCategory;

/// Issues table constraint violations.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[derive(Serialize, Deserialize, Display, EnumIter, EnumString)]
#[serde(into = "String", try_from = "String")]
pub enum IssueConstraints {
    #[strum(serialize = "issues_title_length")]
    TitleLength,
    #[strum(serialize = "issues_story_points_range")]
    StoryPointsRange,
    #[strum(serialize = "issues_position_range")]
    PositionRange,
    #[strum(serialize = "issues_updated_after_created")]
    UpdatedAfterCreated,
}

impl IssueConstraints {
    /// Creates a new [`IssueConstraints`] from the constraint name.
    pub fn new(constraint: &str) -> Option<Self> {
        constraint.parse().ok()
    }

    /// Returns the category of this constraint violation.
    pub fn categorize(&self) -> ConstraintCategory {
        match self {
            Self::TitleLength => ConstraintCategory::Validation,
            Self::StoryPointsRange => ConstraintCategory::Validation,
            Self::PositionRange => ConstraintCategory::Validation,
            Self::UpdatedAfterCreated => ConstraintCategory::Chronological,
        }
    }
}

impl From<IssueConstraints> for String {
    #[inline]
    fn from(val: IssueConstraints) -> Self {
        val.to_string()
    }
}

impl TryFrom<String> for IssueConstraints {
    type Error = strum::ParseError;

    #[inline]
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
