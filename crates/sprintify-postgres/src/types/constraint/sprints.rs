//! Sprints table constraint violations.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::ConstraintCategory;

/// Sprints table constraint violations.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[derive(Serialize, Deserialize, Display, EnumIter, EnumString)]
#[serde(into = "String", try_from = "String")]
pub enum SprintConstraints {
    #[strum(serialize = "sprints_display_name_length")]
    DisplayNameLength,
    #[strum(serialize = "sprints_ends_after_starts")]
    EndsAfterStarts,
    #[strum(serialize = "sprints_updated_after_created")]
    UpdatedAfterCreated,
}

impl SprintConstraints {
    /// Creates a new [`SprintConstraints`] from the constraint name.
    pub fn new(constraint: &str) -> Option<Self> {
        constraint.parse().ok()
    }

    /// Returns the category of this constraint violation.
    pub fn categorize(&self) -> ConstraintCategory {
        match self {
            Self::DisplayNameLength => ConstraintCategory::Validation,
            Self::EndsAfterStarts => ConstraintCategory::Chronological,
            Self::UpdatedAfterCreated => ConstraintCategory::Chronological,
        }
    }
}

impl From<SprintConstraints> for String {
    #[inline]
    fn from(val: SprintConstraints) -> Self {
        val.to_string()
    }
}

impl TryFrom<String> for SprintConstraints {
    type Error = strum::ParseError;

    #[inline]
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
