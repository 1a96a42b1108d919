//! Projects table constraint violations.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::ConstraintCategory;

/// Projects table constraint violations.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[derive(Serialize, Deserialize, Display, EnumIter, EnumString)]
#[serde(into = "String", try_from = "String")]
pub enum ProjectConstraints {
    #[strum(serialize = "projects_display_name_length")]
    DisplayNameLength,
    #[strum(serialize = "projects_description_length")]
    DescriptionLength,
    #[strum(serialize = "projects_updated_after_created")]
    UpdatedAfterCreated,
}

impl ProjectConstraints {
    /// Creates a new [`ProjectConstraints`] from the constraint name.
    pub fn new(constraint: &str) -> Option<Self> {
        constraint.parse().ok()
    }

    /// Returns the category of this constraint violation.
    pub fn categorize(&self) -> ConstraintCategory {
        match self {
            Self::DisplayNameLength => ConstraintCategory::Validation,
            Self::DescriptionLength => ConstraintCategory::Validation,
            Self::UpdatedAfterCreated => ConstraintCategory::Chronological,
        }
    }
}

impl From<ProjectConstraints> for String {
    #[inline]
    fn from(val: ProjectConstraints) -> Self {
        val.to_string()
    }
}

impl TryFrom<String> for ProjectConstraints {
    type Error = strum::ParseError;

    #[inline]
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
