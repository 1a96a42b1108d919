//! Epics table constraint violations.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::ConstraintCategory;

/// Epics table constraint violations.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[derive(Serialize, Deserialize, Display, EnumIter, EnumString)]
#[serde(into = "String", try_from = "String")]
pub enum EpicConstraints {
    #[strum(serialize = "epics_display_name_length")]
    DisplayNameLength,
    #[strum(serialize = "epics_updated_after_created")]
    UpdatedAfterCreated,
}

impl EpicConstraints {
    /// Creates a new [`EpicConstraints`] from the constraint name.
    pub fn new(constraint: &str) -> Option<Self> {
        constraint.parse().ok()
    }

    /// Returns the category of this constraint violation.
    pub fn categorize(&self) -> ConstraintCategory {
        match self {
            Self::DisplayNameLength => ConstraintCategory::Validation,
            Self::UpdatedAfterCreated => ConstraintCategory::Chronological,
        }
    }
}

impl From<EpicConstraints> for String {
    #[inline]
    fn from(val: EpicConstraints) -> Self {
        val.to_string()
    }
}

impl TryFrom<String> for EpicConstraints {
    type Error = strum::ParseError;

    #[inline]
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
