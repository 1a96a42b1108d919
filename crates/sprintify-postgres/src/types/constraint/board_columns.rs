//! Board columns table constraint violations.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::ConstraintCategory;

/// Board columns table constraint violations.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[derive(Serialize, Deserialize, Display, EnumIter, EnumString)]
#[serde(into = "String", try_from = "String")]
pub enum BoardColumnConstraints {
    #[strum(serialize = "board_columns_project_name_unique")]
    ProjectNameUnique,
    #[strum(serialize = "board_columns_position_range")]
    PositionRange,
    #[strum(serialize = "board_columns_updated_after_created")]
    UpdatedAfterCreated,
}

impl BoardColumnConstraints {
    /// Creates a new [`BoardColumnConstraints`] from the constraint name.
    pub fn new(constraint: &str) -> Option<Self> {
        constraint.parse().ok()
    }

    /// Returns the category of this constraint violation.
    pub fn categorize(&self) -> ConstraintCategory {
        match self {
            Self::ProjectNameUnique => ConstraintCategory::Uniqueness,
            Self::PositionRange => ConstraintCategory::Validation,
            Self::UpdatedAfterCreated => ConstraintCategory::Chronological,
        }
    }
}

impl From<BoardColumnConstraints> for String {
    #[inline]
    fn from(val: BoardColumnConstraints) -> Self {
        val.to_string()
    }
}

impl TryFrom<String> for BoardColumnConstraints {
    type Error = strum::ParseError;

    #[inline]
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
