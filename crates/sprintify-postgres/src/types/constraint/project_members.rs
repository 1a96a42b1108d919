//! Project members table constraint violations.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::ConstraintCategory;

/// Project members table constraint violations.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[derive(Serialize, Deserialize, Display, EnumIter, EnumString)]
#[serde(into = "String", try_from = "String")]
pub enum ProjectMemberConstraints {
    #[strum(serialize = "project_members_project_account_unique")]
    ProjectAccountUnique,
    #[strum(serialize = "project_members_updated_after_created")]
    UpdatedAfterCreated,
}

impl ProjectMemberConstraints {
    /// Creates a new [`ProjectMemberConstraints`] from the constraint name.
    pub fn new(constraint: &str) -> Option<Self> {
        constraint.parse().ok()
    }

    /// Returns the category of this constraint violation.
    pub fn categorize(&self) -> ConstraintCategory {
        match self {
            Self::ProjectAccountUnique => ConstraintCategory::Uniqueness,
            Self::UpdatedAfterCreated => ConstraintCategory::Chronological,
        }
    }
}

impl From<ProjectMemberConstraints> for String {
    #[inline]
    fn from(val: ProjectMemberConstraints) -> Self {
        val.to_string()
    }
}

impl TryFrom<String> for ProjectMemberConstraints {
    type Error = strum::ParseError;

    #[inline]
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
