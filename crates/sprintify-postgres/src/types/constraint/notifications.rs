//! Notifications table constraint violations.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::ConstraintCategory;

/// Notifications table constraint violations.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[derive(Serialize, Deserialize, Display, EnumIter, EnumString)]
#[serde(into = "String", try_from = "String")]
pub enum NotificationConstraints {
    #[strum(serialize = "notifications_title_length")]
    TitleLength,
    #[strum(serialize = "notifications_message_length")]
    MessageLength,
    #[strum(serialize = "notifications_read_at_consistency")]
    ReadAtConsistency,
}

impl NotificationConstraints {
    /// Creates a new [`NotificationConstraints`] from the constraint name.
    pub fn new(constraint: &str) -> Option<Self> {
        constraint.parse().ok()
    }

    /// Returns the category of this constraint violation.
    pub fn categorize(&self) -> ConstraintCategory {
        match self {
            Self::TitleLength => ConstraintCategory::Validation,
            Self::MessageLength => ConstraintCategory::Validation,
            Self::ReadAtConsistency => ConstraintCategory::BusinessLogic,
        }
    }
}

impl From<NotificationConstraints> for String {
    #[inline]
    fn from(val: NotificationConstraints) -> Self {
        val.to_string()
    }
}

impl TryFrom<String> for NotificationConstraints {
    type Error = strum::ParseError;

    #[inline]
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
