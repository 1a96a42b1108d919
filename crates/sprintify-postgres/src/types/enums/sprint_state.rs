//! Sprint lifecycle enumeration.

use diesel_derive_enum::DbEnum;
#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Lifecycle of a sprint.
///
/// Corresponds to the `SPRINT_STATE` PostgreSQL enum. A sprint moves forward
/// only: `PLANNED` to `ACTIVE` to `COMPLETED`.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Hash)]
#[derive(Serialize, Deserialize, DbEnum, Display, EnumIter, EnumString)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[ExistingTypePath = "crate::schema::sql_types::SprintState"]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum SprintState {
    /// Sprint is being prepared and has not started.
    #[db_rename = "planned"]
    #[default]
    Planned,

    /// Sprint is running.
    #[db_rename = "active"]
    Active,

    /// Sprint has finished.
    #[db_rename = "completed"]
    Completed,
}

impl SprintState {
    /// Returns whether moving from `self` to `next` is allowed.
    ///
    /// Staying in the same state is always allowed.
    #[inline]
    pub fn can_transition_to(self, next: SprintState) -> bool {
        matches!(
            (self, next),
            (Self::Planned, Self::Planned | Self::Active | Self::Completed)
                | (Self::Active, Self::Active | Self::Completed)
                | (Self::Completed, Self::Completed)
        )
    }

    /// Returns whether `next` starts this sprint.
    #[inline]
    pub fn is_start(self, next: SprintState) -> bool {
        self != Self::Active && next == Self::Active
    }

    /// Returns whether `next` completes this sprint.
    #[inline]
    pub fn is_completion(self, next: SprintState) -> bool {
        self != Self::Completed && next == Self::Completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_only() {
        assert!(SprintState::Planned.can_transition_to(SprintState::Active));
        assert!(SprintState::Active.can_transition_to(SprintState::Completed));
        assert!(!SprintState::Active.can_transition_to(SprintState::Planned));
        assert!(!SprintState::Completed.can_transition_to(SprintState::Active));
    }

    #[test]
    fn start_and_completion_edges() {
        assert!(SprintState::Planned.is_start(SprintState::Active));
        assert!(!SprintState::Active.is_start(SprintState::Active));
        assert!(SprintState::Active.is_completion(SprintState::Completed));
        assert!(SprintState::Planned.is_completion(SprintState::Completed));
        assert!(!SprintState::Completed.is_completion(SprintState::Completed));
    }

    #[test]
    fn wire_names() {
        assert_eq!(SprintState::Active.to_string(), "ACTIVE");
        assert_eq!(
            serde_json::to_string(&SprintState::Completed).ok().as_deref(),
            Some("\"COMPLETED\"")
        );
    }
}
