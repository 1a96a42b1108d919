//! Sprint request types.

use jiff::Timestamp;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sprintify_postgres::model::{NewSprint, UpdateSprint as UpdateSprintModel};
use sprintify_postgres::types::SprintState;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::deserialize_nullable;

/// Request payload for planning a sprint.
#[must_use]
#[derive(Debug, Serialize, Deserialize, Validate, JsonSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_create_window"))]
pub struct CreateSprint {
    /// Display name of the sprint.
    #[validate(length(min = 1, max = 128))]
    pub display_name: String,
    /// What the sprint should achieve.
    #[validate(length(max = 4096))]
    pub goal: Option<String>,
    /// Planned start.
    pub starts_at: Option<Timestamp>,
    /// Planned end; must be after the start.
    pub ends_at: Option<Timestamp>,
}

impl CreateSprint {
    pub fn into_model(self, project_id: Uuid) -> NewSprint {
        NewSprint {
            project_id,
            display_name: self.display_name.trim().to_owned(),
            goal: self.goal.unwrap_or_default(),
            starts_at: self.starts_at.map(Into::into),
            ends_at: self.ends_at.map(Into::into),
        }
    }
}

fn validate_create_window(sprint: &CreateSprint) -> Result<(), ValidationError> {
    check_window(sprint.starts_at, sprint.ends_at)
}

fn check_window(starts_at: Option<Timestamp>, ends_at: Option<Timestamp>) -> Result<(), ValidationError> {
    match (starts_at, ends_at) {
        (Some(start), Some(end)) if end <= start => Err(ValidationError::new("window")
            .with_message("endsAt must be later than startsAt".into())),
        _ => Ok(()),
    }
}

/// Request payload for updating a sprint.
///
/// Changing `state` to `ACTIVE` starts the sprint and to `COMPLETED`
/// completes it; both notify every project member.
#[must_use]
#[derive(Debug, Default, Serialize, Deserialize, Validate, JsonSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_update_window"))]
pub struct UpdateSprint {
    #[validate(length(min = 1, max = 128))]
    pub display_name: Option<String>,
    #[validate(length(max = 4096))]
    pub goal: Option<String>,
    /// New lifecycle state.
    pub state: Option<SprintState>,
    /// New start; `null` clears it.
    #[serde(default, deserialize_with = "deserialize_nullable")]
    pub starts_at: Option<Option<Timestamp>>,
    /// New end; `null` clears it.
    #[serde(default, deserialize_with = "deserialize_nullable")]
    pub ends_at: Option<Option<Timestamp>>,
}

fn validate_update_window(sprint: &UpdateSprint) -> Result<(), ValidationError> {
    check_window(sprint.starts_at.flatten(), sprint.ends_at.flatten())
}

impl UpdateSprint {
    pub fn into_model(self) -> UpdateSprintModel {
        UpdateSprintModel {
            display_name: self.display_name.map(|name| name.trim().to_owned()),
            goal: self.goal,
            sprint_state: self.state,
            starts_at: self.starts_at.map(|at| at.map(Into::into)),
            ends_at: self.ends_at.map(|at| at.map(Into::into)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn end_before_start_is_rejected() {
        let sprint = CreateSprint {
            display_name: "Sprint 1".into(),
            goal: None,
            starts_at: Some(Timestamp::from_second(2_000).unwrap()),
            ends_at: Some(Timestamp::from_second(1_000).unwrap()),
        };
        assert!(sprint.validate().is_err());
    }

    #[test]
    fn explicit_null_clears_dates() {
        let update: UpdateSprint = serde_json::from_str(r#"{"startsAt":null}"#).unwrap();
        assert_eq!(update.starts_at, Some(None));
        assert_eq!(update.ends_at, None);
    }
}
