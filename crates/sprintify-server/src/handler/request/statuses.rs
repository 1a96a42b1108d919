//! Issue status request types.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sprintify_postgres::model::{NewIssueStatus, UpdateIssueStatus as UpdateIssueStatusModel};
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Default color of a status created without one.
const DEFAULT_COLOR: &str = "#6b7280";

/// Request payload for creating an issue status.
#[must_use]
#[derive(Debug, Serialize, Deserialize, Validate, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateIssueStatus {
    #[validate(length(min = 1, max = 50))]
    pub display_name: String,
    /// Hex color such as `#22c55e`.
    #[validate(custom(function = "validate_hex_color"))]
    pub color: Option<String>,
    #[validate(range(min = 0, max = 1000))]
    pub position: Option<i32>,
}

impl CreateIssueStatus {
    pub fn into_model(self, project_id: Uuid, next_position: i32) -> NewIssueStatus {
        NewIssueStatus {
            project_id,
            display_name: self.display_name.trim().to_owned(),
            color: self.color.unwrap_or_else(|| DEFAULT_COLOR.to_owned()),
            position: self.position.unwrap_or(next_position),
        }
    }
}

/// Request payload for updating an issue status.
#[must_use]
#[derive(Debug, Serialize, Deserialize, Validate, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateIssueStatus {
    #[validate(length(min = 1, max = 50))]
    pub display_name: Option<String>,
    #[validate(custom(function = "validate_hex_color"))]
    pub color: Option<String>,
    #[validate(range(min = 0, max = 1000))]
    pub position: Option<i32>,
}

impl UpdateIssueStatus {
    pub fn into_model(self) -> UpdateIssueStatusModel {
        UpdateIssueStatusModel {
            display_name: self.display_name.map(|name| name.trim().to_owned()),
            color: self.color,
            position: self.position,
        }
    }
}

fn validate_hex_color(color: &str) -> Result<(), ValidationError> {
    let digits = color.strip_prefix('#').unwrap_or("");
    let valid = digits.len() == 6 && digits.chars().all(|c| c.is_ascii_hexdigit());

    if valid {
        Ok(())
    } else {
        Err(ValidationError::new("color").with_message("must be a hex color like #22c55e".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_colors() {
        assert!(validate_hex_color("#22c55e").is_ok());
        assert!(validate_hex_color("#fff").is_err());
        assert!(validate_hex_color("22c55e").is_err());
        assert!(validate_hex_color("#zzzzzz").is_err());
    }
}
