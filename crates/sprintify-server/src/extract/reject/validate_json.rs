//! JSON extractor that runs `validator` rules after deserialization.

use std::borrow::Cow;
use std::collections::HashMap;

use axum::extract::{FromRequest, Request};
use derive_more::{Deref, DerefMut, From};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

use super::Json;
use crate::handler::{Error, ErrorKind};

/// Tracing target for request validation.
const TRACING_TARGET: &str = "sprintify_server::extract::validate";

/// JSON extractor with automatic validation.
///
/// Every failed rule becomes one entry of `errors[]` in the `400` response.
#[must_use]
#[derive(Debug, Clone, Copy, Default, Deref, DerefMut, From)]
pub struct ValidateJson<T>(pub T);

impl<T> ValidateJson<T> {
    /// Returns the validated value.
    #[inline]
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T, S> FromRequest<S> for ValidateJson<T>
where
    T: DeserializeOwned + Validate + 'static,
    S: Send + Sync,
{
    type Rejection = Error<'static>;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = <Json<T> as FromRequest<S>>::from_request(req, state).await?;
        data.validate()?;
        Ok(Self(data))
    }
}

type Params = HashMap<Cow<'static, str>, serde_json::Value>;

fn number_param(params: &Params, name: &str) -> Option<f64> {
    params.get(name).and_then(serde_json::Value::as_f64)
}

fn format_length_error(field: &str, params: &Params) -> String {
    match (number_param(params, "min"), number_param(params, "max")) {
        (Some(min), Some(max)) => {
            format!("Field '{field}' must be between {min} and {max} characters long")
        }
        (Some(min), None) => format!("Field '{field}' must be at least {min} characters long"),
        (None, Some(max)) => format!("Field '{field}' must be at most {max} characters long"),
        (None, None) => format!("Field '{field}' has invalid length"),
    }
}

fn format_range_error(field: &str, params: &Params) -> String {
    match (number_param(params, "min"), number_param(params, "max")) {
        (Some(min), Some(max)) => format!("Field '{field}' must be between {min} and {max}"),
        (Some(min), None) => format!("Field '{field}' must be at least {min}"),
        (None, Some(max)) => format!("Field '{field}' must be at most {max}"),
        (None, None) => format!("Field '{field}' is out of valid range"),
    }
}

/// Renders one failed rule as a user-facing sentence.
fn format_validation_error(field: &str, error: &validator::ValidationError) -> String {
    if let Some(custom_message) = &error.message {
        return format!("Field '{field}' {custom_message}");
    }

    let message = match error.code.as_ref() {
        "required" => "is required and cannot be empty",
        "length" => return format_length_error(field, &error.params),
        "range" => return format_range_error(field, &error.params),
        "email" => "must be a valid email address",
        "url" => "must be a valid URL",
        "regex" => "has an invalid format",
        code => return format!("Field '{field}' failed validation: {code}"),
    };

    format!("Field '{field}' {message}")
}

/// Flattens nested struct and list errors into `parent.child` field paths.
fn collect_messages(prefix: Option<&str>, errors: &ValidationErrors, out: &mut Vec<String>) {
    for (field, kind) in errors.errors() {
        let path = match prefix {
            Some(prefix) => format!("{prefix}.{field}"),
            None => field.to_string(),
        };

        match kind {
            ValidationErrorsKind::Field(field_errors) => out.extend(
                field_errors
                    .iter()
                    .map(|error| format_validation_error(&path, error)),
            ),
            ValidationErrorsKind::Struct(nested) => collect_messages(Some(&path), nested, out),
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    collect_messages(Some(&format!("{path}[{index}]")), nested, out);
                }
            }
        }
    }
}

impl From<ValidationErrors> for Error<'static> {
    fn from(errors: ValidationErrors) -> Self {
        let mut messages = Vec::new();
        collect_messages(None, &errors, &mut messages);
        messages.sort();

        tracing::debug!(
            target: TRACING_TARGET,
            errors = ?messages,
            "request validation failed"
        );

        ErrorKind::ValidationError
            .with_resource("request")
            .with_errors(messages)
    }
}

impl<T> aide::OperationInput for ValidateJson<T>
where
    T: schemars::JsonSchema,
{
    fn operation_input(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) {
        Json::<T>::operation_input(ctx, operation);
    }

    fn inferred_early_responses(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) -> Vec<(Option<u16>, aide::openapi::Response)> {
        Json::<T>::inferred_early_responses(ctx, operation)
    }
}

#[cfg(test)]
mod tests {
    use validator::Validate;

    use super::*;

    #[derive(Validate)]
    struct ProjectForm {
        #[validate(length(min = 1, max = 100))]
        display_name: String,
        #[validate(range(min = 0, max = 100))]
        story_points: i32,
    }

    #[test]
    fn every_failure_lands_in_errors() {
        let form = ProjectForm {
            display_name: String::new(),
            story_points: 500,
        };

        let error = Error::from(form.validate().unwrap_err());
        assert_eq!(error.kind(), ErrorKind::ValidationError);
        assert_eq!(error.resource(), Some("request"));
        assert_eq!(error.errors().len(), 2);
        assert!(error.errors()[0].contains("display_name"));
        assert!(error.errors()[1].contains("must be between 0 and 100"));
    }

    #[test]
    fn valid_form_passes() {
        let form = ProjectForm {
            display_name: "Roadmap".into(),
            story_points: 8,
        };
        assert!(form.validate().is_ok());
    }
}
