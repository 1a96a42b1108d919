//! Request extractors with structured rejections.
//!
//! Drop-in replacements for the `axum` extractors of the same name whose
//! rejections are [`handler::Error`]s, so every malformed request answers with
//! the common error envelope.
//!
//! [`handler::Error`]: crate::handler::Error

mod json;
mod path;
mod query;
mod validate_json;

pub use self::json::Json;
pub use self::path::Path;
pub use self::query::Query;
pub use self::validate_json::ValidateJson;

/// Keeps the first lines of a deserializer message, bounded in length.
fn sanitize_error_message(message: &str, max_lines: usize, max_chars: usize) -> String {
    let lines = message.lines().take(max_lines).collect::<Vec<_>>();
    lines.join(" ").chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_bounds_lines_and_length() {
        let message = "first\nsecond\nthird\nfourth";
        assert_eq!(sanitize_error_message(message, 2, 200), "first second");
        assert_eq!(sanitize_error_message(&"x".repeat(500), 3, 200).len(), 200);
    }
}
