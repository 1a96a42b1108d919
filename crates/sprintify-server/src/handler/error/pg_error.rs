//! Conversion of PostgreSQL errors into HTTP errors.
//!
//! Named constraint violations are mapped per table, see the `pg_*` sibling
//! modules. Violations without a known constraint name fall back to their
//! database error kind: unique violations become conflicts and foreign-key
//! violations become bad requests. Everything else is an internal error whose
//! details are only logged.

use sprintify_postgres::PgError;
use sprintify_postgres::error::DieselError;
use sprintify_postgres::types::ConstraintViolation;

use crate::handler::{Error, ErrorKind};

/// Tracing target for database error conversion.
const TRACING_TARGET: &str = "sprintify_server::postgres_constraints";

impl From<ConstraintViolation> for Error<'static> {
    fn from(constraint: ConstraintViolation) -> Self {
        match constraint {
            ConstraintViolation::Account(c) => c.into(),
            ConstraintViolation::Project(c) => c.into(),
            ConstraintViolation::ProjectMember(c) => c.into(),
            ConstraintViolation::Epic(c) => c.into(),
            ConstraintViolation::Sprint(c) => c.into(),
            ConstraintViolation::BoardColumn(c) => c.into(),
            ConstraintViolation::IssueStatus(c) => c.into(),
            ConstraintViolation::Issue(c) => c.into(),
            ConstraintViolation::Notification(c) => c.into(),
        }
    }
}

impl From<PgError> for Error<'static> {
    fn from(error: PgError) -> Self {
        if let Some(constraint) = error.constraint_violation() {
            tracing::warn!(
                target: TRACING_TARGET,
                constraint = %constraint,
                table = constraint.table_name(),
                category = ?constraint.constraint_category(),
                "query rejected by constraint"
            );
            return constraint.into();
        }

        if error.is_serialization_failure() {
            tracing::warn!(
                target: TRACING_TARGET,
                error = %error,
                "serializable transaction lost a conflict"
            );
            return ErrorKind::Conflict
                .with_message("The resource was modified concurrently, please retry");
        }

        if error.is_unique_violation() {
            tracing::warn!(target: TRACING_TARGET, error = %error, "unique violation");
            return ErrorKind::Conflict.into_error();
        }

        if error.is_foreign_key_violation() {
            tracing::warn!(target: TRACING_TARGET, error = %error, "foreign key violation");
            return ErrorKind::BadRequest.with_message("Referenced resource does not exist");
        }

        match error {
            PgError::Config(config_error) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %config_error,
                    "database configuration error"
                );
                ErrorKind::InternalServerError.into_error()
            }
            PgError::Timeout(timeout) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    timeout = ?timeout,
                    "database timeout",
                );
                ErrorKind::ServiceUnavailable.into_error()
            }
            PgError::Connection(connection_error) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %connection_error,
                    "database connection error"
                );
                ErrorKind::ServiceUnavailable.into_error()
            }
            PgError::Migration(migration_error) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %migration_error,
                    "database migration error"
                );
                ErrorKind::InternalServerError.into_error()
            }
            PgError::Query(query_error) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %query_error,
                    "query error"
                );
                ErrorKind::InternalServerError.into_error()
            }
            PgError::Unexpected(unexpected_error) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %unexpected_error,
                    "unexpected database error"
                );
                ErrorKind::InternalServerError.into_error()
            }
        }
    }
}

// Used only for transactions.
impl From<DieselError> for Error<'static> {
    fn from(error: DieselError) -> Self {
        let pg_error: PgError = error.into();
        pg_error.into()
    }
}

#[cfg(test)]
mod tests {
    use sprintify_postgres::types::{IssueConstraints, ProjectMemberConstraints};

    use super::*;

    #[test]
    fn duplicate_membership_is_conflict() {
        let error: Error = ConstraintViolation::ProjectMember(
            ProjectMemberConstraints::ProjectAccountUnique,
        )
        .into();

        assert_eq!(error.kind(), ErrorKind::Conflict);
        assert_eq!(error.resource(), Some("member"));
    }

    #[test]
    fn range_checks_are_bad_requests() {
        let error: Error = ConstraintViolation::Issue(IssueConstraints::StoryPointsRange).into();
        assert_eq!(error.kind(), ErrorKind::BadRequest);
        assert_eq!(error.resource(), Some("issue"));
    }

    #[test]
    fn unexpected_errors_hide_details() {
        let error: Error = PgError::Unexpected("pool exploded".into()).into();
        assert_eq!(error.kind(), ErrorKind::InternalServerError);
        assert_eq!(error.message(), None);
    }

    #[test]
    fn record_not_found_is_internal() {
        let error: Error = DieselError::NotFound.into();
        assert_eq!(error.kind(), ErrorKind::InternalServerError);
    }
}
