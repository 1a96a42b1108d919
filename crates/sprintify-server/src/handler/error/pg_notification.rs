//! Notification constraint violation error handlers.

use sprintify_postgres::types::NotificationConstraints;

use crate::handler::{Error, ErrorKind};

impl From<NotificationConstraints> for Error<'static> {
    fn from(c: NotificationConstraints) -> Self {
        let error = match c {
            NotificationConstraints::TitleLength => ErrorKind::BadRequest
                .with_message("Notification title must be between 1 and 256 characters long"),
            NotificationConstraints::MessageLength => {
                ErrorKind::BadRequest.with_message("Notification message is too long")
            }
            NotificationConstraints::ReadAtConsistency => {
                ErrorKind::InternalServerError.into_error()
            }
        };

        error.with_resource("notification")
    }
}
