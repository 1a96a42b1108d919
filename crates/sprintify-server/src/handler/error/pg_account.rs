//! Account constraint violation error handlers.

use sprintify_postgres::types::AccountConstraints;

use crate::handler::{Error, ErrorKind};

impl From<AccountConstraints> for Error<'static> {
    fn from(c: AccountConstraints) -> Self {
        let error = match c {
            AccountConstraints::DisplayNameLength => ErrorKind::BadRequest
                .with_message("Display name must be between 1 and 128 characters long"),
            AccountConstraints::EmailAddressUnique => {
                ErrorKind::Conflict.with_message("Email address is already in use")
            }
        };

        error.with_resource("account")
    }
}
