//! Project and membership constraint violation error handlers.

use sprintify_postgres::types::{ProjectConstraints, ProjectMemberConstraints};

use crate::handler::{Error, ErrorKind};

impl From<ProjectConstraints> for Error<'static> {
    fn from(c: ProjectConstraints) -> Self {
        let error = match c {
            ProjectConstraints::DisplayNameLength => ErrorKind::BadRequest
                .with_message("Project name must be between 1 and 128 characters long"),
            ProjectConstraints::DescriptionLength => {
                ErrorKind::BadRequest.with_message("Project description is too long")
            }
            ProjectConstraints::UpdatedAfterCreated => ErrorKind::InternalServerError.into_error(),
        };

        error.with_resource("project")
    }
}

impl From<ProjectMemberConstraints> for Error<'static> {
    fn from(c: ProjectMemberConstraints) -> Self {
        let error = match c {
            ProjectMemberConstraints::ProjectAccountUnique => {
                ErrorKind::Conflict.with_message("Account is already a member of this project")
            }
            ProjectMemberConstraints::UpdatedAfterCreated => {
                ErrorKind::InternalServerError.into_error()
            }
        };

        error.with_resource("member")
    }
}
