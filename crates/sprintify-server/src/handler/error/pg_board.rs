//! Board constraint violation error handlers: epics, sprints, columns,
//! statuses and issues.

use sprintify_postgres::types::{
    BoardColumnConstraints, EpicConstraints, IssueConstraints, IssueStatusConstraints,
    SprintConstraints,
};

use crate::handler::{Error, ErrorKind};

impl From<EpicConstraints> for Error<'static> {
    fn from(c: EpicConstraints) -> Self {
        let error = match c {
            EpicConstraints::DisplayNameLength => ErrorKind::BadRequest
                .with_message("Epic name must be between 1 and 256 characters long"),
            EpicConstraints::UpdatedAfterCreated => ErrorKind::InternalServerError.into_error(),
        };

        error.with_resource("epic")
    }
}

impl From<SprintConstraints> for Error<'static> {
    fn from(c: SprintConstraints) -> Self {
        let error = match c {
            SprintConstraints::DisplayNameLength => ErrorKind::BadRequest
                .with_message("Sprint name must be between 1 and 128 characters long"),
            SprintConstraints::EndsAfterStarts => {
                ErrorKind::BadRequest.with_message("Sprint must end after it starts")
            }
            SprintConstraints::UpdatedAfterCreated => ErrorKind::InternalServerError.into_error(),
        };

        error.with_resource("sprint")
    }
}

impl From<BoardColumnConstraints> for Error<'static> {
    fn from(c: BoardColumnConstraints) -> Self {
        let error = match c {
            BoardColumnConstraints::ProjectNameUnique => {
                ErrorKind::Conflict.with_message("A column with this name already exists")
            }
            BoardColumnConstraints::PositionRange => {
                ErrorKind::BadRequest.with_message("Column position must not be negative")
            }
            BoardColumnConstraints::UpdatedAfterCreated => {
                ErrorKind::InternalServerError.into_error()
            }
        };

        error.with_resource("board_column")
    }
}

impl From<IssueStatusConstraints> for Error<'static> {
    fn from(c: IssueStatusConstraints) -> Self {
        let error = match c {
            IssueStatusConstraints::ProjectNameUnique => {
                ErrorKind::Conflict.with_message("A status with this name already exists")
            }
            IssueStatusConstraints::ColorFormat => {
                ErrorKind::BadRequest.with_message("Status color must look like #1a2b3c")
            }
            IssueStatusConstraints::PositionRange => {
                ErrorKind::BadRequest.with_message("Status position must not be negative")
            }
            IssueStatusConstraints::UpdatedAfterCreated => {
                ErrorKind::InternalServerError.into_error()
            }
        };

        error.with_resource("status")
    }
}

impl From<IssueConstraints> for Error<'static> {
    fn from(c: IssueConstraints) -> Self {
        let error = match c {
            IssueConstraints::TitleLength => ErrorKind::BadRequest
                .with_message("Issue title must be between 1 and 512 characters long"),
            IssueConstraints::StoryPointsRange => {
                ErrorKind::BadRequest.with_message("Story points must be between 0 and 100")
            }
            IssueConstraints::PositionRange => {
                ErrorKind::BadRequest.with_message("Issue position must not be negative")
            }
            IssueConstraints::UpdatedAfterCreated => ErrorKind::InternalServerError.into_error(),
        };

        error.with_resource("issue")
    }
}
