//! Database models for all tables.
//!
//! Each row type derives `Queryable` and `Selectable`; `New*` types are
//! `Insertable` and `Update*` types are `AsChangeset` with every field optional.

mod account;
mod board_column;
mod epic;
mod issue;
mod issue_status;
mod notification;
mod project;
mod project_member;
mod sprint;

pub use account::Account;
pub use board_column::{BoardColumn, NewBoardColumn, UpdateBoardColumn};
pub use epic::{Epic, NewEpic, UpdateEpic};
pub use issue::{Issue, NewIssue, UpdateIssue};
pub use issue_status::{IssueStatus, NewIssueStatus, UpdateIssueStatus};
pub use notification::{NewNotification, Notification};
pub use project::{NewProject, Project, UpdateProject};
pub use project_member::{NewProjectMember, ProjectMember, UpdateProjectMember};
pub use sprint::{NewSprint, Sprint, UpdateSprint};
