//! Repository traits for every table, implemented for [`PgConnection`].
//!
//! Methods take `&mut self` so the same calls work on a pooled connection and
//! inside a transaction closure.
//!
//! [`PgConnection`]: crate::PgConnection

mod account;
mod board_column;
mod epic;
mod issue;
mod issue_status;
mod notification;
mod project;
mod project_member;
mod sprint;

pub use account::AccountRepository;
pub use board_column::BoardColumnRepository;
pub use epic::EpicRepository;
pub use issue::{IssueFilter, IssueRepository};
pub use issue_status::IssueStatusRepository;
pub use notification::NotificationRepository;
pub use project::ProjectRepository;
pub use project_member::ProjectMemberRepository;
pub use sprint::SprintRepository;

pub use crate::types::Pagination;
