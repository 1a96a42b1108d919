//! Contains constraints, enumerations and other custom types.

mod constraint;
mod enums;
mod pagination;

pub use constraint::{
    AccountConstraints, BoardColumnConstraints, ConstraintCategory, ConstraintViolation,
    EpicConstraints, IssueConstraints, IssueStatusConstraints, NotificationConstraints,
    ProjectConstraints, ProjectMemberConstraints, SprintConstraints,
};
pub use enums::{NotificationPriority, NotificationType, ProjectRole, SprintState};
pub use pagination::{DEFAULT_LIMIT, MAX_LIMIT, MIN_LIMIT, PageInfo, Pagination};
