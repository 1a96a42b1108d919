//! Database enumerations owned by this crate.
//!
//! Roles and notification enums are shared with clients and live in
//! [`sprintify_core`].

mod sprint_state;

pub use sprint_state::SprintState;
pub use sprintify_core::{NotificationPriority, NotificationType, ProjectRole};
