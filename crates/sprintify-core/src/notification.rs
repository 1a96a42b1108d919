//! Notification category and priority enumerations.

#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Category of a notification.
///
/// Corresponds to the `NOTIFICATION_TYPE` PostgreSQL enum.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(Serialize, Deserialize, Display, EnumIter, EnumString)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[cfg_attr(feature = "diesel", derive(diesel_derive_enum::DbEnum))]
#[cfg_attr(
    feature = "diesel",
    ExistingTypePath = "crate::sql_types::NotificationType"
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationType {
    /// The recipient was invited to a project.
    #[cfg_attr(feature = "diesel", db_rename = "project_invitation")]
    ProjectInvitation,
    /// The recipient's project role changed.
    #[cfg_attr(feature = "diesel", db_rename = "role_changed")]
    RoleChanged,
    /// The recipient was removed from a project.
    #[cfg_attr(feature = "diesel", db_rename = "member_removed")]
    MemberRemoved,
    /// An issue was assigned to the recipient.
    #[cfg_attr(feature = "diesel", db_rename = "task_assigned")]
    TaskAssigned,
    /// A sprint of one of the recipient's projects started.
    #[cfg_attr(feature = "diesel", db_rename = "sprint_started")]
    SprintStarted,
    /// A sprint of one of the recipient's projects completed.
    #[cfg_attr(feature = "diesel", db_rename = "sprint_completed")]
    SprintCompleted,
    /// Anything else.
    #[cfg_attr(feature = "diesel", db_rename = "system")]
    #[default]
    System,
}

impl NotificationType {
    /// Returns whether this category always escalates to email.
    #[inline]
    pub const fn is_invitation(self) -> bool {
        matches!(self, Self::ProjectInvitation)
    }
}

/// Urgency of a notification.
///
/// Corresponds to the `NOTIFICATION_PRIORITY` PostgreSQL enum.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(Serialize, Deserialize, Display, EnumIter, EnumString)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[cfg_attr(feature = "diesel", derive(diesel_derive_enum::DbEnum))]
#[cfg_attr(
    feature = "diesel",
    ExistingTypePath = "crate::sql_types::NotificationPriority"
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationPriority {
    #[cfg_attr(feature = "diesel", db_rename = "low")]
    Low,
    #[cfg_attr(feature = "diesel", db_rename = "medium")]
    #[default]
    Medium,
    #[cfg_attr(feature = "diesel", db_rename = "high")]
    High,
    #[cfg_attr(feature = "diesel", db_rename = "urgent")]
    Urgent,
}

impl NotificationPriority {
    /// Returns whether this priority escalates to email.
    #[inline]
    pub const fn is_escalated(self) -> bool {
        matches!(self, Self::High | Self::Urgent)
    }
}

/// Returns whether a notification of this category and priority is also
/// delivered by email.
#[inline]
pub const fn requires_email(
    notification_type: NotificationType,
    priority: NotificationPriority,
) -> bool {
    priority.is_escalated() || notification_type.is_invitation()
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn escalation_rules() {
        for notification_type in NotificationType::iter() {
            assert!(requires_email(notification_type, NotificationPriority::High));
            assert!(requires_email(notification_type, NotificationPriority::Urgent));
        }

        assert!(requires_email(
            NotificationType::ProjectInvitation,
            NotificationPriority::Low
        ));
        assert!(!requires_email(
            NotificationType::TaskAssigned,
            NotificationPriority::Medium
        ));
        assert!(!requires_email(
            NotificationType::System,
            NotificationPriority::Low
        ));
    }

    #[test]
    fn priority_is_ordered() {
        assert!(NotificationPriority::Low < NotificationPriority::Medium);
        assert!(NotificationPriority::High < NotificationPriority::Urgent);
    }
}
