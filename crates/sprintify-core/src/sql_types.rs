//! Postgres type markers for the shared enums.
//!
//! Re-exported by `sprintify_postgres::schema::sql_types` so the `table!`
//! definitions and the enum derives refer to the same types.

#[derive(diesel::query_builder::QueryId, diesel::sql_types::SqlType)]
#[diesel(postgres_type(name = "project_role"))]
pub struct ProjectRole;

#[derive(diesel::query_builder::QueryId, diesel::sql_types::SqlType)]
#[diesel(postgres_type(name = "notification_type"))]
pub struct NotificationType;

#[derive(diesel::query_builder::QueryId, diesel::sql_types::SqlType)]
#[diesel(postgres_type(name = "notification_priority"))]
pub struct NotificationPriority;
