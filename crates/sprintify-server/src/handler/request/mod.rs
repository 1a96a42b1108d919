//! Request types for HTTP handlers.

mod board_columns;
mod epics;
mod issues;
mod members;
mod notifications;
mod paginations;
mod paths;
mod projects;
mod sprints;
mod statuses;

pub use board_columns::*;
pub use epics::*;
pub use issues::*;
pub use members::*;
pub use notifications::*;
pub use paginations::*;
pub use paths::*;
pub use projects::*;
pub use sprints::*;
pub use statuses::*;

use serde::{Deserialize, Deserializer};

/// Distinguishes an absent field (`None`) from an explicit `null` (`Some(None)`).
pub(crate) fn deserialize_nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
