//! Reconciliation of optimistic mutations, REST responses and socket pushes.
//!
//! Issue state and notification state are kept apart: REST responses own the
//! former, pushes and polling own the latter.

mod board;
mod notifications;
mod optimistic;
mod poll;

pub use self::board::BoardSync;
pub use self::notifications::{NotificationState, NotificationSync};
pub use self::optimistic::{MutationId, OptimisticStore};
pub use self::poll::{DEFAULT_POLL_INTERVAL, PollSchedule};
