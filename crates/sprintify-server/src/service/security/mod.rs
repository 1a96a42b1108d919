//! Token signing keys.

mod session_keys;

pub use session_keys::{SessionKeys, SessionKeysConfig};
