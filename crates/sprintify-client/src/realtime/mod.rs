//! Realtime socket support: frame codec, reconnect policy and, with the
//! `socket` feature, a tokio-tungstenite transport.

mod frame;
mod reconnect;
#[cfg(feature = "socket")]
#[cfg_attr(docsrs, doc(cfg(feature = "socket")))]
mod socket;

pub use self::frame::{decode_frame, encode_frame};
pub use self::reconnect::{
    ConnectionState, DEFAULT_INITIAL_DELAY, DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_DELAY,
    DEFAULT_STABLE_AFTER, ReconnectPolicy,
};
#[cfg(feature = "socket")]
pub use self::socket::{RealtimeClient, RealtimeUpdate};
