#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod event;
mod notification;
mod permission;
mod policy;
mod role;
mod token;

#[cfg(feature = "diesel")]
#[cfg_attr(docsrs, doc(cfg(feature = "diesel")))]
pub mod sql_types;

pub use event::{ClientEvent, NotificationPayload, ServerEvent};
pub use notification::{NotificationPriority, NotificationType, requires_email};
pub use permission::{Permission, can, permissions_for_role};
pub use policy::{
    RoleChange, RoleChangeDenial, can_modify_user_role, evaluate_member_removal,
    evaluate_role_change,
};
pub use role::{ProjectRole, ROLE_TABLE};
pub use token::TokenType;

/// Version of the shared role/permission/event contract.
///
/// Bumped whenever a role, permission, matrix entry or socket event changes
/// shape, so a client built against an older table can detect the drift.
pub const CONTRACT_VERSION: u32 = 1;

/// Header carrying [`CONTRACT_VERSION`] on client requests.
pub const CONTRACT_HEADER: &str = "x-sprintify-contract";
