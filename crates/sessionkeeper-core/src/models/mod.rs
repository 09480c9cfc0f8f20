//! Data models shared with the identity API.
//!
//! - `UserIdentity`: the current user's profile as returned by `/users/me`
//! - `RoleInfo`: the role attached to that profile

pub mod user;

pub use user::{RoleInfo, UserIdentity};
