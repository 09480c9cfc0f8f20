//! Authentication module for the client's view of the session.
//!
//! This module provides:
//! - `SessionStore`: observable in-memory user and loading flag
//! - `SessionValidator`: TTL-cached, single-flight identity check
//! - `has_required_role`: role hierarchy checks for menus and route guards
//! - OAuth helpers for starting Google login and explaining its errors
//!
//! Nothing is persisted; every start begins unauthenticated and loading.

pub mod oauth;
pub mod permissions;
pub mod session;
pub mod validator;

pub use oauth::{check_oauth_error, initiate_google_oauth, oauth_error_message, OAuthError};
pub use permissions::{has_required_role, Role};
pub use session::{SessionState, SessionStore};
pub use validator::{SessionValidator, ValidationClock};
