//! Cross-tab session synchronization.
//!
//! Contexts of one origin share an `AuthBus`. Logging out in one context
//! clears it locally, then posts `{"type":"logout"}` so the others clear
//! themselves and head to the login page. There is no acknowledgment or
//! retry.

pub mod channel;
pub mod cross_tab;

pub use channel::{AuthBus, AuthMessage, AuthPublisher, AuthSubscription, SyncError};
pub use cross_tab::CrossTabSync;
