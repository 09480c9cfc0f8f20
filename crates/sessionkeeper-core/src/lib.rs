//! Sessionkeeper core library.
//!
//! Client-side authentication session coordination for a single-page
//! application:
//!
//! - `auth`: the session store, identity validation with TTL caching and a
//!   single-flight guard, role permissions, and OAuth helpers
//! - `api`: the HTTP client, its error type, and the 401 interceptor
//! - `sync`: cross-tab logout propagation over an origin-scoped bus
//! - `navigation`: the navigation seam (route changes and hard redirects)
//! - `context`: `SessionContext`, which wires everything together once at start-up

pub mod api;
pub mod auth;
pub mod config;
pub mod context;
pub mod models;
pub mod navigation;
pub mod sync;

#[cfg(test)]
pub(crate) mod testing;

pub use api::{ApiClient, ApiError, AuthBackend, HttpErrorInterceptor};
pub use auth::{has_required_role, Role, SessionState, SessionStore, SessionValidator};
pub use config::Config;
pub use context::{Access, SessionContext};
pub use models::UserIdentity;
pub use navigation::{MemoryNavigator, Navigation, Navigator};
pub use sync::{AuthBus, AuthMessage, CrossTabSync};

pub use reqwest::Url;
