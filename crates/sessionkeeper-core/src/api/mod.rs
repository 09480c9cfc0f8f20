//! REST API module for the identity backend.
//!
//! This module provides the `ApiClient` for the auth endpoints, the
//! `AuthBackend` seam the session layer talks through, and the
//! `HttpErrorInterceptor` that reacts to 401s from any request.
//!
//! Authentication is cookie-based and opaque to this crate.

pub mod backend;
pub mod client;
pub mod error;
pub mod interceptor;

pub use backend::AuthBackend;
pub use client::ApiClient;
pub use error::ApiError;
pub use interceptor::HttpErrorInterceptor;
