//! Central handling of unauthorized responses.
//!
//! Every non-success response from `ApiClient` passes through
//! `HttpErrorInterceptor::intercept` before the caller sees it. A 401 from
//! anything but the auth endpoints means the session is gone: the store is
//! cleared and the browser is sent to the login page. The error itself is
//! always handed back so the caller's own error path still runs.

use std::sync::Arc;

use tracing::warn;

use super::client::{CURRENT_USER_ENDPOINT, LOGIN_ENDPOINT};
use super::ApiError;
use crate::auth::SessionStore;
use crate::config::LOGIN_PATH;
use crate::navigation::Navigator;

/// Endpoints whose 401s are expected outcomes handled by their callers
const EXEMPT_ENDPOINTS: &[&str] = &[CURRENT_USER_ENDPOINT, LOGIN_ENDPOINT];

pub struct HttpErrorInterceptor {
    store: Arc<SessionStore>,
    navigator: Arc<dyn Navigator>,
}

impl HttpErrorInterceptor {
    pub fn new(store: Arc<SessionStore>, navigator: Arc<dyn Navigator>) -> Self {
        Self { store, navigator }
    }

    pub fn is_exempt(url: &str) -> bool {
        EXEMPT_ENDPOINTS.iter().any(|endpoint| url.contains(endpoint))
    }

    pub fn intercept(&self, url: &str, error: ApiError) -> ApiError {
        if error.is_unauthorized() && !Self::is_exempt(url) {
            warn!(url = url, "API returned 401, clearing session and redirecting to login");
            self.store.clear();
            if !self.navigator.is_under(LOGIN_PATH) {
                self.navigator.redirect(LOGIN_PATH);
            }
        }
        error
    }
}
