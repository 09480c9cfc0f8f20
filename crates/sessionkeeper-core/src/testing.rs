// Test doubles for the auth backend.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::api::{ApiError, AuthBackend};
use crate::models::UserIdentity;

/// Scripted `AuthBackend`: `None` for the user means every identity check
/// comes back 401.
pub(crate) struct MockBackend {
    user: Mutex<Option<UserIdentity>>,
    delay: Option<Duration>,
    logout_fails: AtomicBool,
    oauth_url: Mutex<Option<String>>,
    current_user_calls: AtomicUsize,
    logout_calls: AtomicUsize,
}

impl MockBackend {
    fn new(user: Option<UserIdentity>) -> Self {
        Self {
            user: Mutex::new(user),
            delay: None,
            logout_fails: AtomicBool::new(false),
            oauth_url: Mutex::new(None),
            current_user_calls: AtomicUsize::new(0),
            logout_calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn with_user(user: UserIdentity) -> Self {
        Self::new(Some(user))
    }

    pub(crate) fn unauthorized() -> Self {
        Self::new(None)
    }

    /// Make every identity check take `delay` before answering
    pub(crate) fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub(crate) fn with_failing_logout(self) -> Self {
        self.logout_fails.store(true, Ordering::SeqCst);
        self
    }

    pub(crate) fn with_oauth_url(self, url: &str) -> Self {
        *self.oauth_url.lock() = Some(url.to_string());
        self
    }

    pub(crate) fn set_user(&self, user: Option<UserIdentity>) {
        *self.user.lock() = user;
    }

    pub(crate) fn current_user_calls(&self) -> usize {
        self.current_user_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn logout_calls(&self) -> usize {
        self.logout_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AuthBackend for MockBackend {
    async fn current_user(&self) -> Result<UserIdentity, ApiError> {
        self.current_user_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let user = self.user.lock().clone();
        user.ok_or(ApiError::Unauthorized)
    }

    async fn logout(&self) -> Result<(), ApiError> {
        self.logout_calls.fetch_add(1, Ordering::SeqCst);
        if self.logout_fails.load(Ordering::SeqCst) {
            Err(ApiError::ServerError("logout unavailable".to_string()))
        } else {
            Ok(())
        }
    }

    async fn google_auth_url(&self) -> Result<String, ApiError> {
        let url = self.oauth_url.lock().clone();
        url.ok_or_else(|| ApiError::ServerError("oauth not configured".to_string()))
    }
}
