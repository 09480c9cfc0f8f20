//! Rate-limited identity validation.
//!
//! `SessionValidator::ensure_authenticated` decides whether the remote
//! identity check is needed at all: a recent success is trusted for the TTL,
//! and while one check is in flight further callers get the store's current
//! answer straight away instead of waiting for it. Only the caller that won
//! the guard may advance the validation clock.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;
use tracing::{debug, warn};

use super::SessionStore;
use crate::api::AuthBackend;
use crate::config::LOGIN_PATH;
use crate::navigation::Navigator;

/// Time of the last successful validation. `None` stands for the epoch, so a
/// fresh clock never satisfies the TTL.
#[derive(Debug, Default)]
pub struct ValidationClock {
    last_success: Mutex<Option<Instant>>,
}

impl ValidationClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_success(&self) -> Option<Instant> {
        *self.last_success.lock()
    }

    pub fn is_fresh(&self, now: Instant, ttl: Duration) -> bool {
        match *self.last_success.lock() {
            Some(at) => now.saturating_duration_since(at) < ttl,
            None => false,
        }
    }

    pub fn mark_success(&self, at: Instant) {
        *self.last_success.lock() = Some(at);
    }

    /// Forget the last success so the next check goes to the network
    pub fn reset(&self) {
        *self.last_success.lock() = None;
    }
}

/// Single-flight marker for the identity check.
#[derive(Debug, Default)]
struct ConcurrencyGuard {
    checking: AtomicBool,
}

impl ConcurrencyGuard {
    fn is_checking(&self) -> bool {
        self.checking.load(Ordering::Acquire)
    }

    fn try_acquire(&self) -> Option<CheckPermit<'_>> {
        self.checking
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| CheckPermit(&self.checking))
    }
}

/// Releases the guard when dropped, whichever way the check ends.
struct CheckPermit<'a>(&'a AtomicBool);

impl Drop for CheckPermit<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct SessionValidator {
    store: Arc<SessionStore>,
    backend: Arc<dyn AuthBackend>,
    navigator: Arc<dyn Navigator>,
    clock: Arc<ValidationClock>,
    guard: ConcurrencyGuard,
    ttl: Duration,
}

impl SessionValidator {
    pub fn new(
        store: Arc<SessionStore>,
        backend: Arc<dyn AuthBackend>,
        navigator: Arc<dyn Navigator>,
        clock: Arc<ValidationClock>,
        ttl: Duration,
    ) -> Self {
        Self {
            store,
            backend,
            navigator,
            clock,
            guard: ConcurrencyGuard::default(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn clock(&self) -> &Arc<ValidationClock> {
        &self.clock
    }

    pub fn is_checking(&self) -> bool {
        self.guard.is_checking()
    }

    /// Is the user signed in? Hits the network only when the last success is
    /// older than the TTL. A caller arriving while another check is in flight
    /// gets the current snapshot and does not wait for that check.
    pub async fn ensure_authenticated(&self, caller: Option<&str>) -> bool {
        let caller = caller.unwrap_or("-");

        if self.guard.is_checking() {
            debug!(caller = caller, "Auth check already in progress, returning current state");
            return self.store.is_authenticated();
        }

        let now = Instant::now();

        if self.store.is_authenticated() && self.clock.is_fresh(now, self.ttl) {
            debug!(caller = caller, "Recent successful auth, skipping check");
            return true;
        }

        // Lost the race to another caller between the two checks above
        let Some(_permit) = self.guard.try_acquire() else {
            debug!(caller = caller, "Auth check already in progress, returning current state");
            return self.store.is_authenticated();
        };

        debug!(caller = caller, "Performing auth validation");
        if !self.store.is_authenticated() {
            self.store.set_loading(true);
        }

        let success = self.validate_current_user().await;
        if success {
            self.clock.mark_success(now);
            debug!(caller = caller, "Auth validation successful");
        } else {
            debug!(caller = caller, "Auth validation failed");
        }
        success
    }

    /// Ask the backend who we are. Any failure clears the session and sends
    /// the browser to the login page unless it is already there.
    pub async fn validate_current_user(&self) -> bool {
        self.store.set_loading(true);

        match self.backend.current_user().await {
            Ok(user) => {
                self.store.set_user(user);
                true
            }
            Err(e) => {
                warn!(error = %e, "Identity check failed, clearing session");
                self.store.clear();
                if !self.navigator.is_under(LOGIN_PATH) {
                    self.navigator.redirect(LOGIN_PATH);
                }
                false
            }
        }
    }
}
