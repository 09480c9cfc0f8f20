//! Session context for one tab.
//!
//! `SessionContext` is built once at start-up and handed to whatever needs to
//! ask about or change the session. It owns the store, the validator and the
//! cross-tab sync, and shares the store with the 401 interceptor.

use std::sync::Arc;

use anyhow::Result;
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::api::{ApiClient, AuthBackend, HttpErrorInterceptor};
use crate::auth::{
    has_required_role, initiate_google_oauth, OAuthError, SessionStore, SessionValidator,
    ValidationClock,
};
use crate::config::Config;
use crate::navigation::Navigator;
use crate::sync::{AuthBus, AuthSubscription, CrossTabSync};

/// Caller tag for the start-up check
const STARTUP_CALLER: &str = "ClientInit";

/// Outcome of a route guard check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Granted,
    Forbidden,
    Unauthenticated,
}

pub struct SessionContext {
    store: Arc<SessionStore>,
    backend: Arc<dyn AuthBackend>,
    navigator: Arc<dyn Navigator>,
    validator: SessionValidator,
    sync: Arc<CrossTabSync>,
    subscription: Mutex<Option<AuthSubscription>>,
    listener: Mutex<Option<JoinHandle<()>>>,
}

impl SessionContext {
    pub fn new(
        config: &Config,
        store: Arc<SessionStore>,
        backend: Arc<dyn AuthBackend>,
        navigator: Arc<dyn Navigator>,
        bus: &AuthBus,
    ) -> Self {
        let clock = Arc::new(ValidationClock::new());
        let validator = SessionValidator::new(
            store.clone(),
            backend.clone(),
            navigator.clone(),
            clock.clone(),
            config.auth_recheck_interval,
        );
        let (publisher, subscription) = bus.open();
        let sync = Arc::new(CrossTabSync::new(
            store.clone(),
            clock,
            backend.clone(),
            navigator.clone(),
            publisher,
        ));

        Self {
            store,
            backend,
            navigator,
            validator,
            sync,
            subscription: Mutex::new(Some(subscription)),
            listener: Mutex::new(None),
        }
    }

    /// Wire a context to the real backend. The returned client shares the
    /// context's interceptor, so 401s from any request end the session.
    pub fn connect(
        config: &Config,
        navigator: Arc<dyn Navigator>,
        bus: &AuthBus,
    ) -> Result<(Self, ApiClient)> {
        let store = Arc::new(SessionStore::new());
        let interceptor = Arc::new(HttpErrorInterceptor::new(store.clone(), navigator.clone()));
        let client = ApiClient::new(config.api_base_url.clone())?.with_interceptor(interceptor);
        let context = Self::new(config, store, Arc::new(client.clone()), navigator, bus);
        Ok((context, client))
    }

    /// Start listening to other tabs and run the initial identity check.
    /// Safe to call more than once; only the first call spawns the listener.
    pub async fn start(&self) -> bool {
        let subscription = self.subscription.lock().take();
        if let Some(subscription) = subscription {
            let handle = self.sync.spawn_listener(subscription);
            *self.listener.lock() = Some(handle);
        } else {
            debug!("Cross-tab listener already running");
        }
        self.ensure_authenticated(Some(STARTUP_CALLER)).await
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    pub fn validator(&self) -> &SessionValidator {
        &self.validator
    }

    pub async fn ensure_authenticated(&self, caller: Option<&str>) -> bool {
        self.validator.ensure_authenticated(caller).await
    }

    pub async fn validate_current_user(&self) -> bool {
        self.validator.validate_current_user().await
    }

    pub async fn logout(&self) {
        self.sync.logout().await;
    }

    /// Role check against whoever is in the store right now
    pub fn has_required_role(&self, min_role: Option<&str>) -> bool {
        has_required_role(self.store.user().as_ref(), min_role)
    }

    /// Route guard: make sure the session is valid, then check the role
    pub async fn authorize(&self, min_role: Option<&str>) -> Access {
        if !self.ensure_authenticated(Some("authorize")).await {
            return Access::Unauthenticated;
        }
        if self.has_required_role(min_role) {
            Access::Granted
        } else {
            warn!(
                role = self.store.role().as_deref().unwrap_or("-"),
                required = min_role.unwrap_or("-"),
                "Insufficient role"
            );
            Access::Forbidden
        }
    }

    pub async fn initiate_google_oauth(&self) -> Result<(), OAuthError> {
        initiate_google_oauth(self.backend.as_ref(), self.navigator.as_ref()).await
    }
}

impl Drop for SessionContext {
    fn drop(&mut self) {
        if let Some(handle) = self.listener.lock().take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::models::UserIdentity;
    use crate::navigation::{MemoryNavigator, Navigation};
    use crate::testing::MockBackend;

    fn context(
        bus: &AuthBus,
        backend: MockBackend,
        path: &str,
    ) -> (SessionContext, Arc<MockBackend>, Arc<MemoryNavigator>) {
        let backend = Arc::new(backend);
        let nav = Arc::new(MemoryNavigator::new(path));
        let ctx = SessionContext::new(
            &Config::default(),
            Arc::new(SessionStore::new()),
            backend.clone(),
            nav.clone(),
            bus,
        );
        (ctx, backend, nav)
    }

    fn user(role: &str) -> UserIdentity {
        UserIdentity::new(5, "ctx@example.com").with_role(role)
    }

    #[tokio::test]
    async fn test_start_runs_initial_check() {
        let bus = AuthBus::new("test-auth");
        let (ctx, backend, _nav) = context(&bus, MockBackend::with_user(user("member")), "/");

        assert!(ctx.store().is_loading());
        assert!(ctx.start().await);
        assert!(ctx.store().is_authenticated());
        assert_eq!(ctx.store().role().as_deref(), Some("member"));

        // cached for the TTL
        assert!(ctx.start().await);
        assert_eq!(backend.current_user_calls(), 1);
    }

    #[tokio::test]
    async fn test_authorize() {
        let bus = AuthBus::new("test-auth");
        let (ctx, _backend, _nav) = context(&bus, MockBackend::with_user(user("member")), "/");

        assert_eq!(ctx.authorize(None).await, Access::Granted);
        assert_eq!(ctx.authorize(Some("readonly")).await, Access::Granted);
        assert_eq!(ctx.authorize(Some("org_admin")).await, Access::Forbidden);
    }

    #[tokio::test]
    async fn test_authorize_unauthenticated() {
        let bus = AuthBus::new("test-auth");
        let (ctx, _backend, nav) = context(&bus, MockBackend::unauthorized(), "/billing");

        assert_eq!(ctx.authorize(Some("member")).await, Access::Unauthenticated);
        assert!(!ctx.has_required_role(Some("member")));
        assert_eq!(nav.history(), vec![Navigation::Redirect("/login".to_string())]);
    }

    #[tokio::test]
    async fn test_logout_reaches_started_context() {
        let bus = AuthBus::new("test-auth");
        let (a, _backend_a, nav_a) = context(&bus, MockBackend::with_user(user("member")), "/notes");
        let (b, backend_b, nav_b) = context(&bus, MockBackend::with_user(user("member")), "/notes");
        assert!(a.start().await);
        assert!(b.start().await);

        a.logout().await;
        assert_eq!(nav_a.current_path(), "/login");

        tokio::time::timeout(Duration::from_secs(1), async {
            while b.store().is_authenticated() {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("second context should log out");
        assert_eq!(nav_b.current_path(), "/login");
        assert_eq!(backend_b.logout_calls(), 0);

        // the cleared clock forces a fresh check
        assert!(b.ensure_authenticated(None).await);
        assert_eq!(backend_b.current_user_calls(), 2);
    }

    #[tokio::test]
    async fn test_connect_builds_client() {
        let bus = AuthBus::new("test-auth");
        let nav = Arc::new(MemoryNavigator::new("/"));
        let (ctx, client) =
            SessionContext::connect(&Config::default(), nav, &bus).expect("connect");
        assert!(!ctx.store().is_authenticated());
        assert_eq!(client.url("/users/me"), "http://localhost:8000/users/me");
    }
}
