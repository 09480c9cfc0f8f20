use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::{AuthMessage, AuthPublisher, AuthSubscription};
use crate::api::AuthBackend;
use crate::auth::{SessionStore, ValidationClock};
use crate::config::LOGIN_PATH;
use crate::navigation::Navigator;

/// Keeps every tab of the origin logged out together.
pub struct CrossTabSync {
    store: Arc<SessionStore>,
    clock: Arc<ValidationClock>,
    backend: Arc<dyn AuthBackend>,
    navigator: Arc<dyn Navigator>,
    publisher: AuthPublisher,
}

impl CrossTabSync {
    pub fn new(
        store: Arc<SessionStore>,
        clock: Arc<ValidationClock>,
        backend: Arc<dyn AuthBackend>,
        navigator: Arc<dyn Navigator>,
        publisher: AuthPublisher,
    ) -> Self {
        Self {
            store,
            clock,
            backend,
            navigator,
            publisher,
        }
    }

    /// Log out here and in every other tab. The server call is best-effort;
    /// local cleanup, the broadcast and the navigation always happen.
    pub async fn logout(&self) {
        if let Err(e) = self.backend.logout().await {
            warn!(error = %e, "Logout request failed");
        }

        self.reset_local();

        if let Err(e) = self.publisher.post(AuthMessage::Logout) {
            warn!(error = %e, "Failed to notify other tabs of logout");
        }

        info!("Logged out");
        self.navigator.navigate(LOGIN_PATH);
    }

    /// React to a message from another tab
    pub fn handle_message(&self, message: AuthMessage) {
        match message {
            AuthMessage::Logout => {
                info!("Logout received from another tab");
                self.reset_local();
                self.navigator.navigate(LOGIN_PATH);
            }
        }
    }

    /// Listen for other tabs until the bus goes away
    pub fn spawn_listener(self: &Arc<Self>, mut subscription: AuthSubscription) -> JoinHandle<()> {
        let sync = Arc::clone(self);
        tokio::spawn(async move {
            while let Some(message) = subscription.recv().await {
                sync.handle_message(message);
            }
            debug!("Auth channel closed, listener exiting");
        })
    }

    fn reset_local(&self) {
        self.store.clear();
        self.clock.reset();
    }
}
