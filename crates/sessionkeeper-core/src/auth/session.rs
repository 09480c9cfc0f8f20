use tokio::sync::watch;

use crate::models::UserIdentity;

/// Snapshot of the client's belief about the current user.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub user: Option<UserIdentity>,
    pub is_loading: bool,
}

impl Default for SessionState {
    /// Start-up shape: nobody signed in, first check still pending
    fn default() -> Self {
        Self {
            user: None,
            is_loading: true,
        }
    }
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn role(&self) -> Option<&str> {
        self.user.as_ref().and_then(|u| u.role_name())
    }
}

/// Observable holder of the session state, one per tab.
///
/// Every mutation replaces the state inside the watch channel in one step, so
/// subscribers never see a user without `is_loading` having been reset.
pub struct SessionStore {
    state: watch::Sender<SessionState>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    pub fn new() -> Self {
        let (state, _) = watch::channel(SessionState::default());
        Self { state }
    }

    /// Receive a notification on every mutation
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn user(&self) -> Option<UserIdentity> {
        self.state.borrow().user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    pub fn role(&self) -> Option<String> {
        self.state.borrow().role().map(str::to_string)
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading
    }

    pub fn set_loading(&self, loading: bool) {
        self.state.send_modify(|state| state.is_loading = loading);
    }

    pub fn set_user(&self, user: UserIdentity) {
        self.state.send_modify(|state| {
            state.user = Some(user);
            state.is_loading = false;
        });
    }

    pub fn clear(&self) {
        self.state.send_modify(|state| {
            state.user = None;
            state.is_loading = false;
        });
    }
}
