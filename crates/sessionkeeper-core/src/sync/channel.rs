use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Messages in flight at once before slow subscribers start missing some
const CHANNEL_CAPACITY: usize = 16;

/// Wire message between contexts: `{"type":"logout"}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuthMessage {
    Logout,
}

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Failed to encode channel message: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
struct Envelope {
    sender: u64,
    payload: String,
}

/// Named publish/subscribe bus shared by every context of one origin.
///
/// Delivery is best-effort: a subscriber that falls too far behind skips
/// messages, and nothing is ever delivered back to the context that sent it.
#[derive(Clone)]
pub struct AuthBus {
    name: Arc<str>,
    sender: broadcast::Sender<Envelope>,
    next_context: Arc<AtomicU64>,
}

impl AuthBus {
    pub fn new(name: &str) -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            name: Arc::from(name),
            sender,
            next_context: Arc::new(AtomicU64::new(1)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Join the bus as a new context (one per tab)
    pub fn open(&self) -> (AuthPublisher, AuthSubscription) {
        let context = self.next_context.fetch_add(1, Ordering::Relaxed);
        debug!(channel = %self.name, context = context, "Opened auth channel");
        (
            AuthPublisher {
                context,
                channel: self.name.clone(),
                sender: self.sender.clone(),
            },
            AuthSubscription {
                context,
                channel: self.name.clone(),
                receiver: self.sender.subscribe(),
            },
        )
    }
}

pub struct AuthPublisher {
    context: u64,
    channel: Arc<str>,
    sender: broadcast::Sender<Envelope>,
}

impl AuthPublisher {
    pub fn post(&self, message: AuthMessage) -> Result<(), SyncError> {
        let envelope = Envelope {
            sender: self.context,
            payload: serde_json::to_string(&message)?,
        };
        // No receivers just means no other context is listening
        if self.sender.send(envelope).is_err() {
            debug!(channel = %self.channel, "No listeners for auth message");
        }
        Ok(())
    }
}

pub struct AuthSubscription {
    context: u64,
    channel: Arc<str>,
    receiver: broadcast::Receiver<Envelope>,
}

impl AuthSubscription {
    /// Next message from another context; `None` once the bus is gone
    pub async fn recv(&mut self) -> Option<AuthMessage> {
        loop {
            match self.receiver.recv().await {
                Ok(envelope) if envelope.sender == self.context => continue,
                Ok(envelope) => match serde_json::from_str(&envelope.payload) {
                    Ok(message) => return Some(message),
                    Err(e) => {
                        debug!(channel = %self.channel, error = %e, "Ignoring unrecognized auth message");
                    }
                },
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(channel = %self.channel, skipped = skipped, "Auth channel lagged, messages dropped");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}
