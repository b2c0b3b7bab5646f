use crate::error::BackendError;
use mentor_core::connection::ConnectionState;
use std::future::Future;
use tokio::sync::watch;
use tracing::{debug, warn};

/// Tracks the lifecycle of outbound calls and publishes it as a
/// [`ConnectionState`].
///
/// Purely observational: it never blocks or retries a call, it only records
/// how the most recent one went.
#[derive(Debug)]
pub struct ConnectionMonitor {
    state_tx: watch::Sender<ConnectionState>,
}

impl Default for ConnectionMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionMonitor {
    pub fn new() -> Self {
        let (state_tx, _) = watch::channel(ConnectionState::Idle);
        Self { state_tx }
    }

    pub fn state(&self) -> ConnectionState {
        *self.state_tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.state_tx.subscribe()
    }

    /// Runs one outbound call: `Connecting` before it starts, then
    /// `Connected` or `Error` depending on the outcome.
    pub async fn track<T, F>(&self, call: F) -> Result<T, BackendError>
    where
        F: Future<Output = Result<T, BackendError>>,
    {
        self.set(ConnectionState::Connecting);
        let result = call.await;
        match &result {
            Ok(_) => self.set(ConnectionState::Connected),
            Err(err) => {
                warn!(endpoint = err.endpoint(), error = %err, "Backend call failed");
                self.set(ConnectionState::Error);
            }
        }
        result
    }

    fn set(&self, next: ConnectionState) {
        // `send_replace` succeeds even when nobody is subscribed.
        let previous = self.state_tx.send_replace(next);
        if previous != next {
            debug!(from = %previous, to = %next, "Connection state changed");
        }
    }
}
