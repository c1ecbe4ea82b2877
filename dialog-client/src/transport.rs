//! The channel abstraction the gateway calls through, and the inbound update
//! stream a transport feeds.

use std::time::Duration;

use async_trait::async_trait;
use dialog_wire::enums;
use tokio::sync::mpsc;

use crate::{InvocationError, auth::AccessToken};

// ─── Outgoing calls ───────────────────────────────────────────────────────────

/// Per-call metadata attached by the gateway.
#[derive(Clone, Debug)]
pub struct CallMetadata {
    /// Token the call is authenticated with.
    pub authorization: AccessToken,
    /// Maximum time the caller will wait; transports may forward it to the
    /// server so it can give up early too.
    pub timeout: Duration,
}

/// A serialized unary call, ready for the wire.
#[derive(Clone, Debug)]
pub struct RawCall {
    /// Method path, e.g. `/dialog.Messaging/SendMessage`.
    pub method:   &'static str,
    pub metadata: CallMetadata,
    /// Serialized request body.
    pub body:     Vec<u8>,
}

/// A live RPC channel.
///
/// Implementations own connection management; the client only issues calls
/// and never asks the channel to reconnect. Failures reported by the remote
/// side should be returned through [`InvocationError::from_status`] so they
/// are classified consistently.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Perform one unary call and return the raw response body.
    async fn unary(&self, call: RawCall) -> Result<Vec<u8>, InvocationError>;
}

// ─── Inbound updates ──────────────────────────────────────────────────────────

/// Sending half of an [`UpdateStream`], held by the transport.
pub type UpdateSender = mpsc::UnboundedSender<enums::Update>;

/// Asynchronous stream of raw server-pushed updates.
pub struct UpdateStream {
    rx: mpsc::UnboundedReceiver<enums::Update>,
}

impl UpdateStream {
    /// Create a connected sender/stream pair.
    pub fn channel() -> (UpdateSender, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        (tx, Self { rx })
    }

    /// Wait for the next update. Returns `None` once the transport is gone.
    pub async fn next(&mut self) -> Option<enums::Update> {
        self.rx.recv().await
    }
}
