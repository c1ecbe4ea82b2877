//! The inbound update pipeline.
//!
//! Each raw update goes through the same chain: resolve the conversation,
//! then (only if that succeeded) resolve the sender, build a [`Message`] and
//! hand it to the registered listener. Updates whose peers cannot be resolved
//! are dropped without reaching the listener.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, RwLock};

use dialog_wire::enums;
use dialog_wire::types::UpdateMessage;
use futures::FutureExt;

use crate::message::Message;
use crate::resolver::PeerResolver;

/// Callback receiving every delivered message.
///
/// It runs on whichever runtime worker finished resolving the update, so it
/// must be `Send + Sync` and should not block.
pub type Listener = Arc<dyn Fn(Message) + Send + Sync>;

/// What happened to one update.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The listener was called with the resulting message.
    Delivered,
    /// The update resolved, but no listener was registered.
    NoListener,
    /// Not a message update.
    Ignored,
    Dropped(DropReason),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DropReason {
    PeerNotFound,
    SenderNotFound,
    /// The resolver returned an error.
    ResolutionFailed,
    /// Processing (or the listener) panicked.
    Panicked,
}

/// Owns the listener slot and the resolver, and processes updates one at a
/// time per call to [`handle`](Self::handle).
pub struct UpdatePipeline {
    resolver: Arc<dyn PeerResolver>,
    listener: RwLock<Option<Listener>>,
}

impl UpdatePipeline {
    pub fn new(resolver: Arc<dyn PeerResolver>) -> Self {
        Self { resolver, listener: RwLock::new(None) }
    }

    /// Replace the listener; `None` unsubscribes. Updates already past
    /// resolution may still reach the previous listener.
    pub fn set_listener(&self, listener: Option<Listener>) {
        *self.listener.write().unwrap_or_else(|e| e.into_inner()) = listener;
    }

    pub fn has_listener(&self) -> bool {
        self.listener.read().unwrap_or_else(|e| e.into_inner()).is_some()
    }

    /// Process one update. Never panics and never returns an error: every
    /// failure is logged and reported as [`Outcome::Dropped`].
    pub async fn handle(&self, update: enums::Update) -> Outcome {
        let update = match update {
            enums::Update::Message(update) => update,
            other => {
                tracing::trace!("[dialog] ignoring {} update", other.kind());
                return Outcome::Ignored;
            }
        };

        match AssertUnwindSafe(self.process(update)).catch_unwind().await {
            Ok(outcome) => outcome,
            Err(payload) => {
                tracing::warn!("[dialog] update handler panicked: {}", panic_message(&*payload));
                Outcome::Dropped(DropReason::Panicked)
            }
        }
    }

    async fn process(&self, update: UpdateMessage) -> Outcome {
        let peer = match self.resolver.find_out_peer(&update.peer).await {
            Ok(Some(peer)) => peer,
            Ok(None) => {
                tracing::trace!("[dialog] dropping update: peer {:?} not found", update.peer);
                return Outcome::Dropped(DropReason::PeerNotFound);
            }
            Err(e) => {
                tracing::warn!("[dialog] peer resolution failed: {e}");
                return Outcome::Dropped(DropReason::ResolutionFailed);
            }
        };

        let sender = match self.resolver
            .load_sender_out_peer(update.sender_uid, &peer, update.date)
            .await
        {
            Ok(Some(sender)) => sender,
            Ok(None) => {
                tracing::trace!("[dialog] dropping update: sender {} not found", update.sender_uid);
                return Outcome::Dropped(DropReason::SenderNotFound);
            }
            Err(e) => {
                tracing::warn!("[dialog] sender resolution failed: {e}");
                return Outcome::Dropped(DropReason::ResolutionFailed);
            }
        };

        let message = Message::from_wire(&peer, &sender, update.mid, update.date, &update.message);
        self.dispatch(message)
    }

    fn dispatch(&self, message: Message) -> Outcome {
        // Clone out so the lock is not held while the listener runs.
        let listener = self.listener.read().unwrap_or_else(|e| e.into_inner()).clone();
        match listener {
            Some(listener) => {
                listener(message);
                Outcome::Delivered
            }
            None => Outcome::NoListener,
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "<non-string panic>"
    }
}
