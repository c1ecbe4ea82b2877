//! # dialog-client
//!
//! Async bot client for the Dialog messaging service.
//!
//! ## Features
//! - Inbound update pipeline: peer and sender resolution, then delivery of
//!   fully resolved [`Message`]s to a single replaceable listener
//! - Authenticated RPC gateway with a per-call deadline and cancellable
//!   [`Pending`] results
//! - Send text / media / documents, resolve file download URLs, load history,
//!   mark as read
//! - Pluggable [`Channel`], [`TokenProvider`] and [`PeerResolver`]; a framed
//!   TCP channel and an in-memory peer directory are included
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use dialog_client::{Client, Config, FramedChannel, PeerDirectory, StaticToken, Transport};
//!
//! # async fn run() -> Result<(), dialog_client::InvocationError> {
//! let (channel, updates) = FramedChannel::connect("127.0.0.1:8443").await?;
//! let client = Client::start(Config::default(), Transport {
//!     channel:  Arc::new(channel),
//!     tokens:   Arc::new(StaticToken::new("token")),
//!     resolver: Arc::new(PeerDirectory::new()),
//!     updates,
//! })?;
//!
//! let replies = client.clone();
//! client.on_message(move |msg| {
//!     replies.send_text(&msg.peer, format!("Echo: {}", msg.text), None).detach();
//! });
//! # Ok(()) }
//! ```

#![deny(unsafe_code)]

mod auth;
mod errors;
mod gateway;
mod messaging;
pub mod media;
pub mod message;
pub mod peer;
pub mod resolver;
pub mod transport;
pub mod transport_framed;
pub mod update;

pub use auth::{AccessToken, StaticToken, TokenProvider};
pub use errors::{InvocationError, RpcError, status};
pub use gateway::{DEFAULT_DEADLINE, Gateway, Pending};
pub use media::{DocumentContent, DocumentKind, FileLocation, FileUrl, Image, Media};
pub use message::{Content, Direction, MediaContent, Message, TextContent};
pub use messaging::{OPTIMIZATIONS, unique_rid};
pub use peer::{Peer, PeerKind};
pub use resolver::{PeerDirectory, PeerResolver};
pub use transport::{CallMetadata, Channel, RawCall, UpdateSender, UpdateStream};
pub use transport_framed::FramedChannel;
pub use update::{DropReason, Listener, Outcome, UpdatePipeline};

pub use dialog_wire as wire;

use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;

// ─── Config ───────────────────────────────────────────────────────────────────

/// Client settings.
#[derive(Clone, Debug)]
pub struct Config {
    /// Bound on every outgoing call.
    pub deadline: Duration,
    /// Runtime the calls and update handlers run on. Defaults to the runtime
    /// [`Client::start`] is called from.
    pub executor: Option<Handle>,
}

impl Default for Config {
    fn default() -> Self {
        Self { deadline: DEFAULT_DEADLINE, executor: None }
    }
}

/// The external collaborators a client is built from.
pub struct Transport {
    pub channel:  Arc<dyn Channel>,
    pub tokens:   Arc<dyn TokenProvider>,
    pub resolver: Arc<dyn PeerResolver>,
    /// Raw updates pushed by the server; consumed by the client.
    pub updates:  UpdateStream,
}

// ─── Client ───────────────────────────────────────────────────────────────────

/// The bot client. Cheap to clone; clones share the listener and the channel.
#[derive(Clone)]
pub struct Client {
    pub(crate) gateway: Gateway,
    pipeline: Arc<UpdatePipeline>,
}

impl Client {
    /// Build a client and subscribe to `transport.updates`.
    ///
    /// The subscription lasts as long as the update stream does. Fails with
    /// [`InvocationError::InvalidArgument`] when no executor is configured and
    /// there is no current tokio runtime.
    pub fn start(config: Config, transport: Transport) -> Result<Self, InvocationError> {
        let executor = match config.executor {
            Some(handle) => handle,
            None => Handle::try_current().map_err(|_| {
                InvocationError::InvalidArgument("Client::start called outside a tokio runtime".into())
            })?,
        };

        let gateway = Gateway::new(transport.channel, transport.tokens, config.deadline, executor.clone());
        let pipeline = Arc::new(UpdatePipeline::new(transport.resolver));

        executor.spawn(run_update_loop(Arc::clone(&pipeline), transport.updates, executor.clone()));
        Ok(Self { gateway, pipeline })
    }

    /// A clone whose calls use `deadline` instead of the configured one.
    pub fn with_deadline(&self, deadline: Duration) -> Self {
        Self { gateway: self.gateway.with_deadline(deadline), pipeline: Arc::clone(&self.pipeline) }
    }

    pub fn deadline(&self) -> Duration { self.gateway.deadline() }

    // ── Listener ───────────────────────────────────────────────────────────

    /// Replace the message listener. Only the most recent one is called.
    pub fn on_message<F>(&self, listener: F)
    where
        F: Fn(Message) + Send + Sync + 'static,
    {
        self.pipeline.set_listener(Some(Arc::new(listener)));
    }

    /// Replace the listener; `None` stops delivery.
    pub fn set_listener(&self, listener: Option<Listener>) {
        self.pipeline.set_listener(listener);
    }

    pub fn clear_listener(&self) {
        self.pipeline.set_listener(None);
    }
}

async fn run_update_loop(pipeline: Arc<UpdatePipeline>, mut updates: UpdateStream, executor: Handle) {
    tracing::info!("[dialog] update loop started");
    while let Some(update) = updates.next().await {
        let pipeline = Arc::clone(&pipeline);
        executor.spawn(async move {
            pipeline.handle(update).await;
        });
    }
    tracing::info!("[dialog] update stream ended");
}
