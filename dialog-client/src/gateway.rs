//! Authenticated, deadline-bounded RPC calls.
//!
//! Every outgoing operation goes through [`Gateway::invoke`], which applies
//! the same fixed steps regardless of the request type: fetch the current
//! access token, attach it together with the deadline, run the call under
//! that deadline, decode the response, and hand it to the caller's mapping
//! closure. The whole sequence runs as one task on the designated executor,
//! so callers must not assume the result is produced on their own thread.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use dialog_wire::{Deserializable, RemoteCall};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::InvocationError;
use crate::auth::TokenProvider;
use crate::transport::{CallMetadata, Channel, RawCall};

/// Deadline applied to every call unless configured otherwise.
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(120);

// ─── Pending ──────────────────────────────────────────────────────────────────

/// The result of a call that is already in flight.
///
/// Await it to get the value. [`Pending::cancel`] abandons the call and makes
/// it resolve to [`InvocationError::Cancelled`]. Dropping a `Pending` without
/// awaiting it detaches the call: it still runs to completion.
#[must_use = "a Pending does nothing observable unless awaited or detached"]
pub struct Pending<T> {
    task:   JoinHandle<Result<T, InvocationError>>,
    cancel: CancellationToken,
}

impl<T> Pending<T> {
    /// Abandon the call. Best-effort: a response already received is dropped.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// A token that cancels this call when triggered, for wiring into other
    /// cancellation scopes.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Let the call run without waiting for it.
    pub fn detach(self) {}
}

impl<T> Future for Pending<T> {
    type Output = Result<T, InvocationError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.task).poll(cx) {
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            Poll::Ready(Err(e)) if e.is_cancelled() => Poll::Ready(Err(InvocationError::Cancelled)),
            Poll::Ready(Err(e)) => {
                tracing::error!("[dialog] call task failed: {e}");
                Poll::Ready(Err(InvocationError::Dropped))
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

// ─── Gateway ──────────────────────────────────────────────────────────────────

/// Shared, read-only call context: one channel and one token source per bot.
#[derive(Clone)]
pub struct Gateway {
    channel:  Arc<dyn Channel>,
    tokens:   Arc<dyn TokenProvider>,
    deadline: Duration,
    executor: Handle,
}

impl Gateway {
    pub fn new(
        channel:  Arc<dyn Channel>,
        tokens:   Arc<dyn TokenProvider>,
        deadline: Duration,
        executor: Handle,
    ) -> Self {
        Self { channel, tokens, deadline, executor }
    }

    /// The deadline applied to each call.
    pub fn deadline(&self) -> Duration { self.deadline }

    /// A copy of this gateway with a different deadline.
    pub fn with_deadline(&self, deadline: Duration) -> Self {
        Self { deadline, ..self.clone() }
    }

    /// Start `request` and return its pending result, reshaped by `map`.
    ///
    /// Returns immediately; nothing blocks the calling thread.
    pub fn invoke<R, T, F>(&self, request: R, map: F) -> Pending<T>
    where
        R: RemoteCall + Send + 'static,
        R::Return: Send,
        T: Send + 'static,
        F: FnOnce(R::Return) -> T + Send + 'static,
    {
        let cancel = CancellationToken::new();
        let gateway = self.clone();
        let token = cancel.clone();
        let task = self.executor.spawn(async move {
            gateway.call(request, token).await.map(map)
        });
        Pending { task, cancel }
    }

    async fn call<R: RemoteCall>(
        &self,
        request: R,
        cancel:  CancellationToken,
    ) -> Result<R::Return, InvocationError> {
        let authorization = self.tokens.access_token()?;
        let raw = RawCall {
            method:   R::METHOD,
            metadata: CallMetadata { authorization, timeout: self.deadline },
            body:     request.to_bytes(),
        };

        tracing::debug!("[dialog] → {} ({} bytes)", R::METHOD, raw.body.len());
        let in_flight = tokio::time::timeout(self.deadline, self.channel.unary(raw));

        let body = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::debug!("[dialog] {} cancelled by caller", R::METHOD);
                return Err(InvocationError::Cancelled);
            }
            outcome = in_flight => match outcome {
                Ok(Err(InvocationError::DeadlineExceeded(_))) => {
                    tracing::debug!("[dialog] {} expired on the server", R::METHOD);
                    return Err(InvocationError::DeadlineExceeded(self.deadline));
                }
                Ok(result) => result?,
                Err(_elapsed) => {
                    tracing::debug!("[dialog] {} timed out after {:?}", R::METHOD, self.deadline);
                    return Err(InvocationError::DeadlineExceeded(self.deadline));
                }
            },
        };

        tracing::debug!("[dialog] ← {} ({} bytes)", R::METHOD, body.len());
        R::Return::from_bytes(&body).map_err(Into::into)
    }
}
