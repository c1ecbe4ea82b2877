use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use dialog_client::wire::enums::PeerType;
use dialog_client::wire::functions::messaging::MessageRead;
use dialog_client::wire::types::{OutPeer, ResponseVoid};
use dialog_client::wire::{RemoteCall, Serializable};
use dialog_client::{
    Channel, DEFAULT_DEADLINE, Gateway, InvocationError, RawCall, StaticToken, status,
};
use tokio::runtime::Handle;
use tokio::time::Instant;

// ── Stubs ─────────────────────────────────────────────────────────────────────

/// Never answers.
struct Silent;

#[async_trait]
impl Channel for Silent {
    async fn unary(&self, _call: RawCall) -> Result<Vec<u8>, InvocationError> {
        std::future::pending().await
    }
}

/// Answers every call with a fixed reply and keeps the calls it saw.
struct Canned {
    reply: fn() -> Result<Vec<u8>, InvocationError>,
    seen:  Mutex<Vec<RawCall>>,
}

impl Canned {
    fn new(reply: fn() -> Result<Vec<u8>, InvocationError>) -> Arc<Self> {
        Arc::new(Self { reply, seen: Mutex::new(Vec::new()) })
    }
}

#[async_trait]
impl Channel for Canned {
    async fn unary(&self, call: RawCall) -> Result<Vec<u8>, InvocationError> {
        self.seen.lock().unwrap().push(call);
        (self.reply)()
    }
}

fn read_request() -> MessageRead {
    MessageRead { peer: OutPeer { kind: PeerType::Group, id: 5, access_hash: 55 }, date: 1_000 }
}

fn gateway(channel: Arc<dyn Channel>, token: &str, deadline: Duration) -> Gateway {
    Gateway::new(channel, Arc::new(StaticToken::new(token)), deadline, Handle::current())
}

// ── Deadline ──────────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn silent_channel_hits_default_deadline() {
    let gw = gateway(Arc::new(Silent), "t", DEFAULT_DEADLINE);
    let started = Instant::now();

    let result = gw.invoke(read_request(), |_| ()).await;

    assert!(matches!(result, Err(InvocationError::DeadlineExceeded(d)) if d == Duration::from_secs(120)));
    let waited = started.elapsed();
    assert!(waited >= Duration::from_secs(120));
    assert!(waited < Duration::from_secs(121), "waited {waited:?}");
}

#[tokio::test(start_paused = true)]
async fn shorter_deadline_is_honoured() {
    let gw = gateway(Arc::new(Silent), "t", DEFAULT_DEADLINE).with_deadline(Duration::from_millis(50));
    assert_eq!(gw.deadline(), Duration::from_millis(50));

    let started = Instant::now();
    let result = gw.invoke(read_request(), |_| ()).await;

    assert!(matches!(result, Err(InvocationError::DeadlineExceeded(_))));
    assert!(started.elapsed() < Duration::from_secs(1));
}

// ── Metadata ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn token_and_deadline_are_attached() {
    let channel = Canned::new(|| Ok(ResponseVoid {}.to_bytes()));
    let gw = gateway(channel.clone(), "secret-token", Duration::from_secs(30));

    gw.invoke(read_request(), |_| ()).await.unwrap();

    let seen = channel.seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].method, MessageRead::METHOD);
    assert_eq!(seen[0].metadata.authorization.secret(), "secret-token");
    assert_eq!(seen[0].metadata.timeout, Duration::from_secs(30));
    assert_eq!(seen[0].body, read_request().to_bytes());
}

#[tokio::test]
async fn token_is_not_printed() {
    let channel = Canned::new(|| Ok(ResponseVoid {}.to_bytes()));
    let gw = gateway(channel.clone(), "secret-token", DEFAULT_DEADLINE);
    gw.invoke(read_request(), |_| ()).await.unwrap();

    let debug = format!("{:?}", channel.seen.lock().unwrap()[0]);
    assert!(!debug.contains("secret-token"));
}

#[tokio::test]
async fn missing_token_fails_without_calling() {
    let channel = Canned::new(|| Ok(ResponseVoid {}.to_bytes()));
    let gw = gateway(channel.clone(), "", DEFAULT_DEADLINE);

    let err = gw.invoke(read_request(), |_| ()).await.unwrap_err();

    assert!(matches!(err, InvocationError::Unauthenticated(_)));
    assert!(channel.seen.lock().unwrap().is_empty());
}

// ── Failures ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn rejected_token_is_unauthenticated() {
    let channel = Canned::new(|| Err(InvocationError::from_status(status::UNAUTHENTICATED, "TOKEN_EXPIRED")));
    let gw = gateway(channel, "stale", DEFAULT_DEADLINE);

    let err = gw.invoke(read_request(), |_| ()).await.unwrap_err();

    assert!(matches!(err, InvocationError::Unauthenticated(_)));
    assert!(err.is("TOKEN_EXPIRED"));
}

#[tokio::test]
async fn remote_error_is_passed_through_once() {
    let channel = Canned::new(|| Err(InvocationError::from_status(status::NOT_FOUND, "PEER_INVALID")));
    let gw = gateway(channel.clone(), "t", DEFAULT_DEADLINE);

    let err = gw.invoke(read_request(), |_| ()).await.unwrap_err();

    assert!(matches!(&err, InvocationError::Rpc(e) if e.code == status::NOT_FOUND));
    assert_eq!(channel.seen.lock().unwrap().len(), 1, "no retries");
}

#[tokio::test]
async fn server_side_deadline_is_a_deadline_error() {
    let channel = Canned::new(|| Err(InvocationError::from_status(status::DEADLINE_EXCEEDED, "DEADLINE_EXCEEDED")));
    let gw = gateway(channel, "t", Duration::from_secs(30));

    let err = gw.invoke(read_request(), |_| ()).await.unwrap_err();
    assert!(matches!(err, InvocationError::DeadlineExceeded(d) if d == Duration::from_secs(30)));
}

#[tokio::test]
async fn unavailable_channel_is_reported() {
    let channel = Canned::new(|| Err(std::io::Error::from(std::io::ErrorKind::ConnectionRefused).into()));
    let gw = gateway(channel, "t", DEFAULT_DEADLINE);

    let err = gw.invoke(read_request(), |_| ()).await.unwrap_err();
    assert!(matches!(err, InvocationError::Unavailable(_)));
}

#[tokio::test]
async fn garbage_response_is_a_deserialize_error() {
    let channel = Canned::new(|| Ok(vec![1, 2]));
    let gw = gateway(channel, "t", DEFAULT_DEADLINE);

    let err = gw.invoke(read_request(), |_| ()).await.unwrap_err();
    assert!(matches!(err, InvocationError::Deserialize(_)));
}

// ── Cancellation ──────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn cancelled_call_resolves_to_cancelled() {
    let gw = gateway(Arc::new(Silent), "t", DEFAULT_DEADLINE);
    let pending = gw.invoke(read_request(), |_| ());
    pending.cancel();

    let started = Instant::now();
    assert!(matches!(pending.await, Err(InvocationError::Cancelled)));
    assert!(started.elapsed() < DEFAULT_DEADLINE);
}

#[tokio::test]
async fn dropped_pending_still_completes() {
    let channel = Canned::new(|| Ok(ResponseVoid {}.to_bytes()));
    let gw = gateway(channel.clone(), "t", DEFAULT_DEADLINE);
    let (done_tx, done_rx) = tokio::sync::oneshot::channel();

    gw.invoke(read_request(), move |_| { let _ = done_tx.send(()); }).detach();

    tokio::time::timeout(Duration::from_secs(5), done_rx).await.unwrap().unwrap();
    assert_eq!(channel.seen.lock().unwrap().len(), 1);
}
