//! A [`Channel`] over a plain TCP connection with length-prefixed framing.
//!
//! On connect the client sends the 4-byte init marker `0xeeeeeeee`; after
//! that every frame in both directions is `[4-byte LE length][payload]`,
//! where the payload is one serialized [`enums::Frame`].
//!
//! Calls are correlated by request id, so any number of them may be in flight
//! at once. Update batches pushed by the server are forwarded to the
//! [`UpdateStream`] returned from [`FramedChannel::connect`].

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use dialog_wire::serialize::MAX_BYTES_LEN;
use dialog_wire::{Deserializable, Serializable, enums, types};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::InvocationError;
use crate::transport::{Channel, RawCall, UpdateSender, UpdateStream};

const INIT_MARKER: [u8; 4] = [0xee, 0xee, 0xee, 0xee];

/// Frames larger than this are treated as a protocol violation.
pub const MAX_FRAME_LEN: usize = 16 * 1024 * 1024;

type Reply = Result<Vec<u8>, InvocationError>;

/// Waiters keyed by request id; `None` once the connection is gone.
type Waiters = Arc<Mutex<Option<HashMap<i64, oneshot::Sender<Reply>>>>>;

// ─── Framing ──────────────────────────────────────────────────────────────────

async fn send_frame<W: AsyncWrite + Unpin>(w: &mut W, data: &[u8]) -> Result<(), InvocationError> {
    let len = u32::try_from(data.len())
        .ok()
        .filter(|&n| n as usize <= MAX_FRAME_LEN)
        .ok_or_else(|| InvocationError::InvalidArgument(format!("frame of {} bytes", data.len())))?;
    w.write_all(&len.to_le_bytes()).await?;
    w.write_all(data).await?;
    w.flush().await?;
    Ok(())
}

async fn recv_frame<R: AsyncRead + Unpin>(r: &mut R) -> Result<Vec<u8>, InvocationError> {
    let mut len_buf = [0u8; 4];
    r.read_exact(&mut len_buf).await?;
    let len = u32::from_le_bytes(len_buf) as usize;
    if len > MAX_FRAME_LEN {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("frame length {len} exceeds limit"),
        ).into());
    }
    let mut buf = vec![0u8; len];
    r.read_exact(&mut buf).await?;
    Ok(buf)
}

// ─── FramedChannel ────────────────────────────────────────────────────────────

/// A multiplexed RPC channel over one TCP connection.
///
/// There is no reconnection: once the server closes the connection every
/// waiting call fails with [`InvocationError::Unavailable`], later calls fail
/// the same way, and the update stream ends.
pub struct FramedChannel {
    writer:  tokio::sync::Mutex<OwnedWriteHalf>,
    waiters: Waiters,
    next_id: AtomicI64,
    reader:  JoinHandle<()>,
}

impl FramedChannel {
    /// Connect to `addr` and start reading.
    pub async fn connect(addr: &str) -> Result<(Self, UpdateStream), InvocationError> {
        let stream = TcpStream::connect(addr).await?;
        tracing::info!("[dialog] connected to {addr}");
        Self::from_stream(stream).await
    }

    /// Take over an already-connected stream.
    pub async fn from_stream(stream: TcpStream) -> Result<(Self, UpdateStream), InvocationError> {
        stream.set_nodelay(true)?;
        let (rd, mut wr) = stream.into_split();
        wr.write_all(&INIT_MARKER).await?;

        let (updates, stream) = UpdateStream::channel();
        let waiters: Waiters = Arc::new(Mutex::new(Some(HashMap::new())));
        let reader = tokio::spawn(read_loop(rd, Arc::clone(&waiters), updates));

        let channel = Self {
            writer: tokio::sync::Mutex::new(wr),
            waiters,
            next_id: AtomicI64::new(1),
            reader,
        };
        Ok((channel, stream))
    }

    /// Calls currently waiting for a reply.
    pub fn in_flight(&self) -> usize {
        lock(&self.waiters).as_ref().map_or(0, HashMap::len)
    }

    fn register(&self, request_id: i64) -> Result<oneshot::Receiver<Reply>, InvocationError> {
        let (tx, rx) = oneshot::channel();
        match lock(&self.waiters).as_mut() {
            Some(map) => {
                map.insert(request_id, tx);
                Ok(rx)
            }
            None => Err(InvocationError::closed("connection closed")),
        }
    }
}

impl Drop for FramedChannel {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

#[async_trait]
impl Channel for FramedChannel {
    async fn unary(&self, call: RawCall) -> Result<Vec<u8>, InvocationError> {
        if call.body.len() > MAX_BYTES_LEN {
            return Err(InvocationError::InvalidArgument(format!(
                "call body of {} bytes exceeds the wire limit", call.body.len()
            )));
        }
        let request_id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let rx = self.register(request_id)?;
        let _guard = WaiterGuard { waiters: &self.waiters, request_id };

        let frame = enums::Frame::Call(types::RpcCall {
            request_id,
            method:        call.method.to_owned(),
            authorization: call.metadata.authorization.secret().to_owned(),
            timeout_ms:    i64::try_from(call.metadata.timeout.as_millis()).unwrap_or(i64::MAX),
            body:          call.body,
        });
        {
            let mut writer = self.writer.lock().await;
            send_frame(&mut *writer, &frame.to_bytes()).await?;
        }

        rx.await.unwrap_or_else(|_| Err(InvocationError::closed("connection closed")))
    }
}

/// Removes a call's waiter when the call finishes or is abandoned.
struct WaiterGuard<'a> {
    waiters:    &'a Waiters,
    request_id: i64,
}

impl Drop for WaiterGuard<'_> {
    fn drop(&mut self) {
        if let Some(map) = lock(self.waiters).as_mut() {
            map.remove(&self.request_id);
        }
    }
}

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

// ─── Reader ───────────────────────────────────────────────────────────────────

async fn read_loop(mut rd: OwnedReadHalf, waiters: Waiters, updates: UpdateSender) {
    loop {
        let data = match recv_frame(&mut rd).await {
            Ok(data) => data,
            Err(e) => {
                tracing::info!("[dialog] connection closed: {e}");
                break;
            }
        };

        match enums::Frame::from_bytes(&data) {
            Ok(enums::Frame::Result(r)) => complete(&waiters, r.request_id, Ok(r.body)),
            Ok(enums::Frame::Failure(f)) => complete(
                &waiters,
                f.request_id,
                Err(InvocationError::from_status(f.code, &f.message)),
            ),
            Ok(enums::Frame::Updates(batch)) => {
                tracing::trace!("[dialog] received {} updates", batch.updates.len());
                for update in batch.updates {
                    // Nobody listening is not an error for the connection.
                    let _ = updates.send(update);
                }
            }
            Ok(enums::Frame::Call(c)) => {
                tracing::warn!("[dialog] unexpected call frame from server: {}", c.method);
            }
            Err(e) => tracing::warn!("[dialog] undecodable frame ({} bytes): {e}", data.len()),
        }
    }

    let abandoned = lock(&waiters).take().unwrap_or_default();
    for (_, tx) in abandoned {
        let _ = tx.send(Err(InvocationError::closed("connection closed")));
    }
}

fn complete(waiters: &Waiters, request_id: i64, reply: Reply) {
    let tx = lock(waiters).as_mut().and_then(|map| map.remove(&request_id));
    match tx {
        Some(tx) => { let _ = tx.send(reply); }
        None => tracing::debug!("[dialog] reply for unknown request {request_id}"),
    }
}
