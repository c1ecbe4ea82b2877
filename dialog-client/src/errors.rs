//! Error types for dialog-client.

use std::{fmt, io, time::Duration};

/// Status codes the server (and the framed transport) use for failures.
///
/// These follow the gRPC numbering so that a channel backed by a gRPC stack
/// can pass codes through unchanged.
pub mod status {
    pub const CANCELLED:         i32 = 1;
    pub const INVALID_ARGUMENT:  i32 = 3;
    pub const DEADLINE_EXCEEDED: i32 = 4;
    pub const NOT_FOUND:         i32 = 5;
    pub const PERMISSION_DENIED: i32 = 7;
    pub const INTERNAL:          i32 = 13;
    pub const UNAVAILABLE:       i32 = 14;
    pub const UNAUTHENTICATED:   i32 = 16;
}

// ─── RpcError ─────────────────────────────────────────────────────────────────

/// A well-formed error reported by the remote service.
///
/// The service reports errors as `SCREAMING_SNAKE_CASE` tags, optionally with
/// a trailing numeric argument: `"PEER_INVALID"`, `"FILE_PART_7_MISSING"`
/// style suffixes are split off into [`RpcError::value`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RpcError {
    /// Status code, see [`status`].
    pub code: i32,
    /// Error tag with any numeric suffix removed.
    pub name: String,
    /// Numeric suffix of the tag, if any.
    pub value: Option<u32>,
}

impl RpcError {
    /// Build from a status code and the raw tag sent by the server.
    pub fn from_status(code: i32, message: &str) -> Self {
        let split = message
            .rsplit_once('_')
            .and_then(|(head, tail)| tail.parse::<u32>().ok().map(|v| (head, v)));
        match split {
            Some((head, v)) if !head.is_empty() => {
                Self { code, name: head.to_owned(), value: Some(v) }
            }
            _ => Self { code, name: message.to_owned(), value: None },
        }
    }

    /// Match on the error tag, with an optional `'*'` wildcard at either end.
    ///
    /// - `err.is("PEER_INVALID")`: exact
    /// - `err.is("PEER_*")`: prefix
    /// - `err.is("*_DENIED")`: suffix
    pub fn is(&self, pattern: &str) -> bool {
        if let Some(prefix) = pattern.strip_suffix('*') {
            self.name.starts_with(prefix)
        } else if let Some(suffix) = pattern.strip_prefix('*') {
            self.name.ends_with(suffix)
        } else {
            self.name == pattern
        }
    }
}

impl fmt::Display for RpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RPC {}: {}", self.code, self.name)?;
        if let Some(v) = self.value {
            write!(f, " ({v})")?;
        }
        Ok(())
    }
}

impl std::error::Error for RpcError {}

// ─── InvocationError ──────────────────────────────────────────────────────────

/// The error type of every outgoing call.
///
/// Each kind is distinct so callers can tell a rejected token from an
/// unreachable server or a call that simply took too long. Nothing in this
/// crate retries on any of them.
#[derive(Debug, thiserror::Error)]
pub enum InvocationError {
    /// The service rejected the request.
    #[error("{0}")]
    Rpc(RpcError),
    /// The access token is missing, invalid or expired.
    #[error("authentication rejected: {0}")]
    Unauthenticated(RpcError),
    /// No response arrived within the call deadline, or the server gave up
    /// on it first. Holds the bound the call ran under.
    #[error("deadline of {0:?} exceeded")]
    DeadlineExceeded(Duration),
    /// The channel could not carry the call.
    #[error("channel unavailable: {0}")]
    Unavailable(#[from] io::Error),
    /// The response (or an update) could not be decoded.
    #[error("deserialize error: {0}")]
    Deserialize(String),
    /// The caller cancelled the call.
    #[error("call cancelled")]
    Cancelled,
    /// The task driving the call went away without producing a result.
    #[error("request dropped")]
    Dropped,
    /// The call was rejected locally before anything was sent.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl From<dialog_wire::deserialize::Error> for InvocationError {
    fn from(e: dialog_wire::deserialize::Error) -> Self { Self::Deserialize(e.to_string()) }
}

impl InvocationError {
    /// Classify a status-coded failure reported by the remote side.
    pub fn from_status(code: i32, message: &str) -> Self {
        let rpc = RpcError::from_status(code, message);
        match code {
            status::UNAUTHENTICATED   => Self::Unauthenticated(rpc),
            status::UNAVAILABLE       => Self::Unavailable(io::Error::new(io::ErrorKind::NotConnected, rpc)),
            // The bound is not known here; the gateway fills it in.
            status::DEADLINE_EXCEEDED => Self::DeadlineExceeded(Duration::ZERO),
            // Server-side cancellation stays distinct from Pending::cancel.
            _                         => Self::Rpc(rpc),
        }
    }

    /// Returns `true` if this is the named remote error (supports `'*'` wildcards).
    pub fn is(&self, pattern: &str) -> bool {
        match self {
            Self::Rpc(e) | Self::Unauthenticated(e) => e.is(pattern),
            _ => false,
        }
    }

    /// Shorthand for a closed connection.
    pub(crate) fn closed(what: &str) -> Self {
        Self::Unavailable(io::Error::new(io::ErrorKind::ConnectionAborted, what.to_owned()))
    }
}
