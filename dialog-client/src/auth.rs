//! Access-token supply for authenticated calls.
//!
//! The client never acquires or renews tokens itself; it asks a
//! [`TokenProvider`] for the current one on every call.

use std::fmt;

use crate::{InvocationError, RpcError, errors::status};

/// A bearer token attached to every outgoing call.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token value.
    pub fn secret(&self) -> &str { &self.0 }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

/// Supplies the access token for the bot.
pub trait TokenProvider: Send + Sync {
    /// The token to attach to the next call.
    fn access_token(&self) -> Result<AccessToken, InvocationError>;
}

/// A token fixed at construction time.
#[derive(Clone, Debug)]
pub struct StaticToken {
    token: AccessToken,
}

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self { token: AccessToken::new(token) }
    }
}

impl TokenProvider for StaticToken {
    fn access_token(&self) -> Result<AccessToken, InvocationError> {
        if self.token.secret().is_empty() {
            return Err(InvocationError::Unauthenticated(RpcError::from_status(
                status::UNAUTHENTICATED,
                "TOKEN_MISSING",
            )));
        }
        Ok(self.token.clone())
    }
}
