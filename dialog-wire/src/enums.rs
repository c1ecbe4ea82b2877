//! Closed value enums and boxed sum types.
//!
//! Boxed types are written as the constructor ID of the active variant
//! followed by its bare body.

use crate::deserialize::{Buffer, Error, Result};
use crate::{Deserializable, Identifiable, Serializable, types};

// ─── Value enums ──────────────────────────────────────────────────────────────

wire_enum! {
    /// Kind of conversation a peer denotes.
    pub enum PeerType {
        Private = 1,
        Group   = 2,
        Channel = 3,
    }
}

wire_enum! {
    /// Order in which a history page is collected around the cursor date.
    pub enum ListLoadMode {
        Forward  = 1,
        Backward = 2,
        Both     = 3,
    }
}

wire_enum! {
    /// Response-shaping hints a client may request.
    pub enum UpdateOptimization {
        StripEntities = 1,
        GroupsV2      = 2,
    }
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// A server-pushed update.
#[derive(Clone, Debug, PartialEq)]
pub enum Update {
    Message(types::UpdateMessage),
    MessageRead(types::UpdateMessageRead),
    Typing(types::UpdateTyping),
}

impl Update {
    /// Constructor ID of the active variant.
    pub fn constructor_id(&self) -> u32 {
        match self {
            Self::Message(_)     => types::UpdateMessage::CONSTRUCTOR_ID,
            Self::MessageRead(_) => types::UpdateMessageRead::CONSTRUCTOR_ID,
            Self::Typing(_)      => types::UpdateTyping::CONSTRUCTOR_ID,
        }
    }

    /// Short human-readable kind, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Message(_)     => "message",
            Self::MessageRead(_) => "message_read",
            Self::Typing(_)      => "typing",
        }
    }
}

impl Serializable for Update {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        self.constructor_id().serialize(buf);
        match self {
            Self::Message(u)     => u.serialize(buf),
            Self::MessageRead(u) => u.serialize(buf),
            Self::Typing(u)      => u.serialize(buf),
        }
    }
}

impl Deserializable for Update {
    fn deserialize(buf: Buffer) -> Result<Self> {
        match u32::deserialize(buf)? {
            types::UpdateMessage::CONSTRUCTOR_ID => {
                types::UpdateMessage::deserialize(buf).map(Self::Message)
            }
            types::UpdateMessageRead::CONSTRUCTOR_ID => {
                types::UpdateMessageRead::deserialize(buf).map(Self::MessageRead)
            }
            types::UpdateTyping::CONSTRUCTOR_ID => {
                types::UpdateTyping::deserialize(buf).map(Self::Typing)
            }
            id => Err(Error::UnexpectedConstructor { id }),
        }
    }
}

// ─── Frame ────────────────────────────────────────────────────────────────────

/// One transport frame exchanged over a framed connection.
#[derive(Clone, Debug, PartialEq)]
pub enum Frame {
    Call(types::RpcCall),
    Result(types::RpcResult),
    Failure(types::RpcFailure),
    Updates(types::UpdateBatch),
}

impl Serializable for Frame {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        match self {
            Self::Call(f) => {
                types::RpcCall::CONSTRUCTOR_ID.serialize(buf);
                f.serialize(buf);
            }
            Self::Result(f) => {
                types::RpcResult::CONSTRUCTOR_ID.serialize(buf);
                f.serialize(buf);
            }
            Self::Failure(f) => {
                types::RpcFailure::CONSTRUCTOR_ID.serialize(buf);
                f.serialize(buf);
            }
            Self::Updates(f) => {
                types::UpdateBatch::CONSTRUCTOR_ID.serialize(buf);
                f.serialize(buf);
            }
        }
    }
}

impl Deserializable for Frame {
    fn deserialize(buf: Buffer) -> Result<Self> {
        match u32::deserialize(buf)? {
            types::RpcCall::CONSTRUCTOR_ID     => types::RpcCall::deserialize(buf).map(Self::Call),
            types::RpcResult::CONSTRUCTOR_ID   => types::RpcResult::deserialize(buf).map(Self::Result),
            types::RpcFailure::CONSTRUCTOR_ID  => types::RpcFailure::deserialize(buf).map(Self::Failure),
            types::UpdateBatch::CONSTRUCTOR_ID => types::UpdateBatch::deserialize(buf).map(Self::Updates),
            id => Err(Error::UnexpectedConstructor { id }),
        }
    }
}
