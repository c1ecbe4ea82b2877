//! Wire schema and binary codec for the Dialog bot RPC protocol.
//!
//! # Overview
//!
//! | Module        | Contents                                                   |
//! |---------------|------------------------------------------------------------|
//! | [`types`]     | Bare schema types as `struct`s                             |
//! | [`functions`] | RPC requests as `struct`s implementing [`RemoteCall`]      |
//! | [`enums`]     | Value enums and boxed sum types (updates, transport frames)|
//!
//! # Raw usage
//!
//! ```rust
//! use dialog_wire::{Deserializable, Serializable, enums::PeerType, functions, types};
//!
//! let req = functions::messaging::MessageRead {
//!     peer: types::OutPeer { kind: PeerType::Private, id: 42, access_hash: 7 },
//!     date: 1_700_000_000_000,
//! };
//!
//! let bytes = req.to_bytes();
//! assert_eq!(functions::messaging::MessageRead::from_bytes(&bytes).unwrap(), req);
//! ```

#![deny(unsafe_code)]

#[macro_use]
mod macros;

pub mod deserialize;
pub mod enums;
pub mod functions;
pub mod serialize;
pub mod types;

pub use deserialize::{Cursor, Deserializable};
pub use serialize::Serializable;

/// `boolTrue` constructor.
pub(crate) const BOOL_TRUE: u32 = 0x997275b5;
/// `boolFalse` constructor.
pub(crate) const BOOL_FALSE: u32 = 0xbc799737;
/// Boxed vector header.
pub(crate) const VECTOR_ID: u32 = 0x1cb5c415;

// ─── Core traits ──────────────────────────────────────────────────────────────

/// Every schema type has a unique 32-bit constructor ID.
pub trait Identifiable {
    /// The constructor ID of this type.
    const CONSTRUCTOR_ID: u32;
}

/// Marks a request type that can be sent as a unary RPC call.
///
/// `Return` is the type the server responds with.
pub trait RemoteCall: Serializable {
    /// The deserialized response type.
    type Return: Deserializable;
    /// Fully qualified method path, e.g. `/dialog.Messaging/SendMessage`.
    const METHOD: &'static str;
}
