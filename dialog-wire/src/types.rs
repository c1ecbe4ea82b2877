//! Bare schema types.
//!
//! Optional fields mirror "has" semantics: a `None` field is simply absent on
//! the wire, and readers pick the first populated one.

use uuid::Uuid;

use crate::enums::{self, PeerType};

// ─── Identifiers ──────────────────────────────────────────────────────────────

wire_struct! {
    /// A 128-bit UUID split into two signed 64-bit halves.
    #[derive(Copy, Default, Eq, Hash)]
    pub struct UuidValue = 0x5c1d3e01 {
        pub msb: i64,
        pub lsb: i64,
    }
}

impl From<Uuid> for UuidValue {
    fn from(id: Uuid) -> Self {
        let (msb, lsb) = id.as_u64_pair();
        Self { msb: msb as i64, lsb: lsb as i64 }
    }
}

impl From<UuidValue> for Uuid {
    fn from(v: UuidValue) -> Self {
        Uuid::from_u64_pair(v.msb as u64, v.lsb as u64)
    }
}

// ─── Peers ────────────────────────────────────────────────────────────────────

wire_struct! {
    /// A peer reference as it appears in server-pushed updates.
    #[derive(Copy, Eq, Hash)]
    pub struct Peer = 0x2b1f7e40 {
        pub kind: PeerType,
        pub id:   i32,
    }
}

wire_struct! {
    /// A resolved peer handle: identity plus the access proof needed to
    /// address it in outgoing calls.
    #[derive(Copy, Eq, Hash)]
    pub struct OutPeer = 0x3a6c9d12 {
        pub kind:        PeerType,
        pub id:          i32,
        pub access_hash: i64,
    }
}

impl OutPeer {
    /// Drop the access proof.
    pub fn peer(&self) -> Peer {
        Peer { kind: self.kind, id: self.id }
    }
}

// ─── Files ────────────────────────────────────────────────────────────────────

wire_struct! {
    #[derive(Copy, Default, Eq, Hash)]
    pub struct FileLocation = 0x7e0f4a55 {
        pub file_id:     i64,
        pub access_hash: i64,
    }
}

wire_struct! {
    pub struct ImageLocation = 0x1f9a2c07 {
        pub file_location: FileLocation,
        pub width:         i32,
        pub height:        i32,
        pub file_size:     i32,
    }
}

// ─── Media attachments ────────────────────────────────────────────────────────

wire_struct! {
    pub struct ImageMedia = 0x4d0e66b3 {
        pub image: ImageLocation,
    }
}

wire_struct! {
    pub struct WebpageMedia = 0x0c93d7e8 {
        pub url:         String,
        pub title:       String,
        pub description: String,
        pub image:       Option<ImageLocation>,
    }
}

wire_struct! {
    pub struct AudioMedia = 0x61b8f2a4 {
        pub file_location: FileLocation,
        pub duration:      i32,
        pub mime_type:     String,
        pub file_size:     i32,
    }
}

wire_struct! {
    /// One attachment of a text message. Exactly one field is expected to be
    /// populated; readers take the first one set.
    #[derive(Default)]
    pub struct MessageMedia = 0x2e7f5c19 {
        pub web_page: Option<WebpageMedia>,
        pub image:    Option<ImageMedia>,
        pub audio:    Option<AudioMedia>,
    }
}

// ─── Message payloads ─────────────────────────────────────────────────────────

wire_struct! {
    #[derive(Default)]
    pub struct TextMessage = 0x6a2d01f3 {
        pub text:     String,
        pub mentions: Vec<i32>,
        pub media:    Vec<MessageMedia>,
    }
}

wire_struct! {
    #[derive(Copy, Eq)]
    pub struct DocumentExPhoto = 0x35c0be21 {
        pub width:  i32,
        pub height: i32,
    }
}

wire_struct! {
    #[derive(Copy, Eq)]
    pub struct DocumentExVideo = 0x4f8817d6 {
        pub width:    i32,
        pub height:   i32,
        pub duration: i32,
    }
}

wire_struct! {
    #[derive(Copy, Eq)]
    pub struct DocumentExVoice = 0x12e4b970 {
        pub duration: i32,
    }
}

wire_struct! {
    /// Extra typed metadata for a document.
    #[derive(Copy, Default, Eq)]
    pub struct DocumentEx = 0x58a7c3e2 {
        pub photo: Option<DocumentExPhoto>,
        pub video: Option<DocumentExVideo>,
        pub voice: Option<DocumentExVoice>,
    }
}

wire_struct! {
    pub struct DocumentMessage = 0x7b31a96c {
        pub file_id:     i64,
        pub access_hash: i64,
        pub file_size:   i32,
        pub name:        String,
        pub mime_type:   String,
        pub ext:         Option<DocumentEx>,
    }
}

wire_struct! {
    pub struct ServiceMessage = 0x0a4e5d88 {
        pub text: String,
    }
}

wire_struct! {
    /// The content of a message. The server sets at most one field; readers
    /// dispatch on the first populated one in declaration order.
    #[derive(Default)]
    pub struct MessageContent = 0x19d26fa0 {
        pub text_message:     Option<TextMessage>,
        pub document_message: Option<DocumentMessage>,
        pub service_message:  Option<ServiceMessage>,
    }
}

impl MessageContent {
    /// Content holding a plain text message.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text_message: Some(TextMessage { text: text.into(), ..Default::default() }),
            ..Default::default()
        }
    }
}

// ─── Updates ──────────────────────────────────────────────────────────────────

wire_struct! {
    /// A new message arrived in `peer`.
    pub struct UpdateMessage = 0x4a1e2b7d {
        pub peer:       Peer,
        pub sender_uid: i32,
        pub date:       i64,
        pub mid:        UuidValue,
        pub message:    MessageContent,
    }
}

wire_struct! {
    /// The other side read messages in `peer` up to `start_date`.
    pub struct UpdateMessageRead = 0x0d7c3f51 {
        pub peer:       Peer,
        pub start_date: i64,
    }
}

wire_struct! {
    pub struct UpdateTyping = 0x6f20a4c9 {
        pub peer: Peer,
        pub uid:  i32,
    }
}

// ─── History ──────────────────────────────────────────────────────────────────

wire_struct! {
    /// A message as returned by history loads; both peers arrive resolved.
    pub struct HistoryMessage = 0x27e8d0b4 {
        pub peer:        OutPeer,
        pub sender_peer: OutPeer,
        pub mid:         UuidValue,
        pub date:        i64,
        pub message:     MessageContent,
    }
}

// ─── Responses ────────────────────────────────────────────────────────────────

wire_struct! {
    pub struct ResponseSeqDateMid = 0x33f0a1c5 {
        pub seq:  i32,
        pub date: i64,
        pub mid:  UuidValue,
    }
}

wire_struct! {
    pub struct ResponseLoadHistory = 0x5e2b8c17 {
        pub history: Vec<HistoryMessage>,
    }
}

wire_struct! {
    pub struct ResponseGetFileUrl = 0x48d9e6f0 {
        pub url: String,
        /// Seconds the URL stays valid.
        pub timeout: i32,
    }
}

wire_struct! {
    #[derive(Copy, Default, Eq)]
    pub struct ResponseVoid = 0x7c4a12de {}
}

// ─── Transport frames ─────────────────────────────────────────────────────────

wire_struct! {
    /// Client → server: one unary call.
    pub struct RpcCall = 0x9e1f0a37 {
        pub request_id:    i64,
        pub method:        String,
        pub authorization: String,
        pub timeout_ms:    i64,
        pub body:          Vec<u8>,
    }
}

wire_struct! {
    /// Server → client: successful reply to the call with `request_id`.
    pub struct RpcResult = 0xf35c6d01 {
        pub request_id: i64,
        pub body:       Vec<u8>,
    }
}

wire_struct! {
    /// Server → client: status-coded failure for the call with `request_id`.
    pub struct RpcFailure = 0x2144ca19 {
        pub request_id: i64,
        pub code:       i32,
        pub message:    String,
    }
}

wire_struct! {
    /// Server → client: pushed updates.
    pub struct UpdateBatch = 0x74ae4240 {
        pub updates: Vec<enums::Update>,
    }
}
