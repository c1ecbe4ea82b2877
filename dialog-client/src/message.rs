//! Domain messages and their content.

use chrono::{DateTime, Utc};
use dialog_wire::enums::ListLoadMode;
use dialog_wire::types::{self, MessageContent, OutPeer, UuidValue};
use uuid::Uuid;

use crate::media::{DocumentContent, Media};
use crate::peer::Peer;

// ─── Content ──────────────────────────────────────────────────────────────────

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TextContent {
    pub text:     String,
    /// User ids mentioned in `text`.
    pub mentions: Vec<i32>,
}

/// A caption followed by ordered attachments.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MediaContent {
    pub caption: String,
    pub items:   Vec<Media>,
}

/// The semantic payload of a message.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Content {
    Text(TextContent),
    Media(MediaContent),
    Document(DocumentContent),
    /// Service messages and anything this client does not model.
    Unknown,
}

impl Content {
    /// Pick a variant by the first populated payload field.
    pub fn from_wire(raw: &MessageContent) -> Self {
        if let Some(t) = &raw.text_message {
            if t.media.is_empty() {
                return Self::Text(TextContent { text: t.text.clone(), mentions: t.mentions.clone() });
            }
            return Self::Media(MediaContent {
                caption: t.text.clone(),
                items:   t.media.iter().filter_map(Media::from_wire).collect(),
            });
        }
        if let Some(d) = &raw.document_message {
            return Self::Document(DocumentContent::from_wire(d));
        }
        Self::Unknown
    }

    pub fn to_wire(&self) -> MessageContent {
        match self {
            Self::Text(t) => MessageContent {
                text_message: Some(types::TextMessage {
                    text:     t.text.clone(),
                    mentions: t.mentions.clone(),
                    media:    Vec::new(),
                }),
                ..Default::default()
            },
            Self::Media(m) => MessageContent {
                text_message: Some(types::TextMessage {
                    text:     m.caption.clone(),
                    mentions: Vec::new(),
                    media:    m.items.iter().map(Media::to_wire).collect(),
                }),
                ..Default::default()
            },
            Self::Document(d) => MessageContent {
                document_message: Some(d.to_wire()),
                ..Default::default()
            },
            Self::Unknown => MessageContent::default(),
        }
    }
}

/// Text carried by a raw payload: the message text, else the document's file
/// id, else empty.
fn extract_text(raw: &MessageContent) -> String {
    if let Some(t) = &raw.text_message {
        t.text.clone()
    } else if let Some(d) = &raw.document_message {
        d.file_id.to_string()
    } else {
        String::new()
    }
}

// ─── Message ──────────────────────────────────────────────────────────────────

/// A fully resolved message, as delivered to listeners and returned by
/// [`crate::Client::load`].
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    /// The conversation the message belongs to.
    pub peer:    Peer,
    pub sender:  Peer,
    pub id:      Uuid,
    /// May be empty.
    pub text:    String,
    /// Unix time in milliseconds.
    pub date:    i64,
    pub content: Content,
}

impl Message {
    /// Map both resolved peers and a raw payload to a domain message.
    pub fn from_wire(
        peer: &OutPeer,
        sender: &OutPeer,
        mid: UuidValue,
        date: i64,
        raw: &MessageContent,
    ) -> Self {
        Self {
            peer:    peer.into(),
            sender:  sender.into(),
            id:      mid.into(),
            text:    extract_text(raw),
            date,
            content: Content::from_wire(raw),
        }
    }

    /// `date` as a UTC timestamp, if it is in chrono's range.
    pub fn sent_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.date)
    }
}

impl From<&types::HistoryMessage> for Message {
    fn from(h: &types::HistoryMessage) -> Self {
        Self::from_wire(&h.peer, &h.sender_peer, h.mid, h.date, &h.message)
    }
}

// ─── Direction ────────────────────────────────────────────────────────────────

/// Order in which [`crate::Client::load`] walks history from its cursor.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Forward,
    Backward,
    Both,
}

impl Direction {
    pub fn load_mode(self) -> ListLoadMode {
        match self {
            Self::Forward  => ListLoadMode::Forward,
            Self::Backward => ListLoadMode::Backward,
            Self::Both     => ListLoadMode::Both,
        }
    }
}

impl From<Direction> for ListLoadMode {
    fn from(d: Direction) -> Self { d.load_mode() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dialog_wire::types::{DocumentMessage, MessageMedia, ServiceMessage, TextMessage};

    fn document() -> DocumentMessage {
        DocumentMessage {
            file_id: 9001,
            access_hash: 5,
            file_size: 12,
            name: "a.txt".into(),
            mime_type: "text/plain".into(),
            ext: None,
        }
    }

    #[test]
    fn text_wins_over_document() {
        let raw = MessageContent {
            text_message: Some(TextMessage { text: "hi".into(), ..Default::default() }),
            document_message: Some(document()),
            service_message: None,
        };
        assert_eq!(extract_text(&raw), "hi");
        assert!(matches!(Content::from_wire(&raw), Content::Text(t) if t.text == "hi"));
    }

    #[test]
    fn document_text_is_file_id() {
        let raw = MessageContent { document_message: Some(document()), ..Default::default() };
        assert_eq!(extract_text(&raw), "9001");
        assert!(matches!(Content::from_wire(&raw), Content::Document(d) if d.file.file_id == 9001));
    }

    #[test]
    fn service_message_is_unknown_with_empty_text() {
        let raw = MessageContent {
            service_message: Some(ServiceMessage { text: "joined".into() }),
            ..Default::default()
        };
        assert_eq!(extract_text(&raw), "");
        assert_eq!(Content::from_wire(&raw), Content::Unknown);
    }

    #[test]
    fn text_with_attachments_is_media() {
        let raw = MessageContent {
            text_message: Some(TextMessage {
                text: "look".into(),
                mentions: vec![],
                media: vec![MessageMedia::default()],
            }),
            ..Default::default()
        };
        let Content::Media(m) = Content::from_wire(&raw) else { panic!("expected media") };
        assert_eq!(m.caption, "look");
        assert!(m.items.is_empty());
    }

    #[test]
    fn sent_at_uses_milliseconds() {
        let out = OutPeer { kind: dialog_wire::enums::PeerType::Private, id: 1, access_hash: 0 };
        let msg = Message::from_wire(&out, &out, UuidValue::default(), 1_500, &MessageContent::default());
        assert_eq!(msg.sent_at().map(|t| t.timestamp_millis()), Some(1_500));
    }
}
