//! Outgoing messaging operations.
//!
//! Every operation builds its request synchronously from the arguments and
//! hands it to the [`Gateway`](crate::Gateway); nothing is awaited before the
//! call is issued. The returned [`Pending`] can be awaited, cancelled or
//! simply dropped.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;
use dialog_wire::enums::UpdateOptimization;
use dialog_wire::functions::{media_and_files, messaging};
use dialog_wire::types::{self, MessageContent};
use uuid::Uuid;

use crate::media::{DocumentContent, FileLocation, FileUrl, Media};
use crate::message::{Direction, Message};
use crate::peer::Peer;
use crate::{Client, InvocationError, Pending};

/// Server-side optimisations requested with every history load.
pub const OPTIMIZATIONS: [UpdateOptimization; 2] =
    [UpdateOptimization::StripEntities, UpdateOptimization::GroupsV2];

static LAST_RID: AtomicI64 = AtomicI64::new(0);

/// A fresh request id: the current Unix time in milliseconds, bumped past the
/// previous id when several are issued within the same millisecond.
///
/// Strictly increasing within the process.
pub fn unique_rid() -> i64 {
    let now = Utc::now().timestamp_millis();
    let mut last = LAST_RID.load(Ordering::Relaxed);
    loop {
        let next = if now > last { now } else { last + 1 };
        match LAST_RID.compare_exchange_weak(last, next, Ordering::Relaxed, Ordering::Relaxed) {
            Ok(_) => return next,
            Err(actual) => last = actual,
        }
    }
}

impl Client {
    // ── Sending ────────────────────────────────────────────────────────────

    /// Send raw message content to `peer`.
    ///
    /// With `only_for` set, the message is visible only to that user.
    /// Resolves to the id the server assigned to the message.
    pub fn send(&self, peer: &Peer, message: MessageContent, only_for: Option<i32>) -> Pending<Uuid> {
        let request = messaging::SendMessage {
            peer: peer.to_out_peer(),
            rid: unique_rid(),
            message,
            is_only_for_user: only_for,
        };
        self.gateway.invoke(request, |r| Uuid::from(r.mid))
    }

    pub fn send_text(&self, peer: &Peer, text: impl Into<String>, only_for: Option<i32>) -> Pending<Uuid> {
        self.send(peer, MessageContent::text(text), only_for)
    }

    /// Send attachments in the given order, without a caption.
    ///
    /// Fails immediately with [`InvocationError::InvalidArgument`] when
    /// `items` is empty.
    pub fn send_media(
        &self,
        peer: &Peer,
        items: &[Media],
        only_for: Option<i32>,
    ) -> Result<Pending<Uuid>, InvocationError> {
        if items.is_empty() {
            return Err(InvocationError::InvalidArgument("send_media needs at least one attachment".into()));
        }
        let message = MessageContent {
            text_message: Some(types::TextMessage {
                text:     String::new(),
                mentions: Vec::new(),
                media:    items.iter().map(Media::to_wire).collect(),
            }),
            ..Default::default()
        };
        Ok(self.send(peer, message, only_for))
    }

    pub fn send_document(
        &self,
        peer: &Peer,
        document: &DocumentContent,
        only_for: Option<i32>,
    ) -> Pending<Uuid> {
        let message = MessageContent {
            document_message: Some(document.to_wire()),
            ..Default::default()
        };
        self.send(peer, message, only_for)
    }

    // ── Files ──────────────────────────────────────────────────────────────

    /// A download URL for `file`, valid for the returned timeout.
    pub fn get_file_url(&self, file: &FileLocation) -> Pending<FileUrl> {
        let request = media_and_files::GetFileUrl { file: file.to_wire() };
        self.gateway.invoke(request, FileUrl::from)
    }

    pub fn get_file_url_parts(&self, file_id: i64, access_hash: i64) -> Pending<FileUrl> {
        self.get_file_url(&FileLocation::new(file_id, access_hash))
    }

    // ── History ────────────────────────────────────────────────────────────

    /// Load up to `limit` messages around `date`, walking in `direction`.
    ///
    /// Messages are mapped exactly like inbound ones. Fails immediately with
    /// [`InvocationError::InvalidArgument`] when `limit` is not positive.
    pub fn load(
        &self,
        peer: &Peer,
        date: i64,
        limit: i32,
        direction: Direction,
    ) -> Result<Pending<Vec<Message>>, InvocationError> {
        if limit <= 0 {
            return Err(InvocationError::InvalidArgument(format!("load limit must be positive, got {limit}")));
        }
        let request = messaging::LoadHistory {
            peer: peer.to_out_peer(),
            date,
            load_mode: direction.load_mode(),
            limit,
            optimizations: OPTIMIZATIONS.to_vec(),
        };
        let limit = limit as usize;
        Ok(self.gateway.invoke(request, move |r| {
            r.history.iter().take(limit).map(Message::from).collect()
        }))
    }

    /// Mark everything in `peer` up to `date` as read.
    pub fn read(&self, peer: &Peer, date: i64) -> Pending<()> {
        let request = messaging::MessageRead { peer: peer.to_out_peer(), date };
        self.gateway.invoke(request, |_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rids_strictly_increase() {
        let ids: Vec<i64> = (0..1_000).map(|_| unique_rid()).collect();
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn rids_are_near_wall_clock() {
        let before = Utc::now().timestamp_millis();
        assert!(unique_rid() >= before);
    }
}
