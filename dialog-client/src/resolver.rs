//! Peer resolution: turning the bare peer references carried by updates into
//! addressable [`OutPeer`] handles.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use dialog_wire::enums::PeerType;
use dialog_wire::types::{OutPeer, Peer};

use crate::InvocationError;

/// Resolves peers referenced by inbound updates.
///
/// `Ok(None)` means "not found"; the update pipeline drops the update without
/// surfacing anything. `Err` is reserved for resolution that could not be
/// attempted at all.
#[async_trait]
pub trait PeerResolver: Send + Sync {
    /// Resolve the conversation an update belongs to.
    async fn find_out_peer(&self, peer: &Peer) -> Result<Option<OutPeer>, InvocationError>;

    /// Resolve the author of a message seen in `peer` at `date`.
    async fn load_sender_out_peer(
        &self,
        sender_uid: i32,
        peer: &OutPeer,
        date: i64,
    ) -> Result<Option<OutPeer>, InvocationError>;
}

// ─── PeerDirectory ────────────────────────────────────────────────────────────

#[derive(Default)]
struct Hashes {
    /// user_id → access_hash
    users:    HashMap<i32, i64>,
    /// group_id → access_hash
    groups:   HashMap<i32, i64>,
    /// channel_id → access_hash
    channels: HashMap<i32, i64>,
}

impl Hashes {
    fn table(&self, kind: PeerType) -> &HashMap<i32, i64> {
        match kind {
            PeerType::Private => &self.users,
            PeerType::Group   => &self.groups,
            PeerType::Channel => &self.channels,
        }
    }

    fn table_mut(&mut self, kind: PeerType) -> &mut HashMap<i32, i64> {
        match kind {
            PeerType::Private => &mut self.users,
            PeerType::Group   => &mut self.groups,
            PeerType::Channel => &mut self.channels,
        }
    }
}

/// An in-memory [`PeerResolver`] backed by access hashes the application
/// already knows.
///
/// Peers become resolvable once [`remember`](Self::remember)ed. A sender that
/// was never seen still resolves in a private chat with that same user.
#[derive(Default)]
pub struct PeerDirectory {
    hashes: RwLock<Hashes>,
}

impl PeerDirectory {
    pub fn new() -> Self { Self::default() }

    /// Record (or replace) the access hash of one peer.
    pub fn remember(&self, peer: OutPeer) {
        let mut hashes = self.hashes.write().unwrap_or_else(|e| e.into_inner());
        hashes.table_mut(peer.kind).insert(peer.id, peer.access_hash);
    }

    pub fn remember_all(&self, peers: impl IntoIterator<Item = OutPeer>) {
        let mut hashes = self.hashes.write().unwrap_or_else(|e| e.into_inner());
        for peer in peers {
            hashes.table_mut(peer.kind).insert(peer.id, peer.access_hash);
        }
    }

    /// Look a peer up without going through the async trait.
    pub fn get(&self, kind: PeerType, id: i32) -> Option<OutPeer> {
        let hashes = self.hashes.read().unwrap_or_else(|e| e.into_inner());
        hashes.table(kind).get(&id).map(|&access_hash| OutPeer { kind, id, access_hash })
    }

    pub fn len(&self) -> usize {
        let hashes = self.hashes.read().unwrap_or_else(|e| e.into_inner());
        hashes.users.len() + hashes.groups.len() + hashes.channels.len()
    }

    pub fn is_empty(&self) -> bool { self.len() == 0 }
}

#[async_trait]
impl PeerResolver for PeerDirectory {
    async fn find_out_peer(&self, peer: &Peer) -> Result<Option<OutPeer>, InvocationError> {
        Ok(self.get(peer.kind, peer.id))
    }

    async fn load_sender_out_peer(
        &self,
        sender_uid: i32,
        peer: &OutPeer,
        _date: i64,
    ) -> Result<Option<OutPeer>, InvocationError> {
        if let Some(known) = self.get(PeerType::Private, sender_uid) {
            return Ok(Some(known));
        }
        let own_chat = peer.kind == PeerType::Private && peer.id == sender_uid;
        Ok(own_chat.then_some(*peer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn out(kind: PeerType, id: i32, access_hash: i64) -> OutPeer {
        OutPeer { kind, id, access_hash }
    }

    #[tokio::test]
    async fn unknown_peer_is_not_found() {
        let dir = PeerDirectory::new();
        let peer = Peer { kind: PeerType::Group, id: 4 };
        assert_eq!(dir.find_out_peer(&peer).await.unwrap(), None);
    }

    #[tokio::test]
    async fn kinds_do_not_collide() {
        let dir = PeerDirectory::new();
        dir.remember_all([out(PeerType::Private, 1, 10), out(PeerType::Group, 1, 20)]);
        assert_eq!(dir.len(), 2);

        let group = Peer { kind: PeerType::Group, id: 1 };
        assert_eq!(dir.find_out_peer(&group).await.unwrap(), Some(out(PeerType::Group, 1, 20)));
    }

    #[tokio::test]
    async fn sender_falls_back_to_private_chat() {
        let dir = PeerDirectory::new();
        let chat = out(PeerType::Private, 7, 70);
        assert_eq!(dir.load_sender_out_peer(7, &chat, 0).await.unwrap(), Some(chat));
        assert_eq!(dir.load_sender_out_peer(8, &chat, 0).await.unwrap(), None);

        let group = out(PeerType::Group, 7, 1);
        assert_eq!(dir.load_sender_out_peer(7, &group, 0).await.unwrap(), None);
    }
}
