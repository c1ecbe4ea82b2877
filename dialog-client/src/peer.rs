//! Application-level peer addresses.

use dialog_wire::enums::PeerType;
use dialog_wire::types::OutPeer;

/// What kind of conversation a [`Peer`] addresses.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PeerKind {
    User,
    Group,
    Channel,
}

impl From<PeerType> for PeerKind {
    fn from(kind: PeerType) -> Self {
        match kind {
            PeerType::Private => Self::User,
            PeerType::Group   => Self::Group,
            PeerType::Channel => Self::Channel,
        }
    }
}

impl From<PeerKind> for PeerType {
    fn from(kind: PeerKind) -> Self {
        match kind {
            PeerKind::User    => Self::Private,
            PeerKind::Group   => Self::Group,
            PeerKind::Channel => Self::Channel,
        }
    }
}

/// A user, group or channel, together with the access proof needed to
/// address it in outgoing calls.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Peer {
    pub id:          i32,
    pub kind:        PeerKind,
    pub access_hash: i64,
}

impl Peer {
    pub fn user(id: i32, access_hash: i64) -> Self {
        Self { id, kind: PeerKind::User, access_hash }
    }

    pub fn group(id: i32, access_hash: i64) -> Self {
        Self { id, kind: PeerKind::Group, access_hash }
    }

    pub fn channel(id: i32, access_hash: i64) -> Self {
        Self { id, kind: PeerKind::Channel, access_hash }
    }

    /// The resolved wire handle for this peer.
    pub fn to_out_peer(&self) -> OutPeer {
        OutPeer { kind: self.kind.into(), id: self.id, access_hash: self.access_hash }
    }
}

impl From<OutPeer> for Peer {
    fn from(p: OutPeer) -> Self {
        Self { id: p.id, kind: p.kind.into(), access_hash: p.access_hash }
    }
}

impl From<&OutPeer> for Peer {
    fn from(p: &OutPeer) -> Self { Self::from(*p) }
}
