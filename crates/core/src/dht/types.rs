//! DHT types about `PeerRing` membership.
#![warn(missing_docs)]
use serde::Deserialize;
use serde::Serialize;

use super::endpoint::Endpoint;

/// Membership status of a peer, derived from its successor and predecessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Successor and predecessor are both the peer itself.
    Lonely,
    /// Predecessor is absent, or exactly one of successor and predecessor is the peer itself.
    Unbalanced,
    /// Successor and predecessor are known and both differ from the peer itself.
    Joined,
}

impl Status {
    /// Compute the status of `me` from its neighbours.
    pub fn derive(me: &Endpoint, successor: &Endpoint, predecessor: Option<&Endpoint>) -> Self {
        let Some(predecessor) = predecessor else {
            return Status::Unbalanced;
        };
        match (successor == me, predecessor == me) {
            (true, true) => Status::Lonely,
            (false, false) => Status::Joined,
            _ => Status::Unbalanced,
        }
    }

    /// Lower-case name used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Lonely => "lonely",
            Status::Unbalanced => "unbalanced",
            Status::Joined => "joined",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Events published by [PeerRing](super::PeerRing) to its subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RingEvent {
    /// Successor was assigned, possibly to the same value.
    SuccessorChanged(Endpoint),
    /// Predecessor was assigned. `None` means it became unknown.
    PredecessorChanged(Option<Endpoint>),
    /// The derived status moved from one value to another.
    StatusChanged {
        /// status before the assignment
        from: Status,
        /// status after the assignment
        to: Status,
    },
}
