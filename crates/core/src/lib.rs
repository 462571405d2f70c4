//! Chordal: a Chord ring of peers addressed by `host:port`.
//! --------------
//! - [PeerRing](crate::dht::PeerRing) holds the membership record of the local peer: successor,
//!   predecessor, successor list, finger table and the derived [Status](crate::dht::Status).
//! - [Swarm](crate::swarm::Swarm) routes lookups across the ring through a
//!   [RemoteGateway](crate::swarm::RemoteGateway).
//! - [Stabilizer](crate::dht::Stabilizer) runs the periodic self-healing tasks.
//!
//! # Identifiers
//!
//! A peer's position on the ring is the SHA-1 digest of `host:port`, interpreted as a 160-bit
//! unsigned integer. Any other value is placed on the same ring by hashing it, and is owned by
//! the first peer clockwise from it, i.e. the peer whose `(predecessor, self]` arc contains it.
//!
//! # Joining
//!
//! A fresh peer is `lonely`: its successor and predecessor are itself. The join task picks a
//! random well-known peer and asks it for the successor of the fresh peer's id. The answer
//! becomes the successor, the predecessor is forgotten, and the peer is `unbalanced` until
//! stabilization lets its neighbours notice it. Once both neighbours are other peers, it is
//! `joined`.
//!
//! # Healing
//!
//! Each of `stabilize`, `fix-successors`, `fix-fingers` and `fix-predecessor` runs on its own
//! timer, jittered by ±50 % around the base interval. A dead successor is replaced by the next
//! entry of the successor list, a dead predecessor is forgotten until someone notifies.

pub mod consts;
pub mod dht;
pub mod error;
pub mod inspect;
pub mod swarm;

pub use async_trait::async_trait;
