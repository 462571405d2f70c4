#![warn(missing_docs)]
//! Routing over the ring.
//!
//! [Swarm] couples the local [PeerRing] with a [RemoteGateway] and implements the lookups
//! that may cross the network. Calls aimed at the local node are answered from local state
//! instead of going through the gateway.

mod builder;
/// Remote call boundary of the swarm
pub mod transport;

use std::sync::Arc;

pub use builder::SwarmBuilder;
use serde::Deserialize;
use serde::Serialize;
pub use transport::RemoteGateway;
pub use transport::SharedRemoteGateway;

use crate::dht::Address;
use crate::dht::Did;
use crate::dht::Endpoint;
use crate::dht::Interval;
use crate::dht::PeerRing;
use crate::dht::Status;
use crate::error::Error;
use crate::error::Result;
use crate::inspect::RingInspect;

/// Result of [Swarm::lookup].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LookupResult {
    /// Peer responsible for the value.
    pub endpoint: Endpoint,
    /// Metadata served by that peer.
    pub metadata: serde_json::Value,
}

/// The local peer together with the way it reaches other peers.
pub struct Swarm {
    /// Reference of DHT.
    pub(crate) dht: Arc<PeerRing>,
    pub(crate) remote: SharedRemoteGateway,
    max_lookup_hops: usize,
}

impl Swarm {
    /// Get did of self.
    pub fn did(&self) -> Did {
        self.dht.did
    }

    /// Get endpoint of self.
    pub fn endpoint(&self) -> Endpoint {
        self.dht.endpoint.clone()
    }

    /// Get DHT(Distributed Hash Table) of self.
    pub fn dht(&self) -> Arc<PeerRing> {
        self.dht.clone()
    }

    /// Get the gateway used to reach other peers.
    pub fn remote(&self) -> SharedRemoteGateway {
        self.remote.clone()
    }

    /// Hop ceiling of [Swarm::find_predecessor].
    pub fn max_lookup_hops(&self) -> usize {
        self.max_lookup_hops
    }

    fn is_me(&self, target: &Endpoint) -> bool {
        *target == self.dht.endpoint
    }

    /// Membership status of self.
    pub fn status(&self) -> Result<Status> {
        self.dht.status()
    }

    /// Metadata of self.
    pub fn metadata(&self) -> serde_json::Value {
        self.dht.metadata()
    }

    /// Successor of self.
    pub fn successor(&self) -> Result<Endpoint> {
        self.dht.successor()
    }

    /// Successor list of self.
    pub fn successors(&self) -> Result<Vec<Endpoint>> {
        self.dht.successors()
    }

    /// Predecessor of self.
    pub fn predecessor(&self) -> Result<Option<Endpoint>> {
        self.dht.predecessor()
    }

    /// Local finger lookup, never touches the network.
    pub fn closest_preceding_finger(&self, id: Did) -> Result<Endpoint> {
        self.dht.closest_preceding_finger(id)
    }

    /// Accept `candidate` as predecessor if it is closer than the current one.
    pub fn notify(&self, candidate: Address) -> Result<bool> {
        self.dht.notify(candidate)
    }

    /// Snapshot of the local ring state.
    pub fn inspect(&self) -> Result<RingInspect> {
        RingInspect::inspect(&self.dht)
    }

    pub(crate) async fn endpoint_of(&self, target: &Endpoint) -> Result<Endpoint> {
        if self.is_me(target) {
            return Ok(self.endpoint());
        }
        self.remote.endpoint(&target.address()).await
    }

    pub(crate) async fn successor_of(&self, target: &Endpoint) -> Result<Endpoint> {
        if self.is_me(target) {
            return self.successor();
        }
        self.remote.successor(&target.address()).await
    }

    pub(crate) async fn successors_of(&self, target: &Endpoint) -> Result<Vec<Endpoint>> {
        if self.is_me(target) {
            return self.successors();
        }
        self.remote.successors(&target.address()).await
    }

    pub(crate) async fn predecessor_of(&self, target: &Endpoint) -> Result<Option<Endpoint>> {
        if self.is_me(target) {
            return self.predecessor();
        }
        self.remote.predecessor(&target.address()).await
    }

    pub(crate) async fn notify_to(&self, target: &Endpoint) -> Result<()> {
        let me = self.dht.endpoint.address();
        if self.is_me(target) {
            self.notify(me)?;
            return Ok(());
        }
        self.remote.notify(&target.address(), &me).await
    }

    async fn closest_preceding_finger_of(&self, target: &Endpoint, id: Did) -> Result<Endpoint> {
        if self.is_me(target) {
            return self.closest_preceding_finger(id);
        }
        self.remote
            .closest_preceding_finger(&target.address(), id)
            .await
    }

    async fn metadata_of(&self, target: &Endpoint) -> Result<serde_json::Value> {
        if self.is_me(target) {
            return Ok(self.metadata());
        }
        self.remote.metadata(&target.address()).await
    }

    /// Walk the ring starting from self until reaching the node whose successor arc
    /// `(node, successor]` contains `id`.
    ///
    /// Fails on the first failed remote call, when a node answers with itself as its
    /// closest preceding finger, or after `max_lookup_hops` hops.
    pub async fn find_predecessor(&self, id: Did) -> Result<Endpoint> {
        let mut candidate = self.endpoint();
        for hop in 0..self.max_lookup_hops {
            let successor = self.successor_of(&candidate).await?;
            if Interval::left_open(candidate.id, successor.id).contains(id) {
                tracing::debug!(
                    "find_predecessor: id: {}, found: {} after {} hops",
                    id,
                    candidate,
                    hop
                );
                return Ok(candidate);
            }
            let next = self.closest_preceding_finger_of(&candidate, id).await?;
            if next == candidate {
                return Err(Error::LookupStalled(id, candidate.to_string()));
            }
            tracing::debug!("find_predecessor: id: {}, hop: {} -> {}", id, candidate, next);
            candidate = next;
        }
        Err(Error::LookupHopsExceeded(id, self.max_lookup_hops))
    }

    /// Find the node responsible for `id`.
    /// Answers from local state when `id` is in `(self, successor]`.
    pub async fn find_successor(&self, id: Did) -> Result<Endpoint> {
        let successor = self.successor()?;
        if Interval::left_open(self.did(), successor.id).contains(id) {
            return Ok(successor);
        }
        let predecessor = self.find_predecessor(id).await?;
        let successor = self.successor_of(&predecessor).await?;
        self.dht.well_known.add([successor.address()])?;
        tracing::debug!("find_successor: id: {}, found: {}", id, successor);
        Ok(successor)
    }

    /// Find the node responsible for an arbitrary value and fetch its metadata.
    pub async fn lookup(&self, value: &str) -> Result<LookupResult> {
        if value.is_empty() {
            return Err(Error::MissingField("value"));
        }
        let endpoint = self.find_successor(Did::hash(value)).await?;
        let metadata = self.metadata_of(&endpoint).await?;
        Ok(LookupResult { endpoint, metadata })
    }

    /// Enter the ring known by `peer`.
    ///
    /// Does nothing when `peer` is self or self is not lonely. Otherwise asks `peer` for
    /// the successor of self, adopts it, and forgets the predecessor until someone notifies.
    pub async fn join(&self, peer: &Address) -> Result<()> {
        if *peer == self.dht.endpoint.address() {
            return Ok(());
        }
        if self.status()? != Status::Lonely {
            return Ok(());
        }
        let successor = self.remote.find_successor(peer, self.did()).await?;
        tracing::info!("{} join ring via {}, successor: {}", self.dht.endpoint, peer, successor);
        self.dht.set_predecessor(None)?;
        self.dht.set_successor(successor.address())?;
        Ok(())
    }
}
