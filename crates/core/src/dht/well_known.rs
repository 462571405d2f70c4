//! Bootstrap contacts of a peer.
use std::sync::Arc;
use std::sync::RwLock;

use rand::seq::SliceRandom;

use super::endpoint::Address;
use crate::error::Error;
use crate::error::Result;

/// Deduplicated list of addresses used to (re)join the ring.
/// Grows as lookups discover new peers, never shrinks.
#[derive(Debug, Clone, Default)]
pub struct WellKnownPeers {
    peers: Arc<RwLock<Vec<Address>>>,
}

impl WellKnownPeers {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one or more addresses, skipping those already known.
    pub fn add<I>(&self, candidates: I) -> Result<()>
    where I: IntoIterator<Item = Address> {
        let mut peers = self.peers.write().map_err(|_| Error::DHTSyncLockError)?;
        for candidate in candidates {
            if !peers.contains(&candidate) {
                tracing::debug!("add well-known peer {}", candidate);
                peers.push(candidate);
            }
        }
        Ok(())
    }

    /// Copy of the registry in insertion order.
    pub fn get(&self) -> Result<Vec<Address>> {
        let peers = self.peers.read().map_err(|_| Error::DHTSyncLockError)?;
        Ok(peers.clone())
    }

    /// Pick a uniformly random entry.
    pub fn sample(&self) -> Result<Option<Address>> {
        let peers = self.peers.read().map_err(|_| Error::DHTSyncLockError)?;
        Ok(peers.choose(&mut rand::thread_rng()).cloned())
    }
}
