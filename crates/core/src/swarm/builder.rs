#![warn(missing_docs)]
//! This module provider [SwarmBuilder] and it's interface for
//! [Swarm]

use std::sync::Arc;

use crate::consts::DEFAULT_MAX_LOOKUP_HOPS;
use crate::dht::Address;
use crate::dht::Endpoint;
use crate::dht::PeerRing;
use crate::error::Result;
use crate::swarm::transport::SharedRemoteGateway;
use crate::swarm::Swarm;

/// Creates a SwarmBuilder to configure a Swarm.
pub struct SwarmBuilder {
    endpoint: Endpoint,
    remote: SharedRemoteGateway,
    well_known_peers: Vec<Address>,
    metadata: serde_json::Value,
    max_lookup_hops: usize,
}

impl SwarmBuilder {
    /// Creates new instance of [SwarmBuilder]
    pub fn new(endpoint: Endpoint, remote: SharedRemoteGateway) -> Self {
        SwarmBuilder {
            endpoint,
            remote,
            well_known_peers: vec![],
            metadata: serde_json::Value::Object(Default::default()),
            max_lookup_hops: DEFAULT_MAX_LOOKUP_HOPS,
        }
    }

    /// Bootstrap contacts, added after the node itself.
    pub fn well_known_peers(mut self, peers: Vec<Address>) -> Self {
        self.well_known_peers = peers;
        self
    }

    /// Opaque metadata served by the `metadata` verb.
    pub fn metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }

    /// Hop ceiling of `find_predecessor`.
    pub fn max_lookup_hops(mut self, hops: usize) -> Self {
        self.max_lookup_hops = hops;
        self
    }

    /// Try build for `Swarm`.
    pub fn build(self) -> Result<Swarm> {
        let dht = Arc::new(PeerRing::new_with_metadata(self.endpoint, self.metadata));
        dht.well_known.add(self.well_known_peers)?;

        Ok(Swarm {
            dht,
            remote: self.remote,
            max_lookup_hops: self.max_lookup_hops,
        })
    }
}
