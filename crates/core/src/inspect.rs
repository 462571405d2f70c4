//! Read-only snapshots of ring state for operators and tests.
use serde::Deserialize;
use serde::Serialize;

use crate::dht::Address;
use crate::dht::Endpoint;
use crate::dht::PeerRing;
use crate::dht::Status;
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RingInspect {
    pub endpoint: Endpoint,
    pub status: Status,
    pub successor: Endpoint,
    #[serde(default)]
    pub predecessor: Option<Endpoint>,
    pub successors: Vec<Endpoint>,
    /// Runs of identical slots as `(endpoint id, first slot, last slot)`, slots are 1-based.
    pub finger_table: Vec<(Option<String>, u64, u64)>,
    pub well_known_peers: Vec<Address>,
}

impl RingInspect {
    pub fn inspect(dht: &PeerRing) -> Result<Self> {
        let finger_table = {
            let ft = dht.lock_finger()?;
            let finger = ft.list().iter().map(|x| x.as_ref().map(|ep| ep.to_string()));
            compress_iter(finger)
                .into_iter()
                .map(|(ep, start, end)| (ep, start + 1, end + 1))
                .collect()
        };

        Ok(Self {
            endpoint: dht.endpoint.clone(),
            status: dht.status()?,
            successor: dht.successor()?,
            predecessor: dht.predecessor()?,
            successors: dht.successors()?,
            finger_table,
            well_known_peers: dht.well_known.get()?,
        })
    }
}

/// Collapse consecutive equal items into `(item, first index, last index)`.
pub fn compress_iter<T>(iter: impl Iterator<Item = T>) -> Vec<(T, u64, u64)>
where T: PartialEq {
    let mut result = vec![];
    let mut start = 0u64;
    let mut count = 0u64;
    let mut prev: Option<T> = None;

    for (i, x) in iter.enumerate() {
        match prev {
            Some(p) if p == x => {
                count += 1;
            }
            _ => {
                if let Some(p) = prev {
                    result.push((p, start, start + count - 1));
                }
                start = i as u64;
                count = 1;
            }
        }
        prev = Some(x);
    }

    if let Some(p) = prev {
        result.push((p, start, start + count - 1));
    }

    result
}
