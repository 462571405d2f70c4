#![warn(missing_docs)]
use serde::Deserialize;
use serde::Serialize;

use super::endpoint::Endpoint;
use super::interval::Interval;
use super::Did;
use crate::consts::ID_BITS;

/// Finger table of Chord DHT.
///
/// Slots are numbered `1..=160` as in the paper: slot `i` aims at the successor of
/// `did + 2^(i-1)`. Slots are filled lazily, one per fix-fingers tick, and are allowed
/// to be empty or stale.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FingerTable {
    did: Did,
    finger: Vec<Option<Endpoint>>,
}

impl FingerTable {
    /// builder
    pub fn new(did: Did) -> Self {
        Self {
            did,
            finger: vec![None; ID_BITS],
        }
    }

    /// Number of slots.
    pub fn size(&self) -> usize {
        self.finger.len()
    }

    /// is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// get number of filled slots
    pub fn len(&self) -> usize {
        self.finger.iter().flatten().count()
    }

    /// getter, `index` in `1..=160`
    pub fn get(&self, index: usize) -> Option<&Endpoint> {
        if index == 0 {
            return None;
        }
        self.finger.get(index - 1).and_then(|x| x.as_ref())
    }

    /// setter, `index` in `1..=160`
    pub fn set(&mut self, index: usize, endpoint: Endpoint) {
        if index == 0 || index > self.finger.len() {
            tracing::error!("set finger index out of range, index: {}", index);
            return;
        }
        tracing::debug!("set finger table index: {} endpoint: {}", index, endpoint);
        self.finger[index - 1] = Some(endpoint);
    }

    /// Start of the interval slot `index` aims at: `did + 2^(index-1)`.
    pub fn target(&self, index: usize) -> Did {
        self.did + Did::pow2(index.saturating_sub(1) as u32)
    }

    /// Scan from the farthest slot down and return the first finger strictly
    /// between this node and `id`. Falls back to `me` when no finger qualifies.
    pub fn closest_preceding_finger(&self, id: Did, me: &Endpoint) -> Endpoint {
        let arc = Interval::open(self.did, id);
        self.finger
            .iter()
            .rev()
            .flatten()
            .find(|finger| arc.contains(finger.id))
            .cloned()
            .unwrap_or_else(|| me.clone())
    }

    /// All slots in index order, empty ones included.
    pub fn list(&self) -> &[Option<Endpoint>] {
        &self.finger
    }

    /// Filled slots with their index.
    pub fn entries(&self) -> Vec<(usize, Endpoint)> {
        self.finger
            .iter()
            .enumerate()
            .filter_map(|(i, x)| x.clone().map(|ep| (i + 1, ep)))
            .collect()
    }
}
