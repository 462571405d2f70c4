//! Chord state of the local peer.
#![warn(missing_docs)]
use std::sync::Mutex;
use std::sync::MutexGuard;

use tokio::sync::broadcast;

use super::endpoint::Address;
use super::endpoint::Endpoint;
use super::interval::Interval;
use super::successor::SuccessorSeq;
use super::types::RingEvent;
use super::types::Status;
use super::well_known::WellKnownPeers;
use super::Did;
use super::FingerTable;
use crate::consts::EVENT_CHANNEL_CAPACITY;
use crate::error::Error;
use crate::error::Result;

/// Successor and predecessor are guarded together so that a status read never sees
/// one of them half updated.
#[derive(Debug, Clone)]
struct Neighbours {
    successor: Endpoint,
    predecessor: Option<Endpoint>,
}

/// PeerRing is the ring membership record of the local node.
/// All nodes form a clockwise ring in the order of [Did].
///
/// It only holds state and the local parts of the Chord algorithm. Everything that needs
/// to talk to other peers lives in [Swarm](crate::swarm::Swarm) and
/// [Stabilizer](super::Stabilizer).
pub struct PeerRing {
    /// The endpoint of current node, fixed at construction.
    pub endpoint: Endpoint,
    /// The did of current node.
    pub did: Did,
    neighbours: Mutex<Neighbours>,
    successor_seq: Mutex<SuccessorSeq>,
    finger: Mutex<FingerTable>,
    /// Bootstrap contacts, seeded with the node itself.
    pub well_known: WellKnownPeers,
    metadata: serde_json::Value,
    events: broadcast::Sender<RingEvent>,
}

impl PeerRing {
    /// Create a ring of one: successor and predecessor are the node itself.
    pub fn new(endpoint: Endpoint) -> Self {
        Self::new_with_metadata(endpoint, serde_json::Value::Object(Default::default()))
    }

    /// Same as [PeerRing::new], with opaque application metadata attached.
    pub fn new_with_metadata(endpoint: Endpoint, metadata: serde_json::Value) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let well_known = WellKnownPeers::new();
        if let Err(e) = well_known.add([endpoint.address()]) {
            tracing::error!("failed to seed well-known peers: {:?}", e);
        }
        Self {
            did: endpoint.id,
            neighbours: Mutex::new(Neighbours {
                successor: endpoint.clone(),
                predecessor: Some(endpoint.clone()),
            }),
            successor_seq: Mutex::new(SuccessorSeq::new()),
            finger: Mutex::new(FingerTable::new(endpoint.id)),
            well_known,
            metadata,
            events,
            endpoint,
        }
    }

    fn lock_neighbours(&self) -> Result<MutexGuard<Neighbours>> {
        self.neighbours.lock().map_err(|_| Error::DHTSyncLockError)
    }

    /// Lock and return MutexGuard of successor sequence.
    pub fn lock_successors(&self) -> Result<MutexGuard<SuccessorSeq>> {
        self.successor_seq
            .lock()
            .map_err(|_| Error::DHTSyncLockError)
    }

    /// Lock and return MutexGuard of finger table.
    pub fn lock_finger(&self) -> Result<MutexGuard<FingerTable>> {
        self.finger.lock().map_err(|_| Error::DHTSyncLockError)
    }

    /// Subscribe to successor, predecessor and status changes.
    pub fn subscribe(&self) -> broadcast::Receiver<RingEvent> {
        self.events.subscribe()
    }

    fn publish(&self, event: RingEvent) {
        // No receiver is not an error.
        let _ = self.events.send(event);
    }

    /// Opaque application metadata.
    pub fn metadata(&self) -> serde_json::Value {
        self.metadata.clone()
    }

    /// Current membership status, computed on every call.
    pub fn status(&self) -> Result<Status> {
        let n = self.lock_neighbours()?;
        Ok(Status::derive(
            &self.endpoint,
            &n.successor,
            n.predecessor.as_ref(),
        ))
    }

    /// Current successor.
    pub fn successor(&self) -> Result<Endpoint> {
        Ok(self.lock_neighbours()?.successor.clone())
    }

    /// Current predecessor, `None` when unknown.
    pub fn predecessor(&self) -> Result<Option<Endpoint>> {
        Ok(self.lock_neighbours()?.predecessor.clone())
    }

    /// Copy of the successor sequence.
    pub fn successors(&self) -> Result<Vec<Endpoint>> {
        Ok(self.lock_successors()?.list())
    }

    /// Apply `f` under the neighbours lock and publish what it reports. `f` returns `None`
    /// when it decided to leave the neighbours untouched.
    /// Events are sent before the lock is released, so subscribers see them in the order
    /// the changes were made.
    fn update_neighbours<F>(&self, f: F) -> Result<bool>
    where F: FnOnce(&mut Neighbours) -> Result<Option<RingEvent>> {
        let mut n = self.lock_neighbours()?;
        let from = Status::derive(&self.endpoint, &n.successor, n.predecessor.as_ref());
        let Some(event) = f(&mut n)? else {
            return Ok(false);
        };
        let to = Status::derive(&self.endpoint, &n.successor, n.predecessor.as_ref());
        self.publish(event);
        if from != to {
            tracing::info!("status of {} changed: {} -> {}", self.endpoint, from, to);
            self.publish(RingEvent::StatusChanged { from, to });
        }
        Ok(true)
    }

    /// Assign the successor. The id is always derived again from host and port.
    pub fn set_successor(&self, successor: impl Into<Address>) -> Result<()> {
        let successor = Endpoint::from(successor.into());
        tracing::debug!("{} set successor: {}", self.endpoint, successor);
        self.update_neighbours(|n| {
            n.successor = successor.clone();
            Ok(Some(RingEvent::SuccessorChanged(successor)))
        })?;
        Ok(())
    }

    /// Assign the predecessor. `None` marks it unknown, which is a valid state.
    pub fn set_predecessor(&self, predecessor: Option<Address>) -> Result<()> {
        let predecessor = predecessor.map(Endpoint::from);
        tracing::debug!("{} set predecessor: {:?}", self.endpoint, predecessor);
        self.update_neighbours(|n| {
            n.predecessor = predecessor.clone();
            Ok(Some(RingEvent::PredecessorChanged(predecessor)))
        })?;
        Ok(())
    }

    /// Replace the successor sequence with `successor` followed by the list it reported.
    pub fn set_successors(&self, successor: Endpoint, reported: Vec<Endpoint>) -> Result<()> {
        self.lock_successors()?.replace(successor, reported);
        Ok(())
    }

    /// Store `endpoint` in finger slot `index`.
    pub fn set_finger(&self, index: usize, endpoint: Endpoint) -> Result<()> {
        self.lock_finger()?.set(index, endpoint);
        Ok(())
    }

    /// Whether this node owns `value`, i.e. `hash(value)` is in `(predecessor, self]`.
    pub fn is_responsible_for(&self, value: &str) -> Result<bool> {
        if value.is_empty() {
            return Err(Error::MissingField("value"));
        }
        let Some(predecessor) = self.predecessor()? else {
            return Ok(false);
        };
        Ok(Interval::left_open(predecessor.id, self.did).contains(Did::hash(value)))
    }

    /// Handle notification from a node that thinks it is the predecessor of current node.
    /// Accepts it when no predecessor is known or it lies strictly between the current
    /// predecessor and this node. Returns whether it was accepted.
    pub fn notify(&self, candidate: Address) -> Result<bool> {
        let candidate = Endpoint::from(candidate);
        let me = self.did;
        self.update_neighbours(|n| {
            let accept = match &n.predecessor {
                None => true,
                Some(pre) => Interval::open(pre.id, me).contains(candidate.id),
            };
            if !accept {
                return Ok(None);
            }
            tracing::debug!("accept predecessor from notify: {}", candidate);
            n.predecessor = Some(candidate.clone());
            Ok(Some(RingEvent::PredecessorChanged(Some(candidate))))
        })
    }

    /// The farthest known finger strictly between this node and `id`, or this node.
    pub fn closest_preceding_finger(&self, id: Did) -> Result<Endpoint> {
        Ok(self
            .lock_finger()?
            .closest_preceding_finger(id, &self.endpoint))
    }

    /// Local repair after `dead` was found unreachable as successor: drop it from the head
    /// of the successor sequence and adopt the next entry, or collapse to a ring of one.
    ///
    /// Nothing changes when the successor is no longer `dead`, so two ticks failing on the
    /// same peer drop it once. Returns the successor after the repair.
    pub fn fix_successor(&self, dead: &Endpoint) -> Result<Endpoint> {
        let mut current = None;
        self.update_neighbours(|n| {
            if n.successor != *dead {
                current = Some(n.successor.clone());
                return Ok(None);
            }
            // neighbours, then successors, the only place both are held
            let mut succs = self.lock_successors()?;
            if succs.first() == Some(dead) {
                succs.shift();
            }
            let next = succs
                .first()
                .cloned()
                .unwrap_or_else(|| self.endpoint.clone());
            tracing::info!("{} fix successor {}, fall back to {}", self.endpoint, dead, next);
            n.successor = next.clone();
            current = Some(next.clone());
            Ok(Some(RingEvent::SuccessorChanged(next)))
        })?;
        current.map_or_else(|| self.successor(), Ok)
    }
}
