#![warn(missing_docs)]
//! Implementation of the ring's DHT
//! which is based on CHORD, ref: <https://pdos.csail.mit.edu/papers/ton:chord/paper-ton.pdf>
//! With high probability, the number of nodes that must be contacted to find a successor in an N-node network is O(log N).

mod chord;
pub mod did;
pub mod endpoint;
/// Finger table of a peer
pub mod finger;
pub mod hex;
pub mod interval;
mod stabilization;
/// Successor list of a peer
pub mod successor;
pub mod types;
pub mod well_known;

pub use chord::PeerRing;
pub use did::Did;
pub use endpoint::Address;
pub use endpoint::Endpoint;
pub use finger::FingerTable;
pub use interval::Interval;
pub use interval::IntervalKind;
pub use stabilization::jitter;
pub use stabilization::Stabilizer;
pub use stabilization::Task;
pub use successor::SuccessorSeq;
pub use types::RingEvent;
pub use types::Status;
pub use well_known::WellKnownPeers;
