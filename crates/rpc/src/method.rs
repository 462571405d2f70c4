//! Protocol verbs.
#![warn(missing_docs)]

use chordal_core::dht::Task;

use super::error::Error;
use super::error::Result;

/// supported methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Method {
    /// Endpoint of the peer, also used as a liveness probe
    SelfEndpoint,
    /// Membership status
    Status,
    /// Opaque application metadata
    Metadata,
    /// Current successor
    Successor,
    /// Successor list, at most 16 entries
    Successors,
    /// Current predecessor or null
    Predecessor,
    /// Find the peer responsible for an id
    FindSuccessor,
    /// Find the peer preceding an id
    FindPredecessor,
    /// Local finger lookup
    ClosestPrecedingFinger,
    /// Offer the caller as predecessor
    Notify,
    /// Enter the ring through another peer
    Join,
    /// Run one stabilize tick
    Stabilize,
    /// Run one fix-fingers tick
    FixFingers,
    /// Run one fix-successors tick
    FixSuccessors,
    /// Run one fix-predecessor tick
    FixPredecessor,
    /// Snapshot of the ring state
    Inspect,
}

impl Method {
    /// All verbs served by a peer.
    pub const ALL: [Method; 16] = [
        Method::SelfEndpoint,
        Method::Status,
        Method::Metadata,
        Method::Successor,
        Method::Successors,
        Method::Predecessor,
        Method::FindSuccessor,
        Method::FindPredecessor,
        Method::ClosestPrecedingFinger,
        Method::Notify,
        Method::Join,
        Method::Stabilize,
        Method::FixFingers,
        Method::FixSuccessors,
        Method::FixPredecessor,
        Method::Inspect,
    ];

    /// Return method's name as `&str`
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::SelfEndpoint => "self",
            Method::Status => "status",
            Method::Metadata => "metadata",
            Method::Successor => "successor",
            Method::Successors => "successors",
            Method::Predecessor => "predecessor",
            Method::FindSuccessor => "find-successor",
            Method::FindPredecessor => "find-predecessor",
            Method::ClosestPrecedingFinger => "closest-preceding-finger",
            Method::Notify => "notify",
            Method::Join => "join",
            Method::Stabilize => "stabilize",
            Method::FixFingers => "fix-fingers",
            Method::FixSuccessors => "fix-successors",
            Method::FixPredecessor => "fix-predecessor",
            Method::Inspect => "inspect",
        }
    }

    /// Route of the verb, `/<name>`.
    pub fn path(&self) -> String {
        format!("/{}", self.as_str())
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Method {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        Method::ALL
            .into_iter()
            .find(|m| m.as_str() == value)
            .ok_or_else(|| Error::InvalidMethod(value.to_string()))
    }
}

impl From<Task> for Method {
    fn from(task: Task) -> Self {
        match task {
            Task::Stabilize => Method::Stabilize,
            Task::FixSuccessors => Method::FixSuccessors,
            Task::FixFingers => Method::FixFingers,
            Task::FixPredecessor => Method::FixPredecessor,
            Task::Join => Method::Join,
        }
    }
}
