//! Successor list for PeerRing
use serde::Deserialize;
use serde::Serialize;

use super::endpoint::Endpoint;
use crate::consts::SUCCESSOR_LIST_MAX;

/// A sequence of successors for a node on the ring.
/// It's necessary to have multiple successors to prevent a single point of failure.
/// The sequence is copied from the successor during fix-successors and is not merged,
/// so a stale remote list can make it shrink.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuccessorSeq {
    successors: Vec<Endpoint>,
}

impl SuccessorSeq {
    /// Create an empty sequence.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the sequence holds no successor.
    pub fn is_empty(&self) -> bool {
        self.successors.is_empty()
    }

    /// Number of successors held.
    pub fn len(&self) -> usize {
        self.successors.len()
    }

    /// The nearest successor, if any.
    pub fn first(&self) -> Option<&Endpoint> {
        self.successors.first()
    }

    /// Copy of the whole sequence, nearest first.
    pub fn list(&self) -> Vec<Endpoint> {
        self.successors.clone()
    }

    /// Drop the head of the sequence and return the new head.
    pub fn shift(&mut self) -> Option<&Endpoint> {
        if !self.successors.is_empty() {
            self.successors.remove(0);
        }
        self.successors.first()
    }

    /// Replace the sequence with `successor` followed by the list reported by it.
    pub fn replace(&mut self, successor: Endpoint, reported: Vec<Endpoint>) {
        let mut succs = Vec::with_capacity(reported.len() + 1);
        succs.push(successor);
        succs.extend(reported);
        succs.truncate(SUCCESSOR_LIST_MAX);
        self.successors = succs;
    }

    /// Replace the sequence as is, truncated to the list bound.
    pub fn set(&mut self, mut successors: Vec<Endpoint>) {
        successors.truncate(SUCCESSOR_LIST_MAX);
        self.successors = successors;
    }
}
