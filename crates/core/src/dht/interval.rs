//! Circular intervals on the identifier ring.
//!
//! Every "where on the ring" decision of routing and stabilization goes through [Interval].
//! Dids are never compared directly for ring order since the space wraps around.

use super::did::Did;

/// Boundary inclusion of an [Interval].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum IntervalKind {
    /// `(left, right)`, both ends excluded.
    Open,
    /// `(left, right]`, right end included.
    LeftOpen,
}

/// A clockwise arc from `left` to `right`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Interval {
    left: Did,
    right: Did,
    kind: IntervalKind,
}

impl Interval {
    /// Create an arc of the given kind.
    pub fn new(left: Did, right: Did, kind: IntervalKind) -> Self {
        Self { left, right, kind }
    }

    /// `(left, right)`
    pub fn open(left: Did, right: Did) -> Self {
        Self::new(left, right, IntervalKind::Open)
    }

    /// `(left, right]`
    pub fn left_open(left: Did, right: Did) -> Self {
        Self::new(left, right, IntervalKind::LeftOpen)
    }

    /// Test whether `x` lies on the arc.
    ///
    /// When `left == right` the arc covers the whole ring: an open arc then contains
    /// everything but `left`, a left-open arc contains everything.
    pub fn contains(&self, x: Did) -> bool {
        let (left, right) = (self.left, self.right);
        match self.kind {
            IntervalKind::Open => {
                if left < right {
                    left < x && x < right
                } else if left > right {
                    left < x || x < right
                } else {
                    x != left
                }
            }
            IntervalKind::LeftOpen => {
                if left < right {
                    left < x && x <= right
                } else if left > right {
                    left < x || x <= right
                } else {
                    true
                }
            }
        }
    }
}
