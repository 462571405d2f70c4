//! Constant variables.

/// Width of the identifier space in bits, the size of a SHA-1 digest.
pub const ID_BITS: usize = 160;
/// Upper bound of the successor list kept by a peer and served to others.
pub const SUCCESSOR_LIST_MAX: usize = 16;
/// Default hop ceiling for `find_predecessor`.
pub const DEFAULT_MAX_LOOKUP_HOPS: usize = 256;
/// Buffered ring events per subscriber before the slowest one starts lagging.
pub const EVENT_CHANNEL_CAPACITY: usize = 64;
