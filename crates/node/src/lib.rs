//! A chordal peer: configuration, logging, the HTTP binding of the protocol verbs
//! and the periodic maintenance tasks.
//!
//! The ring logic itself lives in [chordal_core]; remote verbs are dialed through
//! [chordal_rpc::Client].
pub mod config;
pub mod endpoint;
pub mod error;
pub mod logging;
pub mod processor;
pub mod util;

pub use chordal_core;
pub use chordal_rpc;
