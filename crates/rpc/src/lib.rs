//! HTTP binding of the chordal ring protocol.
//!
//! Every protocol verb is a `POST /<verb>` with a JSON body. [Method] enumerates the verbs,
//! [types] holds the request and response bodies, and [Client] implements
//! [RemoteGateway](chordal_core::swarm::RemoteGateway) over HTTP.
#![warn(missing_docs)]

pub mod client;
pub mod error;
pub mod method;
pub mod types;

pub use client::Client;
pub use method::Method;
pub use types::Protocol;
