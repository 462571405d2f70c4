//! Error of chordal_core

use std::fmt;

use crate::dht::Did;

/// A wrap `Result` contains custom errors.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors collections in chordal-core.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid identifier: {0}")]
    InvalidDid(String),

    #[error("Remote call failed: {0}")]
    RemoteCall(Box<RemoteCallError>),

    #[error("Successor {0} is unreachable")]
    SuccessorUnreachable(String),

    #[error("Lookup for {0} exceeded {1} hops")]
    LookupHopsExceeded(Did, usize),

    #[error("Lookup for {0} stalled at {1}")]
    LookupStalled(Did, String),

    #[error("No well-known peer to join")]
    NoWellKnownPeer,

    #[error("Failed to acquire lock of DHT")]
    DHTSyncLockError,
}

impl Error {
    /// Argument errors are raised synchronously for malformed input and are never retried.
    pub fn is_argument_error(&self) -> bool {
        matches!(
            self,
            Error::MissingField(_) | Error::InvalidArgument(_) | Error::InvalidDid(_)
        )
    }

    /// Returns the remote call context if the error crossed the process boundary.
    pub fn remote_call(&self) -> Option<&RemoteCallError> {
        match self {
            Error::RemoteCall(e) => Some(e),
            _ => None,
        }
    }
}

impl From<RemoteCallError> for Error {
    fn from(e: RemoteCallError) -> Self {
        Error::RemoteCall(Box::new(e))
    }
}

/// Diagnostic context of a failed remote call.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteCallError {
    /// Target url of the call.
    pub url: String,
    /// Name of the protocol verb.
    pub method: String,
    /// Arguments sent with the call.
    pub args: serde_json::Value,
    /// Status code of the response, absent when no response was received.
    pub status: Option<u16>,
    /// Transport or server supplied reason.
    pub reason: String,
}

impl fmt::Display for RemoteCallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(
                f,
                "{} {} returned status {}: {}",
                self.method, self.url, status, self.reason
            ),
            None => write!(f, "{} {}: {}", self.method, self.url, self.reason),
        }
    }
}
