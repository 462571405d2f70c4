//! Request and response bodies of the protocol verbs.
//!
//! Verbs without arguments take an empty object. Verbs that accept an address
//! (`notify`, `join`) take [Address](chordal_core::dht::Address) as `{host, port}`.
use std::str::FromStr;

use chordal_core::dht::Did;
use chordal_core::dht::Status;
use serde::Deserialize;
use serde::Serialize;

use crate::error::Error;

/// Url scheme used to dial other peers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    /// plain http
    #[default]
    Http,
    /// http over tls
    Https,
}

impl Protocol {
    /// Scheme name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Http => "http",
            Protocol::Https => "https",
        }
    }
}

impl FromStr for Protocol {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "http" => Ok(Protocol::Http),
            "https" => Ok(Protocol::Https),
            _ => Err(Error::InvalidProtocol(s.to_string())),
        }
    }
}

impl std::fmt::Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of `find-successor`, `find-predecessor` and `closest-preceding-finger`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdRequest {
    /// Target identifier, 40 hex digits.
    pub id: Did,
}

/// Body returned by `status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Membership status.
    pub status: Status,
}
