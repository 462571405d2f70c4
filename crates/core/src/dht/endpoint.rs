//! Addressing of peers.
#![warn(missing_docs)]

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;

use super::did::Did;
use crate::error::Error;
use crate::error::Result;

/// A dialable `{host, port}` pair without its ring position.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address {
    /// Host name or ip.
    pub host: String,
    /// Port number.
    pub port: u16,
}

impl Address {
    /// Build an address, rejecting an empty host or a zero port.
    pub fn new(host: impl Into<String>, port: u16) -> Result<Self> {
        let host = host.into();
        if host.is_empty() {
            return Err(Error::MissingField("host"));
        }
        if port == 0 {
            return Err(Error::MissingField("port"));
        }
        Ok(Self { host, port })
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// A peer on the ring. The id is always `sha1(host:port)`, so two endpoints are
/// equal iff their addresses are equal.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Endpoint {
    /// Host name or ip.
    pub host: String,
    /// Port number.
    pub port: u16,
    /// Position on the ring.
    pub id: Did,
}

impl Endpoint {
    /// Build an endpoint and derive its id.
    pub fn new(host: impl Into<String>, port: u16) -> Result<Self> {
        Ok(Address::new(host, port)?.into())
    }

    /// The `{host, port}` part of the endpoint.
    pub fn address(&self) -> Address {
        Address {
            host: self.host.clone(),
            port: self.port,
        }
    }
}

impl From<Address> for Endpoint {
    fn from(addr: Address) -> Self {
        let id = Did::hash(&addr.to_string());
        Self {
            host: addr.host,
            port: addr.port,
            id,
        }
    }
}

impl From<&Endpoint> for Address {
    fn from(ep: &Endpoint) -> Self {
        ep.address()
    }
}

impl From<Endpoint> for Address {
    fn from(ep: Endpoint) -> Self {
        Self {
            host: ep.host,
            port: ep.port,
        }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}:{}({})", self.host, self.port, self.id)
    }
}

impl<'de> Deserialize<'de> for Endpoint {
    /// The id on the wire is ignored and derived again from host and port.
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where D: Deserializer<'de> {
        let addr = Address::deserialize(deserializer)?;
        Address::new(addr.host, addr.port)
            .map(Endpoint::from)
            .map_err(serde::de::Error::custom)
    }
}
