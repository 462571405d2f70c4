//! Configuration file of a chordal peer.
use std::fs;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use chordal_core::consts::DEFAULT_MAX_LOOKUP_HOPS;
use chordal_core::dht::Address;
use chordal_core::dht::Endpoint;
use chordal_core::error::Error as CoreError;
use chordal_rpc::Protocol;
use serde::Deserialize;
use serde::Serialize;

use crate::error::Error;
use crate::error::Result;
use crate::util::ensure_parent_dir;
use crate::util::expand_home;

pub const DEFAULT_CONFIG_LOCATION: &str = "~/.chordal/config.yaml";
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 50000;
pub const DEFAULT_SERVICE_INTERVAL: u64 = 30;
pub const DEFAULT_REQUEST_TIMEOUT: u64 = 10;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Advertised host of this peer.
    pub host: String,
    /// Advertised port of this peer.
    pub port: u16,
    /// Listen address, `0.0.0.0:<port>` when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bind_addr: Option<String>,
    /// Scheme used to dial other peers.
    pub protocol: Protocol,
    /// Base interval of every periodic task, in seconds.
    pub service_interval: u64,
    /// Bound on every remote call, in seconds.
    pub request_timeout: u64,
    pub max_lookup_hops: usize,
    /// Bootstrap contacts.
    pub well_known_peers: Vec<Address>,
    /// Served as is by the `metadata` verb.
    pub metadata: serde_json::Value,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            bind_addr: None,
            protocol: Protocol::default(),
            service_interval: DEFAULT_SERVICE_INTERVAL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            max_lookup_hops: DEFAULT_MAX_LOOKUP_HOPS,
            well_known_peers: vec![],
            metadata: serde_json::Value::Object(Default::default()),
        }
    }
}

impl Config {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// The advertised endpoint, rejecting an empty host or a zero port.
    pub fn endpoint(&self) -> Result<Endpoint> {
        Ok(Endpoint::new(self.host.clone(), self.port)?)
    }

    pub fn bind_addr(&self) -> Result<SocketAddr> {
        let addr = match &self.bind_addr {
            Some(addr) => addr.clone(),
            None => format!("0.0.0.0:{}", self.port),
        };
        addr.parse().map_err(|_| Error::InvalidBindAddr(addr))
    }

    /// Reject zero intervals, timeouts and hop ceilings, which would spin the task loops
    /// or fail every remote call.
    pub fn validate(&self) -> Result<()> {
        let zero = [
            ("service_interval", self.service_interval == 0),
            ("request_timeout", self.request_timeout == 0),
            ("max_lookup_hops", self.max_lookup_hops == 0),
        ];
        match zero.into_iter().find(|(_, is_zero)| *is_zero) {
            Some((field, _)) => Err(CoreError::InvalidArgument(format!(
                "{field} must be greater than 0"
            ))
            .into()),
            None => Ok(()),
        }
    }

    pub fn service_interval(&self) -> Duration {
        Duration::from_secs(self.service_interval)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    pub fn write_fs<P>(&self, path: P) -> Result<String>
    where P: AsRef<std::path::Path> {
        let path = expand_home(path)?;
        ensure_parent_dir(&path)?;
        let f =
            fs::File::create(path.as_path()).map_err(|e| Error::CreateFileError(e.to_string()))?;
        let f_writer = io::BufWriter::new(f);
        serde_yaml::to_writer(f_writer, self).map_err(|_| Error::EncodeError)?;
        Ok(path.to_string_lossy().to_string())
    }

    pub fn read_fs<P>(path: P) -> Result<Config>
    where P: AsRef<std::path::Path> {
        let path = expand_home(path)?;
        tracing::debug!("Read config from: {:?}", path);
        let f = fs::File::open(path).map_err(|e| Error::OpenFileError(e.to_string()))?;
        let f_rdr = io::BufReader::new(f);
        Ok(serde_yaml::from_reader(f_rdr)?)
    }
}
