//! chordal-rpc client

use std::time::Duration;

use async_trait::async_trait;
use chordal_core::dht::Address;
use chordal_core::dht::Did;
use chordal_core::dht::Endpoint;
use chordal_core::dht::Status;
use chordal_core::dht::Task;
use chordal_core::error::RemoteCallError;
use chordal_core::error::Result;
use chordal_core::inspect::RingInspect;
use chordal_core::swarm::LookupResult;
use chordal_core::swarm::RemoteGateway;
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;
use url::Url;

use crate::method::Method;
use crate::types::IdRequest;
use crate::types::Protocol;
use crate::types::StatusResponse;

/// Default bound on a single remote call.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Calls protocol verbs on other peers over HTTP.
#[derive(Clone, Debug)]
pub struct Client {
    client: HttpClient,
    protocol: Protocol,
}

impl Client {
    /// Creates a new Client dialing peers with `protocol`, every call bounded by `timeout`.
    pub fn new(protocol: Protocol, timeout: Duration) -> crate::error::Result<Self> {
        let client = HttpClient::builder().timeout(timeout).build()?;
        Ok(Self { client, protocol })
    }

    /// Url of `method` on `target`.
    pub fn url(&self, target: &Address, method: Method) -> crate::error::Result<Url> {
        let base = Url::parse(&format!(
            "{}://{}:{}/",
            self.protocol, target.host, target.port
        ))?;
        Ok(base.join(method.as_str())?)
    }

    /// POST `args` to `method` on `target` and decode the response.
    ///
    /// Connection errors, timeouts, non-success statuses and undecodable bodies all turn
    /// into [RemoteCallError] and are logged at `warn`. An empty body decodes as `null`.
    pub async fn call<T>(&self, target: &Address, method: Method, args: serde_json::Value) -> Result<T>
    where T: DeserializeOwned {
        let url = match self.url(target, method) {
            Ok(url) => url,
            Err(e) => {
                return Err(self.fail(target.to_string(), method, args, None, e.to_string()));
            }
        };

        let resp = match self.client.post(url.clone()).json(&args).send().await {
            Ok(resp) => resp,
            Err(e) => {
                let status = e.status().map(|s| s.as_u16());
                return Err(self.fail(url.to_string(), method, args, status, e.to_string()));
            }
        };

        let status = resp.status();
        let body = match resp.bytes().await {
            Ok(body) => body,
            Err(e) => {
                return Err(self.fail(
                    url.to_string(),
                    method,
                    args,
                    Some(status.as_u16()),
                    e.to_string(),
                ));
            }
        };

        if !status.is_success() {
            let reason = String::from_utf8_lossy(&body).trim().to_string();
            return Err(self.fail(url.to_string(), method, args, Some(status.as_u16()), reason));
        }

        let parsed = if body.iter().all(u8::is_ascii_whitespace) {
            serde_json::from_value(serde_json::Value::Null)
        } else {
            serde_json::from_slice(&body)
        };
        parsed.map_err(|e| {
            self.fail(
                url.to_string(),
                method,
                args,
                Some(status.as_u16()),
                format!("invalid response body: {e}"),
            )
        })
    }

    fn fail(
        &self,
        url: String,
        method: Method,
        args: serde_json::Value,
        status: Option<u16>,
        reason: String,
    ) -> chordal_core::error::Error {
        let e = RemoteCallError {
            url,
            method: method.to_string(),
            args,
            status,
            reason,
        };
        tracing::warn!(
            "failed to call a remote function, url: {}, args: {}, status: {:?}, reason: {}",
            e.url,
            e.args,
            e.status,
            e.reason
        );
        e.into()
    }

    fn empty() -> serde_json::Value {
        serde_json::Value::Object(Default::default())
    }

    fn id_args(id: Did) -> serde_json::Value {
        serde_json::json!(IdRequest { id })
    }

    /// Ask `target` to enter the ring through `peer`.
    pub async fn join(&self, target: &Address, peer: &Address) -> Result<()> {
        self.call(target, Method::Join, serde_json::json!(peer))
            .await
    }

    /// Run one maintenance tick on `target`.
    pub async fn run_task(&self, target: &Address, task: Task) -> Result<()> {
        if task == Task::Join {
            return Err(chordal_core::error::Error::InvalidArgument(
                "join needs a peer address".to_string(),
            ));
        }
        self.call(target, Method::from(task), Self::empty()).await
    }

    /// Snapshot of the ring state of `target`.
    pub async fn inspect(&self, target: &Address) -> Result<RingInspect> {
        self.call(target, Method::Inspect, Self::empty()).await
    }

    /// Find the peer responsible for `value` starting from `target`, and fetch its metadata.
    pub async fn lookup(&self, target: &Address, value: &str) -> Result<LookupResult> {
        if value.is_empty() {
            return Err(chordal_core::error::Error::MissingField("value"));
        }
        let endpoint = self.find_successor(target, Did::hash(value)).await?;
        let metadata = self.metadata(&endpoint.address()).await?;
        Ok(LookupResult { endpoint, metadata })
    }
}

#[async_trait]
impl RemoteGateway for Client {
    async fn endpoint(&self, target: &Address) -> Result<Endpoint> {
        self.call(target, Method::SelfEndpoint, Self::empty()).await
    }

    async fn status(&self, target: &Address) -> Result<Status> {
        let resp: StatusResponse = self.call(target, Method::Status, Self::empty()).await?;
        Ok(resp.status)
    }

    async fn metadata(&self, target: &Address) -> Result<serde_json::Value> {
        self.call(target, Method::Metadata, Self::empty()).await
    }

    async fn successor(&self, target: &Address) -> Result<Endpoint> {
        self.call(target, Method::Successor, Self::empty()).await
    }

    async fn successors(&self, target: &Address) -> Result<Vec<Endpoint>> {
        self.call(target, Method::Successors, Self::empty()).await
    }

    async fn predecessor(&self, target: &Address) -> Result<Option<Endpoint>> {
        self.call(target, Method::Predecessor, Self::empty()).await
    }

    async fn find_successor(&self, target: &Address, id: Did) -> Result<Endpoint> {
        self.call(target, Method::FindSuccessor, Self::id_args(id))
            .await
    }

    async fn find_predecessor(&self, target: &Address, id: Did) -> Result<Endpoint> {
        self.call(target, Method::FindPredecessor, Self::id_args(id))
            .await
    }

    async fn closest_preceding_finger(&self, target: &Address, id: Did) -> Result<Endpoint> {
        self.call(target, Method::ClosestPrecedingFinger, Self::id_args(id))
            .await
    }

    async fn notify(&self, target: &Address, candidate: &Address) -> Result<()> {
        self.call(target, Method::Notify, serde_json::json!(candidate))
            .await
    }
}
