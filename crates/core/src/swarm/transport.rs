//! The remote call boundary of a [Swarm](super::Swarm).
use std::sync::Arc;

use async_trait::async_trait;

use crate::dht::Address;
use crate::dht::Did;
use crate::dht::Endpoint;
use crate::dht::Status;
use crate::error::Result;

/// The [Swarm](super::Swarm) accepts a shared [RemoteGateway] trait object.
pub type SharedRemoteGateway = Arc<dyn RemoteGateway + Send + Sync>;

/// Invoke protocol verbs on another peer.
///
/// Implementations must apply a bounded timeout and turn every transport failure,
/// timeout or non-success response into [Error::RemoteCall](crate::error::Error::RemoteCall)
/// carrying the target, verb, arguments and status. Nothing may panic across this boundary.
#[async_trait]
pub trait RemoteGateway {
    /// `self`, also used as a liveness probe.
    async fn endpoint(&self, target: &Address) -> Result<Endpoint>;

    /// `status`
    async fn status(&self, target: &Address) -> Result<Status>;

    /// `metadata`
    async fn metadata(&self, target: &Address) -> Result<serde_json::Value>;

    /// `successor`
    async fn successor(&self, target: &Address) -> Result<Endpoint>;

    /// `successors`
    async fn successors(&self, target: &Address) -> Result<Vec<Endpoint>>;

    /// `predecessor`, `None` when the target does not know its predecessor.
    async fn predecessor(&self, target: &Address) -> Result<Option<Endpoint>>;

    /// `find-successor`
    async fn find_successor(&self, target: &Address, id: Did) -> Result<Endpoint>;

    /// `find-predecessor`
    async fn find_predecessor(&self, target: &Address, id: Did) -> Result<Endpoint>;

    /// `closest-preceding-finger`
    async fn closest_preceding_finger(&self, target: &Address, id: Did) -> Result<Endpoint>;

    /// `notify`, telling `target` that `candidate` may be its predecessor.
    async fn notify(&self, target: &Address, candidate: &Address) -> Result<()>;
}
