//! Stabilization run daemons to maintain dht.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use futures_timer::Delay;
use rand::Rng;
use serde::Deserialize;
use serde::Serialize;

use crate::consts::ID_BITS;
use crate::dht::Endpoint;
use crate::dht::Interval;
use crate::dht::PeerRing;
use crate::error::Error;
use crate::error::Result;
use crate::swarm::Swarm;

/// Periodic maintenance tasks of a peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Task {
    /// [Stabilizer::stabilize]
    Stabilize,
    /// [Stabilizer::fix_successors]
    FixSuccessors,
    /// [Stabilizer::fix_fingers]
    FixFingers,
    /// [Stabilizer::fix_predecessor]
    FixPredecessor,
    /// [Stabilizer::join_well_known]
    Join,
}

impl Task {
    /// Every task, each one runs on its own timer.
    pub const ALL: [Task; 5] = [
        Task::Stabilize,
        Task::FixSuccessors,
        Task::FixFingers,
        Task::FixPredecessor,
        Task::Join,
    ];

    /// Name of the task, which is also its protocol verb.
    pub fn as_str(&self) -> &'static str {
        match self {
            Task::Stabilize => "stabilize",
            Task::FixSuccessors => "fix-successors",
            Task::FixFingers => "fix-fingers",
            Task::FixPredecessor => "fix-predecessor",
            Task::Join => "join",
        }
    }
}

impl FromStr for Task {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Task::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| Error::InvalidArgument(format!("unknown task: {s}")))
    }
}

impl std::fmt::Display for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Random delay in `[base / 2, base * 3 / 2)`, so that peers started together drift apart.
pub fn jitter(base: Duration) -> Duration {
    base.mul_f64(rand::thread_rng().gen_range(0.5..1.5))
}

/// The stabilization runner.
#[derive(Clone)]
pub struct Stabilizer {
    swarm: Arc<Swarm>,
    dht: Arc<PeerRing>,
}

impl Stabilizer {
    /// Create a new stabilization runner.
    pub fn new(swarm: Arc<Swarm>) -> Self {
        let dht = swarm.dht();
        Self { swarm, dht }
    }

    /// Run one task once.
    pub async fn run(&self, task: Task) -> Result<()> {
        match task {
            Task::Stabilize => self.stabilize().await,
            Task::FixSuccessors => self.fix_successors().await,
            Task::FixFingers => self.fix_fingers().await,
            Task::FixPredecessor => self.fix_predecessor().await,
            Task::Join => self.join_well_known().await,
        }
    }

    fn successor_unreachable(&self, successor: &Endpoint, e: Error) -> Result<()> {
        tracing::warn!("successor {} unreachable: {}", successor, e);
        self.dht.fix_successor(successor)?;
        Err(Error::SuccessorUnreachable(successor.to_string()))
    }

    /// Ask the successor for its predecessor, adopt it when it sits between self and the
    /// successor, then notify the (possibly new) successor about self.
    /// An unreachable successor is dropped through [PeerRing::fix_successor].
    pub async fn stabilize(&self) -> Result<()> {
        let successor = self.dht.successor()?;
        let predecessor = match self.swarm.predecessor_of(&successor).await {
            Ok(p) => p,
            Err(e) => return self.successor_unreachable(&successor, e),
        };

        if let Some(p) = predecessor {
            if Interval::open(self.dht.did, successor.id).contains(p.id) {
                tracing::info!("STABILIZATION found closer successor: {}", p);
                self.dht.set_successor(p.address())?;
            }
        }

        let successor = self.dht.successor()?;
        if let Err(e) = self.swarm.notify_to(&successor).await {
            return self.successor_unreachable(&successor, e);
        }
        Ok(())
    }

    /// Copy the successor list of the successor, prefixed with the successor itself.
    pub async fn fix_successors(&self) -> Result<()> {
        let successor = self.dht.successor()?;
        match self.swarm.successors_of(&successor).await {
            Ok(list) => self.dht.set_successors(successor, list),
            Err(e) => self.successor_unreachable(&successor, e),
        }
    }

    /// Refresh one random finger slot in `[2, 160]`.
    pub async fn fix_fingers(&self) -> Result<()> {
        let index = rand::thread_rng().gen_range(2..=ID_BITS);
        self.fix_finger(index).await
    }

    /// Refresh finger slot `index` with the successor of `did + 2^(index-1)`.
    pub async fn fix_finger(&self, index: usize) -> Result<()> {
        if index == 0 || index > ID_BITS {
            return Err(Error::InvalidArgument(format!(
                "finger index out of range: {index}"
            )));
        }
        let target = self.dht.lock_finger()?.target(index);
        let successor = self.swarm.find_successor(target).await?;
        tracing::debug!("STABILIZATION fix_finger {}: {}", index, successor);
        self.dht.set_finger(index, successor)
    }

    /// Probe the predecessor and forget it when it does not answer.
    pub async fn fix_predecessor(&self) -> Result<()> {
        let Some(predecessor) = self.dht.predecessor()? else {
            return Ok(());
        };
        if let Err(e) = self.swarm.endpoint_of(&predecessor).await {
            tracing::warn!("predecessor {} unreachable: {}", predecessor, e);
            self.dht.set_predecessor(None)?;
        }
        Ok(())
    }

    /// Join through a random entry of the well-known peer registry.
    pub async fn join_well_known(&self) -> Result<()> {
        let peer = self
            .dht
            .well_known
            .sample()?
            .ok_or(Error::NoWellKnownPeer)?;
        self.swarm.join(&peer).await
    }
}

impl Stabilizer {
    /// Run `task` in a loop, sleeping a jittered `interval` before each tick.
    /// A failed tick is logged and the loop goes on.
    pub async fn wait(self: Arc<Self>, task: Task, interval: Duration) {
        loop {
            Delay::new(jitter(interval)).await;
            if let Err(e) = self.run(task).await {
                tracing::warn!("failed to run {}: {}", task, e);
            }
        }
    }
}
