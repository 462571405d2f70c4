#![warn(missing_docs)]
//! Processor of a chordal peer: owns the [Swarm], serves the verbs and runs the
//! periodic maintenance tasks.

use std::sync::Arc;
use std::time::Duration;

use chordal_core::dht::Address;
use chordal_core::dht::Did;
use chordal_core::dht::Endpoint;
use chordal_core::dht::RingEvent;
use chordal_core::dht::Stabilizer;
use chordal_core::dht::Task;
use chordal_core::swarm::Swarm;
use chordal_core::swarm::SwarmBuilder;
use chordal_rpc::Client;
use tokio::sync::broadcast::error::RecvError;

use crate::config::Config;
use crate::error::Result;

/// ProcessorBuilder is used to initialize a [Processor] instance.
pub struct ProcessorBuilder {
    config: Config,
}

/// Processor for chordal-node http server
#[derive(Clone)]
pub struct Processor {
    /// a swarm instance
    pub swarm: Arc<Swarm>,
    stabilizer: Arc<Stabilizer>,
    service_interval: Duration,
}

impl ProcessorBuilder {
    /// initialize a [ProcessorBuilder] with a serialized [Config].
    pub fn from_serialized(config: &str) -> Result<Self> {
        let config = serde_yaml::from_str::<Config>(config)?;
        Ok(Self::from_config(&config))
    }

    /// initialize a [ProcessorBuilder] with a [Config].
    pub fn from_config(config: &Config) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Build the [Processor] with an http [Client] as gateway.
    pub fn build(self) -> Result<Processor> {
        self.config.validate()?;
        let client = Client::new(self.config.protocol, self.config.request_timeout())?;
        let swarm = SwarmBuilder::new(self.config.endpoint()?, Arc::new(client))
            .well_known_peers(self.config.well_known_peers.clone())
            .metadata(self.config.metadata.clone())
            .max_lookup_hops(self.config.max_lookup_hops)
            .build()?;
        Ok(Processor::new(Arc::new(swarm), self.config.service_interval()))
    }
}

impl Processor {
    /// Wrap an existing swarm.
    pub fn new(swarm: Arc<Swarm>, service_interval: Duration) -> Self {
        let stabilizer = Arc::new(Stabilizer::new(swarm.clone()));
        Self {
            swarm,
            stabilizer,
            service_interval,
        }
    }

    /// Get current did
    pub fn did(&self) -> Did {
        self.swarm.did()
    }

    /// Endpoint advertised by this peer.
    pub fn endpoint(&self) -> Endpoint {
        self.swarm.endpoint()
    }

    /// Run one maintenance task now.
    pub async fn run_task(&self, task: Task) -> Result<()> {
        Ok(self.stabilizer.run(task).await?)
    }

    /// Join the ring through `peer`.
    pub async fn join(&self, peer: &Address) -> Result<()> {
        Ok(self.swarm.join(peer).await?)
    }

    /// Run every periodic task and log ring events until the process stops.
    pub async fn listen(&self) {
        let tasks = Task::ALL.map(|task| {
            tokio::spawn(
                self.stabilizer
                    .clone()
                    .wait(task, self.service_interval),
            )
        });
        let events = tokio::spawn(log_events(self.swarm.clone()));

        for handle in tasks {
            if let Err(e) = handle.await {
                tracing::error!("periodic task stopped: {}", e);
            }
        }
        events.abort();
    }
}

async fn log_events(swarm: Arc<Swarm>) {
    let mut events = swarm.dht().subscribe();
    loop {
        match events.recv().await {
            Ok(RingEvent::StatusChanged { from, to }) => {
                tracing::info!("status of {} changed: {} -> {}", swarm.endpoint(), from, to)
            }
            Ok(RingEvent::SuccessorChanged(successor)) => {
                tracing::debug!("successor of {}: {}", swarm.endpoint(), successor)
            }
            Ok(RingEvent::PredecessorChanged(Some(predecessor))) => {
                tracing::debug!("predecessor of {}: {}", swarm.endpoint(), predecessor)
            }
            Ok(RingEvent::PredecessorChanged(None)) => {
                tracing::info!("predecessor of {} is unknown", swarm.endpoint())
            }
            Err(RecvError::Lagged(n)) => tracing::warn!("{} ring events dropped", n),
            Err(RecvError::Closed) => break,
        }
    }
}
