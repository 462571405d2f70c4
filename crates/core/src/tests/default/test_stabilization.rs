use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_timer::Delay;

use super::*;
use crate::dht::Interval;
use crate::dht::RingEvent;
use crate::dht::Task;
use crate::error::Error;

/// Ring order of the four test ports.
const RING: [u16; 4] = [2000, 3000, 6000, 4000];

fn expected_neighbours(port: u16) -> (Endpoint, Endpoint) {
    let i = RING.iter().position(|p| *p == port).unwrap();
    let n = RING.len();
    (ep(RING[(i + 1) % n]), ep(RING[(i + n - 1) % n]))
}

fn is_converged(network: &MemoryNetwork) -> bool {
    RING.iter().all(|port| {
        let swarm = network.swarms.get(&addr(*port)).unwrap().clone();
        let (succ, pred) = expected_neighbours(*port);
        swarm.successor().unwrap() == succ && swarm.predecessor().unwrap() == Some(pred)
    })
}

async fn tick_all(network: &MemoryNetwork, tasks: &[Task]) {
    for port in RING {
        let stb = network.stabilizer(port);
        for task in tasks {
            // failed ticks are expected while the ring is forming
            let _ = stb.run(*task).await;
        }
    }
}

#[tokio::test]
async fn test_two_peers_join_and_stabilize() -> Result<()> {
    let network = MemoryNetwork::new();
    let node2 = network.spawn(2000);
    let node3 = network.spawn(3000);
    let mut events = node2.dht().subscribe();

    node3.join(&addr(2000)).await?;
    network.stabilizer(3000).stabilize().await?;
    // 2000 learned about 3000 from notify
    assert_eq!(node2.predecessor()?, Some(ep(3000)));
    assert_eq!(node2.status()?, Status::Unbalanced);

    network.stabilizer(2000).stabilize().await?;
    assert_eq!(node2.successor()?, ep(3000));
    assert_eq!(node3.predecessor()?, Some(ep(2000)));
    assert_eq!(node2.status()?, Status::Joined);
    assert_eq!(node3.status()?, Status::Joined);

    let mut transitions = vec![];
    while let Ok(ev) = events.try_recv() {
        if let RingEvent::StatusChanged { from, to } = ev {
            transitions.push((from, to));
        }
    }
    assert_eq!(transitions, vec![
        (Status::Lonely, Status::Unbalanced),
        (Status::Unbalanced, Status::Joined)
    ]);
    Ok(())
}

#[tokio::test]
async fn test_ring_converges_after_joins() -> Result<()> {
    let network = MemoryNetwork::new();
    for port in RING {
        network.spawn(port);
    }
    for port in &RING[1..] {
        let swarm = network.swarms.get(&addr(*port)).unwrap().clone();
        swarm.join(&addr(2000)).await?;
    }

    for _ in 0..6 {
        tick_all(&network, &[Task::Stabilize, Task::FixPredecessor]).await;
    }
    assert!(is_converged(&network));

    for _ in 0..RING.len() {
        tick_all(&network, &[Task::FixSuccessors]).await;
    }
    for port in RING {
        let swarm = network.swarms.get(&addr(port)).unwrap().clone();
        let succs = swarm.successors()?;
        let (succ, _) = expected_neighbours(port);
        let (succ_succ, _) = expected_neighbours(succ.port);
        assert_eq!(succs[0], succ);
        assert_eq!(succs[1], succ_succ);
        assert_eq!(swarm.status()?, Status::Joined);
    }
    Ok(())
}

#[tokio::test]
async fn test_fix_fingers_matches_ring() -> Result<()> {
    let network = MemoryNetwork::new();
    for port in RING {
        network.spawn(port);
    }
    link_ring(&network, &RING);

    // slot 2 first, it always resolves locally and lets every later lookup progress
    for index in 2..=160 {
        for port in RING {
            network.stabilizer(port).fix_finger(index).await?;
        }
    }

    for port in RING {
        let swarm = network.swarms.get(&addr(port)).unwrap().clone();
        let dht = swarm.dht();
        let finger = dht.lock_finger()?.clone();
        for index in 2..=160 {
            let target = finger.target(index);
            let owner = RING
                .iter()
                .map(|p| (ep(*p), expected_neighbours(*p).1))
                .find(|(p, pred)| Interval::left_open(pred.id, p.id).contains(target))
                .map(|(p, _)| p)
                .unwrap();
            assert_eq!(finger.get(index), Some(&owner), "slot {index} of {port}");
        }
        assert!(finger.get(1).is_none());
    }

    assert!(matches!(
        network.stabilizer(2000).fix_finger(161).await,
        Err(Error::InvalidArgument(_))
    ));
    Ok(())
}

#[tokio::test]
async fn test_dead_successor_is_replaced() -> Result<()> {
    let network = MemoryNetwork::new();
    for port in RING {
        network.spawn(port);
    }
    link_ring(&network, &RING);
    for _ in 0..RING.len() {
        tick_all(&network, &[Task::FixSuccessors]).await;
    }

    network.kill(6000);
    let node3 = network.swarms.get(&addr(3000)).unwrap().clone();
    let node4 = network.swarms.get(&addr(4000)).unwrap().clone();

    let result = network.stabilizer(3000).stabilize().await;
    assert!(matches!(result, Err(Error::SuccessorUnreachable(_))));
    assert_eq!(node3.successor()?, ep(4000));

    network.stabilizer(4000).fix_predecessor().await?;
    assert_eq!(node4.predecessor()?, None);
    assert_eq!(node4.status()?, Status::Unbalanced);

    network.stabilizer(3000).stabilize().await?;
    assert_eq!(node4.predecessor()?, Some(ep(3000)));
    assert_eq!(node4.status()?, Status::Joined);
    Ok(())
}

#[tokio::test]
async fn test_fix_successors_failure_falls_back() -> Result<()> {
    let network = MemoryNetwork::new();
    let node3 = network.spawn(3000);
    network.spawn(4000);
    link_ring(&network, &[3000, 4000]);
    network.kill(4000);

    let result = network.stabilizer(3000).fix_successors().await;
    assert!(matches!(result, Err(Error::SuccessorUnreachable(_))));
    // empty successor list collapses to self
    assert_eq!(node3.successor()?, ep(3000));
    assert_eq!(node3.status()?, Status::Unbalanced);
    Ok(())
}

#[tokio::test]
async fn test_fix_predecessor_keeps_live_peer() -> Result<()> {
    let network = MemoryNetwork::new();
    let node3 = network.spawn(3000);
    network.spawn(2000);
    link_ring(&network, &[2000, 3000]);

    network.stabilizer(3000).fix_predecessor().await?;
    assert_eq!(node3.predecessor()?, Some(ep(2000)));
    assert_eq!(network.calls("self"), 1);

    node3.dht().set_predecessor(None)?;
    network.reset_calls();
    network.stabilizer(3000).fix_predecessor().await?;
    assert_eq!(network.total_calls(), 0);
    Ok(())
}

#[tokio::test]
async fn test_lonely_peer_maintenance_is_local() -> Result<()> {
    let network = MemoryNetwork::new();
    let node3 = network.spawn(3000);
    let stb = network.stabilizer(3000);
    for task in Task::ALL {
        stb.run(task).await?;
    }
    assert_eq!(node3.status()?, Status::Lonely);
    assert_eq!(node3.successors()?, vec![ep(3000)]);
    assert_eq!(network.total_calls(), 0);
    Ok(())
}

#[tokio::test]
async fn test_join_without_well_known_peer() -> Result<()> {
    let network = MemoryNetwork::new();
    network.spawn(3000);
    // the registry always holds the peer itself, so joining picks self and does nothing
    network.stabilizer(3000).join_well_known().await?;
    assert_eq!(network.total_calls(), 0);
    Ok(())
}

#[tokio::test]
async fn test_timers_converge_ring() -> Result<()> {
    let network = MemoryNetwork::new();
    network.spawn(2000);
    for port in &RING[1..] {
        network.spawn_with(
            SwarmBuilder::new(ep(*port), network.clone()).well_known_peers(vec![addr(2000)]),
        );
    }

    let mut handles = vec![];
    for port in RING {
        let stb = Arc::new(network.stabilizer(port));
        for task in Task::ALL {
            handles.push(tokio::spawn(
                stb.clone().wait(task, Duration::from_millis(10)),
            ));
        }
    }

    let converged = tokio::time::timeout(Duration::from_secs(20), async {
        while !is_converged(&network) {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await;
    for h in handles {
        h.abort();
    }
    assert!(converged.is_ok(), "ring did not converge");
    Ok(())
}

/// A gateway where every peer answers late with a failure.
struct SlowDeadNetwork;

impl SlowDeadNetwork {
    async fn refuse<T>(target: &Address, method: &'static str) -> Result<T> {
        Delay::new(Duration::from_millis(50)).await;
        Err(RemoteCallError {
            url: format!("memory://{}/{}", target, method),
            method: method.to_string(),
            args: serde_json::json!({}),
            status: None,
            reason: "timed out".to_string(),
        }
        .into())
    }
}

#[async_trait]
impl RemoteGateway for SlowDeadNetwork {
    async fn endpoint(&self, target: &Address) -> Result<Endpoint> {
        Self::refuse(target, "self").await
    }

    async fn status(&self, target: &Address) -> Result<Status> {
        Self::refuse(target, "status").await
    }

    async fn metadata(&self, target: &Address) -> Result<serde_json::Value> {
        Self::refuse(target, "metadata").await
    }

    async fn successor(&self, target: &Address) -> Result<Endpoint> {
        Self::refuse(target, "successor").await
    }

    async fn successors(&self, target: &Address) -> Result<Vec<Endpoint>> {
        Self::refuse(target, "successors").await
    }

    async fn predecessor(&self, target: &Address) -> Result<Option<Endpoint>> {
        Self::refuse(target, "predecessor").await
    }

    async fn find_successor(&self, target: &Address, _id: Did) -> Result<Endpoint> {
        Self::refuse(target, "find-successor").await
    }

    async fn find_predecessor(&self, target: &Address, _id: Did) -> Result<Endpoint> {
        Self::refuse(target, "find-predecessor").await
    }

    async fn closest_preceding_finger(&self, target: &Address, _id: Did) -> Result<Endpoint> {
        Self::refuse(target, "closest-preceding-finger").await
    }

    async fn notify(&self, target: &Address, _candidate: &Address) -> Result<()> {
        Self::refuse(target, "notify").await
    }
}

#[tokio::test]
async fn test_concurrent_ticks_drop_dead_successor_once() -> Result<()> {
    let swarm = Arc::new(SwarmBuilder::new(ep(3000), Arc::new(SlowDeadNetwork)).build()?);
    let dht = swarm.dht();
    dht.set_successor(addr(6000))?;
    dht.set_successors(ep(6000), vec![ep(4000), ep(2000)])?;

    let stb = Stabilizer::new(swarm.clone());
    let (stabilized, fixed) = tokio::join!(stb.stabilize(), stb.fix_successors());
    assert!(matches!(stabilized, Err(Error::SuccessorUnreachable(_))));
    assert!(matches!(fixed, Err(Error::SuccessorUnreachable(_))));

    // both ticks saw 6000 fail, only 6000 is dropped
    assert_eq!(swarm.successor()?, ep(4000));
    assert_eq!(swarm.successors()?, vec![ep(4000), ep(2000)]);
    Ok(())
}
