use std::str::FromStr;

use super::*;
use crate::error::Error;

fn did(s: &str) -> Did {
    Did::from_str(s).unwrap()
}

#[tokio::test]
async fn test_find_successor_fast_path_is_local() -> Result<()> {
    let network = MemoryNetwork::new();
    let node3 = network.spawn(3000);
    network.spawn(4000);
    node3.dht().set_successor(addr(4000))?;

    // 6184.. is in (12a3.., dc4f..]
    assert_eq!(node3.find_successor(ep(6000).id).await?, ep(4000));
    // right end is included
    assert_eq!(node3.find_successor(ep(4000).id).await?, ep(4000));
    assert_eq!(network.total_calls(), 0);
    Ok(())
}

#[tokio::test]
async fn test_lonely_peer_owns_everything() -> Result<()> {
    let network = MemoryNetwork::new();
    let node3 = network.spawn(3000);
    for id in [ep(2000).id, ep(3000).id, ep(4000).id] {
        assert_eq!(node3.find_successor(id).await?, ep(3000));
    }
    assert_eq!(network.total_calls(), 0);
    Ok(())
}

#[tokio::test]
async fn test_find_successor_over_fingers() -> Result<()> {
    let network = MemoryNetwork::new();
    let node3 = network.spawn(3000);
    network.spawn(2000);
    network.spawn(4000);
    link_ring(&network, &[2000, 3000, 4000]);
    node3.dht().set_finger(23, ep(4000))?;
    node3.dht().set_finger(42, ep(2000))?;

    let target = did("e6949f387bbcfdfcbad854b601607f28611c6541");
    assert_eq!(node3.closest_preceding_finger(target)?, ep(4000));
    assert_eq!(node3.find_predecessor(target).await?, ep(4000));
    assert_eq!(node3.find_successor(target).await?, ep(2000));
    assert!(network.calls("successor") > 0);
    assert_eq!(network.calls("closest-preceding-finger"), 0);

    // discovered peers grow the bootstrap set
    assert!(node3.dht().well_known.get()?.contains(&addr(2000)));
    Ok(())
}

#[tokio::test]
async fn test_find_successor_of_own_id_fails() -> Result<()> {
    let network = MemoryNetwork::new();
    let node3 = network.spawn(3000);
    network.spawn(2000);
    network.spawn(4000);
    link_ring(&network, &[2000, 3000, 4000]);

    // 12a3.. is not in its own (12a3.., dc4f..] arc and no finger leads around the ring
    let result = node3.find_successor(ep(3000).id).await;
    assert!(matches!(result, Err(Error::LookupStalled(..))));
    Ok(())
}

#[tokio::test]
async fn test_find_predecessor_walks_remote_fingers() -> Result<()> {
    let network = MemoryNetwork::new();
    let node2 = network.spawn(2000);
    let node3 = network.spawn(3000);
    let node6 = network.spawn(6000);
    let node4 = network.spawn(4000);
    link_ring(&network, &[2000, 3000, 6000, 4000]);
    // fingers only point to the direct successor
    for (swarm, next) in [
        (&node2, 3000),
        (&node3, 6000),
        (&node6, 4000),
        (&node4, 2000),
    ] {
        swarm.dht().set_finger(2, ep(next))?;
    }

    // from 2000 the owner of 07f2.. is 2000 itself, three hops away
    assert_eq!(node2.find_predecessor(ep(2000).id).await?, ep(4000));
    assert_eq!(node2.find_successor(ep(2000).id).await?, ep(2000));
    assert!(network.calls("closest-preceding-finger") >= 2);
    Ok(())
}

#[tokio::test]
async fn test_find_predecessor_hop_ceiling() -> Result<()> {
    let network = MemoryNetwork::new();
    let node2 = network.spawn_with(SwarmBuilder::new(ep(2000), network.clone()).max_lookup_hops(2));
    let node3 = network.spawn(3000);
    let node6 = network.spawn(6000);
    let node4 = network.spawn(4000);
    link_ring(&network, &[2000, 3000, 6000, 4000]);
    for (swarm, next) in [
        (&node2, 3000),
        (&node3, 6000),
        (&node6, 4000),
        (&node4, 2000),
    ] {
        swarm.dht().set_finger(2, ep(next))?;
    }

    let result = node2.find_predecessor(ep(2000).id).await;
    assert!(matches!(result, Err(Error::LookupHopsExceeded(_, 2))));
    Ok(())
}

#[tokio::test]
async fn test_remote_failure_propagates() -> Result<()> {
    let network = MemoryNetwork::new();
    let node3 = network.spawn(3000);
    network.spawn(2000);
    network.spawn(4000);
    link_ring(&network, &[2000, 3000, 4000]);
    node3.dht().set_finger(23, ep(4000))?;
    network.kill(4000);

    let target = did("e6949f387bbcfdfcbad854b601607f28611c6541");
    let err = node3.find_successor(target).await.unwrap_err();
    let ctx = err.remote_call().unwrap();
    assert_eq!(ctx.method, "successor");
    assert_eq!(ctx.url, "memory://localhost:4000/successor");
    assert!(!err.is_argument_error());
    Ok(())
}

#[tokio::test]
async fn test_lookup_value() -> Result<()> {
    let network = MemoryNetwork::new();
    let node3 = network.spawn_with(
        SwarmBuilder::new(ep(3000), network.clone())
            .metadata(serde_json::json!({ "role": "storage" })),
    );

    let found = node3.lookup("some key").await?;
    assert_eq!(found.endpoint, ep(3000));
    assert_eq!(found.metadata, serde_json::json!({ "role": "storage" }));

    assert!(matches!(
        node3.lookup("").await,
        Err(Error::MissingField("value"))
    ));
    Ok(())
}

#[tokio::test]
async fn test_lookup_value_on_remote_peer() -> Result<()> {
    let network = MemoryNetwork::new();
    let node3 = network.spawn(3000);
    network.spawn_with(
        SwarmBuilder::new(ep(4000), network.clone()).metadata(serde_json::json!({ "n": 4 })),
    );
    link_ring(&network, &[3000, 4000]);

    // the value "localhost:4000" hashes to the id of 4000
    let found = node3.lookup("localhost:4000").await?;
    assert_eq!(found.endpoint, ep(4000));
    assert_eq!(found.metadata, serde_json::json!({ "n": 4 }));
    assert_eq!(network.calls("metadata"), 1);
    Ok(())
}

#[tokio::test]
async fn test_join() -> Result<()> {
    let network = MemoryNetwork::new();
    let node2 = network.spawn(2000);
    let node3 = network.spawn(3000);

    // joining self does nothing
    node3.join(&addr(3000)).await?;
    assert_eq!(network.total_calls(), 0);
    assert_eq!(node3.status()?, Status::Lonely);

    node3.join(&addr(2000)).await?;
    assert_eq!(node3.successor()?, ep(2000));
    assert_eq!(node3.predecessor()?, None);
    assert_eq!(node3.status()?, Status::Unbalanced);
    assert_eq!(network.calls("find-successor"), 1);

    // only lonely peers join
    network.reset_calls();
    node3.join(&addr(4000)).await?;
    assert_eq!(network.total_calls(), 0);
    assert_eq!(node3.successor()?, ep(2000));

    // node 2000 is untouched until stabilization
    assert_eq!(node2.status()?, Status::Lonely);
    Ok(())
}

#[tokio::test]
async fn test_join_unreachable_peer() -> Result<()> {
    let network = MemoryNetwork::new();
    let node3 = network.spawn(3000);

    assert!(node3.join(&addr(9000)).await.is_err());
    assert_eq!(node3.status()?, Status::Lonely);
    Ok(())
}
