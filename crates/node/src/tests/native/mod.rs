use std::net::TcpListener;
use std::sync::Arc;
use std::time::Duration;

use chordal_core::dht::Address;
use chordal_core::dht::Did;
use chordal_core::dht::Endpoint;
use chordal_core::dht::Status;
use chordal_core::dht::Task;
use chordal_core::swarm::RemoteGateway;
use chordal_rpc::Client;
use chordal_rpc::Method;
use chordal_rpc::Protocol;

use crate::config::Config;
use crate::endpoint::serve;
use crate::processor::Processor;
use crate::processor::ProcessorBuilder;

struct Peer {
    processor: Arc<Processor>,
    addr: Address,
    server: tokio::task::JoinHandle<()>,
}

impl Drop for Peer {
    fn drop(&mut self) {
        self.server.abort();
    }
}

/// Bind a loopback listener and serve a fresh peer advertised on it.
fn spawn_peer(metadata: serde_json::Value) -> Peer {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let mut config = Config::new("127.0.0.1", port);
    config.request_timeout = 2;
    config.metadata = metadata;

    let processor = Arc::new(ProcessorBuilder::from_config(&config).build().unwrap());
    let server = tokio::spawn({
        let processor = processor.clone();
        async move {
            let _ = serve(listener, processor).await;
        }
    });
    Peer {
        processor,
        addr: Address::new("127.0.0.1", port).unwrap(),
        server,
    }
}

fn client() -> Client {
    Client::new(Protocol::Http, Duration::from_secs(2)).unwrap()
}

async fn post_raw(addr: &Address, path: &str, body: &'static str) -> reqwest::StatusCode {
    reqwest::Client::new()
        .post(format!("http://{}:{}{}", addr.host, addr.port, path))
        .header("content-type", "application/json")
        .body(body)
        .send()
        .await
        .unwrap()
        .status()
}

#[tokio::test]
async fn test_verbs_over_http() {
    let peer = spawn_peer(serde_json::json!({ "role": "storage" }));
    let client = client();
    let me = Endpoint::from(peer.addr.clone());

    assert_eq!(client.endpoint(&peer.addr).await.unwrap(), me);
    assert_eq!(client.status(&peer.addr).await.unwrap(), Status::Lonely);
    assert_eq!(
        client.metadata(&peer.addr).await.unwrap(),
        serde_json::json!({ "role": "storage" })
    );
    assert_eq!(client.successor(&peer.addr).await.unwrap(), me);
    assert!(client.successors(&peer.addr).await.unwrap().is_empty());
    assert_eq!(client.predecessor(&peer.addr).await.unwrap(), Some(me.clone()));
    assert_eq!(
        client
            .find_successor(&peer.addr, Did::hash("any"))
            .await
            .unwrap(),
        me
    );
    assert_eq!(
        client
            .closest_preceding_finger(&peer.addr, Did::hash("any"))
            .await
            .unwrap(),
        me
    );
    for task in [
        Task::Stabilize,
        Task::FixFingers,
        Task::FixSuccessors,
        Task::FixPredecessor,
    ] {
        client.run_task(&peer.addr, task).await.unwrap();
    }

    assert_eq!(client.successors(&peer.addr).await.unwrap(), vec![me.clone()]);

    let inspect = client.inspect(&peer.addr).await.unwrap();
    assert_eq!(inspect.endpoint, me);
    assert_eq!(inspect.status, Status::Lonely);

    let found = client.lookup(&peer.addr, "some key").await.unwrap();
    assert_eq!(found.endpoint, me);
    assert_eq!(found.metadata, serde_json::json!({ "role": "storage" }));
}

#[tokio::test]
async fn test_predecessor_null_and_notify() {
    let peer = spawn_peer(serde_json::json!({}));
    let other = Address::new("127.0.0.1", 1).unwrap();
    peer.processor.swarm.dht().set_predecessor(None).unwrap();

    let client = client();
    assert_eq!(client.predecessor(&peer.addr).await.unwrap(), None);
    assert_eq!(
        client.status(&peer.addr).await.unwrap(),
        Status::Unbalanced
    );

    client.notify(&peer.addr, &other).await.unwrap();
    assert_eq!(
        client.predecessor(&peer.addr).await.unwrap(),
        Some(Endpoint::from(other))
    );
}

#[tokio::test]
async fn test_bad_requests() {
    let peer = spawn_peer(serde_json::json!({}));
    let addr = &peer.addr;

    assert_eq!(
        post_raw(addr, &Method::FindSuccessor.path(), "").await,
        reqwest::StatusCode::BAD_REQUEST
    );
    assert_eq!(
        post_raw(addr, &Method::FindSuccessor.path(), r#"{"id": "xyz"}"#).await,
        reqwest::StatusCode::BAD_REQUEST
    );
    assert_eq!(
        post_raw(addr, &Method::Notify.path(), r#"{"port": 3000}"#).await,
        reqwest::StatusCode::BAD_REQUEST
    );
    assert_eq!(
        post_raw(addr, &Method::Notify.path(), r#"{"host": "", "port": 3000}"#).await,
        reqwest::StatusCode::BAD_REQUEST
    );
    assert_eq!(
        post_raw(addr, &Method::Join.path(), r#"{"host": "localhost", "port": 0}"#).await,
        reqwest::StatusCode::BAD_REQUEST
    );
    assert_eq!(
        post_raw(addr, "/handle/job", "{}").await,
        reqwest::StatusCode::NOT_FOUND
    );

    // a non-success answer surfaces as a remote call error with its status
    let err = client()
        .call::<Endpoint>(addr, Method::FindSuccessor, serde_json::json!({}))
        .await
        .unwrap_err();
    assert_eq!(err.remote_call().unwrap().status, Some(400));
}

#[tokio::test]
async fn test_two_peers_join_over_http() {
    let node_a = spawn_peer(serde_json::json!({}));
    let node_b = spawn_peer(serde_json::json!({}));
    let client = client();

    client.join(&node_b.addr, &node_a.addr).await.unwrap();
    assert_eq!(
        node_b.processor.swarm.successor().unwrap(),
        Endpoint::from(node_a.addr.clone())
    );
    assert_eq!(
        node_b.processor.swarm.status().unwrap(),
        Status::Unbalanced
    );

    for _ in 0..2 {
        for node in [&node_b, &node_a] {
            node.processor.run_task(Task::Stabilize).await.unwrap();
        }
    }
    assert_eq!(node_a.processor.swarm.status().unwrap(), Status::Joined);
    assert_eq!(node_b.processor.swarm.status().unwrap(), Status::Joined);
    assert_eq!(
        node_a.processor.swarm.predecessor().unwrap(),
        Some(Endpoint::from(node_b.addr.clone()))
    );

    // each peer resolves the id of the other through its successor
    let a = Endpoint::from(node_a.addr.clone());
    let b = Endpoint::from(node_b.addr.clone());
    assert_eq!(client.find_successor(&node_a.addr, b.id).await.unwrap(), b);
    assert_eq!(client.find_successor(&node_b.addr, a.id).await.unwrap(), a);
}
