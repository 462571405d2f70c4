//! chordal-node service binding every protocol verb to `POST /<verb>`.
#![warn(missing_docs)]
mod http_error;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::post;
use axum::Json;
use axum::Router;
use chordal_core::dht::Address;
use chordal_core::dht::Task;
use chordal_core::error::Error as CoreError;
use chordal_rpc::types::IdRequest;
use chordal_rpc::types::StatusResponse;
use chordal_rpc::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tower_http::cors::CorsLayer;

pub use self::http_error::HttpError;
use crate::processor::Processor;

/// Router serving all verbs of `processor`.
pub fn router(processor: Arc<Processor>) -> Router {
    let mut router: Router<Arc<Processor>> = Router::new();
    for method in Method::ALL {
        router = router.route(
            &method.path(),
            post(
                move |State(processor): State<Arc<Processor>>, body: Bytes| async move {
                    handle(&processor, method, body).await
                },
            ),
        );
    }
    router
        .layer(CorsLayer::permissive())
        .layer(axum::middleware::from_fn(node_info_header))
        .with_state(processor)
}

/// Run a web server serving the protocol verbs on `binding_addr`.
pub async fn run_http_api(binding_addr: SocketAddr, processor: Arc<Processor>) -> anyhow::Result<()> {
    let endpoint = processor.endpoint();
    tracing::info!("chordal peer {} listening on http://{}", endpoint, binding_addr);
    axum::Server::bind(&binding_addr)
        .serve(router(processor).into_make_service())
        .await?;
    Ok(())
}

/// Same as [run_http_api] on an already bound listener.
pub async fn serve(listener: std::net::TcpListener, processor: Arc<Processor>) -> anyhow::Result<()> {
    axum::Server::from_tcp(listener)?
        .serve(router(processor).into_make_service())
        .await?;
    Ok(())
}

async fn node_info_header<B>(
    req: http::Request<B>,
    next: axum::middleware::Next<B>,
) -> axum::response::Response {
    let mut res = next.run(req).await;
    let headers = res.headers_mut();

    if let Ok(version) = http::HeaderValue::from_str(crate::util::build_version().as_str()) {
        headers.insert("X-NODE-VERSION", version);
    }
    res
}

fn parse<T>(body: &[u8], field: &'static str) -> Result<T, HttpError>
where T: DeserializeOwned {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(CoreError::MissingField(field).into());
    }
    Ok(serde_json::from_slice(body)?)
}

fn parse_address(body: &[u8]) -> Result<Address, HttpError> {
    let addr: Address = parse(body, "host")?;
    Ok(Address::new(addr.host, addr.port)?)
}

fn json<T: Serialize>(value: T) -> Result<Response, HttpError> {
    Ok(Json(value).into_response())
}

fn empty() -> Result<Response, HttpError> {
    Ok(StatusCode::OK.into_response())
}

async fn task(processor: &Processor, task: Task) -> Result<Response, HttpError> {
    processor.run_task(task).await?;
    empty()
}

async fn handle(processor: &Processor, method: Method, body: Bytes) -> Result<Response, HttpError> {
    tracing::debug!("handle {} with {} bytes", method, body.len());
    let resp = dispatch(processor, method, &body).await;
    if let Err(e) = &resp {
        tracing::warn!("{} failed: {:?}", method, e);
    }
    resp
}

async fn dispatch(processor: &Processor, method: Method, body: &[u8]) -> Result<Response, HttpError> {
    let swarm = &processor.swarm;
    match method {
        Method::SelfEndpoint => json(swarm.endpoint()),
        Method::Status => json(StatusResponse {
            status: swarm.status()?,
        }),
        Method::Metadata => json(swarm.metadata()),
        Method::Successor => json(swarm.successor()?),
        Method::Successors => json(swarm.successors()?),
        Method::Predecessor => json(swarm.predecessor()?),
        Method::FindSuccessor => {
            let req: IdRequest = parse(body, "id")?;
            json(swarm.find_successor(req.id).await?)
        }
        Method::FindPredecessor => {
            let req: IdRequest = parse(body, "id")?;
            json(swarm.find_predecessor(req.id).await?)
        }
        Method::ClosestPrecedingFinger => {
            let req: IdRequest = parse(body, "id")?;
            json(swarm.closest_preceding_finger(req.id)?)
        }
        Method::Notify => {
            swarm.notify(parse_address(body)?)?;
            empty()
        }
        Method::Join => {
            processor.join(&parse_address(body)?).await?;
            empty()
        }
        Method::Stabilize => task(processor, Task::Stabilize).await,
        Method::FixFingers => task(processor, Task::FixFingers).await,
        Method::FixSuccessors => task(processor, Task::FixSuccessors).await,
        Method::FixPredecessor => task(processor, Task::FixPredecessor).await,
        Method::Inspect => json(swarm.inspect()?),
        _ => Err(HttpError::BadRequest(format!("unsupported method: {method}"))),
    }
}
