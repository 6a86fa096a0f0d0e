//! End-to-end tests over loopback HTTP.

use bytes::Bytes;
use fnhost::context::{ContextBuilder, SecretStore};
use fnhost::function::hello::HelloFunction;
use fnhost::graphql::{HyperTransport, Transport};
use fnhost::prelude::*;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use std::collections::HashMap;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

fn contexts(env: &[(&str, &str)], secrets: &tempfile::TempDir) -> ContextBuilder {
    let env: HashMap<String, String> = env
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    ContextBuilder::new(
        Arc::new(env),
        SecretStore::new(secrets.path().join("primary"), secrets.path().join("legacy")),
        Arc::new(HyperTransport::new()),
    )
}

/// Start a server on an ephemeral loopback port.
async fn spawn_server(
    function: impl HostedFunction + 'static,
    contexts: ContextBuilder,
    config: ServerConfig,
) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = Server::with_contexts(config, Arc::new(function), contexts);
    tokio::spawn(async move {
        let _ = server.serve(listener).await;
    });
    addr
}

async fn send(request: Request<Full<Bytes>>) -> Response<Bytes> {
    HyperTransport::new().send(request).await.unwrap()
}

#[tokio::test]
async fn hello_over_http() {
    let dir = tempfile::tempdir().unwrap();
    let addr = spawn_server(HelloFunction, contexts(&[], &dir), ServerConfig::new()).await;

    let response = send(
        Request::post(format!("http://{}/", addr))
            .body(Full::new(Bytes::from("ping")))
            .unwrap(),
    )
    .await;

    assert_eq!(response.status(), 200);
    assert_eq!(response.body(), "Hello world, input was: ping");
}

#[hosted_function]
async fn describe(req: FnRequest, _ctx: &FnContext) -> Result<FnResponse, FnError> {
    let response = FnResponse::new()
        .status(StatusCode::CREATED)
        .header("X-Method", req.method().as_str())
        .header("X-Query", req.raw_query())
        .body(req.get_header("x-client").unwrap_or("anonymous").to_string());
    Ok(response)
}

#[tokio::test]
async fn every_path_and_method_reaches_the_function() {
    let dir = tempfile::tempdir().unwrap();
    let addr = spawn_server(DescribeFunction, contexts(&[], &dir), ServerConfig::new()).await;

    for (method, path) in [("GET", "/"), ("DELETE", "/a/b/c?x=1&y=2"), ("PATCH", "/_health")] {
        let response = send(
            Request::builder()
                .method(method)
                .uri(format!("http://{}{}", addr, path))
                .header("X-Client", "curl")
                .body(Full::new(Bytes::new()))
                .unwrap(),
        )
        .await;

        assert_eq!(response.status(), 201);
        assert_eq!(response.headers().get("x-method").unwrap(), method);
        let query = path.split_once('?').map(|(_, q)| q).unwrap_or("");
        assert_eq!(response.headers().get("x-query").unwrap(), query);
        assert_eq!(response.body(), "curl");
    }
}

#[hosted_function]
async fn failing(_req: FnRequest, _ctx: &FnContext) -> Result<FnResponse, FnError> {
    Err(FnError::new("upstream exploded").with_response(
        FnResponse::new()
            .header("Retry-After", "5")
            .body("please retry"),
    ))
}

#[tokio::test]
async fn failing_function_answers_500_with_its_body() {
    let dir = tempfile::tempdir().unwrap();
    let addr = spawn_server(FailingFunction, contexts(&[], &dir), ServerConfig::new()).await;

    let response = send(
        Request::get(format!("http://{}/", addr))
            .body(Full::new(Bytes::new()))
            .unwrap(),
    )
    .await;

    assert_eq!(response.status(), 500);
    assert_eq!(response.headers().get("retry-after").unwrap(), "5");
    assert_eq!(response.body(), "please retry");
}

#[hosted_function]
async fn whoami(_req: FnRequest, ctx: &FnContext) -> Result<FnResponse, FnError> {
    let Some(client) = ctx.graphql() else {
        return Ok(FnResponse::new().status(StatusCode(503)).body("no graphql host"));
    };

    let data: serde_json::Value = client.run(&GraphqlRequest::new("{ whoami }")).await?;
    Ok(FnResponse::json(&data)?)
}

/// GraphQL backend answering with the access key it received.
async fn spawn_graphql_backend() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            let (stream, _) = listener.accept().await.unwrap();
            tokio::spawn(async move {
                let service = service_fn(|req: Request<Incoming>| async move {
                    let key = req
                        .headers()
                        .get("x-hasura-access-key")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("<none>")
                        .to_string();
                    let body = serde_json::json!({ "data": { "key": key } }).to_string();
                    Ok::<_, Infallible>(Response::new(Full::new(Bytes::from(body))))
                });
                let _ = http1::Builder::new()
                    .serve_connection(TokioIo::new(stream), service)
                    .await;
            });
        }
    });

    addr
}

#[tokio::test]
async fn graphql_calls_carry_the_access_key() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("legacy")).unwrap();
    std::fs::write(dir.path().join("legacy").join("hasura-key"), "admin-secret").unwrap();

    let backend = spawn_graphql_backend().await;
    let host = format!("http://{}/v1/graphql", backend);
    let contexts = contexts(
        &[
            ("HASURA_ACCESS_KEY_SECRET", "hasura-key"),
            ("GRAPHQL_HOST", host.as_str()),
        ],
        &dir,
    );
    let addr = spawn_server(WhoamiFunction, contexts, ServerConfig::new()).await;

    let response = send(
        Request::get(format!("http://{}/", addr))
            .body(Full::new(Bytes::new()))
            .unwrap(),
    )
    .await;

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
    assert_eq!(body, serde_json::json!({ "key": "admin-secret" }));
}

#[tokio::test]
async fn graphql_client_absent_without_host() {
    let dir = tempfile::tempdir().unwrap();
    let addr = spawn_server(WhoamiFunction, contexts(&[], &dir), ServerConfig::new()).await;

    let response = send(
        Request::get(format!("http://{}/", addr))
            .body(Full::new(Bytes::new()))
            .unwrap(),
    )
    .await;

    assert_eq!(response.status(), 503);
    assert_eq!(response.body(), "no graphql host");
}

#[hosted_function]
async fn sluggish(_req: FnRequest, _ctx: &FnContext) -> Result<FnResponse, FnError> {
    tokio::time::sleep(Duration::from_secs(5)).await;
    Ok(FnResponse::text("too late"))
}

#[tokio::test]
async fn write_timeout_drops_the_connection() {
    let dir = tempfile::tempdir().unwrap();
    let config = ServerConfig::new().write_timeout(Duration::from_millis(100));
    let addr = spawn_server(SluggishFunction, contexts(&[], &dir), config).await;

    let result = HyperTransport::new()
        .send(
            Request::get(format!("http://{}/", addr))
                .body(Full::new(Bytes::new()))
                .unwrap(),
        )
        .await;

    assert!(result.is_err());
}

#[hosted_function]
async fn napping(_req: FnRequest, _ctx: &FnContext) -> Result<FnResponse, FnError> {
    tokio::time::sleep(Duration::from_millis(50)).await;
    Ok(FnResponse::text("rested"))
}

#[tokio::test]
async fn zero_timeouts_disable_the_limits() {
    let dir = tempfile::tempdir().unwrap();
    let env = HashMap::from([
        ("read_timeout".to_string(), "0".to_string()),
        ("write_timeout".to_string(), "0".to_string()),
    ]);
    let config = ServerConfig::from_env(&env);
    assert_eq!(config.write_timeout, Duration::ZERO);
    let addr = spawn_server(NappingFunction, contexts(&[], &dir), config).await;

    let response = send(
        Request::post(format!("http://{}/", addr))
            .body(Full::new(Bytes::from("zzz")))
            .unwrap(),
    )
    .await;

    assert_eq!(response.status(), 200);
    assert_eq!(response.body(), "rested");
}

#[tokio::test]
async fn response_header_names_keep_their_case_on_the_wire() {
    let dir = tempfile::tempdir().unwrap();
    let addr = spawn_server(FailingFunction, contexts(&[], &dir), ServerConfig::new()).await;

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(b"GET / HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
        .await
        .unwrap();
    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).await.unwrap();
    let raw = String::from_utf8_lossy(&raw);

    assert!(raw.starts_with("HTTP/1.1 500"), "{}", raw);
    assert!(raw.contains("\r\nRetry-After: 5\r\n"), "{}", raw);
    assert!(raw.ends_with("please retry"), "{}", raw);
}
