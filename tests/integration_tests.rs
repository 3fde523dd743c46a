//! Integration tests for rustrid.
//!
//! These tests run the HTTP server on an ephemeral port and talk to it over
//! plain TCP, and drive the middleware through hyper services directly.

use bytes::Bytes;
use http_body_util::Full;
use hyper::service::{service_fn, Service};
use hyper::{Request, Response};
use rustrid::config::parse_config;
use rustrid::middleware::{GeneratorStrategy, RequestIdConfig, RequestIdLayer};
use rustrid::request_id::X_REQUEST_ID;
use rustrid::server::HttpServer;
use rustrid::util::ShutdownSignal;
use std::collections::HashSet;
use std::convert::Infallible;
use std::net::SocketAddr;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

/// Start a server with the given layer and return its address.
async fn start_server(layer: RequestIdLayer) -> (SocketAddr, ShutdownSignal) {
    let server = HttpServer::bind("127.0.0.1:0".parse().unwrap(), layer)
        .await
        .expect("failed to bind");
    let addr = server.local_addr().unwrap();
    let shutdown = ShutdownSignal::new();
    tokio::spawn(server.run(shutdown.subscribe()));
    (addr, shutdown)
}

/// Send a raw HTTP/1.1 request and return the response, lowercased.
async fn send(addr: SocketAddr, path: &str, extra_headers: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.expect("failed to connect");
    let request = format!(
        "GET {} HTTP/1.1\r\nHost: localhost\r\n{}Connection: close\r\n\r\n",
        path, extra_headers
    );
    stream.write_all(request.as_bytes()).await.expect("failed to write");

    let mut response = String::new();
    stream.read_to_string(&mut response).await.expect("failed to read");
    response.to_lowercase()
}

/// Extract a header value from a raw, lowercased response.
fn header<'a>(response: &'a str, name: &str) -> Option<&'a str> {
    let prefix = format!("{}: ", name);
    response
        .lines()
        .find_map(|line| line.strip_prefix(prefix.as_str()))
        .map(str::trim)
}

#[tokio::test]
async fn test_server_echoes_client_request_id() {
    let (addr, shutdown) = start_server(rustrid::request_id_layer()).await;

    let response = send(addr, "/orders", "X-Request-ID: abc123\r\n").await;

    assert!(response.starts_with("http/1.1 200"));
    assert_eq!(header(&response, "x-request-id"), Some("abc123"));
    assert!(response.contains("request-id: abc123"));
    shutdown.shutdown();
}

#[tokio::test]
async fn test_server_generates_request_id() {
    let layer = RequestIdConfig::new()
        .generator(|| "RID-1".to_string())
        .build()
        .unwrap();
    let (addr, shutdown) = start_server(layer).await;

    let response = send(addr, "/orders", "").await;

    assert_eq!(header(&response, "x-request-id"), Some("rid-1"));
    shutdown.shutdown();
}

#[tokio::test]
async fn test_server_default_ids_differ() {
    let (addr, shutdown) = start_server(rustrid::request_id_layer()).await;

    let first = send(addr, "/", "").await;
    let second = send(addr, "/", "").await;

    let a = header(&first, "x-request-id").unwrap().to_string();
    let b = header(&second, "x-request-id").unwrap().to_string();
    assert_eq!(a.len(), 32);
    assert_ne!(a, b);
    shutdown.shutdown();
}

#[tokio::test]
async fn test_server_skips_configured_paths() {
    let config = parse_config(
        r#"
request_id:
  skip_paths: ["/healthz"]
"#,
    )
    .unwrap();
    let layer = config.request_id.build_layer().unwrap();
    let (addr, shutdown) = start_server(layer).await;

    let health = send(addr, "/healthz", "X-Request-ID: abc123\r\n").await;
    assert!(health.starts_with("http/1.1 200"));
    assert!(header(&health, "x-request-id").is_none());

    let other = send(addr, "/orders", "").await;
    assert!(header(&other, "x-request-id").is_some());
    shutdown.shutdown();
}

#[tokio::test]
async fn test_server_context_aware_from_config() {
    let config = parse_config(
        r#"
request_id:
  header: X-Correlation-ID
  strategy: context_aware
  source_header: lambda-runtime-aws-request-id
"#,
    )
    .unwrap();
    let layer = config.request_id.build_layer().unwrap();
    let (addr, shutdown) = start_server(layer).await;

    let response = send(
        addr,
        "/invoke",
        "Lambda-Runtime-Aws-Request-Id: 8476a536-e9f4-11e8\r\n",
    )
    .await;

    assert_eq!(header(&response, "x-correlation-id"), Some("8476a536-e9f4-11e8"));
    assert!(header(&response, "x-request-id").is_none());
    shutdown.shutdown();
}

#[test]
fn test_construction_fails_before_serving() {
    let result = RequestIdConfig::new()
        .strategy(GeneratorStrategy::ContextAware)
        .build();
    assert!(result.is_err());
}

#[tokio::test]
async fn test_concurrent_requests_get_distinct_ids() {
    let svc = rustrid::request_id_layer().layer(service_fn(|_req: Request<Full<Bytes>>| async {
        Ok::<_, Infallible>(Response::new(Full::new(Bytes::new())))
    }));

    let calls = (0..200).map(|_| {
        let req = Request::builder().body(Full::new(Bytes::new())).unwrap();
        svc.call(req)
    });
    let responses = futures::future::join_all(calls).await;

    let ids: HashSet<String> = responses
        .into_iter()
        .map(|res| {
            res.unwrap()
                .headers()
                .get(X_REQUEST_ID)
                .unwrap()
                .to_str()
                .unwrap()
                .to_string()
        })
        .collect();
    assert_eq!(ids.len(), 200);
}

#[tokio::test]
async fn test_layer_shared_across_tasks() {
    let layer = RequestIdConfig::new()
        .skip(|ctx| ctx.path().starts_with("/internal"))
        .build()
        .unwrap();

    let mut handles = Vec::new();
    for i in 0..8 {
        let svc = layer.layer(service_fn(|_req: Request<Full<Bytes>>| async {
            Ok::<_, Infallible>(Response::new(Full::new(Bytes::new())))
        }));
        handles.push(tokio::spawn(async move {
            let path = if i % 2 == 0 { "/internal/stats" } else { "/api" };
            let req = Request::builder()
                .uri(path)
                .body(Full::new(Bytes::new()))
                .unwrap();
            let res = svc.call(req).await.unwrap();
            (i, res.headers().contains_key(X_REQUEST_ID))
        }));
    }

    for handle in handles {
        let (i, has_id) = handle.await.unwrap();
        assert_eq!(has_id, i % 2 == 1);
    }
}
