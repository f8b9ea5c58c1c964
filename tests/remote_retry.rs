mod common;

use common::{closed_addr, MockServer, Scripted};
use doc_compare::config::RemoteConfig;
use doc_compare::remote::{RemoteCallOutcome, RemoteCaller};
use serde_json::json;
use std::time::{Duration, Instant};

fn remote(max_retries: u32) -> RemoteConfig {
    RemoteConfig {
        max_retries,
        timeout_secs: 5,
        default_retry_after_secs: 1,
        max_retry_after_secs: 5,
    }
}

#[tokio::test]
async fn test_rate_limit_then_success() {
    let server = MockServer::start(
        vec![
            Scripted::status(429, "slow down").with_header("retry-after", "1"),
            Scripted::ok(r#"{"ok":true}"#),
        ],
        Scripted::status(500, "unexpected"),
    )
    .await;
    let caller = RemoteCaller::new(&remote(5)).unwrap();

    let started = Instant::now();
    let outcome = caller.call(&server.url(), &[], &json!({"text": "hi"})).await;

    assert_eq!(server.hits(), 2);
    assert!(started.elapsed() >= Duration::from_secs(1));
    assert!(outcome.is_success());
    assert_eq!(outcome.success_json(), Some(json!({"ok": true})));
}

#[tokio::test]
async fn test_client_error_is_final() {
    let server = MockServer::start(vec![Scripted::status(400, "bad")], Scripted::ok("{}")).await;
    let caller = RemoteCaller::new(&remote(5)).unwrap();

    let outcome = caller.call(&server.url(), &[], &json!({})).await;

    assert_eq!(server.hits(), 1);
    match outcome {
        RemoteCallOutcome::Completed(response) => {
            assert_eq!(response.status, 400);
            assert_eq!(response.body, "bad");
        }
        other => panic!("expected a completed call, got {:?}", other),
    }
}

#[tokio::test]
async fn test_gateway_errors_exhaust_retries() {
    let server = MockServer::start(vec![], Scripted::status(503, "unavailable")).await;
    let caller = RemoteCaller::new(&remote(2)).unwrap();

    let outcome = caller.call(&server.url(), &[], &json!({})).await;

    assert_eq!(server.hits(), 2);
    assert!(matches!(outcome, RemoteCallOutcome::Exhausted { ref reason } if reason == "HTTP 503"));
}

#[tokio::test]
async fn test_network_failure_exhausts_without_panicking() {
    let addr = closed_addr().await;
    let caller = RemoteCaller::new(&remote(1)).unwrap();

    let outcome = caller
        .call(&format!("http://{}", addr), &[], &json!({}))
        .await;

    assert!(!outcome.is_success());
    assert!(matches!(outcome, RemoteCallOutcome::Exhausted { .. }));
}

#[tokio::test]
async fn test_headers_and_body_are_sent() {
    let server = MockServer::start(vec![], Scripted::ok("[]")).await;
    let caller = RemoteCaller::new(&remote(1)).unwrap();

    caller
        .call(&server.url(), &[("api-key", "secret")], &json!({"a": 1}))
        .await;

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].headers["api-key"], "secret");
    assert_eq!(requests[0].body, r#"{"a":1}"#);
}
