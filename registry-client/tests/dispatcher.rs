mod common;

use std::time::{Duration, Instant};

use registry_client::{CallError, Dispatcher};
use url::Url;

use common::config;

#[tokio::test]
async fn one_deadline_covers_headers_and_body() {
    let base_url = common::stalling_registry(Duration::from_millis(250)).await;
    let config = config(&base_url).with_timeout(Duration::from_millis(400));
    let dispatcher = Dispatcher::new(&config);
    let url = Url::parse(&format!("{base_url}/api/v1/user/")).unwrap();

    let started = Instant::now();
    let err = dispatcher.get(&url).await.expect_err("body never completes");
    let elapsed = started.elapsed();

    assert!(
        matches!(err, CallError::NetworkFailure { ref reason } if reason.contains("timed out")),
        "{err}"
    );
    assert!(elapsed < Duration::from_millis(600), "{elapsed:?}");
}

#[tokio::test]
async fn oversized_bodies_are_rejected() {
    let mut server = mockito::Server::new_async().await;
    let body = "x".repeat(2048);
    server
        .mock("GET", "/api/v1/user/")
        .with_status(200)
        .with_body(&body)
        .create_async()
        .await;
    let url = Url::parse(&format!("{}/api/v1/user/", server.url())).unwrap();

    let dispatcher = Dispatcher::new(&config(&server.url()));
    let err = dispatcher
        .clone()
        .with_max_body_bytes(1024)
        .get(&url)
        .await
        .expect_err("body exceeds the cap");
    assert!(
        matches!(err, CallError::NetworkFailure { ref reason } if reason.contains("exceeds 1024 bytes")),
        "{err}"
    );

    let exact = dispatcher
        .with_max_body_bytes(2048)
        .get(&url)
        .await
        .expect("body fits the cap");
    assert_eq!(exact.len(), 2048);
}
