//! Scan session lifecycle tests.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;
use ticket_gate_core::{ScanError, ScanSession, Scanner};
use ticket_gate_testing::ScriptedCamera;
use tokio::sync::mpsc;

#[tokio::test]
async fn test_session_forwards_payloads_in_order() {
    let camera = ScriptedCamera::new(["a-b-c", "d-e-f"]);
    let (sink, mut payloads) = mpsc::channel(4);

    let session = ScanSession::start(&camera, sink).await.unwrap();
    assert_eq!(payloads.recv().await.as_deref(), Some("a-b-c"));
    assert_eq!(payloads.recv().await.as_deref(), Some("d-e-f"));
    assert!(session.is_active());

    session.stop().await;
    assert_eq!(camera.held(), 0);
}

#[tokio::test]
async fn test_start_stop_twice_holds_no_handle() {
    let camera = ScriptedCamera::new(Vec::<String>::new());
    let mut scanner = Scanner::new(Arc::new(camera.clone()));

    for _ in 0..2 {
        let (sink, _payloads) = mpsc::channel(1);
        scanner.start(sink).await.unwrap();
        assert!(scanner.is_scanning());
        assert_eq!(camera.held(), 1);

        scanner.stop().await;
        assert!(!scanner.is_scanning());
        assert_eq!(camera.held(), 0);
    }
    assert_eq!(camera.acquisitions(), 2);
}

#[tokio::test]
async fn test_stop_without_start_is_a_no_op() {
    let camera = ScriptedCamera::new(["x-y-z"]);
    let mut scanner = Scanner::new(Arc::new(camera.clone()));

    scanner.stop().await;
    scanner.stop().await;

    assert!(!scanner.is_scanning());
    assert_eq!(camera.acquisitions(), 0);
}

#[tokio::test]
async fn test_restart_tears_down_previous_session() {
    let camera = ScriptedCamera::new(Vec::<String>::new());
    let mut scanner = Scanner::new(Arc::new(camera.clone()));

    let (first, _first_rx) = mpsc::channel(1);
    let (second, _second_rx) = mpsc::channel(1);
    scanner.start(first).await.unwrap();
    scanner.start(second).await.unwrap();

    assert_eq!(camera.acquisitions(), 2);
    assert_eq!(camera.held(), 1);

    scanner.stop().await;
    assert_eq!(camera.held(), 0);
}

#[tokio::test]
async fn test_scan_once_releases_after_first_payload() {
    let camera = ScriptedCamera::new(["1-0xabc-84532", "2-0xabc-84532"]);
    let mut scanner = Scanner::new(Arc::new(camera.clone()));

    let payload = scanner.scan_once().await.unwrap();

    assert_eq!(payload, "1-0xabc-84532");
    assert!(!scanner.is_scanning());
    assert_eq!(camera.held(), 0);
}

#[tokio::test]
async fn test_scan_once_on_exhausted_feed_is_ended() {
    let camera = ScriptedCamera::new(Vec::<String>::new()).ending();
    let mut scanner = Scanner::new(Arc::new(camera.clone()));

    assert_eq!(scanner.scan_once().await, Err(ScanError::Ended));
    assert_eq!(camera.held(), 0);
}

#[tokio::test]
async fn test_acquisition_failure_holds_nothing() {
    let camera = ScriptedCamera::failing(ScanError::PermissionDenied);
    let mut scanner = Scanner::new(Arc::new(camera.clone()));
    let (sink, _payloads) = mpsc::channel(1);

    let err = scanner.start(sink).await.unwrap_err();

    assert!(err.is_resource_unavailable());
    assert!(!scanner.is_scanning());
    assert_eq!(camera.held(), 0);
}

#[tokio::test]
async fn test_closed_sink_ends_session_and_releases() {
    let camera = ScriptedCamera::new(["a-b-c"]);
    let (sink, payloads) = mpsc::channel(1);
    drop(payloads);

    let session = ScanSession::start(&camera, sink).await.unwrap();
    tokio::time::timeout(Duration::from_secs(1), async {
        while camera.held() > 0 {
            tokio::task::yield_now().await;
        }
    })
    .await
    .unwrap();

    session.stop().await;
    assert_eq!(camera.held(), 0);
}

#[tokio::test]
async fn test_dropped_session_releases_feed() {
    let camera = ScriptedCamera::new(Vec::<String>::new());
    let (sink, _payloads) = mpsc::channel(1);

    let session = ScanSession::start(&camera, sink).await.unwrap();
    assert_eq!(camera.held(), 1);
    drop(session);

    tokio::time::timeout(Duration::from_secs(1), async {
        while camera.held() > 0 {
            tokio::task::yield_now().await;
        }
    })
    .await
    .unwrap();
}
