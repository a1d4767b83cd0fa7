//! Operator console tests.
//!
//! Drive the console with scripted input over the in-memory registry seeded
//! with the demo tickets.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;
use ticket_gate::{Config, Console, ResourceManager};
use ticket_gate_core::{CHECKED_IN_MESSAGE, ScanError, Scanner};
use ticket_gate_testing::{
    FlakyRegistry, InMemoryTicketRegistry, ScriptedCamera, fixtures, test_clock,
};

async fn demo_resources() -> ResourceManager {
    let resources = ResourceManager::new(
        Arc::new(Config::from_lookup(|_| None)),
        fixtures::venue(),
        Arc::new(InMemoryTicketRegistry::new()),
        Arc::new(test_clock()),
    );
    resources.seed_demo().await.unwrap();
    resources
}

async fn run_console(scanner: Option<Scanner>, input: &str) -> String {
    let resources = demo_resources().await;
    let mut console = Console::new(resources.station(), scanner, Vec::new())
        .with_scan_timeout(Duration::from_millis(50));

    console.run(input.as_bytes()).await.unwrap();
    String::from_utf8(console.into_output()).unwrap()
}

#[tokio::test]
async fn test_manual_verify_and_check_in() {
    let output = run_console(None, "12345\ncheck-in\nquit\n").await;

    assert!(output.contains("Valid ticket. Ready to check in."));
    assert!(output.contains("Base Workshop Meet 3"));
    assert!(output.contains(CHECKED_IN_MESSAGE));
    assert!(output.contains("Used at 2025-01-01T00:00:00+00:00"));
}

#[tokio::test]
async fn test_second_check_in_is_refused() {
    let output = run_console(None, "12345\ncheck-in\ncheck-in\n").await;

    assert_eq!(output.matches(CHECKED_IN_MESSAGE).count(), 1);
    assert!(output.contains("Verify a valid ticket before checking in."));
}

#[tokio::test]
async fn test_used_demo_ticket_is_reported() {
    let output = run_console(None, "12346\ncheck-in\n").await;

    assert!(output.contains("Ticket already used."));
    assert!(output.contains("Base Developer Conference"));
    assert!(!output.contains(CHECKED_IN_MESSAGE));
}

#[tokio::test]
async fn test_full_code_and_malformed_input() {
    let input = format!("{}\n1-2\n99999\n", fixtures::scan_code("12345"));
    let output = run_console(None, &input).await;

    assert!(output.contains("Valid ticket."));
    assert!(output.contains("Invalid QR code format."));
    assert!(output.contains("Invalid ticket. This ticket does not exist"));
}

#[tokio::test]
async fn test_input_after_quit_is_ignored() {
    let output = run_console(None, "quit\n12345\n").await;
    assert!(!output.contains("Valid ticket."));
}

#[tokio::test]
async fn test_scan_without_reader_asks_for_manual_input() {
    let output = run_console(None, "scan\n").await;
    assert!(output.contains("No code reader configured."));
}

#[tokio::test]
async fn test_scan_reads_one_code_and_releases_reader() {
    let camera = ScriptedCamera::new([fixtures::scan_code("12345")]);
    let scanner = Scanner::new(Arc::new(camera.clone()));

    let output = run_console(Some(scanner), "scan\ncheck-in\n").await;

    assert!(output.contains("Valid ticket."));
    assert!(output.contains(CHECKED_IN_MESSAGE));
    assert_eq!(camera.acquisitions(), 1);
    assert_eq!(camera.held(), 0);
}

#[tokio::test]
async fn test_camera_failure_falls_back_to_manual_input() {
    let camera = ScriptedCamera::failing(ScanError::PermissionDenied);
    let scanner = Scanner::new(Arc::new(camera));

    let output = run_console(Some(scanner), "scan\n12345\n").await;

    assert!(output.contains("Failed to start camera. Please check permissions or try manual input."));
    assert!(output.contains("Valid ticket."));
}

#[tokio::test]
async fn test_scan_timeout_releases_reader() {
    let camera = ScriptedCamera::new(Vec::<String>::new());
    let scanner = Scanner::new(Arc::new(camera.clone()));

    let output = run_console(Some(scanner), "scan\n").await;

    assert!(output.contains("No code was read."));
    assert_eq!(camera.acquisitions(), 1);
    assert_eq!(camera.held(), 0);
}

#[tokio::test]
async fn test_clear_forgets_verdict() {
    let output = run_console(None, "12345\nclear\ncheck-in\n").await;

    assert!(output.contains("Cleared."));
    assert!(output.contains("Verify a valid ticket before checking in."));
    assert!(!output.contains(CHECKED_IN_MESSAGE));
}

#[tokio::test]
async fn test_slow_registry_outage_after_scan_is_reported() {
    let registry = FlakyRegistry::new(InMemoryTicketRegistry::new(), usize::MAX)
        .with_latency(Duration::from_millis(200));
    let resources = ResourceManager::new(
        Arc::new(Config::from_lookup(|key| {
            (key == "GATE_RETRY_MAX").then(|| "0".to_string())
        })),
        fixtures::venue(),
        Arc::new(registry),
        Arc::new(test_clock()),
    );
    let camera = ScriptedCamera::new([fixtures::scan_code("12345")]);
    let scanner = Scanner::new(Arc::new(camera.clone()));

    let mut console = Console::new(resources.station(), Some(scanner), Vec::new())
        .with_scan_timeout(Duration::from_millis(50));
    console.run("scan\n".as_bytes()).await.unwrap();
    let output = String::from_utf8(console.into_output()).unwrap();

    assert!(output.contains("Ticket registry is unreachable."));
    assert!(!output.contains("No code was read."));
    assert_eq!(camera.held(), 0);
}
