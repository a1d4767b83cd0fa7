//! Tests for the in-memory registry and the scripted camera.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use ticket_gate_core::{Camera, OwnerAddress, RegistryError, ScanError, TicketRegistry};
use ticket_gate_testing::{FlakyRegistry, InMemoryTicketRegistry, ScriptedCamera, fixtures, test_clock};
use ticket_gate_core::environment::Clock;

#[tokio::test]
async fn test_lookup_unknown_ticket_is_none() {
    let registry = InMemoryTicketRegistry::new();
    assert_eq!(registry.lookup(&fixtures::identity("1")).await.unwrap(), None);
}

#[tokio::test]
async fn test_issue_twice_is_rejected() {
    let registry = InMemoryTicketRegistry::new();
    registry.issue(fixtures::new_ticket("1")).await.unwrap();

    let err = registry.issue(fixtures::new_ticket("1")).await.unwrap_err();
    assert_eq!(err, RegistryError::AlreadyIssued(fixtures::identity("1")));
    assert_eq!(registry.len(), 1);
}

#[tokio::test]
async fn test_mark_used_is_one_way() {
    let registry = InMemoryTicketRegistry::new();
    let identity = fixtures::identity("1");
    let at = test_clock().now();
    registry.issue(fixtures::new_ticket("1")).await.unwrap();

    let ticket = registry.mark_used(&identity, at).await.unwrap();
    assert_eq!(ticket.used_at, Some(at));

    let err = registry.mark_used(&identity, at + chrono::Duration::minutes(5)).await.unwrap_err();
    assert_eq!(err, RegistryError::AlreadyUsed { identity: identity.clone(), used_at: at });

    // The first timestamp is kept
    let stored = registry.lookup(&identity).await.unwrap().unwrap();
    assert_eq!(stored.used_at, Some(at));
}

#[tokio::test]
async fn test_mark_used_unknown_ticket_is_not_found() {
    let registry = InMemoryTicketRegistry::new();
    let identity = fixtures::identity("404");

    let err = registry.mark_used(&identity, test_clock().now()).await.unwrap_err();
    assert_eq!(err, RegistryError::NotFound(identity));
}

#[tokio::test]
async fn test_tickets_owned_by_filters_and_orders() {
    let registry = InMemoryTicketRegistry::new();
    registry.issue(fixtures::new_ticket("3")).await.unwrap();
    registry.issue(fixtures::new_ticket("1")).await.unwrap();

    let mut foreign = fixtures::new_ticket("2");
    foreign.owner = OwnerAddress::new("0xother");
    registry.issue(foreign).await.unwrap();

    let owned = registry
        .tickets_owned_by(&OwnerAddress::new(fixtures::OWNER))
        .await
        .unwrap();
    let ids: Vec<&str> = owned.iter().map(|t| t.identity.ticket_id().as_str()).collect();
    assert_eq!(ids, vec!["1", "3"]);
}

#[tokio::test]
async fn test_clones_share_state() {
    let registry = InMemoryTicketRegistry::new();
    let clone = registry.clone();
    clone.issue(fixtures::new_ticket("1")).await.unwrap();

    assert!(!registry.is_empty());
}

#[tokio::test]
async fn test_flaky_registry_fails_then_delegates() {
    let inner = InMemoryTicketRegistry::new();
    inner.issue(fixtures::new_ticket("1")).await.unwrap();
    let registry = FlakyRegistry::new(inner, 2);
    let identity = fixtures::identity("1");

    assert!(matches!(registry.lookup(&identity).await, Err(RegistryError::Unavailable(_))));
    assert!(matches!(registry.lookup(&identity).await, Err(RegistryError::Unavailable(_))));
    assert!(registry.lookup(&identity).await.unwrap().is_some());
    assert_eq!(registry.lookup_calls(), 3);
}

#[tokio::test]
async fn test_scripted_camera_tracks_handles() {
    let camera = Arc::new(ScriptedCamera::new(["a"]).ending());

    let mut feed = camera.acquire().await.unwrap();
    assert_eq!(camera.held(), 1);
    assert_eq!(feed.next_payload().await, Some("a".to_string()));
    assert_eq!(feed.next_payload().await, None);

    feed.release();
    feed.release();
    assert_eq!(camera.held(), 0);
    assert_eq!(camera.acquisitions(), 1);
}

#[tokio::test]
async fn test_failing_camera_holds_nothing() {
    let camera = ScriptedCamera::failing(ScanError::PermissionDenied);

    assert_eq!(camera.acquire().await.err(), Some(ScanError::PermissionDenied));
    assert_eq!(camera.held(), 0);
}
