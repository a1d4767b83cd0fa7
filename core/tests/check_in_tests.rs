//! Check-in coordinator tests.
//!
//! The concurrency tests follow the stress-test layout: many tasks race for
//! the same ticket on a multi-threaded runtime and exactly one may win.

#![allow(clippy::unwrap_used)]

use futures::future::join_all;
use tokio_test::assert_ok;
use std::sync::Arc;
use ticket_gate_core::{
    CheckInCoordinator, CheckInError, Clock, TicketRegistry, VerdictKind, VerificationEngine,
};
use ticket_gate_testing::{InMemoryTicketRegistry, fixtures, test_clock};

async fn registry_with(id: &str) -> InMemoryTicketRegistry {
    let registry = InMemoryTicketRegistry::new();
    registry.issue(fixtures::new_ticket(id)).await.unwrap();
    registry
}

fn coordinator(registry: &InMemoryTicketRegistry) -> Arc<CheckInCoordinator> {
    Arc::new(CheckInCoordinator::new(
        Arc::new(registry.clone()),
        Arc::new(test_clock()),
    ))
}

async fn race(tasks: usize) -> Vec<Result<ticket_gate_core::Ticket, CheckInError>> {
    let registry = registry_with("1").await;
    let coordinator = coordinator(&registry);
    let identity = fixtures::identity("1");

    let handles = (0..tasks).map(|_| {
        let coordinator = Arc::clone(&coordinator);
        let identity = identity.clone();
        tokio::spawn(async move { coordinator.check_in(&identity).await })
    });

    join_all(handles)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect()
}

#[tokio::test]
async fn test_check_in_marks_ticket_used() {
    let registry = registry_with("1").await;
    let ticket = coordinator(&registry).check_in(&fixtures::identity("1")).await.unwrap();

    assert_eq!(ticket.used_at, Some(test_clock().now()));
    let stored = registry.lookup(&fixtures::identity("1")).await.unwrap().unwrap();
    assert!(stored.is_used());
}

#[tokio::test]
async fn test_second_check_in_is_a_conflict() {
    let registry = registry_with("1").await;
    let coordinator = coordinator(&registry);
    let identity = fixtures::identity("1");

    assert_ok!(coordinator.check_in(&identity).await);
    let err = coordinator.check_in(&identity).await.unwrap_err();

    assert!(err.is_conflict());
    assert_eq!(
        err,
        CheckInError::AlreadyUsed {
            identity,
            used_at: test_clock().now()
        }
    );
}

#[tokio::test]
async fn test_check_in_unknown_ticket_is_not_found() {
    let registry = InMemoryTicketRegistry::new();
    let err = coordinator(&registry)
        .check_in(&fixtures::identity("404"))
        .await
        .unwrap_err();

    assert_eq!(err, CheckInError::NotFound(fixtures::identity("404")));
    assert!(!err.is_conflict());
}

#[tokio::test]
async fn test_verdict_before_and_after_check_in() {
    let registry = registry_with("1").await;
    let engine = VerificationEngine::new(Arc::new(registry.clone()), fixtures::venue());
    let code = fixtures::scan_code("1");

    assert_eq!(engine.verify(&code).await.kind(), VerdictKind::Valid);
    coordinator(&registry).check_in(&fixtures::identity("1")).await.unwrap();
    assert_eq!(engine.verify(&code).await.kind(), VerdictKind::AlreadyUsed);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_two_gates_race_for_one_ticket() {
    let results = race(2).await;

    let successes = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1);
    assert!(results
        .iter()
        .filter_map(|r| r.as_ref().err())
        .all(CheckInError::is_conflict));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_many_concurrent_check_ins_admit_once() {
    let results = race(100).await;

    let successes = results.iter().filter(|r| r.is_ok()).count();
    let conflicts = results
        .iter()
        .filter(|r| matches!(r, Err(CheckInError::AlreadyUsed { .. })))
        .count();

    assert_eq!(successes, 1, "exactly one check-in must win");
    assert_eq!(conflicts, 99);
}
