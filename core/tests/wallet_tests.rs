//! Owned-ticket listing tests.

#![allow(clippy::unwrap_used)]

use ticket_gate_core::{OwnedTicket, OwnerAddress, TicketRegistry, owned_tickets};
use ticket_gate_testing::{InMemoryTicketRegistry, fixtures};

#[tokio::test]
async fn test_owned_tickets_carry_their_scan_codes() {
    let registry = InMemoryTicketRegistry::new();
    registry.issue(fixtures::new_ticket("12346")).await.unwrap();
    registry.issue(fixtures::new_ticket("12345")).await.unwrap();

    let owned = owned_tickets(&registry, &OwnerAddress::new(fixtures::OWNER))
        .await
        .unwrap();

    let codes: Vec<&str> = owned.iter().map(|t| t.scan_code.as_str()).collect();
    assert_eq!(
        codes,
        vec![
            "12345-0x25b2C2eaf9b8EC899d9cd44Ac74001eF17180F14-84532",
            "12346-0x25b2C2eaf9b8EC899d9cd44Ac74001eF17180F14-84532",
        ]
    );
}

#[tokio::test]
async fn test_unknown_owner_has_no_tickets() {
    let registry = InMemoryTicketRegistry::new();
    registry.issue(fixtures::new_ticket("1")).await.unwrap();

    let owned = owned_tickets(&registry, &OwnerAddress::new("0xnobody")).await.unwrap();
    assert!(owned.is_empty());
}

#[test]
fn test_owned_ticket_serializes_flat() {
    let owned = OwnedTicket::from(fixtures::new_ticket("7").into_ticket());
    let json = serde_json::to_value(&owned).unwrap();

    assert_eq!(json["event_name"], fixtures::EVENT_NAME);
    assert_eq!(json["scan_code"], fixtures::scan_code("7"));
    assert!(json["used_at"].is_null());
}
