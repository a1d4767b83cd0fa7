//! Test fixtures for the demo venue.
//!
//! Fixture constructors panic on invalid input; they are only called with
//! literals.

#![allow(clippy::expect_used)]
#![allow(clippy::missing_panics_doc)]

use ticket_gate_core::{
    ContractAddress, EventId, NetworkId, NewTicket, OwnerAddress, TicketId, TicketIdentity,
    VenueContext,
};

/// Contract address of the demo venue.
pub const CONTRACT_ADDRESS: &str = "0x25b2C2eaf9b8EC899d9cd44Ac74001eF17180F14";

/// Network id of the demo venue (Base Sepolia).
pub const NETWORK_ID: &str = "84532";

/// Holder of the fixture tickets.
pub const OWNER: &str = "0x1234...5678";

/// Event name of the fixture tickets.
pub const EVENT_NAME: &str = "Base Workshop Meet 3";

/// The demo venue.
#[must_use]
pub fn venue() -> VenueContext {
    VenueContext::new(
        ContractAddress::parse(CONTRACT_ADDRESS).expect("fixture contract address is valid"),
        NetworkId::parse(NETWORK_ID).expect("fixture network id is valid"),
    )
}

/// Identity of `ticket_id` at the demo venue.
#[must_use]
pub fn identity(ticket_id: &str) -> TicketIdentity {
    venue().identity_for(TicketId::parse(ticket_id).expect("fixture ticket id is valid"))
}

/// Scan code of `ticket_id` at the demo venue.
#[must_use]
pub fn scan_code(ticket_id: &str) -> String {
    identity(ticket_id).scan_code().into_string()
}

/// Mint request for `ticket_id` at the demo venue, held by [`OWNER`].
#[must_use]
pub fn new_ticket(ticket_id: &str) -> NewTicket {
    NewTicket {
        identity: identity(ticket_id),
        owner: OwnerAddress::new(OWNER),
        event_id: EventId::new("0"),
        event_name: EVENT_NAME.to_string(),
    }
}
