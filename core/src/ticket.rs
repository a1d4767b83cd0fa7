//! Ticket records as held by the registry.

use crate::identity::{EventId, OwnerAddress, TicketIdentity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A minted ticket.
///
/// The registry owns the authoritative copy; values handed out are snapshots.
/// `used_at` goes from `None` to `Some` exactly once and never back.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    /// Identity the ticket was minted under
    pub identity: TicketIdentity,
    /// Current holder
    pub owner: OwnerAddress,
    /// Event the ticket admits to
    pub event_id: EventId,
    /// Display name of the event
    pub event_name: String,
    /// When the ticket was checked in, if it has been
    pub used_at: Option<DateTime<Utc>>,
}

impl Ticket {
    /// Whether the ticket has been consumed.
    #[must_use]
    pub const fn is_used(&self) -> bool {
        self.used_at.is_some()
    }
}

/// Mint request accepted by [`crate::TicketRegistry::issue`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTicket {
    /// Identity to mint under
    pub identity: TicketIdentity,
    /// Initial holder
    pub owner: OwnerAddress,
    /// Event the ticket admits to
    pub event_id: EventId,
    /// Display name of the event
    pub event_name: String,
}

impl NewTicket {
    /// The unused ticket this request mints.
    #[must_use]
    pub fn into_ticket(self) -> Ticket {
        Ticket {
            identity: self.identity,
            owner: self.owner,
            event_id: self.event_id,
            event_name: self.event_name,
            used_at: None,
        }
    }
}
