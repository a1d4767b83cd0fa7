//! Holder view of owned tickets.

use crate::codec::ScanCode;
use crate::identity::OwnerAddress;
use crate::registry::{RegistryError, TicketRegistry};
use crate::ticket::Ticket;
use serde::Serialize;

/// A ticket together with the code its holder presents at the entrance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct OwnedTicket {
    /// Ticket snapshot
    #[serde(flatten)]
    pub ticket: Ticket,
    /// Encoded identity, rendered as a QR code by the holder's wallet
    pub scan_code: ScanCode,
}

impl From<Ticket> for OwnedTicket {
    fn from(ticket: Ticket) -> Self {
        let scan_code = ticket.identity.scan_code();
        Self { ticket, scan_code }
    }
}

/// List the tickets held by `owner`, with their scan codes.
///
/// # Errors
///
/// Propagates the registry's error.
pub async fn owned_tickets(
    registry: &dyn TicketRegistry,
    owner: &OwnerAddress,
) -> Result<Vec<OwnedTicket>, RegistryError> {
    let tickets = registry.tickets_owned_by(owner).await?;
    tracing::debug!(owner = %owner, count = tickets.len(), "Listed owned tickets");
    Ok(tickets.into_iter().map(OwnedTicket::from).collect())
}
