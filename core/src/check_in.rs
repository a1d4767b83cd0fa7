//! Check-in coordinator.
//!
//! Performs the one-way `Valid → Used` transition. The coordinator never
//! trusts a cached verdict: another gate may have consumed the ticket since
//! it was verified, so the precondition is re-checked by the registry's
//! atomic conditional update.
//!
//! ```text
//! Unknown ──lookup(absent)──────► NotFound      (terminal for that scan)
//! Unknown ──lookup(unused)──────► Valid
//! Valid   ──check_in success────► Used          (terminal)
//! Valid   ──check_in raced──────► AlreadyUsed   (terminal, a conflict)
//! ```

use crate::environment::Clock;
use crate::identity::TicketIdentity;
use crate::registry::{RegistryError, TicketRegistry};
use crate::ticket::Ticket;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Confirmation shown to the operator after a successful check-in.
pub const CHECKED_IN_MESSAGE: &str = "Ticket checked in successfully!";

/// Why a check-in did not happen. Every variant is recoverable.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckInError {
    /// The ticket was consumed first, possibly by another gate.
    #[error("Ticket {identity} was already checked in at {used_at}")]
    AlreadyUsed {
        /// The contested ticket.
        identity: TicketIdentity,
        /// When the winning check-in happened.
        used_at: DateTime<Utc>,
    },

    /// No ticket was minted under this identity.
    #[error("Ticket not found: {0}")]
    NotFound(TicketIdentity),

    /// The registry could not complete the update; retry later.
    #[error("Ticket registry unavailable: {0}")]
    RegistryUnavailable(String),

    /// Check-in was requested without a current `Valid` verdict.
    #[error("No valid verification to check in")]
    NotVerified,
}

impl CheckInError {
    /// Whether this is the expected outcome of losing a race.
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::AlreadyUsed { .. })
    }

    /// Stable label, used for metrics and wire formats.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AlreadyUsed { .. } => "already_used",
            Self::NotFound(_) => "not_found",
            Self::RegistryUnavailable(_) => "registry_unavailable",
            Self::NotVerified => "not_verified",
        }
    }

    /// Message shown to the gate operator.
    #[must_use]
    pub const fn operator_message(&self) -> &'static str {
        match self {
            Self::AlreadyUsed { .. } => {
                "Ticket already used. Another check-in consumed it first; do not admit twice."
            }
            Self::NotFound(_) => "Check-in failed: this ticket does not exist.",
            Self::RegistryUnavailable(_) => "Check-in failed: ticket registry is unreachable. Please try again.",
            Self::NotVerified => "Verify a valid ticket before checking in.",
        }
    }
}

impl From<RegistryError> for CheckInError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::AlreadyUsed { identity, used_at } => {
                Self::AlreadyUsed { identity, used_at }
            }
            RegistryError::NotFound(identity) => Self::NotFound(identity),
            other @ (RegistryError::AlreadyIssued(_)
            | RegistryError::Unavailable(_)
            | RegistryError::InvalidRecord(_)) => Self::RegistryUnavailable(other.to_string()),
        }
    }
}

/// Consumes tickets through the registry.
#[derive(Clone)]
pub struct CheckInCoordinator {
    registry: Arc<dyn TicketRegistry>,
    clock: Arc<dyn Clock>,
}

impl CheckInCoordinator {
    /// Create a coordinator.
    #[must_use]
    pub fn new(registry: Arc<dyn TicketRegistry>, clock: Arc<dyn Clock>) -> Self {
        Self { registry, clock }
    }

    /// Mark the ticket as used.
    ///
    /// Concurrent calls for the same ticket yield exactly one `Ok`; the
    /// others get [`CheckInError::AlreadyUsed`].
    ///
    /// # Errors
    ///
    /// - [`CheckInError::AlreadyUsed`]: the ticket was consumed first
    /// - [`CheckInError::NotFound`]: no such ticket
    /// - [`CheckInError::RegistryUnavailable`]: the update could not be made
    pub async fn check_in(&self, identity: &TicketIdentity) -> Result<Ticket, CheckInError> {
        let at = self.clock.now();

        match self.registry.mark_used(identity, at).await {
            Ok(ticket) => {
                tracing::info!(
                    ticket = %identity,
                    owner = %ticket.owner,
                    event = %ticket.event_name,
                    "Ticket checked in"
                );
                metrics::counter!("ticket_gate_check_ins_total", "outcome" => "checked_in")
                    .increment(1);
                Ok(ticket)
            }
            Err(err) => {
                let err = CheckInError::from(err);
                match &err {
                    CheckInError::AlreadyUsed { used_at, .. } => {
                        tracing::warn!(ticket = %identity, %used_at, "Check-in conflict: ticket already used");
                    }
                    CheckInError::RegistryUnavailable(reason) => {
                        tracing::error!(ticket = %identity, %reason, "Check-in failed");
                    }
                    CheckInError::NotFound(_) | CheckInError::NotVerified => {
                        tracing::info!(ticket = %identity, error = %err, "Check-in rejected");
                    }
                }
                metrics::counter!("ticket_gate_check_ins_total", "outcome" => err.as_str())
                    .increment(1);
                Err(err)
            }
        }
    }
}
