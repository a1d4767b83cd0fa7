//! Ticket registry trait and related types.
//!
//! The registry is the authoritative store of ticket ownership and
//! consumption state. In production it is backed by a ledger or a database;
//! the verification engine and the check-in coordinator only ever see this
//! trait.
//!
//! # Implementations
//!
//! - `PostgresTicketRegistry` (in `ticket-gate-postgres` crate): SQL-backed
//! - `InMemoryTicketRegistry` (in `ticket-gate-testing` crate): tests and demos
//!
//! # Atomicity
//!
//! [`TicketRegistry::mark_used`] is the single serialization point of the
//! whole system. Implementations MUST perform it as one conditional update
//! against the backing store ("set used where unused"), never as a lookup
//! followed by a write: two gates scanning the same ticket at the same moment
//! must observe exactly one success.

use crate::identity::{OwnerAddress, TicketIdentity};
use crate::ticket::{NewTicket, Ticket};
use chrono::{DateTime, Utc};
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Boxed future returned by registry operations.
pub type RegistryFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, RegistryError>> + Send + 'a>>;

/// Errors that can occur during registry operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// No ticket was minted under this identity.
    #[error("Ticket not found: {0}")]
    NotFound(TicketIdentity),

    /// The conditional update lost: the ticket is already consumed.
    #[error("Ticket {identity} already used at {used_at}")]
    AlreadyUsed {
        /// The contested ticket.
        identity: TicketIdentity,
        /// When the winning check-in happened.
        used_at: DateTime<Utc>,
    },

    /// A ticket with this identity already exists.
    #[error("Ticket already issued: {0}")]
    AlreadyIssued(TicketIdentity),

    /// Transport or infrastructure failure. Safe to retry.
    #[error("Registry unavailable: {0}")]
    Unavailable(String),

    /// The backing store returned a record that is not a valid ticket.
    #[error("Invalid registry record: {0}")]
    InvalidRecord(String),
}

impl RegistryError {
    /// Whether the failure is transient and the operation may be retried.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

/// Authoritative ticket store.
///
/// # Dyn Compatibility
///
/// Returns boxed futures instead of using `async fn` so the registry can be
/// shared as `Arc<dyn TicketRegistry>` between the engine, the coordinator
/// and HTTP handlers.
pub trait TicketRegistry: Send + Sync {
    /// Look a ticket up.
    ///
    /// Read-only: safe to call concurrently and repeatedly. Returns
    /// `Ok(None)` when no ticket was minted under `identity`.
    ///
    /// # Errors
    ///
    /// - `Unavailable`: the backing store could not be reached
    /// - `InvalidRecord`: the stored row could not be decoded
    fn lookup<'a>(&'a self, identity: &'a TicketIdentity) -> RegistryFuture<'a, Option<Ticket>>;

    /// Atomically mark a ticket as used.
    ///
    /// Succeeds only if the ticket exists and is currently unused, and
    /// returns the updated ticket with `used_at == Some(at)`.
    ///
    /// # Errors
    ///
    /// - `AlreadyUsed`: another caller consumed the ticket first
    /// - `NotFound`: no ticket was minted under `identity`
    /// - `Unavailable`: the backing store could not be reached
    fn mark_used<'a>(
        &'a self,
        identity: &'a TicketIdentity,
        at: DateTime<Utc>,
    ) -> RegistryFuture<'a, Ticket>;

    /// Record a newly minted ticket.
    ///
    /// # Errors
    ///
    /// - `AlreadyIssued`: the identity is taken
    /// - `Unavailable`: the backing store could not be reached
    fn issue(&self, ticket: NewTicket) -> RegistryFuture<'_, Ticket>;

    /// All tickets held by `owner`, ordered by ticket id.
    ///
    /// # Errors
    ///
    /// - `Unavailable`: the backing store could not be reached
    /// - `InvalidRecord`: a stored row could not be decoded
    fn tickets_owned_by<'a>(&'a self, owner: &'a OwnerAddress) -> RegistryFuture<'a, Vec<Ticket>>;

    /// Round-trip to the backing store, for readiness probes.
    ///
    /// # Errors
    ///
    /// - `Unavailable`: the backing store could not be reached
    fn ping(&self) -> RegistryFuture<'_, ()> {
        Box::pin(async { Ok(()) })
    }
}
