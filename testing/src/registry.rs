//! In-memory ticket registries.
//!
//! - [`InMemoryTicketRegistry`]: `HashMap`-backed registry, deterministic
//! - [`FlakyRegistry`]: wraps another registry and fails lookups on demand

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::future::ready;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;
use ticket_gate_core::{
    NewTicket, OwnerAddress, RegistryError, RegistryFuture, Ticket, TicketIdentity,
    TicketRegistry,
};

/// In-memory ticket registry.
///
/// `mark_used` checks and updates under a single write lock, so concurrent
/// check-ins of one ticket observe exactly one success, the same guarantee
/// the SQL registry gets from its conditional `UPDATE`.
///
/// Clones share state.
///
/// # Example
///
/// ```
/// use ticket_gate_testing::{InMemoryTicketRegistry, fixtures};
/// use ticket_gate_core::TicketRegistry;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let registry = InMemoryTicketRegistry::new();
/// registry.issue(fixtures::new_ticket("12345")).await?;
///
/// let ticket = registry.lookup(&fixtures::identity("12345")).await?;
/// assert!(ticket.is_some());
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default)]
pub struct InMemoryTicketRegistry {
    tickets: Arc<RwLock<HashMap<TicketIdentity, Ticket>>>,
}

impl InMemoryTicketRegistry {
    /// Create a new empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of minted tickets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read().map_or(0, |tickets| tickets.len())
    }

    /// Whether no ticket was minted yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<TicketIdentity, Ticket>>, RegistryError> {
        self.tickets
            .read()
            .map_err(|_| RegistryError::Unavailable("registry lock poisoned".to_string()))
    }

    fn write(
        &self,
    ) -> Result<RwLockWriteGuard<'_, HashMap<TicketIdentity, Ticket>>, RegistryError> {
        self.tickets
            .write()
            .map_err(|_| RegistryError::Unavailable("registry lock poisoned".to_string()))
    }

    fn lookup_now(&self, identity: &TicketIdentity) -> Result<Option<Ticket>, RegistryError> {
        Ok(self.read()?.get(identity).cloned())
    }

    fn mark_used_now(
        &self,
        identity: &TicketIdentity,
        at: DateTime<Utc>,
    ) -> Result<Ticket, RegistryError> {
        let mut tickets = self.write()?;

        let Some(ticket) = tickets.get_mut(identity) else {
            return Err(RegistryError::NotFound(identity.clone()));
        };
        if let Some(used_at) = ticket.used_at {
            return Err(RegistryError::AlreadyUsed {
                identity: identity.clone(),
                used_at,
            });
        }

        ticket.used_at = Some(at);
        Ok(ticket.clone())
    }

    fn issue_now(&self, new_ticket: NewTicket) -> Result<Ticket, RegistryError> {
        let mut tickets = self.write()?;

        if tickets.contains_key(&new_ticket.identity) {
            return Err(RegistryError::AlreadyIssued(new_ticket.identity));
        }

        let ticket = new_ticket.into_ticket();
        tickets.insert(ticket.identity.clone(), ticket.clone());
        tracing::debug!(ticket = %ticket.identity, owner = %ticket.owner, "Issued ticket");
        Ok(ticket)
    }

    fn owned_by_now(&self, owner: &OwnerAddress) -> Result<Vec<Ticket>, RegistryError> {
        let mut owned: Vec<Ticket> = self
            .read()?
            .values()
            .filter(|ticket| &ticket.owner == owner)
            .cloned()
            .collect();

        owned.sort_by(|a, b| {
            a.identity
                .ticket_id()
                .cmp(b.identity.ticket_id())
                .then_with(|| a.identity.contract_address().cmp(b.identity.contract_address()))
                .then_with(|| a.identity.network_id().cmp(b.identity.network_id()))
        });
        Ok(owned)
    }
}

impl TicketRegistry for InMemoryTicketRegistry {
    fn lookup<'a>(&'a self, identity: &'a TicketIdentity) -> RegistryFuture<'a, Option<Ticket>> {
        Box::pin(ready(self.lookup_now(identity)))
    }

    fn mark_used<'a>(
        &'a self,
        identity: &'a TicketIdentity,
        at: DateTime<Utc>,
    ) -> RegistryFuture<'a, Ticket> {
        Box::pin(ready(self.mark_used_now(identity, at)))
    }

    fn issue(&self, ticket: NewTicket) -> RegistryFuture<'_, Ticket> {
        Box::pin(ready(self.issue_now(ticket)))
    }

    fn tickets_owned_by<'a>(&'a self, owner: &'a OwnerAddress) -> RegistryFuture<'a, Vec<Ticket>> {
        Box::pin(ready(self.owned_by_now(owner)))
    }

    fn ping(&self) -> RegistryFuture<'_, ()> {
        Box::pin(ready(self.read().map(|_| ())))
    }
}

/// Registry wrapper that fails the next N lookups as unavailable.
///
/// Every other operation is delegated untouched.
pub struct FlakyRegistry<R> {
    inner: R,
    failures_left: AtomicUsize,
    lookups: AtomicUsize,
    latency: Duration,
}

impl<R: TicketRegistry> FlakyRegistry<R> {
    /// Wrap `inner`, failing its first `failures` lookups.
    #[must_use]
    pub const fn new(inner: R, failures: usize) -> Self {
        Self {
            inner,
            failures_left: AtomicUsize::new(failures),
            lookups: AtomicUsize::new(0),
            latency: Duration::ZERO,
        }
    }

    /// Make each failing lookup take `latency` before it reports the outage,
    /// like a connection attempt running into its timeout.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Number of lookups attempted so far, failed ones included.
    #[must_use]
    pub fn lookup_calls(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    fn take_failure(&self) -> bool {
        self.failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok()
    }
}

impl<R: TicketRegistry> TicketRegistry for FlakyRegistry<R> {
    fn lookup<'a>(&'a self, identity: &'a TicketIdentity) -> RegistryFuture<'a, Option<Ticket>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if self.take_failure() {
            let latency = self.latency;
            return Box::pin(async move {
                if !latency.is_zero() {
                    tokio::time::sleep(latency).await;
                }
                Err::<Option<Ticket>, _>(RegistryError::Unavailable(
                    "connection refused".to_string(),
                ))
            });
        }
        self.inner.lookup(identity)
    }

    fn mark_used<'a>(
        &'a self,
        identity: &'a TicketIdentity,
        at: DateTime<Utc>,
    ) -> RegistryFuture<'a, Ticket> {
        self.inner.mark_used(identity, at)
    }

    fn issue(&self, ticket: NewTicket) -> RegistryFuture<'_, Ticket> {
        self.inner.issue(ticket)
    }

    fn tickets_owned_by<'a>(&'a self, owner: &'a OwnerAddress) -> RegistryFuture<'a, Vec<Ticket>> {
        self.inner.tickets_owned_by(owner)
    }

    fn ping(&self) -> RegistryFuture<'_, ()> {
        self.inner.ping()
    }
}
