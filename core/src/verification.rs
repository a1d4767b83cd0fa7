//! Verification engine.
//!
//! Turns an opaque scanned or typed code into a [`Verdict`] by decoding it and
//! consulting the registry. Camera scans and manual entry converge on
//! [`VerificationEngine::verify`]; there is no second classification path.

use crate::codec::{self, CodecError};
use crate::identity::{ContractAddress, NetworkId, TicketId, TicketIdentity};
use crate::registry::TicketRegistry;
use crate::retry::{RetryPolicy, retry_transient};
use crate::verdict::Verdict;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Contract and network a gate admits tickets for.
///
/// Manual entry only carries a ticket id; the rest of the identity comes from
/// here. There is no ad-hoc contract/network entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VenueContext {
    /// Contract the gate's event was minted on
    pub contract_address: ContractAddress,
    /// Network of that contract
    pub network_id: NetworkId,
}

impl VenueContext {
    /// Create a venue context.
    #[must_use]
    pub const fn new(contract_address: ContractAddress, network_id: NetworkId) -> Self {
        Self {
            contract_address,
            network_id,
        }
    }

    /// Complete a ticket id into a full identity for this venue.
    #[must_use]
    pub fn identity_for(&self, ticket_id: TicketId) -> TicketIdentity {
        TicketIdentity::new(
            ticket_id,
            self.contract_address.clone(),
            self.network_id.clone(),
        )
    }
}

/// Read-only verifier over a [`TicketRegistry`].
///
/// Idempotent: with unchanged registry state, the same input yields the same
/// verdict. Never fails past its boundary; infrastructure problems surface as
/// [`Verdict::RegistryUnavailable`].
#[derive(Clone)]
pub struct VerificationEngine {
    registry: Arc<dyn TicketRegistry>,
    venue: VenueContext,
    retry: RetryPolicy,
}

impl VerificationEngine {
    /// Create an engine with the default retry policy.
    #[must_use]
    pub fn new(registry: Arc<dyn TicketRegistry>, venue: VenueContext) -> Self {
        Self {
            registry,
            venue,
            retry: RetryPolicy::default(),
        }
    }

    /// Replace the retry policy used for registry lookups.
    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// The venue this engine completes manual entries with.
    #[must_use]
    pub const fn venue(&self) -> &VenueContext {
        &self.venue
    }

    /// Verify a scanned code.
    ///
    /// Surrounding whitespace (scanner line endings, pasted input) is ignored.
    pub async fn verify(&self, raw: &str) -> Verdict {
        let input = raw.trim();

        let identity = match codec::decode(input) {
            Ok(identity) => identity,
            Err(error) => {
                tracing::debug!(input, error = %error, "Rejected malformed scan code");
                return record(Verdict::MalformedInput {
                    input: input.to_owned(),
                    error,
                });
            }
        };

        let registry = &self.registry;
        let key = &identity;
        let looked_up = retry_transient(&self.retry, "lookup", move || registry.lookup(key)).await;

        let verdict = match looked_up {
            Ok(None) => Verdict::NotFound(identity),
            Ok(Some(ticket)) if ticket.is_used() => Verdict::AlreadyUsed(ticket),
            Ok(Some(ticket)) => Verdict::Valid(ticket),
            Err(err) => {
                tracing::warn!(ticket = %identity, error = %err, "Ticket lookup failed");
                Verdict::RegistryUnavailable {
                    identity,
                    reason: err.to_string(),
                }
            }
        };

        tracing::debug!(code = input, verdict = %verdict.kind(), "Verified ticket");
        record(verdict)
    }

    /// Verify a manually entered ticket id for this engine's venue.
    ///
    /// The id is completed with the venue's contract and network, encoded, and
    /// passed to [`Self::verify`].
    pub async fn verify_manual(&self, ticket_id: &str) -> Verdict {
        let input = ticket_id.trim();

        match TicketId::parse(input) {
            Ok(ticket_id) => {
                let code = self.venue.identity_for(ticket_id).scan_code();
                self.verify(code.as_str()).await
            }
            Err(err) => {
                tracing::debug!(input, error = %err, "Rejected manual ticket id");
                record(Verdict::MalformedInput {
                    input: input.to_owned(),
                    error: CodecError::InvalidField(err),
                })
            }
        }
    }
}

fn record(verdict: Verdict) -> Verdict {
    metrics::counter!("ticket_gate_verifications_total", "verdict" => verdict.kind().as_str())
        .increment(1);
    verdict
}
