//! Verification verdicts.

use crate::codec::CodecError;
use crate::identity::TicketIdentity;
use crate::ticket::Ticket;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification of a scanned or entered code at a point in time.
///
/// A read-only snapshot: never persisted, recomputed on every verification.
/// `Valid`, `AlreadyUsed` and `NotFound` are judgments about the ticket;
/// `MalformedInput` and `RegistryUnavailable` are not, and must not be
/// presented to the operator as one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Verdict {
    /// The ticket exists and has not been used.
    Valid(Ticket),

    /// The ticket exists but was already checked in.
    AlreadyUsed(Ticket),

    /// No ticket was minted under this identity.
    NotFound(TicketIdentity),

    /// The input is not a scan code.
    MalformedInput {
        /// The rejected input (trimmed).
        input: String,
        /// Why it was rejected.
        error: CodecError,
    },

    /// The registry could not be reached; retry later.
    RegistryUnavailable {
        /// The identity that was being looked up.
        identity: TicketIdentity,
        /// Infrastructure error description.
        reason: String,
    },
}

/// Tag of a [`Verdict`], without its payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictKind {
    /// See [`Verdict::Valid`]
    Valid,
    /// See [`Verdict::AlreadyUsed`]
    AlreadyUsed,
    /// See [`Verdict::NotFound`]
    NotFound,
    /// See [`Verdict::MalformedInput`]
    MalformedInput,
    /// See [`Verdict::RegistryUnavailable`]
    RegistryUnavailable,
}

impl VerdictKind {
    /// Stable label, used for metrics and wire formats.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Valid => "valid",
            Self::AlreadyUsed => "already_used",
            Self::NotFound => "not_found",
            Self::MalformedInput => "malformed_input",
            Self::RegistryUnavailable => "registry_unavailable",
        }
    }

    /// Message shown to the gate operator.
    #[must_use]
    pub const fn operator_message(self) -> &'static str {
        match self {
            Self::Valid => "Valid ticket. Ready to check in.",
            Self::AlreadyUsed => "Ticket already used. It has been checked in before.",
            Self::NotFound => {
                "Invalid ticket. This ticket does not exist or belongs to another event."
            }
            Self::MalformedInput => {
                "Invalid QR code format. Re-scan the code or enter the token ID manually."
            }
            Self::RegistryUnavailable => "Ticket registry is unreachable. Please try again.",
        }
    }
}

impl fmt::Display for VerdictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Verdict {
    /// The verdict's tag.
    #[must_use]
    pub const fn kind(&self) -> VerdictKind {
        match self {
            Self::Valid(_) => VerdictKind::Valid,
            Self::AlreadyUsed(_) => VerdictKind::AlreadyUsed,
            Self::NotFound(_) => VerdictKind::NotFound,
            Self::MalformedInput { .. } => VerdictKind::MalformedInput,
            Self::RegistryUnavailable { .. } => VerdictKind::RegistryUnavailable,
        }
    }

    /// The ticket snapshot, for verdicts about an existing ticket.
    #[must_use]
    pub const fn ticket(&self) -> Option<&Ticket> {
        match self {
            Self::Valid(ticket) | Self::AlreadyUsed(ticket) => Some(ticket),
            _ => None,
        }
    }

    /// The identity the verdict is about, if the input decoded.
    #[must_use]
    pub const fn identity(&self) -> Option<&TicketIdentity> {
        match self {
            Self::Valid(ticket) | Self::AlreadyUsed(ticket) => Some(&ticket.identity),
            Self::NotFound(identity) | Self::RegistryUnavailable { identity, .. } => Some(identity),
            Self::MalformedInput { .. } => None,
        }
    }

    /// Whether the ticket may be checked in.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }

    /// Whether this is a judgment about the ticket itself.
    #[must_use]
    pub const fn is_judgment(&self) -> bool {
        matches!(self, Self::Valid(_) | Self::AlreadyUsed(_) | Self::NotFound(_))
    }

    /// Message shown to the gate operator.
    #[must_use]
    pub const fn operator_message(&self) -> &'static str {
        self.kind().operator_message()
    }
}
