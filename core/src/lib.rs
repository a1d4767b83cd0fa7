//! # Ticket Gate Core
//!
//! Verification and check-in protocol for NFT event tickets.
//!
//! A minted ticket is named by its [`TicketIdentity`]: the ticket id, the
//! issuing contract and the network the contract lives on. The identity is
//! encoded into a compact [`ScanCode`] that a holder presents as a QR code at
//! the venue entrance. This crate turns a scanned (or typed) code back into a
//! trust decision and records, exactly once, that the ticket was consumed.
//!
//! ## Components
//!
//! - [`codec`]: deterministic encode/decode between identity and scan code
//! - [`registry`]: the authoritative ticket store, consumed as a trait
//! - [`verification`]: classifies input into a [`Verdict`]
//! - [`check_in`]: the one-way valid → used transition
//! - [`scan`]: scoped lifecycle of a code reader feeding the engine
//! - [`station`]: per-device controller holding the most recent verdict
//! - [`wallet`]: holder view of owned tickets and their scan codes
//!
//! ## Data Flow
//!
//! ```text
//! ScanSession / manual input
//!         │
//!         ▼
//!   codec::decode ──► VerificationEngine ──lookup──► TicketRegistry
//!                             │                            ▲
//!                          Verdict                         │
//!                             │                      mark_used (atomic)
//!                             ▼                            │
//!                     CheckInCoordinator ──────────────────┘
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use ticket_gate_core::{CheckInCoordinator, VerificationEngine, Verdict};
//!
//! let verdict = engine.verify("12345-0x25b2...180F14-84532").await;
//! if let Verdict::Valid(ticket) = &verdict {
//!     coordinator.check_in(&ticket.identity).await?;
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod check_in;
pub mod codec;
pub mod identity;
pub mod registry;
pub mod retry;
pub mod scan;
pub mod station;
pub mod ticket;
pub mod verdict;
pub mod verification;
pub mod wallet;

/// Environment module - injected dependencies.
///
/// Time is the only ambient dependency of the protocol: check-ins are stamped
/// with the clock's current time so tests can pin it.
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Clock trait - abstracts time operations for testability
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Wall-clock time.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }
}

pub use check_in::{CHECKED_IN_MESSAGE, CheckInCoordinator, CheckInError};
pub use codec::{CodecError, ScanCode, decode, encode};
pub use environment::{Clock, SystemClock};
pub use identity::{
    ContractAddress, EventId, IdentityError, NetworkId, OwnerAddress, SEPARATOR, TicketId,
    TicketIdentity,
};
pub use registry::{RegistryError, RegistryFuture, TicketRegistry};
pub use retry::RetryPolicy;
pub use scan::{Camera, CameraFeed, ScanError, ScanSession, Scanner};
pub use station::GateStation;
pub use ticket::{NewTicket, Ticket};
pub use verdict::{Verdict, VerdictKind};
pub use verification::{VenueContext, VerificationEngine};
pub use wallet::{OwnedTicket, owned_tickets};
