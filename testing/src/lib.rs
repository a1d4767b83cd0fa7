//! # Ticket Gate Testing
//!
//! Testing utilities and in-memory collaborators for Ticket Gate.
//!
//! This crate provides:
//! - Mock implementations of environment traits ([`FixedClock`])
//! - [`InMemoryTicketRegistry`]: `HashMap`-backed registry, also used by the
//!   gate when no database is configured
//! - [`FlakyRegistry`]: injects transient registry failures
//! - [`ScriptedCamera`]: code reader replaying a fixed script
//! - Fixtures and proptest strategies for identities and scan codes
//!
//! ## Example
//!
//! ```ignore
//! use ticket_gate_testing::{InMemoryTicketRegistry, fixtures, test_clock};
//!
//! #[tokio::test]
//! async fn test_check_in() {
//!     let registry = InMemoryTicketRegistry::new();
//!     registry.issue(fixtures::new_ticket("12345")).await.unwrap();
//!
//!     let engine = VerificationEngine::new(Arc::new(registry), fixtures::venue());
//!     assert!(engine.verify_manual("12345").await.is_valid());
//! }
//! ```

use chrono::{DateTime, Utc};
use ticket_gate_core::environment::Clock;

pub mod camera;
pub mod fixtures;
pub mod registry;

/// Mock implementations for testing.
pub mod mocks {
    use super::{Clock, DateTime, Utc};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making check-in timestamps reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use ticket_gate_testing::mocks::FixedClock;
    /// use ticket_gate_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }
}

/// Test helpers and utilities.
pub mod helpers {
    /// Install a test-friendly tracing subscriber.
    ///
    /// Output goes through the test harness writer, so it is only shown for
    /// failing tests. Safe to call from every test; only the first call
    /// installs the subscriber.
    pub fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("ticket_gate=debug")),
            )
            .with_test_writer()
            .try_init();
    }
}

/// Property-based testing utilities using proptest.
pub mod properties {
    use proptest::collection::vec;
    use proptest::prelude::*;
    use ticket_gate_core::TicketIdentity;

    /// A single identity field: non-empty, separator-free.
    pub fn arb_field() -> impl Strategy<Value = String> {
        "[0-9A-Za-z_.:]{1,24}"
    }

    /// Any valid ticket identity.
    pub fn arb_identity() -> impl Strategy<Value = TicketIdentity> {
        (arb_field(), arb_field(), arb_field()).prop_filter_map(
            "fields must form a valid identity",
            |(ticket_id, contract_address, network_id)| {
                TicketIdentity::parse(&ticket_id, &contract_address, &network_id).ok()
            },
        )
    }

    /// A code with the wrong number of fields, paired with that number.
    pub fn arb_wrong_field_count_code() -> impl Strategy<Value = (String, usize)> {
        prop_oneof![vec(arb_field(), 1..3), vec(arb_field(), 4..8)]
            .prop_map(|fields| (fields.join("-"), fields.len()))
    }
}

// Re-export commonly used items
pub use camera::ScriptedCamera;
pub use mocks::{FixedClock, test_clock};
pub use registry::{FlakyRegistry, InMemoryTicketRegistry};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock() {
        let clock = test_clock();
        let time1 = clock.now();
        let time2 = clock.now();
        assert_eq!(time1, time2);
    }
}
