//! Application state for Axum handlers.

use std::sync::Arc;
use ticket_gate_core::{
    CheckInCoordinator, Clock, RetryPolicy, TicketRegistry, VenueContext, VerificationEngine,
};

/// Application state shared across all HTTP handlers.
///
/// Every check-in device talking to this server shares the same registry,
/// so the registry's atomic update decides races between devices.
/// Cloned (cheaply via `Arc`) for each request.
#[derive(Clone)]
pub struct AppState {
    /// Read-only verifier
    pub engine: Arc<VerificationEngine>,
    /// Consumes tickets
    pub coordinator: Arc<CheckInCoordinator>,
    /// Authoritative ticket store
    pub registry: Arc<dyn TicketRegistry>,
}

impl AppState {
    /// Wire the engine and coordinator over `registry`.
    #[must_use]
    pub fn new(
        registry: Arc<dyn TicketRegistry>,
        venue: VenueContext,
        clock: Arc<dyn Clock>,
        retry: RetryPolicy,
    ) -> Self {
        let engine = VerificationEngine::new(Arc::clone(&registry), venue).with_retry_policy(retry);
        let coordinator = CheckInCoordinator::new(Arc::clone(&registry), clock);

        Self {
            engine: Arc::new(engine),
            coordinator: Arc::new(coordinator),
            registry,
        }
    }
}
