//! Gate station: the per-device controller.
//!
//! Holds the most recent verdict for one check-in device and only lets a
//! check-in through when that verdict is `Valid`. After every check-in
//! attempt the held verdict is refreshed, so the operator never acts on a
//! stale `Valid`.

use crate::check_in::{CheckInCoordinator, CheckInError};
use crate::scan::{ScanError, Scanner};
use crate::ticket::Ticket;
use crate::verdict::Verdict;
use crate::verification::VerificationEngine;
use std::sync::Arc;

/// State of one check-in device.
///
/// Owned by a single operator loop; every mutating operation takes
/// `&mut self`.
pub struct GateStation {
    engine: Arc<VerificationEngine>,
    coordinator: Arc<CheckInCoordinator>,
    current: Option<Verdict>,
}

impl GateStation {
    /// Create a station with no verdict.
    #[must_use]
    pub const fn new(engine: Arc<VerificationEngine>, coordinator: Arc<CheckInCoordinator>) -> Self {
        Self {
            engine,
            coordinator,
            current: None,
        }
    }

    /// The most recent verdict, if any.
    #[must_use]
    pub const fn current(&self) -> Option<&Verdict> {
        self.current.as_ref()
    }

    /// Verify a scanned or pasted code and hold the verdict.
    pub async fn submit_code(&mut self, code: &str) -> &Verdict {
        let verdict = self.engine.verify(code).await;
        self.current.insert(verdict)
    }

    /// Verify a manually entered ticket id and hold the verdict.
    pub async fn submit_manual(&mut self, ticket_id: &str) -> &Verdict {
        let verdict = self.engine.verify_manual(ticket_id).await;
        self.current.insert(verdict)
    }

    /// Scan one code with `scanner`, then verify it.
    ///
    /// The scanner is stopped before verification starts.
    ///
    /// # Errors
    ///
    /// Returns the scanner's error when no code could be read; the held
    /// verdict is left unchanged in that case.
    pub async fn scan(&mut self, scanner: &mut Scanner) -> Result<&Verdict, ScanError> {
        let payload = scanner.scan_once().await?;
        Ok(self.submit_code(&payload).await)
    }

    /// Forget the held verdict.
    pub fn clear(&mut self) {
        self.current = None;
    }

    /// Check in the ticket of the held `Valid` verdict.
    ///
    /// On success the held verdict becomes `AlreadyUsed` for the consumed
    /// ticket. When the check-in loses a race or the ticket vanished, the
    /// ticket is re-verified so the held verdict reflects the registry.
    ///
    /// # Errors
    ///
    /// - [`CheckInError::NotVerified`]: no held verdict, or it is not `Valid`
    /// - any error from [`CheckInCoordinator::check_in`]
    pub async fn check_in(&mut self) -> Result<Ticket, CheckInError> {
        let Some(Verdict::Valid(ticket)) = &self.current else {
            return Err(CheckInError::NotVerified);
        };
        let identity = ticket.identity.clone();

        match self.coordinator.check_in(&identity).await {
            Ok(ticket) => {
                self.current = Some(Verdict::AlreadyUsed(ticket.clone()));
                Ok(ticket)
            }
            Err(err @ (CheckInError::AlreadyUsed { .. } | CheckInError::NotFound(_))) => {
                let verdict = self.engine.verify(identity.scan_code().as_str()).await;
                self.current = Some(verdict);
                Err(err)
            }
            Err(err) => Err(err),
        }
    }
}
