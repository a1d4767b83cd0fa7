//! Verification endpoints.
//!
//! Ticket judgments (`valid`, `already_used`, `not_found`) are successful
//! responses; an unreadable code or an unreachable registry is not a
//! judgment and is reported as an error.

use crate::error::AppError;
use crate::state::AppState;
use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use ticket_gate_core::{ScanCode, Ticket, Verdict, VerdictKind};

/// Body of `POST /api/verify`.
#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    /// Scanned or pasted scan code
    pub code: String,
}

/// Body of `POST /api/verify/manual`.
#[derive(Debug, Deserialize)]
pub struct ManualVerifyRequest {
    /// Ticket id typed by the operator
    pub ticket_id: String,
}

/// A ticket judgment.
#[derive(Debug, Serialize)]
pub struct VerdictResponse {
    /// Verdict tag
    pub verdict: VerdictKind,
    /// Operator-facing message
    pub message: &'static str,
    /// Scan code of the judged identity
    pub code: ScanCode,
    /// Ticket snapshot, when the ticket exists
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticket: Option<Ticket>,
}

impl TryFrom<Verdict> for VerdictResponse {
    type Error = AppError;

    fn try_from(verdict: Verdict) -> Result<Self, Self::Error> {
        let kind = verdict.kind();
        let message = kind.operator_message();

        match verdict {
            Verdict::Valid(ticket) | Verdict::AlreadyUsed(ticket) => Ok(Self {
                verdict: kind,
                message,
                code: ticket.identity.scan_code(),
                ticket: Some(ticket),
            }),
            Verdict::NotFound(identity) => Ok(Self {
                verdict: kind,
                message,
                code: identity.scan_code(),
                ticket: None,
            }),
            Verdict::MalformedInput { error, .. } => Err(error.into()),
            Verdict::RegistryUnavailable { reason, .. } => Err(AppError::registry_unavailable(
                message,
            )
            .with_source(anyhow::anyhow!(reason))),
        }
    }
}

/// Verify a scanned code.
///
/// # Endpoint
///
/// ```text
/// POST /api/verify
/// {"code": "12345-0x25b2...180F14-84532"}
/// ```
///
/// # Errors
///
/// - 422 `MALFORMED_CODE`: the code is not `<ticketId>-<contract>-<network>`
/// - 503 `REGISTRY_UNAVAILABLE`: the registry could not be reached
pub async fn verify(
    State(state): State<AppState>,
    Json(request): Json<VerifyRequest>,
) -> Result<Json<VerdictResponse>, AppError> {
    let verdict = state.engine.verify(&request.code).await;
    Ok(Json(VerdictResponse::try_from(verdict)?))
}

/// Verify a ticket id for this gate's venue.
///
/// # Endpoint
///
/// ```text
/// POST /api/verify/manual
/// {"ticket_id": "12345"}
/// ```
///
/// # Errors
///
/// Same as [`verify`].
pub async fn verify_manual(
    State(state): State<AppState>,
    Json(request): Json<ManualVerifyRequest>,
) -> Result<Json<VerdictResponse>, AppError> {
    let verdict = state.engine.verify_manual(&request.ticket_id).await;
    Ok(Json(VerdictResponse::try_from(verdict)?))
}
