//! Check-in endpoint.

use crate::error::AppError;
use crate::state::AppState;
use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use ticket_gate_core::{CHECKED_IN_MESSAGE, Ticket, codec};

/// Body of `POST /api/check-in`.
#[derive(Debug, Deserialize)]
pub struct CheckInRequest {
    /// Scan code of the ticket to consume
    pub code: String,
}

/// Successful check-in.
#[derive(Debug, Serialize)]
pub struct CheckInResponse {
    /// Operator-facing confirmation
    pub message: &'static str,
    /// The consumed ticket
    pub ticket: Ticket,
}

/// Consume a ticket.
///
/// Does not rely on an earlier verification: the registry's conditional
/// update decides. When two devices submit the same ticket, exactly one gets
/// 200 and the other 409.
///
/// # Endpoint
///
/// ```text
/// POST /api/check-in
/// {"code": "12345-0x25b2...180F14-84532"}
/// ```
///
/// # Errors
///
/// - 409 `ALREADY_USED`: the ticket was consumed first
/// - 404 `NOT_FOUND`: no such ticket
/// - 422 `MALFORMED_CODE`: the code does not decode
/// - 503 `REGISTRY_UNAVAILABLE`: the registry could not be reached
pub async fn check_in(
    State(state): State<AppState>,
    Json(request): Json<CheckInRequest>,
) -> Result<Json<CheckInResponse>, AppError> {
    let identity = codec::decode(request.code.trim())?;
    let ticket = state.coordinator.check_in(&identity).await?;

    Ok(Json(CheckInResponse {
        message: CHECKED_IN_MESSAGE,
        ticket,
    }))
}
