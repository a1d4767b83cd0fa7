//! Holder ticket listing.

use crate::error::AppError;
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, State},
};
use ticket_gate_core::{OwnedTicket, OwnerAddress, owned_tickets};

/// List the tickets held by an owner, with the scan code each presents.
///
/// # Endpoint
///
/// ```text
/// GET /api/owners/:owner/tickets
/// ```
///
/// # Errors
///
/// - 503 `REGISTRY_UNAVAILABLE`: the registry could not be reached
pub async fn list_owned(
    State(state): State<AppState>,
    Path(owner): Path<String>,
) -> Result<Json<Vec<OwnedTicket>>, AppError> {
    let owner = OwnerAddress::new(owner);
    let tickets = owned_tickets(state.registry.as_ref(), &owner).await?;
    Ok(Json(tickets))
}
