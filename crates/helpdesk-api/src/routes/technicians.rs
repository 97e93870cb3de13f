//! Technician routes: location, availability and nearby work.

use axum::extract::{Path, Query, State};
use axum::Json;
use helpdesk::{GeoPoint, NearbyTicket, Nearest, Technician, Ticket};
use serde::Deserialize;

use crate::error::Result;
use crate::state::AppState;

/// Availability update body.
#[derive(Deserialize)]
pub struct AvailabilityRequest {
    pub available: bool,
}

/// Record a technician's location.
pub async fn update_location(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(location): Json<GeoPoint>,
) -> Result<Json<Technician>> {
    Ok(Json(state.helpdesk.update_location(&id, location).await?))
}

/// Set a technician's availability.
pub async fn set_availability(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<AvailabilityRequest>,
) -> Result<Json<Technician>> {
    Ok(Json(state.helpdesk.set_availability(&id, req.available).await?))
}

/// Pending tickets near a technician.
pub async fn nearby(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<NearbyTicket>>> {
    Ok(Json(state.helpdesk.nearby_pending(&id).await?))
}

/// Tickets assigned to a technician.
pub async fn tickets(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Ticket>>> {
    Ok(Json(state.helpdesk.list_for_technician(&id).await?))
}

/// Every technician profile.
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Technician>>> {
    Ok(Json(state.helpdesk.list_technicians().await?))
}

/// Approved technicians currently taking tickets.
pub async fn available(State(state): State<AppState>) -> Result<Json<Vec<Technician>>> {
    Ok(Json(state.helpdesk.available_pool().await?))
}

/// Nearest available technician to `?latitude=..&longitude=..`.
pub async fn nearest(
    State(state): State<AppState>,
    Query(location): Query<GeoPoint>,
) -> Result<Json<Nearest>> {
    Ok(Json(state.helpdesk.require_nearest(location).await?))
}
