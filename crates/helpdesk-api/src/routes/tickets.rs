//! Ticket routes.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use helpdesk::{AssignOutcome, AutoAssignReport, Ticket, TicketRequest, TicketStatus};
use serde::Deserialize;

use crate::error::Result;
use crate::state::AppState;

/// Body naming the technician acting on a ticket.
#[derive(Deserialize)]
pub struct TechnicianRequest {
    pub technician_id: String,
}

/// Optional `?status=` filter for the ticket listing.
#[derive(Deserialize)]
pub struct TicketFilter {
    pub status: Option<TicketStatus>,
}

/// List every ticket, optionally by status.
pub async fn list(
    State(state): State<AppState>,
    Query(filter): Query<TicketFilter>,
) -> Result<Json<Vec<Ticket>>> {
    Ok(Json(state.helpdesk.list_tickets(filter.status).await?))
}

/// Submit a ticket.
pub async fn submit(
    State(state): State<AppState>,
    Json(req): Json<TicketRequest>,
) -> Result<(StatusCode, Json<Ticket>)> {
    let ticket = state.helpdesk.submit(req).await?;
    Ok((StatusCode::CREATED, Json(ticket)))
}

/// Get a ticket by ID.
pub async fn get(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Json<Ticket>> {
    Ok(Json(state.helpdesk.get_ticket(id).await?))
}

/// List unassigned tickets.
pub async fn pending(State(state): State<AppState>) -> Result<Json<Vec<Ticket>>> {
    Ok(Json(state.helpdesk.list_pending().await?))
}

/// List a customer's tickets.
pub async fn for_customer(
    State(state): State<AppState>,
    Path(customer_ref): Path<String>,
) -> Result<Json<Vec<Ticket>>> {
    Ok(Json(state.helpdesk.list_for_customer(&customer_ref).await?))
}

/// Technician claims a ticket.
pub async fn claim(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<TechnicianRequest>,
) -> Result<Json<Ticket>> {
    Ok(Json(state.helpdesk.claim(id, &req.technician_id).await?))
}

/// Admin assigns a ticket.
pub async fn assign(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<TechnicianRequest>,
) -> Result<Json<Ticket>> {
    Ok(Json(state.helpdesk.assign(id, &req.technician_id).await?))
}

/// Assigned technician completes a ticket.
pub async fn complete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<TechnicianRequest>,
) -> Result<Json<Ticket>> {
    Ok(Json(state.helpdesk.complete(id, &req.technician_id).await?))
}

/// Auto-assign one ticket.
pub async fn auto_assign_one(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<AssignOutcome>> {
    Ok(Json(state.helpdesk.auto_assign(id).await?))
}

/// Auto-assign every pending ticket.
pub async fn auto_assign_all(State(state): State<AppState>) -> Result<Json<AutoAssignReport>> {
    Ok(Json(state.helpdesk.auto_assign_pending().await?))
}
