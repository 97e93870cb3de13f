//! Route handlers for the helpdesk API.

pub mod dashboard;
pub mod health;
pub mod technicians;
pub mod tickets;
pub mod users;

use axum::routing::{get, post, put};
use axum::Router;

use crate::state::AppState;

/// Build the router with all routes.
pub fn router() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(health::health))
        .route("/api/stats", get(dashboard::stats_api))
        // Users
        .route("/api/users", get(users::list).post(users::register))
        .route("/api/users/pending", get(users::pending_approvals))
        .route("/api/users/by-phone/:phone", get(users::by_phone))
        .route("/api/users/:id/approve", post(users::approve))
        // Technicians
        .route("/api/technicians", get(technicians::list))
        .route("/api/technicians/available", get(technicians::available))
        .route("/api/technicians/nearest", get(technicians::nearest))
        .route("/api/technicians/:id/location", put(technicians::update_location))
        .route(
            "/api/technicians/:id/availability",
            put(technicians::set_availability),
        )
        .route("/api/technicians/:id/nearby", get(technicians::nearby))
        .route("/api/technicians/:id/tickets", get(technicians::tickets))
        // Tickets
        .route("/api/tickets", get(tickets::list).post(tickets::submit))
        .route("/api/tickets/pending", get(tickets::pending))
        .route("/api/tickets/auto-assign", post(tickets::auto_assign_all))
        .route(
            "/api/tickets/customer/:customer_ref",
            get(tickets::for_customer),
        )
        .route("/api/tickets/:id", get(tickets::get))
        .route("/api/tickets/:id/claim", post(tickets::claim))
        .route("/api/tickets/:id/assign", post(tickets::assign))
        .route("/api/tickets/:id/complete", post(tickets::complete))
        .route("/api/tickets/:id/auto-assign", post(tickets::auto_assign_one))
}
