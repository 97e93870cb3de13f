//! Registration, lookup and approval routes.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use helpdesk::{HelpdeskError, Registration, User};

use crate::error::Result;
use crate::state::AppState;

/// Register a user.
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<Registration>,
) -> Result<(StatusCode, Json<User>)> {
    let user = state.helpdesk.register(req).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// List all users.
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<User>>> {
    Ok(Json(state.helpdesk.list_users().await?))
}

/// List technicians awaiting approval.
pub async fn pending_approvals(State(state): State<AppState>) -> Result<Json<Vec<User>>> {
    Ok(Json(state.helpdesk.list_pending_approvals().await?))
}

/// Look up a user by phone number.
pub async fn by_phone(
    State(state): State<AppState>,
    Path(phone): Path<String>,
) -> Result<Json<User>> {
    let user = state
        .helpdesk
        .find_by_phone(&phone)
        .await?
        .ok_or(HelpdeskError::NotFound {
            entity: "User",
            id: phone,
        })?;
    Ok(Json(user))
}

/// Approve a technician.
pub async fn approve(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<User>> {
    Ok(Json(state.helpdesk.approve(&id).await?))
}
