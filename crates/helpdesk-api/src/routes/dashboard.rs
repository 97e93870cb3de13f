//! Desk statistics.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::error::Result;
use crate::state::AppState;

/// Desk statistics.
#[derive(Clone, Serialize)]
pub struct Stats {
    pub users: Vec<CountByKey>,
    pub tickets: Vec<CountByKey>,
    pub pending_approvals: usize,
    pub available_technicians: usize,
}

/// A grouped count, e.g. users per role.
#[derive(Clone, Serialize)]
pub struct CountByKey {
    pub key: String,
    pub count: i64,
}

/// Get desk statistics as JSON.
pub async fn stats_api(State(state): State<AppState>) -> Result<Json<Stats>> {
    let pool = state.db.pool();

    let users = database::user::count_users_by_role(pool).await?;
    let tickets = database::ticket::count_tickets_by_status(pool).await?;
    let pending_approvals = state.helpdesk.list_pending_approvals().await?.len();
    let available_technicians = state.helpdesk.available_pool().await?.len();

    Ok(Json(Stats {
        users: to_counts(users),
        tickets: to_counts(tickets),
        pending_approvals,
        available_technicians,
    }))
}

fn to_counts(rows: Vec<(String, i64)>) -> Vec<CountByKey> {
    rows.into_iter()
        .map(|(key, count)| CountByKey { key, count })
        .collect()
}
