//! Application state shared across handlers.

use std::sync::Arc;

use database::Database;
use helpdesk::{Helpdesk, HelpdeskConfig};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Database connection, for statistics queries.
    pub db: Database,
    /// Engine over the same database.
    pub helpdesk: Helpdesk,
}

impl AppState {
    /// Create new application state.
    pub fn new(db: Database, config: HelpdeskConfig) -> Self {
        let helpdesk = Helpdesk::with_config(Arc::new(db.clone()), config);
        Self { db, helpdesk }
    }
}
