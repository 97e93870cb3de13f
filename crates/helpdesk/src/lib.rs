//! Ticket lifecycle and assignment engine for a small IT helpdesk.
//!
//! Customers submit tickets, technicians register and wait for an admin to
//! approve them, and pending tickets go to technicians by claim, by admin
//! assignment, or automatically to the nearest available technician.
//!
//! The engine owns no state. Records live in a [`RecordStore`]: either the
//! SQLite [`database::Database`] or the in-memory [`MemoryStore`].
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use helpdesk::{GeoPoint, Helpdesk, MemoryStore, Registration, Role, TicketRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), helpdesk::HelpdeskError> {
//!     let desk = Helpdesk::new(Arc::new(MemoryStore::new()));
//!
//!     let ana = desk
//!         .register(Registration::new("Ana", "+15550000001", Role::Technician))
//!         .await?;
//!     desk.approve(&ana.id).await?;
//!     desk.update_location(&ana.id, GeoPoint::new(10.0, 10.0)).await?;
//!
//!     let ticket = desk
//!         .submit(TicketRequest {
//!             customer_ref: "Bob".to_string(),
//!             issue: "Laptop will not boot".to_string(),
//!             coords: Some(GeoPoint::new(10.01, 10.01)),
//!             ..Default::default()
//!         })
//!         .await?;
//!
//!     let report = desk.auto_assign_pending().await?;
//!     assert_eq!(report.assigned[0].ticket_id, ticket.id);
//!     Ok(())
//! }
//! ```

pub mod assignment;
pub mod config;
pub mod error;
pub mod identity;
pub mod lifecycle;
pub mod store;

pub use assignment::{
    find_nearest, geodesic_distance_km, AssignOutcome, Assignment, AutoAssignReport, NearbyTicket,
    Nearest, UnassignedReason,
};
pub use config::HelpdeskConfig;
pub use error::{HelpdeskError, Result};
pub use identity::Registration;
pub use lifecycle::{Helpdesk, TicketRequest};
pub use store::{MemoryStore, RecordStore};

// Record types, re-exported so callers need not depend on `database` directly.
pub use database::{GeoPoint, Role, Technician, Ticket, TicketStatus, User, UserStatus};
