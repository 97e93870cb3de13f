//! The record store seam.
//!
//! The engine never holds state of its own: every operation reads a fresh
//! snapshot through [`RecordStore`] and writes back single-record updates.
//! Assignment goes through a conditional update so that two writers racing
//! for the same ticket cannot both win.

mod memory;
mod sqlite;

pub use memory::MemoryStore;

use async_trait::async_trait;
use database::{
    GeoPoint, NewTicket, Technician, Ticket, TicketStatus, UpdateOutcome, User, UserStatus,
};

use crate::error::Result;

/// Typed access to the users, technicians and tickets tables.
///
/// Listing methods return records in insertion order. This trait is
/// object-safe and is normally used as `Arc<dyn RecordStore>`.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Human-readable name of the backend, for logs.
    fn name(&self) -> &str;

    /// Append a user. Fails with `AlreadyRegistered` if the phone is taken.
    async fn insert_user(&self, user: &User) -> Result<()>;

    async fn get_user(&self, id: &str) -> Result<Option<User>>;

    /// Look up a user by normalized phone number.
    async fn find_user_by_phone(&self, phone: &str) -> Result<Option<User>>;

    async fn list_users(&self) -> Result<Vec<User>>;

    /// Fails with `NotFound` for unknown ids.
    async fn set_user_status(&self, id: &str, status: UserStatus) -> Result<()>;

    /// Append a technician's user record together with their profile.
    ///
    /// Either both records are stored or neither is. Fails with
    /// `AlreadyRegistered` if the phone is taken.
    async fn insert_technician(&self, user: &User, technician: &Technician) -> Result<()>;

    async fn get_technician(&self, user_id: &str) -> Result<Option<Technician>>;

    async fn list_technicians(&self) -> Result<Vec<Technician>>;

    async fn set_technician_available(
        &self,
        user_id: &str,
        available: bool,
        updated_at: &str,
    ) -> Result<()>;

    async fn set_technician_location(
        &self,
        user_id: &str,
        location: GeoPoint,
        updated_at: &str,
    ) -> Result<()>;

    /// Append a ticket and return it with its assigned id.
    async fn insert_ticket(&self, ticket: &NewTicket) -> Result<Ticket>;

    async fn get_ticket(&self, id: i64) -> Result<Option<Ticket>>;

    async fn list_tickets(&self) -> Result<Vec<Ticket>>;

    async fn list_tickets_by_status(&self, status: TicketStatus) -> Result<Vec<Ticket>>;

    /// Set the assignee only if the ticket is still pending at write time.
    async fn assign_ticket_if_pending(&self, id: i64, technician_id: &str)
        -> Result<UpdateOutcome>;

    /// Mark completed only if the ticket is assigned to `technician_id`.
    async fn complete_ticket_if_assigned(
        &self,
        id: i64,
        technician_id: &str,
    ) -> Result<UpdateOutcome>;
}
