//! [`RecordStore`] backed by the SQLite database crate.

use async_trait::async_trait;
use database::{
    technician, ticket, user, Database, DatabaseError, GeoPoint, NewTicket, Technician, Ticket,
    TicketStatus, UpdateOutcome, User, UserStatus,
};

use super::RecordStore;
use crate::error::{HelpdeskError, Result};

/// Translate storage errors into engine errors.
///
/// `create_user` reports phone collisions with the phone as the id.
fn store_error(err: DatabaseError) -> HelpdeskError {
    match err {
        DatabaseError::NotFound { entity, id } => HelpdeskError::NotFound { entity, id },
        DatabaseError::AlreadyExists { entity: "User", id } => {
            HelpdeskError::AlreadyRegistered { phone: id }
        }
        other => HelpdeskError::Database(other),
    }
}

#[async_trait]
impl RecordStore for Database {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn insert_user(&self, new_user: &User) -> Result<()> {
        user::create_user(self.pool(), new_user)
            .await
            .map_err(store_error)
    }

    async fn get_user(&self, id: &str) -> Result<Option<User>> {
        match user::get_user(self.pool(), id).await {
            Ok(found) => Ok(Some(found)),
            Err(DatabaseError::NotFound { .. }) => Ok(None),
            Err(e) => Err(store_error(e)),
        }
    }

    async fn find_user_by_phone(&self, phone: &str) -> Result<Option<User>> {
        user::get_user_by_phone(self.pool(), phone)
            .await
            .map_err(store_error)
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        user::list_users(self.pool()).await.map_err(store_error)
    }

    async fn set_user_status(&self, id: &str, status: UserStatus) -> Result<()> {
        user::set_user_status(self.pool(), id, status)
            .await
            .map_err(store_error)
    }

    async fn insert_technician(&self, owner: &User, profile: &Technician) -> Result<()> {
        technician::create_with_user(self.pool(), owner, profile)
            .await
            .map_err(store_error)
    }

    async fn get_technician(&self, user_id: &str) -> Result<Option<Technician>> {
        technician::get_technician(self.pool(), user_id)
            .await
            .map_err(store_error)
    }

    async fn list_technicians(&self) -> Result<Vec<Technician>> {
        technician::list_technicians(self.pool())
            .await
            .map_err(store_error)
    }

    async fn set_technician_available(
        &self,
        user_id: &str,
        available: bool,
        updated_at: &str,
    ) -> Result<()> {
        technician::set_available(self.pool(), user_id, available, updated_at)
            .await
            .map_err(store_error)
    }

    async fn set_technician_location(
        &self,
        user_id: &str,
        location: GeoPoint,
        updated_at: &str,
    ) -> Result<()> {
        technician::set_location(self.pool(), user_id, location, updated_at)
            .await
            .map_err(store_error)
    }

    async fn insert_ticket(&self, new_ticket: &NewTicket) -> Result<Ticket> {
        ticket::insert_ticket(self.pool(), new_ticket)
            .await
            .map_err(store_error)
    }

    async fn get_ticket(&self, id: i64) -> Result<Option<Ticket>> {
        ticket::get_ticket(self.pool(), id)
            .await
            .map_err(store_error)
    }

    async fn list_tickets(&self) -> Result<Vec<Ticket>> {
        ticket::list_tickets(self.pool()).await.map_err(store_error)
    }

    async fn list_tickets_by_status(&self, status: TicketStatus) -> Result<Vec<Ticket>> {
        ticket::list_tickets_by_status(self.pool(), status)
            .await
            .map_err(store_error)
    }

    async fn assign_ticket_if_pending(
        &self,
        id: i64,
        technician_id: &str,
    ) -> Result<UpdateOutcome> {
        ticket::assign_if_pending(self.pool(), id, technician_id)
            .await
            .map_err(store_error)
    }

    async fn complete_ticket_if_assigned(
        &self,
        id: i64,
        technician_id: &str,
    ) -> Result<UpdateOutcome> {
        ticket::complete_if_assigned(self.pool(), id, technician_id)
            .await
            .map_err(store_error)
    }
}
