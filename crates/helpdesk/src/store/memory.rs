//! In-memory record store.

use async_trait::async_trait;
use database::{
    GeoPoint, NewTicket, Technician, Ticket, TicketStatus, UpdateOutcome, User, UserStatus,
};
use indexmap::IndexMap;
use tokio::sync::RwLock;

use super::RecordStore;
use crate::error::{HelpdeskError, Result};

#[derive(Debug, Default)]
struct Tables {
    users: IndexMap<String, User>,
    technicians: IndexMap<String, Technician>,
    tickets: IndexMap<i64, Ticket>,
    last_ticket_id: i64,
}

impl Tables {
    fn check_new_user(&self, user: &User) -> Result<()> {
        if self.users.values().any(|u| u.phone == user.phone) {
            return Err(HelpdeskError::AlreadyRegistered {
                phone: user.phone.clone(),
            });
        }
        if self.users.contains_key(&user.id) {
            return Err(HelpdeskError::InvalidInput(format!(
                "duplicate user id: {}",
                user.id
            )));
        }
        Ok(())
    }
}

/// A [`RecordStore`] kept entirely in memory.
///
/// Tables are insertion-ordered maps behind a single lock, so conditional
/// updates are atomic with respect to every other operation.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn insert_user(&self, user: &User) -> Result<()> {
        let mut tables = self.tables.write().await;
        tables.check_new_user(user)?;
        tables.users.insert(user.id.clone(), user.clone());
        Ok(())
    }

    async fn get_user(&self, id: &str) -> Result<Option<User>> {
        Ok(self.tables.read().await.users.get(id).cloned())
    }

    async fn find_user_by_phone(&self, phone: &str) -> Result<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.phone == phone).cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        Ok(self.tables.read().await.users.values().cloned().collect())
    }

    async fn set_user_status(&self, id: &str, status: UserStatus) -> Result<()> {
        let mut tables = self.tables.write().await;
        let user = tables
            .users
            .get_mut(id)
            .ok_or_else(|| HelpdeskError::not_found("User", id))?;
        user.status = status;
        Ok(())
    }

    async fn insert_technician(&self, user: &User, technician: &Technician) -> Result<()> {
        let mut tables = self.tables.write().await;

        tables.check_new_user(user)?;
        if technician.user_id != user.id {
            return Err(HelpdeskError::not_found("User", &technician.user_id));
        }
        if tables.technicians.contains_key(&technician.user_id) {
            return Err(HelpdeskError::InvalidInput(format!(
                "technician profile already exists: {}",
                technician.user_id
            )));
        }

        tables.users.insert(user.id.clone(), user.clone());
        tables
            .technicians
            .insert(technician.user_id.clone(), technician.clone());
        Ok(())
    }

    async fn get_technician(&self, user_id: &str) -> Result<Option<Technician>> {
        Ok(self.tables.read().await.technicians.get(user_id).cloned())
    }

    async fn list_technicians(&self) -> Result<Vec<Technician>> {
        Ok(self
            .tables
            .read()
            .await
            .technicians
            .values()
            .cloned()
            .collect())
    }

    async fn set_technician_available(
        &self,
        user_id: &str,
        available: bool,
        updated_at: &str,
    ) -> Result<()> {
        let mut tables = self.tables.write().await;
        let technician = tables
            .technicians
            .get_mut(user_id)
            .ok_or_else(|| HelpdeskError::not_found("Technician", user_id))?;
        technician.available = available;
        technician.updated_at = updated_at.to_string();
        Ok(())
    }

    async fn set_technician_location(
        &self,
        user_id: &str,
        location: GeoPoint,
        updated_at: &str,
    ) -> Result<()> {
        let mut tables = self.tables.write().await;
        let technician = tables
            .technicians
            .get_mut(user_id)
            .ok_or_else(|| HelpdeskError::not_found("Technician", user_id))?;
        technician.latitude = location.latitude;
        technician.longitude = location.longitude;
        technician.updated_at = updated_at.to_string();
        Ok(())
    }

    async fn insert_ticket(&self, ticket: &NewTicket) -> Result<Ticket> {
        let mut tables = self.tables.write().await;
        tables.last_ticket_id += 1;
        let stored = ticket.clone().into_ticket(tables.last_ticket_id);
        tables.tickets.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn get_ticket(&self, id: i64) -> Result<Option<Ticket>> {
        Ok(self.tables.read().await.tickets.get(&id).cloned())
    }

    async fn list_tickets(&self) -> Result<Vec<Ticket>> {
        Ok(self.tables.read().await.tickets.values().cloned().collect())
    }

    async fn list_tickets_by_status(&self, status: TicketStatus) -> Result<Vec<Ticket>> {
        let tables = self.tables.read().await;
        Ok(tables
            .tickets
            .values()
            .filter(|t| t.status == status)
            .cloned()
            .collect())
    }

    async fn assign_ticket_if_pending(
        &self,
        id: i64,
        technician_id: &str,
    ) -> Result<UpdateOutcome> {
        let mut tables = self.tables.write().await;
        let ticket = tables
            .tickets
            .get_mut(&id)
            .ok_or_else(|| HelpdeskError::not_found("Ticket", id))?;

        if !ticket.is_pending() || !ticket.assigned_technician.is_empty() {
            return Ok(UpdateOutcome::Conflict);
        }

        ticket.assigned_technician = technician_id.to_string();
        ticket.status = TicketStatus::Assigned;
        Ok(UpdateOutcome::Applied)
    }

    async fn complete_ticket_if_assigned(
        &self,
        id: i64,
        technician_id: &str,
    ) -> Result<UpdateOutcome> {
        let mut tables = self.tables.write().await;
        let ticket = tables
            .tickets
            .get_mut(&id)
            .ok_or_else(|| HelpdeskError::not_found("Ticket", id))?;

        if ticket.status != TicketStatus::Assigned || ticket.assigned_technician != technician_id {
            return Ok(UpdateOutcome::Conflict);
        }

        ticket.status = TicketStatus::Completed;
        Ok(UpdateOutcome::Applied)
    }
}
