//! Ticket lifecycle: submission, listing, claim/assign and completion.
//!
//! ```text
//! Pending --claim/assign--> Assigned --complete--> Completed
//! ```
//!
//! A ticket is pending exactly when it has no assigned technician.

use std::sync::Arc;

use chrono::Utc;
use database::validation::{
    validate_coordinates, validate_max_length, validate_required, MAX_FIELD_LENGTH,
    MAX_ISSUE_LENGTH,
};
use database::{GeoPoint, NewTicket, Ticket, TicketStatus, UpdateOutcome};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::HelpdeskConfig;
use crate::error::{HelpdeskError, Result};
use crate::store::RecordStore;

/// Current UTC time in SQLite `datetime('now')` format.
pub(crate) fn timestamp() -> String {
    Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// A ticket as submitted by a customer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TicketRequest {
    /// Name, phone or id identifying the customer. Required.
    pub customer_ref: String,
    #[serde(default)]
    pub issue: String,
    #[serde(default)]
    pub device: String,
    /// Free-text location.
    #[serde(default)]
    pub address: String,
    /// Coordinates, when the customer shared them.
    #[serde(default)]
    pub coords: Option<GeoPoint>,
    #[serde(default)]
    pub preferred_date: String,
}

impl TicketRequest {
    fn validate(self) -> Result<NewTicket> {
        let customer_ref = validate_required("customer_ref", &self.customer_ref, MAX_FIELD_LENGTH)
            .map_err(|_| {
                HelpdeskError::InvalidInput("customer reference is required".to_string())
            })?
            .to_string();

        validate_max_length("issue", &self.issue, MAX_ISSUE_LENGTH)?;
        validate_max_length("device", &self.device, MAX_FIELD_LENGTH)?;
        validate_max_length("address", &self.address, MAX_FIELD_LENGTH)?;
        validate_max_length("preferred_date", &self.preferred_date, MAX_FIELD_LENGTH)?;
        if let Some(point) = self.coords {
            validate_coordinates(point)?;
        }

        Ok(NewTicket {
            customer_ref,
            issue: self.issue.trim().to_string(),
            device: self.device.trim().to_string(),
            address: self.address.trim().to_string(),
            coords: self.coords,
            preferred_date: self.preferred_date.trim().to_string(),
            created_at: timestamp(),
        })
    }
}

/// The helpdesk engine.
///
/// Cheap to clone; all clones share the same record store.
#[derive(Clone)]
pub struct Helpdesk {
    pub(crate) store: Arc<dyn RecordStore>,
    pub(crate) config: HelpdeskConfig,
}

impl Helpdesk {
    /// Create an engine with the default configuration.
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self::with_config(store, HelpdeskConfig::default())
    }

    pub fn with_config(store: Arc<dyn RecordStore>, config: HelpdeskConfig) -> Self {
        debug!(store = store.name(), ?config, "Helpdesk engine created");
        Self { store, config }
    }

    pub fn config(&self) -> &HelpdeskConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    /// Submit a new ticket. It always starts pending and unassigned.
    ///
    /// No duplicate detection is performed: submitting twice creates two tickets.
    pub async fn submit(&self, request: TicketRequest) -> Result<Ticket> {
        let new_ticket = request.validate()?;
        let ticket = self.store.insert_ticket(&new_ticket).await?;

        info!(
            ticket_id = ticket.id,
            customer = %ticket.customer_ref,
            "Ticket submitted"
        );
        Ok(ticket)
    }

    /// Get a ticket by ID.
    pub async fn get_ticket(&self, ticket_id: i64) -> Result<Ticket> {
        self.store
            .get_ticket(ticket_id)
            .await?
            .ok_or_else(|| HelpdeskError::not_found("Ticket", ticket_id))
    }

    /// Every ticket, oldest first, optionally limited to one status.
    pub async fn list_tickets(&self, status: Option<TicketStatus>) -> Result<Vec<Ticket>> {
        match status {
            Some(status) => self.store.list_tickets_by_status(status).await,
            None => self.store.list_tickets().await,
        }
    }

    /// All unassigned tickets, oldest first.
    pub async fn list_pending(&self) -> Result<Vec<Ticket>> {
        let tickets = self.list_tickets(Some(TicketStatus::Pending)).await?;

        debug!(count = tickets.len(), "Listed pending tickets");
        Ok(tickets)
    }

    /// All tickets submitted under `customer_ref`, oldest first.
    pub async fn list_for_customer(&self, customer_ref: &str) -> Result<Vec<Ticket>> {
        let customer_ref = customer_ref.trim();
        Ok(self
            .store
            .list_tickets()
            .await?
            .into_iter()
            .filter(|t| t.customer_ref == customer_ref)
            .collect())
    }

    /// All tickets assigned to a technician, including completed ones.
    pub async fn list_for_technician(&self, technician_id: &str) -> Result<Vec<Ticket>> {
        Ok(self
            .store
            .list_tickets()
            .await?
            .into_iter()
            .filter(|t| !t.assigned_technician.is_empty() && t.assigned_technician == technician_id)
            .collect())
    }

    /// Technician self-assignment to a pending ticket.
    pub async fn claim(&self, ticket_id: i64, technician_id: &str) -> Result<Ticket> {
        self.take(ticket_id, technician_id, "claim").await
    }

    /// Admin assignment of a pending ticket. Same contract as [`Helpdesk::claim`].
    pub async fn assign(&self, ticket_id: i64, technician_id: &str) -> Result<Ticket> {
        self.take(ticket_id, technician_id, "assign").await
    }

    async fn take(&self, ticket_id: i64, technician_id: &str, action: &str) -> Result<Ticket> {
        self.require_approved_technician(technician_id).await?;

        match self
            .store
            .assign_ticket_if_pending(ticket_id, technician_id)
            .await?
        {
            UpdateOutcome::Applied => {
                info!(ticket_id, technician = technician_id, action, "Ticket assigned");
                self.mark_available(technician_id, false).await;
                self.get_ticket(ticket_id).await
            }
            UpdateOutcome::Conflict => {
                let current = self.get_ticket(ticket_id).await?;
                warn!(
                    ticket_id,
                    technician = technician_id,
                    assigned_to = %current.assigned_technician,
                    action,
                    "Ticket already assigned"
                );
                Err(HelpdeskError::AlreadyAssigned {
                    ticket_id,
                    assigned_to: current.assigned_technician,
                })
            }
        }
    }

    /// Close an assigned ticket. Only the assigned technician may do this.
    pub async fn complete(&self, ticket_id: i64, technician_id: &str) -> Result<Ticket> {
        let ticket = self.get_ticket(ticket_id).await?;
        check_completable(&ticket, technician_id)?;

        match self
            .store
            .complete_ticket_if_assigned(ticket_id, technician_id)
            .await?
        {
            UpdateOutcome::Applied => {
                info!(ticket_id, technician = technician_id, "Ticket completed");
                self.mark_available(technician_id, true).await;
                self.get_ticket(ticket_id).await
            }
            UpdateOutcome::Conflict => {
                // Someone else moved the ticket between our read and write.
                let current = self.get_ticket(ticket_id).await?;
                check_completable(&current, technician_id)?;
                Err(HelpdeskError::InvalidTransition {
                    ticket_id,
                    from: current.status,
                    action: "complete",
                })
            }
        }
    }

    /// Flip technician availability after an assignment change, if configured.
    ///
    /// The ticket write has already landed at this point, so a failure here is
    /// logged rather than returned.
    pub(crate) async fn mark_available(&self, technician_id: &str, available: bool) {
        if !self.config.release_on_assign {
            return;
        }

        if let Err(e) = self
            .store
            .set_technician_available(technician_id, available, &timestamp())
            .await
        {
            warn!(
                technician = technician_id,
                available,
                error = %e,
                "Failed to update technician availability"
            );
        }
    }
}

fn check_completable(ticket: &Ticket, technician_id: &str) -> Result<()> {
    match ticket.status {
        TicketStatus::Assigned if ticket.assigned_technician == technician_id => Ok(()),
        TicketStatus::Assigned => Err(HelpdeskError::NotAssignee {
            ticket_id: ticket.id,
            technician_id: technician_id.to_string(),
        }),
        status => Err(HelpdeskError::InvalidTransition {
            ticket_id: ticket.id,
            from: status,
            action: "complete",
        }),
    }
}
