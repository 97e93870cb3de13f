//! Error types for helpdesk operations.

use database::TicketStatus;
use thiserror::Error;

/// Errors that can occur in the helpdesk engine.
///
/// None of these are fatal: a failed operation leaves every record as it was.
#[derive(Debug, Error)]
pub enum HelpdeskError {
    /// A referenced ticket, user or technician does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// The ticket was assigned by someone else before our write landed.
    #[error("ticket {ticket_id} is already assigned to {assigned_to}")]
    AlreadyAssigned { ticket_id: i64, assigned_to: String },

    /// No approved, available technician could take the ticket.
    #[error("no technician available")]
    NoTechnicianAvailable,

    /// A required field was empty or malformed.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A user with this phone number is already registered.
    #[error("phone number already registered: {phone}")]
    AlreadyRegistered { phone: String },

    /// The technician has not been approved by an admin yet.
    #[error("technician {technician_id} is not approved")]
    NotApproved { technician_id: String },

    /// Only the assigned technician may act on this ticket.
    #[error("ticket {ticket_id} is not assigned to {technician_id}")]
    NotAssignee { ticket_id: i64, technician_id: String },

    /// The ticket's current status does not allow the requested action.
    #[error("cannot {action} ticket {ticket_id} while it is {from}")]
    InvalidTransition {
        ticket_id: i64,
        from: TicketStatus,
        action: &'static str,
    },

    /// Record store failure.
    #[error("store error: {0}")]
    Database(#[from] database::DatabaseError),
}

impl From<database::ValidationError> for HelpdeskError {
    fn from(err: database::ValidationError) -> Self {
        HelpdeskError::InvalidInput(err.to_string())
    }
}

impl HelpdeskError {
    pub(crate) fn not_found(entity: &'static str, id: impl ToString) -> Self {
        HelpdeskError::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

/// Result type for helpdesk operations.
pub type Result<T> = std::result::Result<T, HelpdeskError>;
