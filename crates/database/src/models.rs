//! Database models.
//!
//! Every table has an explicit row type; enum columns are stored as
//! lowercase text and decoded through `sqlx::Type`.

use std::fmt;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Role a user registered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Role {
    Customer,
    Technician,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Technician => "technician",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Approval status of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum UserStatus {
    Pending,
    Approved,
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Pending => "pending",
            UserStatus::Approved => "approved",
        }
    }
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle status of a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum TicketStatus {
    /// Waiting for a technician.
    Pending,
    /// Claimed by or assigned to a technician.
    Assigned,
    /// Closed by the assigned technician.
    Completed,
}

impl TicketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Pending => "pending",
            TicketStatus::Assigned => "assigned",
            TicketStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// A registered user, identified by a generated UUID and keyed by phone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Generated UUID (e.g., "c27fb365-0c84-4cf2-8555-814bb065e448")
    pub id: String,
    /// Display name
    pub name: String,
    /// Normalized phone number, unique across users
    pub phone: String,
    /// Optional contact email
    pub email: Option<String>,
    pub role: Role,
    pub status: UserStatus,
    /// Registration timestamp.
    pub created_at: String,
}

impl User {
    pub fn is_approved(&self) -> bool {
        self.status == UserStatus::Approved
    }
}

/// Technician profile, one per user registered as a technician.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Technician {
    /// ID of the owning user.
    pub user_id: String,
    pub name: String,
    /// Whether the technician is accepting new tickets.
    pub available: bool,
    /// Last known latitude.
    pub latitude: f64,
    /// Last known longitude.
    pub longitude: f64,
    /// Last update timestamp.
    pub updated_at: String,
}

impl Technician {
    pub fn location(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }
}

/// A support ticket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Ticket {
    /// Auto-incrementing ID.
    pub id: i64,
    /// Name, phone or id of the submitting customer.
    pub customer_ref: String,
    pub issue: String,
    pub device: String,
    /// Free-text location as entered by the customer.
    pub address: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub preferred_date: String,
    /// User ID of the assigned technician, empty while unassigned.
    pub assigned_technician: String,
    pub status: TicketStatus,
    /// Creation timestamp.
    pub created_at: String,
}

impl Ticket {
    pub fn is_pending(&self) -> bool {
        self.status == TicketStatus::Pending
    }

    /// Coordinates of the ticket, if both were given.
    pub fn coords(&self) -> Option<GeoPoint> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some(GeoPoint::new(lat, lon)),
            _ => None,
        }
    }
}

/// A ticket that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTicket {
    pub customer_ref: String,
    pub issue: String,
    pub device: String,
    pub address: String,
    pub coords: Option<GeoPoint>,
    pub preferred_date: String,
    pub created_at: String,
}

impl NewTicket {
    /// Materialize the stored row for a freshly assigned id.
    pub fn into_ticket(self, id: i64) -> Ticket {
        Ticket {
            id,
            customer_ref: self.customer_ref,
            issue: self.issue,
            device: self.device,
            address: self.address,
            latitude: self.coords.map(|c| c.latitude),
            longitude: self.coords.map(|c| c.longitude),
            preferred_date: self.preferred_date,
            assigned_technician: String::new(),
            status: TicketStatus::Pending,
            created_at: self.created_at,
        }
    }
}

/// Result of a conditional (compare-and-swap) update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The row matched the precondition and was written.
    Applied,
    /// The row exists but no longer matched the precondition.
    Conflict,
}
