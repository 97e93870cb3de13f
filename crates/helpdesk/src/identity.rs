//! Registration, lookup and the technician approval gate.

use database::validation::{
    normalize_phone, validate_coordinates, validate_email, validate_required, MAX_FIELD_LENGTH,
};
use database::{GeoPoint, Role, Technician, User, UserStatus};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{HelpdeskError, Result};
use crate::lifecycle::{timestamp, Helpdesk};

/// Details supplied when registering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
    pub role: Role,
}

impl Registration {
    pub fn new(name: impl Into<String>, phone: impl Into<String>, role: Role) -> Self {
        Self {
            name: name.into(),
            phone: phone.into(),
            email: None,
            role,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

impl Helpdesk {
    /// Register a new user.
    ///
    /// Customers and admins are approved immediately. Technicians start
    /// pending and get a profile that is available at `(0, 0)` until they
    /// report a location.
    pub async fn register(&self, registration: Registration) -> Result<User> {
        let name = validate_required("name", &registration.name, MAX_FIELD_LENGTH)?.to_string();
        let phone = normalize_phone(&registration.phone)?;
        let email = match registration.email.as_deref().map(str::trim) {
            Some(email) if !email.is_empty() => {
                validate_email(email)?;
                Some(email.to_string())
            }
            _ => None,
        };

        if self.store.find_user_by_phone(&phone).await?.is_some() {
            debug!(phone = %phone, "Registration rejected, phone already registered");
            return Err(HelpdeskError::AlreadyRegistered { phone });
        }

        let status = match registration.role {
            Role::Technician => UserStatus::Pending,
            Role::Customer | Role::Admin => UserStatus::Approved,
        };

        let now = timestamp();
        let user = User {
            id: Uuid::new_v4().to_string(),
            name,
            phone,
            email,
            role: registration.role,
            status,
            created_at: now.clone(),
        };

        if user.role == Role::Technician {
            let profile = Technician {
                user_id: user.id.clone(),
                name: user.name.clone(),
                available: true,
                latitude: 0.0,
                longitude: 0.0,
                updated_at: now,
            };
            self.store.insert_technician(&user, &profile).await?;
        } else {
            self.store.insert_user(&user).await?;
        }

        info!(
            user_id = %user.id,
            role = %user.role,
            status = %user.status,
            "User registered"
        );
        Ok(user)
    }

    /// Approve a user. Approving an already approved user is a no-op.
    pub async fn approve(&self, user_id: &str) -> Result<User> {
        let mut user = self.get_user(user_id).await?;

        if user.is_approved() {
            debug!(user_id, "User already approved");
            return Ok(user);
        }

        self.store
            .set_user_status(user_id, UserStatus::Approved)
            .await?;
        user.status = UserStatus::Approved;

        info!(user_id, role = %user.role, "User approved");
        Ok(user)
    }

    /// Get a user by ID.
    pub async fn get_user(&self, user_id: &str) -> Result<User> {
        self.store
            .get_user(user_id)
            .await?
            .ok_or_else(|| HelpdeskError::not_found("User", user_id))
    }

    /// Find a user by phone number, as entered (it is normalized first).
    pub async fn find_by_phone(&self, phone: &str) -> Result<Option<User>> {
        let phone = normalize_phone(phone)?;
        self.store.find_user_by_phone(&phone).await
    }

    pub async fn list_users(&self) -> Result<Vec<User>> {
        self.store.list_users().await
    }

    /// Technicians waiting for an admin to approve them, in registration order.
    pub async fn list_pending_approvals(&self) -> Result<Vec<User>> {
        Ok(self
            .store
            .list_users()
            .await?
            .into_iter()
            .filter(|u| u.role == Role::Technician && u.status == UserStatus::Pending)
            .collect())
    }

    /// Record a technician's current location.
    pub async fn update_location(&self, technician_id: &str, location: GeoPoint) -> Result<Technician> {
        validate_coordinates(location)?;
        self.store
            .set_technician_location(technician_id, location, &timestamp())
            .await?;

        debug!(
            technician = technician_id,
            lat = location.latitude,
            lon = location.longitude,
            "Technician location updated"
        );
        self.get_technician(technician_id).await
    }

    /// Mark a technician as accepting or not accepting tickets.
    pub async fn set_availability(&self, technician_id: &str, available: bool) -> Result<Technician> {
        self.store
            .set_technician_available(technician_id, available, &timestamp())
            .await?;

        info!(technician = technician_id, available, "Technician availability changed");
        self.get_technician(technician_id).await
    }

    /// Every technician profile, busy and unapproved ones included.
    pub async fn list_technicians(&self) -> Result<Vec<Technician>> {
        self.store.list_technicians().await
    }

    pub async fn get_technician(&self, technician_id: &str) -> Result<Technician> {
        self.store
            .get_technician(technician_id)
            .await?
            .ok_or_else(|| HelpdeskError::not_found("Technician", technician_id))
    }

    /// Resolve a technician who is allowed to take tickets.
    pub(crate) async fn require_approved_technician(&self, technician_id: &str) -> Result<User> {
        let user = self
            .store
            .get_user(technician_id)
            .await?
            .filter(|u| u.role == Role::Technician)
            .ok_or_else(|| HelpdeskError::not_found("Technician", technician_id))?;

        if !user.is_approved() {
            return Err(HelpdeskError::NotApproved {
                technician_id: technician_id.to_string(),
            });
        }

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;
    use database::{NewTicket, Ticket, TicketStatus, UpdateOutcome};

    use super::*;
    use crate::store::{MemoryStore, RecordStore};

    fn helpdesk() -> Helpdesk {
        Helpdesk::new(Arc::new(MemoryStore::new()))
    }

    /// Memory store whose first technician insert fails.
    #[derive(Default)]
    struct FailingStore {
        inner: MemoryStore,
        failed: AtomicBool,
    }

    #[async_trait]
    impl RecordStore for FailingStore {
        fn name(&self) -> &str {
            "failing"
        }

        async fn insert_user(&self, user: &User) -> Result<()> {
            self.inner.insert_user(user).await
        }

        async fn get_user(&self, id: &str) -> Result<Option<User>> {
            self.inner.get_user(id).await
        }

        async fn find_user_by_phone(&self, phone: &str) -> Result<Option<User>> {
            self.inner.find_user_by_phone(phone).await
        }

        async fn list_users(&self) -> Result<Vec<User>> {
            self.inner.list_users().await
        }

        async fn set_user_status(&self, id: &str, status: UserStatus) -> Result<()> {
            self.inner.set_user_status(id, status).await
        }

        async fn insert_technician(&self, user: &User, technician: &Technician) -> Result<()> {
            if !self.failed.swap(true, Ordering::SeqCst) {
                return Err(HelpdeskError::InvalidInput("disk full".to_string()));
            }
            self.inner.insert_technician(user, technician).await
        }

        async fn get_technician(&self, user_id: &str) -> Result<Option<Technician>> {
            self.inner.get_technician(user_id).await
        }

        async fn list_technicians(&self) -> Result<Vec<Technician>> {
            self.inner.list_technicians().await
        }

        async fn set_technician_available(
            &self,
            user_id: &str,
            available: bool,
            updated_at: &str,
        ) -> Result<()> {
            self.inner
                .set_technician_available(user_id, available, updated_at)
                .await
        }

        async fn set_technician_location(
            &self,
            user_id: &str,
            location: GeoPoint,
            updated_at: &str,
        ) -> Result<()> {
            self.inner
                .set_technician_location(user_id, location, updated_at)
                .await
        }

        async fn insert_ticket(&self, ticket: &NewTicket) -> Result<Ticket> {
            self.inner.insert_ticket(ticket).await
        }

        async fn get_ticket(&self, id: i64) -> Result<Option<Ticket>> {
            self.inner.get_ticket(id).await
        }

        async fn list_tickets(&self) -> Result<Vec<Ticket>> {
            self.inner.list_tickets().await
        }

        async fn list_tickets_by_status(&self, status: TicketStatus) -> Result<Vec<Ticket>> {
            self.inner.list_tickets_by_status(status).await
        }

        async fn assign_ticket_if_pending(
            &self,
            id: i64,
            technician_id: &str,
        ) -> Result<UpdateOutcome> {
            self.inner.assign_ticket_if_pending(id, technician_id).await
        }

        async fn complete_ticket_if_assigned(
            &self,
            id: i64,
            technician_id: &str,
        ) -> Result<UpdateOutcome> {
            self.inner.complete_ticket_if_assigned(id, technician_id).await
        }
    }

    #[tokio::test]
    async fn test_failed_technician_registration_leaves_nothing_behind() {
        let desk = Helpdesk::new(Arc::new(FailingStore::default()));
        let registration = Registration::new("Ana", "+15550000001", Role::Technician);

        let err = desk.register(registration.clone()).await.unwrap_err();
        assert!(matches!(err, HelpdeskError::InvalidInput(_)));
        assert!(desk.list_users().await.unwrap().is_empty());

        let user = desk.register(registration).await.unwrap();
        assert_eq!(desk.list_users().await.unwrap().len(), 1);
        assert_eq!(desk.get_technician(&user.id).await.unwrap().user_id, user.id);
    }

    #[tokio::test]
    async fn test_customer_is_approved_immediately() {
        let desk = helpdesk();
        let user = desk
            .register(Registration::new("Bob", "+1 555 000 0003", Role::Customer))
            .await
            .unwrap();

        assert_eq!(user.status, UserStatus::Approved);
        assert_eq!(user.phone, "+15550000003");
        assert!(desk.get_technician(&user.id).await.is_err());
    }

    #[tokio::test]
    async fn test_technician_starts_pending_with_profile() {
        let desk = helpdesk();
        let user = desk
            .register(Registration::new("Ana", "+15550000001", Role::Technician))
            .await
            .unwrap();

        assert_eq!(user.status, UserStatus::Pending);

        let profile = desk.get_technician(&user.id).await.unwrap();
        assert!(profile.available);
        assert_eq!(profile.location(), GeoPoint::new(0.0, 0.0));
        assert_eq!(profile.name, "Ana");

        let pending = desk.list_pending_approvals().await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, user.id);
    }

    #[tokio::test]
    async fn test_approve_is_idempotent() {
        let desk = helpdesk();
        let user = desk
            .register(Registration::new("Ana", "+15550000001", Role::Technician))
            .await
            .unwrap();

        let approved = desk.approve(&user.id).await.unwrap();
        assert_eq!(approved.status, UserStatus::Approved);

        let again = desk.approve(&user.id).await.unwrap();
        assert_eq!(again, approved);
        assert!(desk.list_pending_approvals().await.unwrap().is_empty());

        let missing = desk.approve("nobody").await;
        assert!(matches!(missing, Err(HelpdeskError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_duplicate_phone_is_rejected() {
        let desk = helpdesk();
        desk.register(Registration::new("Bob", "555-000-0003", Role::Customer))
            .await
            .unwrap();

        let result = desk
            .register(Registration::new("Robert", "(555) 000 0003", Role::Technician))
            .await;
        assert!(matches!(result, Err(HelpdeskError::AlreadyRegistered { .. })));
        assert_eq!(desk.list_users().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_find_by_phone_normalizes() {
        let desk = helpdesk();
        let bob = desk
            .register(Registration::new("Bob", "+15550000003", Role::Customer))
            .await
            .unwrap();

        let found = desk.find_by_phone("+1 (555) 000-0003").await.unwrap();
        assert_eq!(found.map(|u| u.id), Some(bob.id));

        assert!(desk.find_by_phone("+15559999999").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_register_validation() {
        let desk = helpdesk();

        let result = desk
            .register(Registration::new(" ", "+15550000003", Role::Customer))
            .await;
        assert!(matches!(result, Err(HelpdeskError::InvalidInput(_))));

        let result = desk
            .register(Registration::new("Bob", "", Role::Customer))
            .await;
        assert!(matches!(result, Err(HelpdeskError::InvalidInput(_))));

        let result = desk
            .register(Registration::new("Bob", "+15550000003", Role::Customer).with_email("bob"))
            .await;
        assert!(matches!(result, Err(HelpdeskError::InvalidInput(_))));

        let user = desk
            .register(
                Registration::new("Bob", "+15550000003", Role::Customer)
                    .with_email(" bob@example.com "),
            )
            .await
            .unwrap();
        assert_eq!(user.email.as_deref(), Some("bob@example.com"));
    }

    #[tokio::test]
    async fn test_location_and_availability_updates() {
        let desk = helpdesk();
        let user = desk
            .register(Registration::new("Ana", "+15550000001", Role::Technician))
            .await
            .unwrap();

        let profile = desk
            .update_location(&user.id, GeoPoint::new(10.0, 10.0))
            .await
            .unwrap();
        assert_eq!(profile.location(), GeoPoint::new(10.0, 10.0));

        let profile = desk.set_availability(&user.id, false).await.unwrap();
        assert!(!profile.available);

        let result = desk
            .update_location(&user.id, GeoPoint::new(0.0, 200.0))
            .await;
        assert!(matches!(result, Err(HelpdeskError::InvalidInput(_))));

        let result = desk.set_availability("nobody", true).await;
        assert!(matches!(result, Err(HelpdeskError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_list_technicians_includes_busy_and_unapproved() {
        let desk = helpdesk();
        let ana = desk
            .register(Registration::new("Ana", "+15550000001", Role::Technician))
            .await
            .unwrap();
        let ben = desk
            .register(Registration::new("Ben", "+15550000002", Role::Technician))
            .await
            .unwrap();
        desk.register(Registration::new("Bob", "+15550000003", Role::Customer))
            .await
            .unwrap();

        desk.approve(&ben.id).await.unwrap();
        desk.set_availability(&ben.id, false).await.unwrap();

        let ids: Vec<String> = desk
            .list_technicians()
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.user_id)
            .collect();
        assert_eq!(ids, vec![ana.id, ben.id]);
        assert!(desk.available_pool().await.unwrap().is_empty());
    }
}
