//! Nearest-technician assignment.
//!
//! Distances are WGS84 geodesics. Among equally distant technicians the
//! first one in pool order (registration order) wins.

use std::collections::HashSet;
use std::sync::OnceLock;

use database::validation::validate_coordinates;
use database::{GeoPoint, Role, Technician, Ticket, UpdateOutcome};
use geographiclib_rs::{Geodesic, InverseGeodesic};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{HelpdeskError, Result};
use crate::lifecycle::Helpdesk;

fn wgs84() -> &'static Geodesic {
    static WGS84: OnceLock<Geodesic> = OnceLock::new();
    WGS84.get_or_init(Geodesic::wgs84)
}

/// Ellipsoidal distance between two points, in kilometres.
pub fn geodesic_distance_km(from: GeoPoint, to: GeoPoint) -> f64 {
    let meters: f64 = wgs84().inverse(from.latitude, from.longitude, to.latitude, to.longitude);
    meters / 1000.0
}

/// The technician closest to a location.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Nearest {
    pub technician_id: String,
    pub distance_km: f64,
}

/// Pick the technician in `pool` closest to `location`.
///
/// Technicians farther than `max_radius_km` are ignored, as are distances that
/// cannot be computed. Returns `None` when no candidate remains.
pub fn find_nearest(
    location: GeoPoint,
    pool: &[Technician],
    max_radius_km: Option<f64>,
) -> Option<Nearest> {
    let mut best: Option<Nearest> = None;

    for technician in pool {
        let distance_km = geodesic_distance_km(location, technician.location());

        if !distance_km.is_finite() {
            continue;
        }
        if max_radius_km.is_some_and(|radius| distance_km > radius) {
            continue;
        }

        // Strict comparison keeps the earliest of equal candidates.
        if best.as_ref().map_or(true, |b| distance_km < b.distance_km) {
            best = Some(Nearest {
                technician_id: technician.user_id.clone(),
                distance_km,
            });
        }
    }

    best
}

/// A ticket handed to a technician by auto-assignment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assignment {
    pub ticket_id: i64,
    pub technician_id: String,
    pub distance_km: f64,
}

/// Why auto-assignment left a ticket pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnassignedReason {
    /// The ticket has no coordinates to measure from.
    NoCoordinates,
    /// No approved, available technician within range.
    NoTechnicianAvailable,
    /// Someone claimed the ticket while we were deciding.
    AlreadyAssigned,
}

/// Result of auto-assigning one ticket.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AssignOutcome {
    Assigned(Assignment),
    Unassigned {
        ticket_id: i64,
        reason: UnassignedReason,
    },
}

/// Summary of an auto-assignment pass over all pending tickets.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AutoAssignReport {
    pub assigned: Vec<Assignment>,
    pub unassigned: Vec<(i64, UnassignedReason)>,
}

/// A pending ticket near a technician.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearbyTicket {
    pub ticket: Ticket,
    pub distance_km: f64,
}

impl Helpdesk {
    /// Approved technicians that are currently available, in registration order.
    pub async fn available_pool(&self) -> Result<Vec<Technician>> {
        let approved: HashSet<String> = self
            .store
            .list_users()
            .await?
            .into_iter()
            .filter(|u| u.role == Role::Technician && u.is_approved())
            .map(|u| u.id)
            .collect();

        Ok(self
            .store
            .list_technicians()
            .await?
            .into_iter()
            .filter(|t| t.available && approved.contains(&t.user_id))
            .collect())
    }

    /// Nearest available technician to a location, honouring the radius limit.
    pub async fn nearest_technician(&self, location: GeoPoint) -> Result<Option<Nearest>> {
        validate_coordinates(location)?;
        let pool = self.available_pool().await?;
        Ok(find_nearest(location, &pool, self.config.max_radius_km))
    }

    /// Like [`Helpdesk::nearest_technician`], but an empty result is an error.
    pub async fn require_nearest(&self, location: GeoPoint) -> Result<Nearest> {
        self.nearest_technician(location)
            .await?
            .ok_or(HelpdeskError::NoTechnicianAvailable)
    }

    /// Assign one pending ticket to its nearest available technician.
    ///
    /// Leaving the ticket pending is a normal outcome, not an error.
    pub async fn auto_assign(&self, ticket_id: i64) -> Result<AssignOutcome> {
        let ticket = self.get_ticket(ticket_id).await?;
        if !ticket.is_pending() {
            return Err(HelpdeskError::InvalidTransition {
                ticket_id,
                from: ticket.status,
                action: "auto-assign",
            });
        }

        let pool = self.available_pool().await?;
        self.assign_from_pool(&ticket, &pool).await
    }

    /// Auto-assign every pending ticket, oldest first.
    ///
    /// When technicians are released on assignment, each one takes at most
    /// one ticket per pass.
    pub async fn auto_assign_pending(&self) -> Result<AutoAssignReport> {
        let pending = self.list_pending().await?;
        let mut pool = self.available_pool().await?;
        let mut report = AutoAssignReport::default();

        debug!(
            pending = pending.len(),
            technicians = pool.len(),
            "Auto-assigning pending tickets"
        );

        for ticket in &pending {
            match self.assign_from_pool(ticket, &pool).await? {
                AssignOutcome::Assigned(assignment) => {
                    if self.config.release_on_assign {
                        pool.retain(|t| t.user_id != assignment.technician_id);
                    }
                    report.assigned.push(assignment);
                }
                AssignOutcome::Unassigned { ticket_id, reason } => {
                    report.unassigned.push((ticket_id, reason));
                }
            }
        }

        info!(
            assigned = report.assigned.len(),
            unassigned = report.unassigned.len(),
            "Auto-assignment pass finished"
        );
        Ok(report)
    }

    async fn assign_from_pool(&self, ticket: &Ticket, pool: &[Technician]) -> Result<AssignOutcome> {
        let unassigned = |reason| AssignOutcome::Unassigned {
            ticket_id: ticket.id,
            reason,
        };

        let Some(location) = ticket.coords() else {
            debug!(ticket_id = ticket.id, "Ticket has no coordinates, leaving pending");
            return Ok(unassigned(UnassignedReason::NoCoordinates));
        };

        let Some(nearest) = find_nearest(location, pool, self.config.max_radius_km) else {
            debug!(ticket_id = ticket.id, "No technician in range, leaving pending");
            return Ok(unassigned(UnassignedReason::NoTechnicianAvailable));
        };

        match self
            .store
            .assign_ticket_if_pending(ticket.id, &nearest.technician_id)
            .await?
        {
            UpdateOutcome::Applied => {
                info!(
                    ticket_id = ticket.id,
                    technician = %nearest.technician_id,
                    distance_km = nearest.distance_km,
                    "Ticket auto-assigned"
                );
                self.mark_available(&nearest.technician_id, false).await;
                Ok(AssignOutcome::Assigned(Assignment {
                    ticket_id: ticket.id,
                    technician_id: nearest.technician_id,
                    distance_km: nearest.distance_km,
                }))
            }
            UpdateOutcome::Conflict => {
                warn!(ticket_id = ticket.id, "Ticket claimed during auto-assignment");
                Ok(unassigned(UnassignedReason::AlreadyAssigned))
            }
        }
    }

    /// Pending tickets a technician could claim, nearest first.
    ///
    /// Only tickets with coordinates are considered, limited to the configured
    /// radius when one is set. Equal distances keep submission order.
    pub async fn nearby_pending(&self, technician_id: &str) -> Result<Vec<NearbyTicket>> {
        self.require_approved_technician(technician_id).await?;
        let origin = self.get_technician(technician_id).await?.location();
        let radius = self.config.max_radius_km;

        let mut nearby: Vec<NearbyTicket> = self
            .list_pending()
            .await?
            .into_iter()
            .filter_map(|ticket| {
                let distance_km = geodesic_distance_km(origin, ticket.coords()?);
                if radius.is_some_and(|r| distance_km > r) {
                    return None;
                }
                Some(NearbyTicket {
                    ticket,
                    distance_km,
                })
            })
            .collect();

        nearby.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
        Ok(nearby)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn technician(id: &str, lat: f64, lon: f64) -> Technician {
        Technician {
            user_id: id.to_string(),
            name: id.to_string(),
            available: true,
            latitude: lat,
            longitude: lon,
            updated_at: "2026-10-16 09:00:00".to_string(),
        }
    }

    #[test]
    fn test_geodesic_distance_known_values() {
        // One degree of longitude on the equator is about 111.32 km.
        let d = geodesic_distance_km(GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 1.0));
        assert!((d - 111.319).abs() < 0.01, "got {}", d);

        // One degree of latitude near the pole is longer than at the equator.
        let equator = geodesic_distance_km(GeoPoint::new(0.0, 0.0), GeoPoint::new(1.0, 0.0));
        let polar = geodesic_distance_km(GeoPoint::new(88.0, 0.0), GeoPoint::new(89.0, 0.0));
        assert!(polar > equator);

        let same = geodesic_distance_km(GeoPoint::new(10.0, 10.0), GeoPoint::new(10.0, 10.0));
        assert!(same.abs() < 1e-9);
    }

    #[test]
    fn test_empty_pool() {
        assert_eq!(find_nearest(GeoPoint::new(0.0, 0.0), &[], None), None);
    }

    #[test]
    fn test_nearest_is_minimal() {
        let request = GeoPoint::new(48.8566, 2.3522);
        let pool = vec![
            technician("lyon", 45.764, 4.8357),
            technician("versailles", 48.8049, 2.1204),
            technician("lille", 50.6292, 3.0573),
            technician("reims", 49.2583, 4.0317),
        ];

        let nearest = find_nearest(request, &pool, None).unwrap();
        assert_eq!(nearest.technician_id, "versailles");

        for t in &pool {
            assert!(nearest.distance_km <= geodesic_distance_km(request, t.location()));
        }
    }

    #[test]
    fn test_tie_goes_to_first_in_pool() {
        let request = GeoPoint::new(0.0, 0.0);
        let pool = vec![
            technician("first", 0.2, 0.3),
            technician("second", 0.2, 0.3),
        ];

        let nearest = find_nearest(request, &pool, None).unwrap();
        assert_eq!(nearest.technician_id, "first");

        let reversed: Vec<Technician> = pool.into_iter().rev().collect();
        let nearest = find_nearest(request, &reversed, None).unwrap();
        assert_eq!(nearest.technician_id, "second");
    }

    #[test]
    fn test_deterministic() {
        let request = GeoPoint::new(10.01, 10.01);
        let pool = vec![
            technician("a", 10.0, 10.0),
            technician("b", 10.02, 10.02),
            technician("c", 9.0, 9.0),
        ];

        let first = find_nearest(request, &pool, None);
        for _ in 0..10 {
            assert_eq!(find_nearest(request, &pool, None), first);
        }
    }

    #[test]
    fn test_unmeasurable_location_has_no_nearest() {
        let pool = vec![technician("a", 10.0, 10.0), technician("b", 10.02, 10.02)];

        assert_eq!(find_nearest(GeoPoint::new(f64::NAN, 10.0), &pool, None), None);
        assert_eq!(find_nearest(GeoPoint::new(10.0, f64::INFINITY), &pool, None), None);
    }

    #[tokio::test]
    async fn test_nearest_rejects_invalid_location() {
        use crate::identity::Registration;
        use crate::store::MemoryStore;
        use std::sync::Arc;

        let desk = Helpdesk::new(Arc::new(MemoryStore::new()));
        let tech = desk
            .register(Registration::new("Ana", "+15550000001", Role::Technician))
            .await
            .unwrap();
        desk.approve(&tech.id).await.unwrap();
        desk.update_location(&tech.id, GeoPoint::new(10.0, 10.0))
            .await
            .unwrap();

        for location in [GeoPoint::new(f64::NAN, 10.0), GeoPoint::new(500.0, 10.0)] {
            let err = desk.require_nearest(location).await.unwrap_err();
            assert!(matches!(err, HelpdeskError::InvalidInput(_)), "got {:?}", err);
        }
        assert!(desk.require_nearest(GeoPoint::new(10.01, 10.01)).await.is_ok());
    }

    #[test]
    fn test_radius_limit() {
        let request = GeoPoint::new(10.0, 10.0);
        let pool = vec![technician("far", 10.5, 10.5)];

        assert!(find_nearest(request, &pool, None).is_some());
        assert!(find_nearest(request, &pool, Some(10.0)).is_none());
        assert!(find_nearest(request, &pool, Some(100.0)).is_some());
    }
}
