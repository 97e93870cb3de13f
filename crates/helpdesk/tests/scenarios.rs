//! End-to-end helpdesk scenarios.
//!
//! Every scenario runs against both the in-memory store and SQLite.

use std::sync::Arc;

use database::Database;
use helpdesk::{
    geodesic_distance_km, GeoPoint, Helpdesk, HelpdeskConfig, HelpdeskError, MemoryStore,
    RecordStore, Registration, Role, TicketRequest, TicketStatus, UnassignedReason,
};

async fn sqlite_store() -> Arc<dyn RecordStore> {
    // In-memory SQLite lives per connection, so keep a single one.
    let db = Database::connect_with_pool_size("sqlite::memory:", 1)
        .await
        .unwrap();
    db.migrate().await.unwrap();
    Arc::new(db)
}

async fn stores() -> Vec<Arc<dyn RecordStore>> {
    let memory: Arc<dyn RecordStore> = Arc::new(MemoryStore::new());
    vec![memory, sqlite_store().await]
}

async fn approved_technician(desk: &Helpdesk, name: &str, phone: &str, at: GeoPoint) -> String {
    let user = desk
        .register(Registration::new(name, phone, Role::Technician))
        .await
        .unwrap();
    desk.approve(&user.id).await.unwrap();
    desk.update_location(&user.id, at).await.unwrap();
    user.id
}

fn ticket_at(customer: &str, at: Option<GeoPoint>) -> TicketRequest {
    TicketRequest {
        customer_ref: customer.to_string(),
        issue: "Wi-Fi keeps dropping".to_string(),
        device: "Laptop".to_string(),
        address: "Market Square 4".to_string(),
        coords: at,
        preferred_date: "2026-10-20".to_string(),
    }
}

#[tokio::test]
async fn nearest_approved_technician_gets_the_ticket() {
    for store in stores().await {
        let desk = Helpdesk::new(store.clone());

        let ana = approved_technician(&desk, "Ana", "+15550000001", GeoPoint::new(10.0, 10.0)).await;
        let ticket = desk
            .submit(ticket_at("Bob", Some(GeoPoint::new(10.01, 10.01))))
            .await
            .unwrap();

        let report = desk.auto_assign_pending().await.unwrap();
        assert_eq!(report.assigned.len(), 1, "store: {}", store.name());
        assert!(report.unassigned.is_empty());

        let assignment = &report.assigned[0];
        assert_eq!(assignment.ticket_id, ticket.id);
        assert_eq!(assignment.technician_id, ana);
        // WGS84 geodesic: 0.01 degrees north (~1.106 km) and east (~1.096 km
        // at 10N) combine to ~1.557 km, not the 1.2 km a rough estimate gives.
        assert!(
            (assignment.distance_km - 1.557).abs() < 0.01,
            "expected ~1.557 km, got {}",
            assignment.distance_km
        );

        let stored = desk.get_ticket(ticket.id).await.unwrap();
        assert_eq!(stored.status, TicketStatus::Assigned);
        assert_eq!(stored.assigned_technician, ana);
        assert_eq!(desk.get_user(&ana).await.unwrap().name, "Ana");
    }
}

#[tokio::test]
async fn ticket_stays_pending_without_approved_technicians() {
    for store in stores().await {
        let desk = Helpdesk::new(store);

        // Registered but never approved
        let ben = desk
            .register(Registration::new("Ben", "+15550000002", Role::Technician))
            .await
            .unwrap();
        desk.update_location(&ben.id, GeoPoint::new(10.0, 10.0))
            .await
            .unwrap();

        let ticket = desk
            .submit(ticket_at("Bob", Some(GeoPoint::new(10.01, 10.01))))
            .await
            .unwrap();

        let report = desk.auto_assign_pending().await.unwrap();
        assert!(report.assigned.is_empty());
        assert_eq!(
            report.unassigned,
            vec![(ticket.id, UnassignedReason::NoTechnicianAvailable)]
        );

        let stored = desk.get_ticket(ticket.id).await.unwrap();
        assert_eq!(stored.status, TicketStatus::Pending);
        assert!(stored.assigned_technician.is_empty());

        let result = desk.require_nearest(GeoPoint::new(10.01, 10.01)).await;
        assert!(matches!(result, Err(HelpdeskError::NoTechnicianAvailable)));
    }
}

#[tokio::test]
async fn concurrent_claims_have_exactly_one_winner() {
    for store in stores().await {
        let desk = Helpdesk::new(store);

        let ana = approved_technician(&desk, "Ana", "+15550000001", GeoPoint::new(10.0, 10.0)).await;
        let ben = approved_technician(&desk, "Ben", "+15550000002", GeoPoint::new(10.1, 10.1)).await;
        let ticket = desk.submit(ticket_at("Bob", None)).await.unwrap();

        let (a, b) = tokio::join!(desk.claim(ticket.id, &ana), desk.claim(ticket.id, &ben));

        let (winner, loser) = match (a, b) {
            (Ok(t), Err(e)) | (Err(e), Ok(t)) => (t, e),
            (a, b) => panic!("expected exactly one winner, got {:?} and {:?}", a, b),
        };
        assert!(matches!(loser, HelpdeskError::AlreadyAssigned { .. }));

        let stored = desk.get_ticket(ticket.id).await.unwrap();
        assert_eq!(stored.status, TicketStatus::Assigned);
        assert_eq!(stored.assigned_technician, winner.assigned_technician);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn spawned_claims_race_on_shared_engine() {
    let desk = Helpdesk::new(Arc::new(MemoryStore::new()));
    let mut technicians = Vec::new();
    for i in 0..8 {
        let phone = format!("+1555000010{}", i);
        let id = approved_technician(&desk, &format!("Tech {}", i), &phone, GeoPoint::new(0.0, 0.0)).await;
        technicians.push(id);
    }
    let ticket_id = desk.submit(ticket_at("Bob", None)).await.unwrap().id;

    let handles: Vec<_> = technicians
        .iter()
        .cloned()
        .map(|tech| {
            let desk = desk.clone();
            tokio::spawn(async move { desk.claim(ticket_id, &tech).await })
        })
        .collect();

    let mut wins = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => wins += 1,
            Err(HelpdeskError::AlreadyAssigned { .. }) => {}
            Err(e) => panic!("unexpected error: {}", e),
        }
    }
    assert_eq!(wins, 1);
}

#[tokio::test]
async fn auto_assign_spreads_tickets_when_releasing() {
    for store in stores().await {
        let desk = Helpdesk::new(store);

        let near = approved_technician(&desk, "Ana", "+15550000001", GeoPoint::new(10.0, 10.0)).await;
        let far = approved_technician(&desk, "Ben", "+15550000002", GeoPoint::new(10.5, 10.5)).await;

        let first = desk
            .submit(ticket_at("Bob", Some(GeoPoint::new(10.01, 10.01))))
            .await
            .unwrap();
        let second = desk
            .submit(ticket_at("Carol", Some(GeoPoint::new(10.02, 10.02))))
            .await
            .unwrap();
        let third = desk
            .submit(ticket_at("Dan", Some(GeoPoint::new(10.03, 10.03))))
            .await
            .unwrap();
        let no_coords = desk.submit(ticket_at("Eve", None)).await.unwrap();

        let report = desk.auto_assign_pending().await.unwrap();

        let assigned: Vec<(i64, String)> = report
            .assigned
            .iter()
            .map(|a| (a.ticket_id, a.technician_id.clone()))
            .collect();
        assert_eq!(assigned, vec![(first.id, near.clone()), (second.id, far.clone())]);
        assert_eq!(
            report.unassigned,
            vec![
                (third.id, UnassignedReason::NoTechnicianAvailable),
                (no_coords.id, UnassignedReason::NoCoordinates),
            ]
        );

        // Completing frees the technician for the next pass
        desk.complete(first.id, &near).await.unwrap();
        let outcome = desk.auto_assign(third.id).await.unwrap();
        assert_eq!(
            desk.get_ticket(third.id).await.unwrap().assigned_technician,
            near
        );
        assert!(matches!(outcome, helpdesk::AssignOutcome::Assigned(_)));
    }
}

#[tokio::test]
async fn radius_limits_auto_assignment_and_browsing() {
    let config = HelpdeskConfig::default()
        .with_max_radius_km(Some(10.0))
        .unwrap();
    let desk = Helpdesk::with_config(sqlite_store().await, config);

    let ana = approved_technician(&desk, "Ana", "+15550000001", GeoPoint::new(10.0, 10.0)).await;

    let close = desk
        .submit(ticket_at("Bob", Some(GeoPoint::new(10.05, 10.0))))
        .await
        .unwrap();
    let closer = desk
        .submit(ticket_at("Carol", Some(GeoPoint::new(10.01, 10.0))))
        .await
        .unwrap();
    let far = desk
        .submit(ticket_at("Dan", Some(GeoPoint::new(11.0, 10.0))))
        .await
        .unwrap();

    let nearby = desk.nearby_pending(&ana).await.unwrap();
    let ids: Vec<i64> = nearby.iter().map(|n| n.ticket.id).collect();
    assert_eq!(ids, vec![closer.id, close.id]);
    for n in &nearby {
        let d = geodesic_distance_km(GeoPoint::new(10.0, 10.0), n.ticket.coords().unwrap());
        assert!((n.distance_km - d).abs() < 1e-9);
        assert!(n.distance_km <= 10.0);
    }

    let outcome = desk.auto_assign(far.id).await.unwrap();
    assert!(matches!(
        outcome,
        helpdesk::AssignOutcome::Unassigned {
            reason: UnassignedReason::NoTechnicianAvailable,
            ..
        }
    ));
    assert!(desk.get_ticket(far.id).await.unwrap().is_pending());
}

#[tokio::test]
async fn registration_is_unique_per_phone_in_sqlite() {
    let desk = Helpdesk::new(sqlite_store().await);

    let bob = desk
        .register(Registration::new("Bob", "+1 555 000 0003", Role::Customer))
        .await
        .unwrap();
    let again = desk
        .register(Registration::new("Bobby", "+15550000003", Role::Customer))
        .await;
    assert!(matches!(again, Err(HelpdeskError::AlreadyRegistered { .. })));

    let found = desk.find_by_phone("+15550000003").await.unwrap().unwrap();
    assert_eq!(found.id, bob.id);
    assert_eq!(found.status, helpdesk::UserStatus::Approved);
}
