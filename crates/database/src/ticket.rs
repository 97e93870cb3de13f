//! Ticket persistence and conditional status updates.

use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::{NewTicket, Ticket, TicketStatus, UpdateOutcome};

const TICKET_COLUMNS: &str = "id, customer_ref, issue, device, address, latitude, longitude, \
     preferred_date, assigned_technician, status, created_at";

/// Insert a new pending ticket and return the stored row.
pub async fn insert_ticket(pool: &SqlitePool, ticket: &NewTicket) -> Result<Ticket> {
    let result = sqlx::query(
        r#"
        INSERT INTO tickets (
            customer_ref, issue, device, address, latitude, longitude,
            preferred_date, assigned_technician, status, created_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, '', ?, ?)
        "#,
    )
    .bind(&ticket.customer_ref)
    .bind(&ticket.issue)
    .bind(&ticket.device)
    .bind(&ticket.address)
    .bind(ticket.coords.map(|c| c.latitude))
    .bind(ticket.coords.map(|c| c.longitude))
    .bind(&ticket.preferred_date)
    .bind(TicketStatus::Pending)
    .bind(&ticket.created_at)
    .execute(pool)
    .await?;

    Ok(ticket.clone().into_ticket(result.last_insert_rowid()))
}

/// Get a ticket by ID.
pub async fn get_ticket(pool: &SqlitePool, id: i64) -> Result<Option<Ticket>> {
    let query = format!("SELECT {} FROM tickets WHERE id = ?", TICKET_COLUMNS);
    let record = sqlx::query_as::<_, Ticket>(&query)
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(record)
}

/// List all tickets in submission order.
pub async fn list_tickets(pool: &SqlitePool) -> Result<Vec<Ticket>> {
    let query = format!("SELECT {} FROM tickets ORDER BY id", TICKET_COLUMNS);
    let rows = sqlx::query_as::<_, Ticket>(&query).fetch_all(pool).await?;

    Ok(rows)
}

/// List tickets with a given status in submission order.
pub async fn list_tickets_by_status(pool: &SqlitePool, status: TicketStatus) -> Result<Vec<Ticket>> {
    let query = format!(
        "SELECT {} FROM tickets WHERE status = ? ORDER BY id",
        TICKET_COLUMNS
    );
    let rows = sqlx::query_as::<_, Ticket>(&query)
        .bind(status)
        .fetch_all(pool)
        .await?;

    Ok(rows)
}

/// Assign a ticket only if it is still unassigned at write time.
///
/// Returns `Conflict` when another writer assigned it first and `NotFound`
/// when the ticket does not exist.
pub async fn assign_if_pending(
    pool: &SqlitePool,
    id: i64,
    technician_id: &str,
) -> Result<UpdateOutcome> {
    let result = sqlx::query(
        r#"
        UPDATE tickets
        SET assigned_technician = ?, status = ?
        WHERE id = ? AND assigned_technician = '' AND status = ?
        "#,
    )
    .bind(technician_id)
    .bind(TicketStatus::Assigned)
    .bind(id)
    .bind(TicketStatus::Pending)
    .execute(pool)
    .await?;

    conditional_outcome(pool, id, result.rows_affected()).await
}

/// Complete a ticket only if it is assigned to the given technician.
pub async fn complete_if_assigned(
    pool: &SqlitePool,
    id: i64,
    technician_id: &str,
) -> Result<UpdateOutcome> {
    let result = sqlx::query(
        r#"
        UPDATE tickets
        SET status = ?
        WHERE id = ? AND assigned_technician = ? AND status = ?
        "#,
    )
    .bind(TicketStatus::Completed)
    .bind(id)
    .bind(technician_id)
    .bind(TicketStatus::Assigned)
    .execute(pool)
    .await?;

    conditional_outcome(pool, id, result.rows_affected()).await
}

async fn conditional_outcome(pool: &SqlitePool, id: i64, rows: u64) -> Result<UpdateOutcome> {
    if rows > 0 {
        return Ok(UpdateOutcome::Applied);
    }

    let exists = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM tickets WHERE id = ?")
        .bind(id)
        .fetch_one(pool)
        .await?;

    if exists == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Ticket",
            id: id.to_string(),
        });
    }

    Ok(UpdateOutcome::Conflict)
}

/// Count tickets grouped by status.
pub async fn count_tickets_by_status(pool: &SqlitePool) -> Result<Vec<(String, i64)>> {
    let rows = sqlx::query_as::<_, (String, i64)>(
        r#"
        SELECT status, COUNT(*) as count
        FROM tickets
        GROUP BY status
        ORDER BY count DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
