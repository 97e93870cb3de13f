//! Technician profile storage.

use sqlx::{SqliteExecutor, SqlitePool};

use crate::error::{DatabaseError, Result};
use crate::models::{GeoPoint, Technician, User};
use crate::user;

/// Create a technician profile for an existing user.
pub async fn create_technician<'e>(
    executor: impl SqliteExecutor<'e>,
    technician: &Technician,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO technicians (user_id, name, available, latitude, longitude, updated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&technician.user_id)
    .bind(&technician.name)
    .bind(technician.available)
    .bind(technician.latitude)
    .bind(technician.longitude)
    .bind(&technician.updated_at)
    .execute(executor)
    .await
    .map_err(|e| DatabaseError::from_insert(e, "Technician", &technician.user_id))?;

    Ok(())
}

/// Create a technician's user record and profile in one transaction.
///
/// Either both rows are written or neither is.
pub async fn create_with_user(
    pool: &SqlitePool,
    owner: &User,
    technician: &Technician,
) -> Result<()> {
    let mut tx = pool.begin().await?;

    user::create_user(&mut *tx, owner).await?;
    create_technician(&mut *tx, technician).await?;

    tx.commit().await?;
    Ok(())
}

/// Get a technician profile by user ID.
pub async fn get_technician(pool: &SqlitePool, user_id: &str) -> Result<Option<Technician>> {
    let record = sqlx::query_as::<_, Technician>(
        r#"
        SELECT user_id, name, available, latitude, longitude, updated_at
        FROM technicians
        WHERE user_id = ?
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(record)
}

/// List all technician profiles in registration order.
pub async fn list_technicians(pool: &SqlitePool) -> Result<Vec<Technician>> {
    let rows = sqlx::query_as::<_, Technician>(
        r#"
        SELECT user_id, name, available, latitude, longitude, updated_at
        FROM technicians
        ORDER BY rowid
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Mark a technician as available or busy.
pub async fn set_available(
    pool: &SqlitePool,
    user_id: &str,
    available: bool,
    updated_at: &str,
) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE technicians
        SET available = ?, updated_at = ?
        WHERE user_id = ?
        "#,
    )
    .bind(available)
    .bind(updated_at)
    .bind(user_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Technician",
            id: user_id.to_string(),
        });
    }

    Ok(())
}

/// Record a technician's last known location.
pub async fn set_location(
    pool: &SqlitePool,
    user_id: &str,
    location: GeoPoint,
    updated_at: &str,
) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE technicians
        SET latitude = ?, longitude = ?, updated_at = ?
        WHERE user_id = ?
        "#,
    )
    .bind(location.latitude)
    .bind(location.longitude)
    .bind(updated_at)
    .bind(user_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Technician",
            id: user_id.to_string(),
        });
    }

    Ok(())
}
