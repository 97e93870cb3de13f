//! User CRUD operations.

use sqlx::{SqliteExecutor, SqlitePool};

use crate::error::{DatabaseError, Result};
use crate::models::{User, UserStatus};

/// Create a new user.
///
/// Fails with `AlreadyExists` if the id or the phone number is taken.
pub async fn create_user<'e>(executor: impl SqliteExecutor<'e>, user: &User) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO users (id, name, phone, email, role, status, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&user.id)
    .bind(&user.name)
    .bind(&user.phone)
    .bind(&user.email)
    .bind(user.role)
    .bind(user.status)
    .bind(&user.created_at)
    .execute(executor)
    .await
    .map_err(|e| DatabaseError::from_insert(e, "User", &user.phone))?;

    Ok(())
}

/// Get a user by ID.
pub async fn get_user(pool: &SqlitePool, id: &str) -> Result<User> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT id, name, phone, email, role, status, created_at
        FROM users
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "User",
        id: id.to_string(),
    })
}

/// Get a user by normalized phone number.
pub async fn get_user_by_phone(pool: &SqlitePool, phone: &str) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, name, phone, email, role, status, created_at
        FROM users
        WHERE phone = ?
        "#,
    )
    .bind(phone)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

/// Set a user's approval status.
pub async fn set_user_status(pool: &SqlitePool, id: &str, status: UserStatus) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE users
        SET status = ?
        WHERE id = ?
        "#,
    )
    .bind(status)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "User",
            id: id.to_string(),
        });
    }

    Ok(())
}

/// List all users in registration order.
pub async fn list_users(pool: &SqlitePool) -> Result<Vec<User>> {
    let users = sqlx::query_as::<_, User>(
        r#"
        SELECT id, name, phone, email, role, status, created_at
        FROM users
        ORDER BY rowid
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(users)
}

/// Count users grouped by role.
pub async fn count_users_by_role(pool: &SqlitePool) -> Result<Vec<(String, i64)>> {
    let rows = sqlx::query_as::<_, (String, i64)>(
        r#"
        SELECT role, COUNT(*) as count
        FROM users
        GROUP BY role
        ORDER BY count DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
