//! User operations.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DatabaseError, Result};
use crate::models::User;

/// Create a user, or return the ID of the existing user with that name.
pub async fn create_user(pool: &SqlitePool, username: &str) -> Result<i64> {
    let inserted = sqlx::query(
        r#"
        INSERT INTO users (username)
        VALUES (?)
        "#,
    )
    .bind(username)
    .execute(pool)
    .await;

    match inserted {
        Ok(result) => {
            debug!(username, "Created user");
            Ok(result.last_insert_rowid())
        }
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
            let user = get_user_by_name(pool, username).await?;
            Ok(user.id)
        }
        Err(e) => Err(DatabaseError::Sqlx(e)),
    }
}

/// Get a user by ID.
pub async fn get_user(pool: &SqlitePool, id: i64) -> Result<User> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT id, username, created_at
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

/// Get a user by username.
pub async fn get_user_by_name(pool: &SqlitePool, username: &str) -> Result<User> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT id, username, created_at
        FROM users
        WHERE username = ?
        "#,
    )
    .bind(username)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "User",
        id: username.to_string(),
    })
}

/// Count total users.
pub async fn count_users(pool: &SqlitePool) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM users
        "#,
    )
    .fetch_one(pool)
    .await?;

    Ok(count)
}
