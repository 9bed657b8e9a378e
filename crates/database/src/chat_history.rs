//! Chat history persistence.

use sqlx::SqlitePool;

use crate::models::ChatMessage;
use crate::Result;

/// Default number of messages returned by [`get_chat_history`] callers.
pub const DEFAULT_HISTORY_LIMIT: i64 = 50;

/// Append a chat message to a path's history.
pub async fn add_chat_message(
    pool: &SqlitePool,
    user_id: i64,
    path_id: i64,
    role: &str,
    content: &str,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO chat_history (user_id, path_id, role, content)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(user_id)
    .bind(path_id)
    .bind(role)
    .bind(content)
    .execute(pool)
    .await?;

    Ok(())
}

/// Get the most recent `limit` messages, returned oldest first.
pub async fn get_chat_history(
    pool: &SqlitePool,
    user_id: i64,
    path_id: i64,
    limit: i64,
) -> Result<Vec<ChatMessage>> {
    let mut rows = sqlx::query_as::<_, ChatMessage>(
        r#"
        SELECT id, user_id, path_id, role, content, timestamp
        FROM chat_history
        WHERE user_id = ? AND path_id = ?
        ORDER BY timestamp DESC, id DESC
        LIMIT ?
        "#,
    )
    .bind(user_id)
    .bind(path_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    rows.reverse();
    Ok(rows)
}
