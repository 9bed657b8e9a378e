//! Learning path storage.

use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::LearningPath;

/// Store a generated curriculum as a new learning path. Returns the path ID.
pub async fn create_learning_path(
    pool: &SqlitePool,
    user_id: i64,
    title: &str,
    source_type: &str,
    source_content: &str,
    curriculum: &serde_json::Value,
) -> Result<i64> {
    let curriculum_json = serde_json::to_string(curriculum)?;

    let result = sqlx::query(
        r#"
        INSERT INTO learning_paths (user_id, title, source_type, source_content, curriculum_json)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(user_id)
    .bind(title)
    .bind(source_type)
    .bind(source_content)
    .bind(curriculum_json)
    .execute(pool)
    .await?;

    let id = result.last_insert_rowid();
    tracing::info!(user_id, path_id = id, source_type, "Created learning path");

    Ok(id)
}

/// List a user's learning paths, newest first.
pub async fn list_learning_paths(pool: &SqlitePool, user_id: i64) -> Result<Vec<LearningPath>> {
    let paths = sqlx::query_as::<_, LearningPath>(
        r#"
        SELECT id, user_id, title, source_type, source_content, curriculum_json, created_at
        FROM learning_paths
        WHERE user_id = ?
        ORDER BY created_at DESC, id DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(paths)
}

/// Get a learning path by ID.
pub async fn get_learning_path(pool: &SqlitePool, id: i64) -> Result<LearningPath> {
    sqlx::query_as::<_, LearningPath>(
        r#"
        SELECT id, user_id, title, source_type, source_content, curriculum_json, created_at
        FROM learning_paths
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "LearningPath",
        id: id.to_string(),
    })
}
