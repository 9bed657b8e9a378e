//! Module progress tracking.

use sqlx::SqlitePool;

use crate::models::{ModuleProgress, ProgressRow, ProgressStatus};
use crate::Result;

/// Create or update the progress row for a (user, path, module) tuple.
///
/// An empty `projects_completed` list is stored as NULL.
pub async fn update_progress(
    pool: &SqlitePool,
    user_id: i64,
    path_id: i64,
    module_id: &str,
    status: ProgressStatus,
    projects_completed: Option<&[String]>,
    notes: Option<&str>,
) -> Result<()> {
    let projects_json = match projects_completed {
        Some(projects) if !projects.is_empty() => Some(serde_json::to_string(projects)?),
        _ => None,
    };

    sqlx::query(
        r#"
        INSERT INTO progress (user_id, path_id, module_id, status, projects_completed, notes)
        VALUES (?, ?, ?, ?, ?, ?)
        ON CONFLICT(user_id, path_id, module_id) DO UPDATE SET
            status = excluded.status,
            projects_completed = excluded.projects_completed,
            notes = excluded.notes,
            updated_at = CURRENT_TIMESTAMP
        "#,
    )
    .bind(user_id)
    .bind(path_id)
    .bind(module_id)
    .bind(status.as_str())
    .bind(projects_json)
    .bind(notes)
    .execute(pool)
    .await?;

    tracing::debug!(user_id, path_id, module_id, %status, "Updated progress");

    Ok(())
}

/// Get all progress rows for a user's path, most recently updated first.
pub async fn get_progress(
    pool: &SqlitePool,
    user_id: i64,
    path_id: i64,
) -> Result<Vec<ModuleProgress>> {
    let rows = sqlx::query_as::<_, ProgressRow>(
        r#"
        SELECT id, user_id, path_id, module_id, status, projects_completed, notes, updated_at
        FROM progress
        WHERE user_id = ? AND path_id = ?
        ORDER BY updated_at DESC, id DESC
        "#,
    )
    .bind(user_id)
    .bind(path_id)
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(ProgressRow::into_progress).collect()
}
