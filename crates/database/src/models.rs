//! Database models.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::error::DatabaseError;

/// A learner, identified by a unique username.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Auto-incrementing ID.
    pub id: i64,
    /// Unique username entered at login.
    pub username: String,
    /// Creation timestamp.
    pub created_at: String,
}

/// A generated curriculum owned by a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct LearningPath {
    /// Auto-incrementing ID.
    pub id: i64,
    /// Owning user.
    pub user_id: i64,
    /// Display title (usually the curriculum title).
    pub title: String,
    /// Where the path came from: "manual", "syllabus", "github", "template".
    pub source_type: String,
    /// The raw input that produced the curriculum (topic, syllabus excerpt, URL).
    pub source_content: Option<String>,
    /// Curriculum document as JSON text.
    pub curriculum_json: Option<String>,
    /// Creation timestamp.
    pub created_at: String,
}

impl LearningPath {
    /// Decode the stored curriculum document.
    ///
    /// A path saved without a curriculum decodes to `Value::Null`.
    pub fn curriculum(&self) -> Result<serde_json::Value, DatabaseError> {
        match self.curriculum_json.as_deref() {
            Some(json) => Ok(serde_json::from_str(json)?),
            None => Ok(serde_json::Value::Null),
        }
    }

    /// The date part of `created_at` (YYYY-MM-DD).
    pub fn created_date(&self) -> &str {
        self.created_at.get(..10).unwrap_or(&self.created_at)
    }
}

/// Progress state of a single curriculum module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
}

impl ProgressStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProgressStatus::NotStarted => "not_started",
            ProgressStatus::InProgress => "in_progress",
            ProgressStatus::Completed => "completed",
        }
    }

    /// Human-readable label ("In Progress").
    pub fn label(&self) -> &'static str {
        match self {
            ProgressStatus::NotStarted => "Not Started",
            ProgressStatus::InProgress => "In Progress",
            ProgressStatus::Completed => "Completed",
        }
    }
}

impl fmt::Display for ProgressStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProgressStatus {
    type Err = DatabaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "not_started" => Ok(ProgressStatus::NotStarted),
            "in_progress" => Ok(ProgressStatus::InProgress),
            "completed" => Ok(ProgressStatus::Completed),
            other => Err(DatabaseError::InvalidValue {
                field: "status",
                value: other.to_string(),
            }),
        }
    }
}

/// Progress of one user through one module of a learning path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleProgress {
    pub id: i64,
    pub user_id: i64,
    pub path_id: i64,
    /// Module identifier from the curriculum (e.g., "module_1").
    pub module_id: String,
    pub status: ProgressStatus,
    /// Names of projects finished within the module.
    pub projects_completed: Option<Vec<String>>,
    /// Free-text learner notes.
    pub notes: Option<String>,
    /// Last update timestamp.
    pub updated_at: String,
}

/// Raw progress row as stored.
#[derive(Debug, Clone, FromRow)]
pub(crate) struct ProgressRow {
    pub id: i64,
    pub user_id: i64,
    pub path_id: i64,
    pub module_id: String,
    pub status: String,
    pub projects_completed: Option<String>,
    pub notes: Option<String>,
    pub updated_at: String,
}

impl ProgressRow {
    pub(crate) fn into_progress(self) -> Result<ModuleProgress, DatabaseError> {
        let projects_completed = match self.projects_completed {
            Some(json) => Some(serde_json::from_str(&json)?),
            None => None,
        };

        Ok(ModuleProgress {
            id: self.id,
            user_id: self.user_id,
            path_id: self.path_id,
            module_id: self.module_id,
            status: self.status.parse()?,
            projects_completed,
            notes: self.notes,
            updated_at: self.updated_at,
        })
    }
}

/// A chat message exchanged while studying a learning path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ChatMessage {
    pub id: i64,
    pub user_id: i64,
    pub path_id: i64,
    /// Role: "user" or "assistant"
    pub role: String,
    pub content: String,
    pub timestamp: String,
}
