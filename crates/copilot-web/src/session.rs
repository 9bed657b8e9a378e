//! Per-browser session state.
//!
//! A session is created at login and identified by a random UUID cookie.
//! It carries everything the UI needs between requests: the open learning
//! path, the generated project, the last analyses, a one-shot flash message,
//! tiny wins and the experiment journal. Sessions idle longer than the
//! configured timeout are dropped on the next access.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::COOKIE;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum::response::Redirect;
use chrono::{DateTime, Utc};
use curriculum::{
    AdaptationReport, CodeAnalysis, Curriculum, KarpathyMode, Module, ProjectScaffold,
};
use ingest::RepoAnalysis;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::journal::ExperimentJournal;
use crate::state::AppState;
use crate::wins::TinyWins;

pub const SESSION_COOKIE: &str = "copilot_session";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashLevel {
    Success,
    Info,
    Error,
}

impl FlashLevel {
    /// CSS class for the banner.
    pub fn class(&self) -> &'static str {
        match self {
            FlashLevel::Success => "flash-success",
            FlashLevel::Info => "flash-info",
            FlashLevel::Error => "flash-error",
        }
    }
}

/// A message shown once on the next page render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct SessionContext {
    pub user_id: i64,
    pub username: String,
    pub current_path_id: Option<i64>,
    pub curriculum: Option<Curriculum>,
    pub current_module: Option<Module>,
    pub project: Option<ProjectScaffold>,
    pub repo_analysis: Option<RepoAnalysis>,
    pub code_analysis: Option<CodeAnalysis>,
    pub adaptation: Option<AdaptationReport>,
    pub explanation: Option<String>,
    pub mode: Option<KarpathyMode>,
    pub flash: Option<Flash>,
    pub wins: TinyWins,
    pub journal: ExperimentJournal,
    last_seen: DateTime<Utc>,
}

impl SessionContext {
    fn new(user_id: i64, username: &str, now: DateTime<Utc>) -> Self {
        Self {
            user_id,
            username: username.to_string(),
            current_path_id: None,
            curriculum: None,
            current_module: None,
            project: None,
            repo_analysis: None,
            code_analysis: None,
            adaptation: None,
            explanation: None,
            mode: None,
            flash: None,
            wins: TinyWins::default(),
            journal: ExperimentJournal::default(),
            last_seen: now,
        }
    }

    /// Switch to another learning path, dropping per-path state.
    pub fn open_path(&mut self, path_id: i64, curriculum: Curriculum) {
        if self.current_path_id != Some(path_id) {
            self.current_module = None;
            self.project = None;
            self.code_analysis = None;
            self.adaptation = None;
            self.explanation = None;
        }
        self.current_path_id = Some(path_id);
        self.curriculum = Some(curriculum);
    }

    /// Forget the open path (the "New Learning Path" action).
    pub fn close_path(&mut self) {
        self.current_path_id = None;
        self.curriculum = None;
        self.current_module = None;
        self.project = None;
        self.code_analysis = None;
        self.adaptation = None;
        self.explanation = None;
    }

    /// The cached curriculum, when it belongs to `path_id`.
    pub fn cached_curriculum(&self, path_id: i64) -> Option<&Curriculum> {
        match self.current_path_id {
            Some(id) if id == path_id => self.curriculum.as_ref(),
            _ => None,
        }
    }

    pub fn flash(&mut self, level: FlashLevel, message: impl Into<String>) {
        self.flash = Some(Flash {
            level,
            message: message.into(),
        });
    }

    pub fn take_flash(&mut self) -> Option<Flash> {
        self.flash.take()
    }

    fn is_expired(&self, now: DateTime<Utc>, idle_timeout: Duration) -> bool {
        (now - self.last_seen)
            .to_std()
            .map(|idle| idle >= idle_timeout)
            .unwrap_or(false)
    }
}

/// All live sessions, keyed by cookie id.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, SessionContext>>>,
    idle_timeout: Duration,
}

impl SessionStore {
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            idle_timeout,
        }
    }

    /// Start a session for a logged-in user.
    pub async fn create(&self, user_id: i64, username: &str) -> Uuid {
        let id = Uuid::new_v4();
        let now = Utc::now();

        let mut sessions = self.sessions.write().await;
        Self::prune(&mut sessions, now, self.idle_timeout);
        sessions.insert(id, SessionContext::new(user_id, username, now));

        info!(user_id, %username, "Session started");
        id
    }

    /// A copy of the session, refreshing its idle timer.
    pub async fn snapshot(&self, id: Uuid) -> Option<SessionContext> {
        self.update_at(id, Utc::now(), |ctx| ctx.clone()).await
    }

    /// Run `f` against the session, refreshing its idle timer.
    ///
    /// Returns `None` when the session does not exist or has expired.
    pub async fn update<T>(&self, id: Uuid, f: impl FnOnce(&mut SessionContext) -> T) -> Option<T> {
        self.update_at(id, Utc::now(), f).await
    }

    /// Set the flash message of a session.
    pub async fn flash(&self, id: Uuid, level: FlashLevel, message: impl Into<String>) {
        let message = message.into();
        self.update(id, |ctx| ctx.flash(level, message)).await;
    }

    pub(crate) async fn update_at<T>(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
        f: impl FnOnce(&mut SessionContext) -> T,
    ) -> Option<T> {
        let mut sessions = self.sessions.write().await;
        Self::prune(&mut sessions, now, self.idle_timeout);

        let ctx = sessions.get_mut(&id)?;
        ctx.last_seen = now;
        Some(f(ctx))
    }

    /// End a session. Returns whether it existed.
    pub async fn destroy(&self, id: Uuid) -> bool {
        let removed = self.sessions.write().await.remove(&id);
        if let Some(ctx) = &removed {
            info!(user_id = ctx.user_id, "Session ended");
        }
        removed.is_some()
    }

    /// Number of live sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    fn prune(
        sessions: &mut HashMap<Uuid, SessionContext>,
        now: DateTime<Utc>,
        idle_timeout: Duration,
    ) {
        let before = sessions.len();
        sessions.retain(|_, ctx| !ctx.is_expired(now, idle_timeout));
        let pruned = before - sessions.len();
        if pruned > 0 {
            debug!(pruned, "Dropped idle sessions");
        }
    }
}

/// Session id from the request's cookie header.
pub fn session_id(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| Uuid::parse_str(value.trim()).ok())
}

/// `Set-Cookie` value for a new session.
pub fn session_cookie(id: Uuid) -> String {
    format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, id)
}

/// `Set-Cookie` value that removes the session cookie.
pub fn expired_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", SESSION_COOKIE)
}

/// The caller's live session. Requests without one are sent to the login page.
pub struct CurrentSession {
    pub id: Uuid,
    pub context: SessionContext,
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentSession {
    type Rejection = Redirect;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let id = session_id(&parts.headers).ok_or_else(|| Redirect::to("/"))?;
        let context = state
            .sessions
            .snapshot(id)
            .await
            .ok_or_else(|| Redirect::to("/"))?;

        Ok(Self { id, context })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use chrono::Duration as TimeDelta;

    #[tokio::test]
    async fn test_create_and_update() {
        let store = SessionStore::new(Duration::from_secs(3600));
        let id = store.create(7, "ada").await;

        let ctx = store.snapshot(id).await.unwrap();
        assert_eq!(ctx.user_id, 7);
        assert_eq!(ctx.username, "ada");

        store.flash(id, FlashLevel::Success, "saved").await;
        let flash = store.update(id, |ctx| ctx.take_flash()).await.unwrap();
        assert_eq!(flash.unwrap().message, "saved");
        assert!(store.update(id, |ctx| ctx.take_flash()).await.unwrap().is_none());

        assert!(store.destroy(id).await);
        assert!(store.snapshot(id).await.is_none());
        assert!(!store.destroy(id).await);
    }

    #[tokio::test]
    async fn test_idle_sessions_expire() {
        let store = SessionStore::new(Duration::from_secs(60));
        let stale = store.create(1, "old").await;
        let fresh = store.create(2, "new").await;

        let now = Utc::now();
        // Keep `fresh` alive just before the deadline
        store.update_at(fresh, now + TimeDelta::seconds(50), |_| ()).await;

        let later = now + TimeDelta::seconds(90);
        assert!(store.update_at(stale, later, |_| ()).await.is_none());
        assert!(store.update_at(fresh, later, |_| ()).await.is_some());
        assert_eq!(store.len().await, 1);
    }

    #[test]
    fn test_open_path_resets_per_path_state() {
        let mut ctx = SessionContext::new(1, "ada", Utc::now());
        ctx.open_path(3, Curriculum::default());
        ctx.explanation = Some("x".into());
        ctx.project = Some(ProjectScaffold::default());

        // Reopening the same path keeps state
        ctx.open_path(3, Curriculum::default());
        assert!(ctx.project.is_some());
        assert!(ctx.cached_curriculum(3).is_some());
        assert!(ctx.cached_curriculum(4).is_none());

        ctx.open_path(4, Curriculum::default());
        assert!(ctx.project.is_none());
        assert!(ctx.explanation.is_none());

        ctx.close_path();
        assert!(ctx.current_path_id.is_none());
        assert!(ctx.curriculum.is_none());
    }

    #[test]
    fn test_cookie_parsing() {
        let id = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_str(&format!("theme=dark; {}={}; other=1", SESSION_COOKIE, id))
                .unwrap(),
        );
        assert_eq!(session_id(&headers), Some(id));

        let mut bad = HeaderMap::new();
        bad.insert(COOKIE, HeaderValue::from_static("copilot_session=not-a-uuid"));
        assert_eq!(session_id(&bad), None);
        assert_eq!(session_id(&HeaderMap::new()), None);

        assert!(session_cookie(id).starts_with(&format!("copilot_session={};", id)));
        assert!(expired_cookie().contains("Max-Age=0"));
    }
}
