//! Route handlers for the web interface.

pub mod auth;
pub mod experiments;
pub mod health;
pub mod home;
pub mod learning;
pub mod paths;
pub mod wins;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use chrono::Utc;
use curriculum::karpathy;
use curriculum::wisdom::{self, Quote};

use crate::journal::Experiment;
use crate::session::SessionContext;
use crate::state::AppState;
use crate::wins::{time_ago, WinKind, WIN_KINDS};

/// Largest accepted syllabus upload.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Wins and experiments listed in the sidebar.
const SIDEBAR_ITEMS: usize = 5;

/// Build the router with all routes.
pub fn router() -> Router<AppState> {
    Router::new()
        // HTML pages
        .route("/", get(home::home_page))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        // Path creation
        .route("/paths/new", post(paths::new_path))
        .route("/paths/topic", post(paths::create_from_topic))
        .route(
            "/paths/syllabus",
            post(paths::create_from_syllabus).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/paths/github/analyze", post(paths::analyze_repository))
        .route("/paths/github", post(paths::create_from_repository))
        .route("/paths/template", post(paths::create_from_template))
        // Learning
        .route("/paths/:id", get(learning::learning_page))
        .route("/paths/:id/modules/:module/start", post(learning::start_module))
        .route("/paths/:id/modules/:module/complete", post(learning::complete_module))
        .route("/paths/:id/modules/:module/project", post(learning::generate_project))
        .route("/paths/:id/chat", post(learning::chat))
        .route("/paths/:id/mode", post(learning::set_mode))
        .route("/paths/:id/project/analyze", post(learning::analyze_code))
        .route("/paths/:id/project/explain", post(learning::explain_code))
        .route("/paths/:id/adapt", post(learning::adapt))
        // Tiny wins and experiments
        .route("/wins", post(wins::record_win))
        .route("/wins/export", get(wins::export_wins))
        .route("/experiments/start", post(experiments::start))
        .route("/experiments/metric", post(experiments::log_metric))
        .route("/experiments/artifact", post(experiments::add_artifact))
        .route("/experiments/complete", post(experiments::complete))
        .route("/experiments/export", get(experiments::export))
        // Health check
        .route("/health", get(health::health))
        // API endpoints
        .route("/api/paths/:id/progress", get(learning::progress_api))
}

/// Redirect target from a form, limited to local paths.
pub fn local_redirect(next: Option<&str>) -> String {
    match next {
        Some(next) if next.starts_with('/') && !next.starts_with("//") => next.to_string(),
        _ => "/".to_string(),
    }
}

/// Rotating philosophy copy for a page.
pub struct Wisdom {
    pub quote: Quote,
    pub mantra: &'static str,
    pub debugging_mantra: &'static str,
}

impl Wisdom {
    pub fn pick() -> Self {
        let mut rng = rand::thread_rng();
        Self {
            quote: wisdom::random_quote(&mut rng),
            mantra: wisdom::random_mantra(&mut rng),
            debugging_mantra: karpathy::debugging_mantra(&mut rng),
        }
    }
}

pub struct KeyValue {
    pub key: String,
    pub value: String,
}

pub struct WinView {
    pub icon: &'static str,
    pub title: &'static str,
    pub description: String,
    pub ago: String,
}

pub struct ExperimentView {
    pub id: u32,
    pub hypothesis: String,
    pub status: &'static str,
    pub started: String,
    pub config: Vec<KeyValue>,
    pub metrics: Vec<KeyValue>,
    pub artifacts: Vec<String>,
    pub result: Option<String>,
    pub insight: Option<String>,
    pub duration: Option<String>,
}

impl From<&Experiment> for ExperimentView {
    fn from(experiment: &Experiment) -> Self {
        Self {
            id: experiment.id,
            hypothesis: experiment.hypothesis.clone(),
            status: experiment.status.as_str(),
            started: experiment.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            config: experiment
                .config
                .iter()
                .map(|(key, value)| KeyValue {
                    key: key.clone(),
                    value: value.to_string(),
                })
                .collect(),
            metrics: experiment
                .metrics
                .iter()
                .map(|(key, value)| KeyValue {
                    key: key.clone(),
                    value: format!("{:.4}", value),
                })
                .collect(),
            artifacts: experiment.artifacts.iter().map(|a| a.name.clone()).collect(),
            result: experiment.result.clone(),
            insight: experiment.insight.clone(),
            duration: experiment.duration.map(|d| format!("{:.1} seconds", d)),
        }
    }
}

/// Tiny wins and experiment journal panel shared by the main pages.
pub struct Sidebar {
    pub total_wins: usize,
    pub streak: u32,
    pub daily_wins: u32,
    pub motivation: &'static str,
    pub recent_wins: Vec<WinView>,
    pub win_kinds: &'static [WinKind],
    pub current_experiment: Option<ExperimentView>,
    pub experiments: Vec<ExperimentView>,
    pub insights: Vec<String>,
    /// Where sidebar forms return to.
    pub next: String,
}

impl Sidebar {
    pub fn new(ctx: &SessionContext, next: &str) -> Self {
        let now = Utc::now();
        let wins = &ctx.wins;

        Self {
            total_wins: wins.total(),
            streak: wins.streak(),
            daily_wins: wins.daily_count(),
            motivation: wins.motivational_message(),
            recent_wins: wins
                .recent(SIDEBAR_ITEMS)
                .iter()
                .rev()
                .map(|win| WinView {
                    icon: win.icon,
                    title: win.title,
                    description: win.description.clone(),
                    ago: time_ago(win.timestamp, now),
                })
                .collect(),
            win_kinds: WIN_KINDS,
            current_experiment: ctx.journal.current().map(ExperimentView::from),
            experiments: ctx
                .journal
                .recent(SIDEBAR_ITEMS)
                .iter()
                .rev()
                .map(ExperimentView::from)
                .collect(),
            insights: ctx.journal.insights(),
            next: next.to_string(),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use axum::Router;
    use completion::{
        async_trait, ChatCompletionRequest, CompletionClient, CompletionConfig, CompletionError,
        CompletionTransport,
    };
    use curriculum::CurriculumGenerator;
    use database::Database;
    use ingest::GitHubFetcher;
    use tower::ServiceExt;

    use crate::session::{SessionStore, SESSION_COOKIE};
    use crate::state::AppState;

    /// Replies with canned text and records what it was sent.
    #[derive(Clone, Default)]
    pub struct ScriptedTransport {
        pub replies: Arc<Mutex<VecDeque<String>>>,
        pub sent: Arc<Mutex<Vec<ChatCompletionRequest>>>,
    }

    impl ScriptedTransport {
        pub fn reply(&self, text: &str) {
            self.replies.lock().unwrap().push_back(text.to_string());
        }
    }

    #[async_trait]
    impl CompletionTransport for ScriptedTransport {
        async fn send(
            &self,
            request: &ChatCompletionRequest,
        ) -> Result<String, CompletionError> {
            self.sent.lock().unwrap().push(request.clone());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| CompletionError::Upstream("no scripted reply".into()))
        }
    }

    pub async fn test_state() -> (AppState, ScriptedTransport) {
        test_state_with_github("http://127.0.0.1:9").await
    }

    /// Test state whose GitHub client talks to `github_url`.
    pub async fn test_state_with_github(github_url: &str) -> (AppState, ScriptedTransport) {
        let db = Database::connect_with_pool_size("sqlite::memory:", 1)
            .await
            .unwrap();
        db.init_schema().await.unwrap();

        let transport = ScriptedTransport::default();
        let config = CompletionConfig::builder()
            .api_key("test")
            .model("gpt-4")
            .build();
        let client = CompletionClient::with_transport(config, Box::new(transport.clone()));
        let github = GitHubFetcher::new(github_url, None).unwrap();

        let state = AppState::new(
            db,
            CurriculumGenerator::new(Arc::new(client)),
            github,
            SessionStore::new(Duration::from_secs(3600)),
        );
        (state, transport)
    }

    pub fn app(state: &AppState) -> Router {
        super::router().with_state(state.clone())
    }

    /// Log in through the form and return the session cookie.
    pub async fn login(state: &AppState, username: &str) -> String {
        let response = app(state)
            .oneshot(form_request("/login", "", &format!("username={}", username)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap();
        let pair = cookie.split(';').next().unwrap().to_string();
        assert!(pair.starts_with(SESSION_COOKIE));
        pair
    }

    pub fn form_request(uri: &str, cookie: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header(header::COOKIE, cookie)
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    pub fn get_request(uri: &str, cookie: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header(header::COOKIE, cookie)
            .body(Body::empty())
            .unwrap()
    }

    pub async fn body_text(response: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    pub fn location(response: &axum::response::Response) -> &str {
        response
            .headers()
            .get(header::LOCATION)
            .unwrap()
            .to_str()
            .unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_redirect() {
        assert_eq!(local_redirect(Some("/paths/3")), "/paths/3");
        assert_eq!(local_redirect(Some("//evil.example")), "/");
        assert_eq!(local_redirect(Some("https://evil.example")), "/");
        assert_eq!(local_redirect(None), "/");
    }
}
