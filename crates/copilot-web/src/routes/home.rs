//! Login page and home page.

use askama::Template;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use curriculum::wisdom::{self, ANTI_PATTERNS, BUILD_PIPELINE};
use curriculum::{QuickStartTemplate, QUICK_START_TEMPLATES};
use ingest::{learning_content, FileFormat, RepoAnalysis};

use crate::error::Result;
use crate::routes::paths::{DURATIONS, LEVELS};
use crate::routes::{Sidebar, Wisdom};
use crate::session::{CurrentSession, Flash};
use crate::state::AppState;

/// Principle cards shown on the landing pages.
const PRINCIPLE_CARDS: usize = 6;

/// Login page template.
#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub error: Option<String>,
    pub wisdom: Wisdom,
    pub principles: &'static [(&'static str, &'static str)],
    pub anti_patterns: &'static [&'static str],
}

impl LoginTemplate {
    pub fn new(error: Option<String>) -> Self {
        Self {
            error,
            wisdom: Wisdom::pick(),
            principles: wisdom::principle_cards(PRINCIPLE_CARDS),
            anti_patterns: ANTI_PATTERNS,
        }
    }
}

/// A saved learning path in the list.
pub struct PathRow {
    pub id: i64,
    pub title: String,
    pub source_type: String,
    pub created: String,
}

/// The last repository analysis, ready to render.
pub struct RepoView {
    pub name: String,
    pub url: String,
    pub language: String,
    pub stars: u64,
    pub topics: Vec<String>,
    pub tree: String,
    pub digest: String,
}

impl From<&RepoAnalysis> for RepoView {
    fn from(analysis: &RepoAnalysis) -> Self {
        Self {
            name: analysis.name.clone(),
            url: analysis.url.clone(),
            language: analysis
                .language
                .clone()
                .unwrap_or_else(|| "Unknown".to_string()),
            stars: analysis.stars,
            topics: analysis.topics.clone(),
            tree: analysis.structure.render_tree(),
            digest: learning_content(analysis),
        }
    }
}

/// Home page template.
#[derive(Template)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub username: String,
    pub flash: Option<Flash>,
    pub paths: Vec<PathRow>,
    pub templates: &'static [QuickStartTemplate],
    pub levels: &'static [&'static str],
    pub durations: &'static [&'static str],
    pub upload_formats: String,
    pub repo: Option<RepoView>,
    pub pipeline: &'static [(&'static str, &'static str)],
    pub principles: &'static [(&'static str, &'static str)],
    pub wisdom: Wisdom,
    pub sidebar: Sidebar,
}

/// Render the home page, or the login page without a session.
pub async fn home_page(
    State(state): State<AppState>,
    session: Option<CurrentSession>,
) -> Result<Response> {
    let Some(session) = session else {
        return Ok(LoginTemplate::new(None).into_response());
    };

    let user_id = session.context.user_id;
    let paths = database::learning_path::list_learning_paths(state.db.pool(), user_id)
        .await?
        .into_iter()
        .map(|path| PathRow {
            created: path.created_date().to_string(),
            id: path.id,
            title: path.title,
            source_type: path.source_type,
        })
        .collect();

    let flash = state
        .sessions
        .update(session.id, |ctx| ctx.take_flash())
        .await
        .flatten();
    let ctx = &session.context;

    Ok(HomeTemplate {
        username: ctx.username.clone(),
        flash,
        paths,
        templates: QUICK_START_TEMPLATES,
        levels: &LEVELS,
        durations: &DURATIONS,
        upload_formats: FileFormat::supported().join(","),
        repo: ctx.repo_analysis.as_ref().map(RepoView::from),
        pipeline: BUILD_PIPELINE,
        principles: wisdom::principle_cards(PRINCIPLE_CARDS),
        wisdom: Wisdom::pick(),
        sidebar: Sidebar::new(ctx, "/"),
    }
    .into_response())
}
