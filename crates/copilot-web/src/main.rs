//! Learning Copilot web server.
//!
//! Turns a topic, syllabus, GitHub repository or quick-start template into a
//! project-based curriculum, then tracks progress, chat and experiments as
//! the learner builds through it. Pages are server-rendered HTML.

mod config;
mod error;
mod journal;
mod routes;
mod session;
mod state;
mod wins;

use std::sync::Arc;

use completion::CompletionClient;
use curriculum::CurriculumGenerator;
use database::Database;
use ingest::GitHubFetcher;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::session::SessionStore;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    info!(addr = %config.addr, "Starting Learning Copilot");

    let db = Database::connect(&config.database_url).await?;
    db.init_schema().await?;

    // Without an API key nothing useful can be generated
    let client = match CompletionClient::from_env() {
        Ok(client) => client,
        Err(e) => {
            error!("Completion client unavailable: {}", e);
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    let generator = CurriculumGenerator::new(Arc::new(client));

    let github = GitHubFetcher::from_env()?;
    if !github.is_authenticated() {
        info!("GITHUB_ACCESS_TOKEN not set, repository analysis is rate limited");
    }

    let sessions = SessionStore::new(config.session_idle_timeout);
    let state = AppState::new(db, generator, github, sessions);

    let app = routes::router()
        .nest_service("/static", ServeDir::new(&config.static_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    info!(addr = %config.addr, "Learning Copilot listening");
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
