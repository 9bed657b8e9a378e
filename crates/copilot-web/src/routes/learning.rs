//! Learning page: modules, chat, progress and the current project.

use std::collections::HashMap;

use askama::Template;
use axum::extract::{Path, State};
use axum::response::Redirect;
use axum::{Form, Json};
use completion::ChatMessage as Turn;
use curriculum::karpathy::{self, KarpathyMode};
use curriculum::{
    AdaptationReport, CapstoneProject, CodeAnalysis, Curriculum, Difficulty, Module,
    ProgressSummary, ProjectIdea, ProjectScaffold,
};
use database::chat_history::{self, DEFAULT_HISTORY_LIMIT};
use database::{ChatMessage, LearningPath, ModuleProgress, ProgressStatus};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::error::{AppError, Result};
use crate::routes::{Sidebar, Wisdom};
use crate::session::{CurrentSession, Flash, FlashLevel, SessionContext};
use crate::state::AppState;

/// Completion counts for one learning path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathProgress {
    pub completed: usize,
    pub in_progress: usize,
    pub total_modules: usize,
    pub completion_percentage: f64,
}

impl PathProgress {
    pub fn compute(progress: &[ModuleProgress], total_modules: usize) -> Self {
        let count = |status| progress.iter().filter(|p| p.status == status).count();
        let completed = count(ProgressStatus::Completed);
        let completion_percentage = if total_modules > 0 {
            completed as f64 / total_modules as f64 * 100.0
        } else {
            0.0
        };

        Self {
            completed,
            in_progress: count(ProgressStatus::InProgress),
            total_modules,
            completion_percentage,
        }
    }

    pub fn percentage_label(&self) -> String {
        format!("{:.0}%", self.completion_percentage)
    }
}

fn status_icon(status: ProgressStatus) -> &'static str {
    match status {
        ProgressStatus::NotStarted => "⭕",
        ProgressStatus::InProgress => "🔄",
        ProgressStatus::Completed => "✅",
    }
}

/// A module with its progress, ready to render.
pub struct ModuleView {
    pub number: usize,
    pub id: String,
    pub title: String,
    pub description: String,
    pub learning_outcomes: Vec<String>,
    pub concepts: Vec<String>,
    pub projects: Vec<ProjectIdea>,
    pub difficulty: Difficulty,
    pub status_icon: &'static str,
    pub status_label: &'static str,
    pub status_class: &'static str,
    pub in_progress: bool,
    pub is_current: bool,
}

pub struct ChatView {
    pub role: String,
    pub content: String,
}

pub struct ModeOption {
    pub name: &'static str,
    pub selected: bool,
}

pub struct AnalysisView {
    pub analysis: CodeAnalysis,
    pub score: String,
}

/// Learning page template.
#[derive(Template)]
#[template(path = "learning.html")]
pub struct LearningTemplate {
    pub username: String,
    pub flash: Option<Flash>,
    pub path_id: i64,
    pub title: String,
    pub description: String,
    pub source_type: String,
    pub created: String,
    pub generated_from: Option<String>,
    pub estimated_duration: String,
    pub prerequisites: Vec<String>,
    pub capstone: Option<CapstoneProject>,
    pub modules: Vec<ModuleView>,
    pub progress: PathProgress,
    pub chat: Vec<ChatView>,
    pub nudge: Option<&'static str>,
    pub modes: Vec<ModeOption>,
    pub mode_greeting: Option<&'static str>,
    pub current_module: Option<String>,
    pub project: Option<ProjectScaffold>,
    pub code_analysis: Option<AnalysisView>,
    pub explanation: Option<String>,
    pub adaptation: Option<AdaptationReport>,
    pub wisdom: Wisdom,
    pub sidebar: Sidebar,
}

/// Load a path owned by the session's user, with its curriculum.
async fn load_path(
    state: &AppState,
    session: &CurrentSession,
    path_id: i64,
) -> Result<(LearningPath, Curriculum)> {
    let path = database::learning_path::get_learning_path(state.db.pool(), path_id).await?;
    if path.user_id != session.context.user_id {
        return Err(AppError::NotFound(format!("learning path {}", path_id)));
    }

    let curriculum = match session.context.cached_curriculum(path_id) {
        Some(curriculum) => curriculum.clone(),
        None => match path.curriculum()? {
            Value::Null => Curriculum::default(),
            document => Curriculum::from_value(document)?,
        },
    };

    Ok((path, curriculum))
}

fn find_module(curriculum: &Curriculum, module_id: &str) -> Result<Module> {
    curriculum
        .module(module_id)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("module {}", module_id)))
}

fn back_to(path_id: i64) -> Redirect {
    Redirect::to(&format!("/paths/{}", path_id))
}

pub async fn learning_page(
    State(state): State<AppState>,
    session: CurrentSession,
    Path(path_id): Path<i64>,
) -> Result<LearningTemplate> {
    let (path, curriculum) = load_path(&state, &session, path_id).await?;
    let user_id = session.context.user_id;
    let pool = state.db.pool();

    let progress = database::progress::get_progress(pool, user_id, path_id).await?;
    let chat = chat_history::get_chat_history(pool, user_id, path_id, DEFAULT_HISTORY_LIMIT).await?;

    let opened = curriculum.clone();
    let (flash, ctx) = state
        .sessions
        .update(session.id, |ctx| {
            ctx.open_path(path_id, opened);
            (ctx.take_flash(), ctx.clone())
        })
        .await
        .unwrap_or((None, session.context));

    Ok(render_learning(&path, curriculum, &progress, chat, flash, &ctx))
}

fn render_learning(
    path: &LearningPath,
    curriculum: Curriculum,
    progress: &[ModuleProgress],
    chat: Vec<ChatMessage>,
    flash: Option<Flash>,
    ctx: &SessionContext,
) -> LearningTemplate {
    let statuses: HashMap<&str, ProgressStatus> = progress
        .iter()
        .map(|p| (p.module_id.as_str(), p.status))
        .collect();
    let current_id = ctx.current_module.as_ref().map(|m| m.id.as_str());
    let total = curriculum.modules.len();

    let modules = curriculum
        .modules
        .iter()
        .enumerate()
        .map(|(idx, module)| {
            let status = statuses.get(module.id.as_str()).copied().unwrap_or_default();
            ModuleView {
                number: idx + 1,
                id: module.id.clone(),
                title: module.title.clone(),
                description: module.description.clone(),
                learning_outcomes: module.learning_outcomes.clone(),
                concepts: module.concepts.clone(),
                projects: module.projects.clone(),
                difficulty: Difficulty::for_position(idx, total),
                status_icon: status_icon(status),
                status_label: status.label(),
                status_class: status.as_str(),
                in_progress: status == ProgressStatus::InProgress,
                is_current: current_id == Some(module.id.as_str()),
            }
        })
        .collect();

    let nudge = chat
        .iter()
        .rev()
        .find(|m| m.role == "user")
        .map(|m| karpathy::socratic_response(&m.content, &mut rand::thread_rng()));

    LearningTemplate {
        username: ctx.username.clone(),
        flash,
        path_id: path.id,
        title: curriculum.title.clone(),
        description: curriculum.description.clone(),
        source_type: path.source_type.clone(),
        created: path.created_date().to_string(),
        generated_from: curriculum.generated_from().map(str::to_string),
        estimated_duration: curriculum.estimated_duration.clone(),
        prerequisites: curriculum.prerequisites.clone(),
        capstone: curriculum.capstone_project.clone(),
        modules,
        progress: PathProgress::compute(progress, total),
        chat: chat
            .into_iter()
            .map(|m| ChatView {
                role: m.role,
                content: m.content,
            })
            .collect(),
        nudge,
        modes: KarpathyMode::ALL
            .iter()
            .map(|mode| ModeOption {
                name: mode.name(),
                selected: ctx.mode == Some(*mode),
            })
            .collect(),
        mode_greeting: ctx.mode.map(|mode| mode.greeting()),
        current_module: ctx.current_module.as_ref().map(|m| m.title.clone()),
        project: ctx.project.clone(),
        code_analysis: ctx.code_analysis.clone().map(|analysis| AnalysisView {
            score: format!("{:.0}%", analysis.completeness_score),
            analysis,
        }),
        explanation: ctx.explanation.clone(),
        adaptation: ctx.adaptation.clone(),
        wisdom: Wisdom::pick(),
        sidebar: Sidebar::new(ctx, &format!("/paths/{}", path.id)),
    }
}

/// Progress summary as JSON.
pub async fn progress_api(
    State(state): State<AppState>,
    session: CurrentSession,
    Path(path_id): Path<i64>,
) -> Result<Json<PathProgress>> {
    let (_, curriculum) = load_path(&state, &session, path_id).await?;
    let progress =
        database::progress::get_progress(state.db.pool(), session.context.user_id, path_id)
            .await?;

    Ok(Json(PathProgress::compute(&progress, curriculum.modules.len())))
}

async fn set_status(
    state: &AppState,
    session: &CurrentSession,
    path_id: i64,
    module_id: &str,
    status: ProgressStatus,
) -> Result<Module> {
    let (_, curriculum) = load_path(state, session, path_id).await?;
    let module = find_module(&curriculum, module_id)?;

    database::progress::update_progress(
        state.db.pool(),
        session.context.user_id,
        path_id,
        &module.id,
        status,
        None,
        None,
    )
    .await?;

    Ok(module)
}

pub async fn start_module(
    State(state): State<AppState>,
    session: CurrentSession,
    Path((path_id, module_id)): Path<(i64, String)>,
) -> Result<Redirect> {
    let module = set_status(&state, &session, path_id, &module_id, ProgressStatus::InProgress).await?;

    state
        .sessions
        .update(session.id, |ctx| {
            ctx.flash(FlashLevel::Info, format!("🔄 Started {}", module.title));
            ctx.current_module = Some(module);
        })
        .await;

    Ok(back_to(path_id))
}

pub async fn complete_module(
    State(state): State<AppState>,
    session: CurrentSession,
    Path((path_id, module_id)): Path<(i64, String)>,
) -> Result<Redirect> {
    set_status(&state, &session, path_id, &module_id, ProgressStatus::Completed).await?;

    state
        .sessions
        .flash(session.id, FlashLevel::Success, "Module completed! 🎉")
        .await;

    Ok(back_to(path_id))
}

pub async fn generate_project(
    State(state): State<AppState>,
    session: CurrentSession,
    Path((path_id, module_id)): Path<(i64, String)>,
) -> Result<Redirect> {
    let (_, curriculum) = load_path(&state, &session, path_id).await?;
    let module = find_module(&curriculum, &module_id)?;

    let scaffold = match state.generator.generate_project(&module, &curriculum).await {
        Ok(outcome) => outcome.decode::<ProjectScaffold>("project scaffold"),
        Err(err) => {
            warn!(module = %module.id, "Project generation failed: {}", err);
            state
                .sessions
                .flash(session.id, FlashLevel::Error, format!("Error: {}", err))
                .await;
            return Ok(back_to(path_id));
        }
    };

    state
        .sessions
        .update(session.id, move |ctx| match scaffold {
            Ok(scaffold) => {
                ctx.flash(
                    FlashLevel::Success,
                    format!("🛠️ Project ready: {}", scaffold.title),
                );
                ctx.project = Some(scaffold);
                ctx.current_module = Some(module);
                ctx.code_analysis = None;
                ctx.explanation = None;
            }
            Err(failed) => {
                ctx.flash(
                    FlashLevel::Error,
                    format!("Error: {}", failed.error().unwrap_or("project generation failed")),
                );
            }
        })
        .await;

    Ok(back_to(path_id))
}

#[derive(Deserialize)]
pub struct ChatForm {
    pub message: String,
}

/// Store the question, ask for guidance and store the answer.
pub async fn chat(
    State(state): State<AppState>,
    session: CurrentSession,
    Path(path_id): Path<i64>,
    Form(form): Form<ChatForm>,
) -> Result<Redirect> {
    let question = form.message.trim();
    if question.is_empty() {
        return Ok(back_to(path_id));
    }

    let (_, curriculum) = load_path(&state, &session, path_id).await?;
    let pool = state.db.pool();
    let user_id = session.context.user_id;

    let history: Vec<Turn> =
        chat_history::get_chat_history(pool, user_id, path_id, DEFAULT_HISTORY_LIMIT)
            .await?
            .into_iter()
            .filter_map(|m| match m.role.as_str() {
                "user" => Some(Turn::user(m.content)),
                "assistant" => Some(Turn::assistant(m.content)),
                _ => None,
            })
            .collect();

    chat_history::add_chat_message(pool, user_id, path_id, "user", question).await?;

    let current_module = session
        .context
        .current_module
        .as_ref()
        .map(|m| m.title.as_str());
    let context = format!("Learning: {}", curriculum.title);

    let answer = state
        .generator
        .learning_guidance(question, &context, current_module, &history, session.context.mode)
        .await;

    match answer {
        Ok(answer) => {
            chat_history::add_chat_message(pool, user_id, path_id, "assistant", &answer).await?;
        }
        Err(err) => {
            warn!(path_id, "Learning guidance failed: {}", err);
            state
                .sessions
                .flash(session.id, FlashLevel::Error, format!("Error: {}", err))
                .await;
        }
    }

    Ok(back_to(path_id))
}

#[derive(Deserialize)]
pub struct ModeForm {
    pub mode: String,
}

/// Pick the coaching mode used for chat answers. An empty value clears it.
pub async fn set_mode(
    State(state): State<AppState>,
    session: CurrentSession,
    Path(path_id): Path<i64>,
    Form(form): Form<ModeForm>,
) -> Redirect {
    let mode = match form.mode.trim() {
        "" => None,
        name => Some(KarpathyMode::from_name(name)),
    };

    state
        .sessions
        .update(session.id, |ctx| {
            ctx.mode = mode;
            if let Some(mode) = mode {
                ctx.flash(FlashLevel::Info, mode.greeting());
            }
        })
        .await;

    back_to(path_id)
}

#[derive(Deserialize)]
pub struct CodeForm {
    pub code: String,
}

/// Review a submission against the current project.
pub async fn analyze_code(
    State(state): State<AppState>,
    session: CurrentSession,
    Path(path_id): Path<i64>,
    Form(form): Form<CodeForm>,
) -> Result<Redirect> {
    let Some(project) = session.context.project.as_ref() else {
        state
            .sessions
            .flash(session.id, FlashLevel::Error, "Generate a project first")
            .await;
        return Ok(back_to(path_id));
    };
    if form.code.trim().is_empty() {
        return Ok(back_to(path_id));
    }

    let requirements = serde_json::to_value(project)?;
    let analysis = match state
        .generator
        .analyze_code_submission(&form.code, &requirements)
        .await
    {
        Ok(outcome) => outcome.decode::<CodeAnalysis>("analysis"),
        Err(err) => {
            state
                .sessions
                .flash(session.id, FlashLevel::Error, format!("Error: {}", err))
                .await;
            return Ok(back_to(path_id));
        }
    };

    state
        .sessions
        .update(session.id, move |ctx| match analysis {
            Ok(analysis) => {
                let (level, message) = if analysis.requirements_met {
                    (FlashLevel::Success, "✅ Great job! Requirements met!")
                } else {
                    (FlashLevel::Info, "⚠️ Some requirements need work")
                };
                ctx.flash(level, message);
                ctx.code_analysis = Some(analysis);
            }
            Err(failed) => {
                ctx.flash(
                    FlashLevel::Error,
                    format!("Error: {}", failed.error().unwrap_or("analysis failed")),
                );
            }
        })
        .await;

    Ok(back_to(path_id))
}

#[derive(Deserialize)]
pub struct ExplainForm {
    pub code: String,
    #[serde(default)]
    pub error: String,
}

/// Explain code, or walk through debugging when an error is pasted too.
pub async fn explain_code(
    State(state): State<AppState>,
    session: CurrentSession,
    Path(path_id): Path<i64>,
    Form(form): Form<ExplainForm>,
) -> Result<Redirect> {
    if form.code.trim().is_empty() {
        return Ok(back_to(path_id));
    }

    let error = Some(form.error.trim()).filter(|e| !e.is_empty());
    match state.generator.explain_code(&form.code, error).await {
        Ok(explanation) => {
            state
                .sessions
                .update(session.id, |ctx| ctx.explanation = Some(explanation))
                .await;
        }
        Err(err) => {
            state
                .sessions
                .flash(session.id, FlashLevel::Error, format!("Error: {}", err))
                .await;
        }
    }

    Ok(back_to(path_id))
}

#[derive(Deserialize)]
pub struct AdaptForm {
    #[serde(default)]
    pub feedback: String,
}

/// Ask for curriculum adaptations based on progress and feedback.
pub async fn adapt(
    State(state): State<AppState>,
    session: CurrentSession,
    Path(path_id): Path<i64>,
    Form(form): Form<AdaptForm>,
) -> Result<Redirect> {
    let (path, _) = load_path(&state, &session, path_id).await?;
    let progress =
        database::progress::get_progress(state.db.pool(), session.context.user_id, path_id)
            .await?;

    let ids = |status| {
        progress
            .iter()
            .filter(|p| p.status == status)
            .map(|p| p.module_id.clone())
            .collect::<Vec<_>>()
    };
    let summary = ProgressSummary {
        completed: ids(ProgressStatus::Completed),
        in_progress: ids(ProgressStatus::InProgress),
    };

    let feedback = Some(form.feedback.trim()).filter(|f| !f.is_empty());
    let document = path.curriculum()?;

    let report = match state
        .generator
        .adapt_curriculum(&document, &summary, feedback)
        .await
    {
        Ok(outcome) => outcome.decode::<AdaptationReport>("adaptations"),
        Err(err) => {
            state
                .sessions
                .flash(session.id, FlashLevel::Error, format!("Error: {}", err))
                .await;
            return Ok(back_to(path_id));
        }
    };

    info!(path_id, completed = summary.completed.len(), "Curriculum adaptation requested");

    state
        .sessions
        .update(session.id, move |ctx| match report {
            Ok(report) => {
                ctx.flash(FlashLevel::Success, "🧭 Adaptation suggestions ready");
                ctx.adaptation = Some(report);
            }
            Err(failed) => {
                ctx.flash(
                    FlashLevel::Error,
                    format!("Error: {}", failed.error().unwrap_or("adaptation failed")),
                );
            }
        })
        .await;

    Ok(back_to(path_id))
}
