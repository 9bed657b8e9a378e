//! Experiment journal forms and export.

use axum::extract::State;
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Form;
use curriculum::karpathy::format_experiment_hypothesis;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{AppError, Result};
use crate::routes::local_redirect;
use crate::session::{CurrentSession, FlashLevel};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct StartForm {
    #[serde(default)]
    pub hypothesis: String,
    /// Used to draft a hypothesis when none is given.
    #[serde(default)]
    pub goal: String,
    pub learning_rate: Option<String>,
    pub batch_size: Option<String>,
    pub epochs: Option<String>,
    pub seed: Option<String>,
    pub next: Option<String>,
}

impl StartForm {
    fn hypothesis(&self) -> Option<String> {
        let hypothesis = self.hypothesis.trim();
        let goal = self.goal.trim();
        if !hypothesis.is_empty() {
            Some(hypothesis.to_string())
        } else if !goal.is_empty() {
            Some(format_experiment_hypothesis(goal))
        } else {
            None
        }
    }

    /// Hyperparameters that were filled in. Numbers are stored as numbers.
    fn config(&self) -> Map<String, Value> {
        let fields = [
            ("learning_rate", &self.learning_rate),
            ("batch_size", &self.batch_size),
            ("epochs", &self.epochs),
            ("seed", &self.seed),
        ];

        fields
            .into_iter()
            .filter_map(|(key, raw)| {
                let raw = raw.as_deref()?.trim();
                if raw.is_empty() {
                    return None;
                }
                let value = if let Ok(int) = raw.parse::<i64>() {
                    Value::from(int)
                } else if let Ok(float) = raw.parse::<f64>() {
                    Value::from(float)
                } else {
                    Value::from(raw)
                };
                Some((key.to_string(), value))
            })
            .collect()
    }
}

pub async fn start(
    State(state): State<AppState>,
    session: CurrentSession,
    Form(form): Form<StartForm>,
) -> Redirect {
    let next = local_redirect(form.next.as_deref());
    let hypothesis = form.hypothesis();
    let config = form.config();

    state
        .sessions
        .update(session.id, move |ctx| match hypothesis {
            Some(hypothesis) => {
                let id = ctx.journal.start(&hypothesis, config);
                ctx.flash(FlashLevel::Success, format!("🧪 Experiment #{} started", id));
            }
            None => ctx.flash(FlashLevel::Error, "Enter a hypothesis or a goal"),
        })
        .await;

    Redirect::to(&next)
}

#[derive(Deserialize)]
pub struct MetricForm {
    pub name: String,
    pub value: String,
    pub next: Option<String>,
}

pub async fn log_metric(
    State(state): State<AppState>,
    session: CurrentSession,
    Form(form): Form<MetricForm>,
) -> Redirect {
    let name = form.name.trim().to_string();
    let value = form.value.trim().parse::<f64>().ok();

    state
        .sessions
        .update(session.id, |ctx| match value {
            Some(_) if name.is_empty() => ctx.flash(FlashLevel::Error, "Metric name is required"),
            Some(value) => {
                if !ctx.journal.log_metric(&name, value) {
                    ctx.flash(FlashLevel::Error, "No experiment is running");
                }
            }
            None => ctx.flash(FlashLevel::Error, format!("Invalid metric value: {}", form.value)),
        })
        .await;

    Redirect::to(&local_redirect(form.next.as_deref()))
}

#[derive(Deserialize)]
pub struct ArtifactForm {
    pub name: String,
    #[serde(default)]
    pub content: String,
    pub next: Option<String>,
}

pub async fn add_artifact(
    State(state): State<AppState>,
    session: CurrentSession,
    Form(form): Form<ArtifactForm>,
) -> Redirect {
    state
        .sessions
        .update(session.id, |ctx| {
            if form.name.trim().is_empty() {
                ctx.flash(FlashLevel::Error, "Artifact name is required");
            } else if !ctx.journal.add_artifact(form.name.trim(), &form.content) {
                ctx.flash(FlashLevel::Error, "No experiment is running");
            }
        })
        .await;

    Redirect::to(&local_redirect(form.next.as_deref()))
}

#[derive(Deserialize)]
pub struct CompleteForm {
    #[serde(default)]
    pub result: String,
    #[serde(default)]
    pub insight: String,
    pub next: Option<String>,
}

/// Close the running experiment. Both result and insight are required.
pub async fn complete(
    State(state): State<AppState>,
    session: CurrentSession,
    Form(form): Form<CompleteForm>,
) -> Redirect {
    let result = form.result.trim();
    let insight = form.insight.trim();

    state
        .sessions
        .update(session.id, |ctx| {
            if result.is_empty() || insight.is_empty() {
                ctx.flash(FlashLevel::Error, "Record both a result and an insight");
                return;
            }
            let duration = ctx.journal.complete(result, insight).map(|e| e.duration);
            match duration {
                Some(duration) => ctx.flash(
                    FlashLevel::Success,
                    format!(
                        "✅ Experiment completed in {:.1} seconds",
                        duration.unwrap_or_default()
                    ),
                ),
                None => ctx.flash(FlashLevel::Error, "No experiment is running"),
            }
        })
        .await;

    Redirect::to(&local_redirect(form.next.as_deref()))
}

/// Download the journal as JSON.
pub async fn export(session: CurrentSession) -> Result<Response> {
    let json = session
        .context
        .journal
        .export_json()
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok((
        [
            (CONTENT_TYPE, "application/json"),
            (
                CONTENT_DISPOSITION,
                "attachment; filename=\"experiment_log.json\"",
            ),
        ],
        json,
    )
        .into_response())
}
