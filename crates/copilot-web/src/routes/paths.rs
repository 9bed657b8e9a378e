//! Learning path creation: topic, syllabus upload, GitHub repository, template.

use axum::extract::{Multipart, State};
use axum::response::Redirect;
use axum::Form;
use completion::StructuredOutcome;
use curriculum::{Curriculum, QuickStartTemplate};
use ingest::{is_not_found, parse_syllabus_structure, process_file, syllabus_document};
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::error::{AppError, Result};
use crate::session::{CurrentSession, FlashLevel};
use crate::state::AppState;

pub const LEVELS: [&str; 3] = ["beginner", "intermediate", "advanced"];
pub const DURATIONS: [&str; 4] = ["2 weeks", "4 weeks", "8 weeks", "12 weeks"];

/// Characters of the source kept with a path.
const SOURCE_EXCERPT_CHARS: usize = 1000;

/// How a generated curriculum is stored.
struct NewPath<'a> {
    source_type: &'a str,
    source_content: &'a str,
    /// Used when the curriculum has no title.
    fallback_title: &'a str,
}

/// Store a generated curriculum and open it, or flash why generation failed.
async fn save_generated(
    state: &AppState,
    session: &CurrentSession,
    outcome: curriculum::Result<StructuredOutcome>,
    path: NewPath<'_>,
) -> Result<Redirect> {
    let object = match outcome {
        Ok(StructuredOutcome::Parsed(object)) => object,
        Ok(StructuredOutcome::Failed { error, .. }) => {
            return flash_home(state, session, format!("Error: {}", error)).await;
        }
        Err(err) => {
            warn!(source_type = path.source_type, "Curriculum generation failed: {}", err);
            return flash_home(state, session, format!("Error: {}", err)).await;
        }
    };

    let document = Value::Object(object);
    let curriculum = match Curriculum::from_value(document.clone()) {
        Ok(curriculum) => curriculum,
        Err(err) => {
            warn!(source_type = path.source_type, "Generated curriculum does not fit: {}", err);
            return flash_home(state, session, "Error: Failed to parse curriculum".into()).await;
        }
    };
    let title = match curriculum.title.trim() {
        "" => path.fallback_title.to_string(),
        title => title.to_string(),
    };

    let path_id = database::learning_path::create_learning_path(
        state.db.pool(),
        session.context.user_id,
        &title,
        path.source_type,
        path.source_content,
        &document,
    )
    .await?;

    state
        .sessions
        .update(session.id, |ctx| {
            ctx.open_path(path_id, curriculum);
            ctx.flash(FlashLevel::Success, "✅ Curriculum created successfully!");
        })
        .await;

    Ok(Redirect::to(&format!("/paths/{}", path_id)))
}

async fn flash_home(
    state: &AppState,
    session: &CurrentSession,
    message: String,
) -> Result<Redirect> {
    state
        .sessions
        .flash(session.id, FlashLevel::Error, message)
        .await;
    Ok(Redirect::to("/"))
}

/// Close the open path and go back to the creation forms.
pub async fn new_path(State(state): State<AppState>, session: CurrentSession) -> Redirect {
    state.sessions.update(session.id, |ctx| ctx.close_path()).await;
    Redirect::to("/")
}

#[derive(Deserialize)]
pub struct TopicForm {
    pub topic: String,
    pub level: String,
    pub duration: String,
}

pub async fn create_from_topic(
    State(state): State<AppState>,
    session: CurrentSession,
    Form(form): Form<TopicForm>,
) -> Result<Redirect> {
    let topic = form.topic.trim();
    if topic.is_empty() {
        return flash_home(&state, &session, "Please describe what you want to learn".into()).await;
    }

    let outcome = state
        .generator
        .generate_from_topic(topic, &form.level, &form.duration)
        .await;

    save_generated(
        &state,
        &session,
        outcome,
        NewPath {
            source_type: "manual",
            source_content: topic,
            fallback_title: topic,
        },
    )
    .await
}

/// Generate from an uploaded syllabus (multipart field `syllabus`).
pub async fn create_from_syllabus(
    State(state): State<AppState>,
    session: CurrentSession,
    mut multipart: Multipart,
) -> Result<Redirect> {
    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() != Some("syllabus") {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        upload = Some((filename, bytes));
    }

    let Some((filename, bytes)) = upload.filter(|(name, _)| !name.is_empty()) else {
        return flash_home(&state, &session, "Choose a syllabus file to upload".into()).await;
    };

    let file = match process_file(&filename, &bytes) {
        Ok(file) => file,
        Err(err) => return flash_home(&state, &session, err.to_string()).await,
    };
    info!(filename = %file.filename, format = %file.format, size = file.size, "Processed syllabus");

    let structure = parse_syllabus_structure(&file.content);
    let outcome = state
        .generator
        .generate_from_syllabus(&syllabus_document(&file), &structure)
        .await;
    let excerpt: String = file.content.chars().take(SOURCE_EXCERPT_CHARS).collect();

    save_generated(
        &state,
        &session,
        outcome,
        NewPath {
            source_type: "syllabus",
            source_content: &excerpt,
            fallback_title: "Custom Syllabus",
        },
    )
    .await
}

#[derive(Deserialize)]
pub struct RepositoryForm {
    pub url: String,
}

/// Analyze a repository and keep the analysis in the session.
pub async fn analyze_repository(
    State(state): State<AppState>,
    session: CurrentSession,
    Form(form): Form<RepositoryForm>,
) -> Result<Redirect> {
    let url = form.url.trim();
    if url.is_empty() {
        return flash_home(&state, &session, "Enter a GitHub repository URL".into()).await;
    }

    match state.github.analyze_repository(url).await {
        Ok(analysis) => {
            let message = format!("🔍 Analyzed {}", analysis.name);
            state
                .sessions
                .update(session.id, |ctx| {
                    ctx.repo_analysis = Some(analysis);
                    ctx.flash(FlashLevel::Success, message);
                })
                .await;
            Ok(Redirect::to("/"))
        }
        Err(err) if is_not_found(&err) => {
            warn!(%url, "Repository not found");
            flash_home(&state, &session, format!("Repository not found or private: {}", url)).await
        }
        Err(err) => {
            warn!(%url, "Repository analysis failed: {}", err);
            flash_home(&state, &session, format!("Error analyzing repository: {}", err)).await
        }
    }
}

/// Generate from the repository analyzed last.
pub async fn create_from_repository(
    State(state): State<AppState>,
    session: CurrentSession,
) -> Result<Redirect> {
    let Some(analysis) = session.context.repo_analysis.clone() else {
        return flash_home(&state, &session, "Analyze a repository first".into()).await;
    };

    let outcome = state.generator.generate_from_repository(&analysis).await;

    save_generated(
        &state,
        &session,
        outcome,
        NewPath {
            source_type: "github",
            source_content: &analysis.url,
            fallback_title: &analysis.name,
        },
    )
    .await
}

#[derive(Deserialize)]
pub struct TemplateForm {
    pub template: String,
}

pub async fn create_from_template(
    State(state): State<AppState>,
    session: CurrentSession,
    Form(form): Form<TemplateForm>,
) -> Result<Redirect> {
    let Some(template) = QuickStartTemplate::find(&form.template) else {
        return flash_home(&state, &session, format!("Unknown template: {}", form.template)).await;
    };

    let outcome = state.generator.generate_from_template(template).await;

    save_generated(
        &state,
        &session,
        outcome,
        NewPath {
            source_type: "template",
            source_content: template.description,
            fallback_title: template.title,
        },
    )
    .await
}

#[cfg(test)]
mod tests {
    use crate::routes::test_support::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_topic_creates_and_opens_path() {
        let (state, transport) = test_state().await;
        let cookie = login(&state, "ada").await;
        transport.reply(r#"{"title": "Tiny GPT", "modules": [{"title": "Bigrams"}]}"#);

        let response = app(&state)
            .oneshot(form_request(
                "/paths/topic",
                &cookie,
                "topic=transformers&level=beginner&duration=4+weeks",
            ))
            .await
            .unwrap();
        assert_eq!(location(&response), "/paths/1");

        let path = database::learning_path::get_learning_path(state.db.pool(), 1)
            .await
            .unwrap();
        assert_eq!(path.title, "Tiny GPT");
        assert_eq!(path.source_type, "manual");
        assert_eq!(path.source_content.as_deref(), Some("transformers"));
        assert_eq!(path.curriculum().unwrap()["generated_from"], "topic");

        let body = body_text(app(&state).oneshot(get_request("/paths/1", &cookie)).await.unwrap()).await;
        assert!(body.contains("Tiny GPT"));
        assert!(body.contains("Bigrams"));
        assert!(body.contains("Curriculum created successfully"));
    }

    #[tokio::test]
    async fn test_loosely_typed_curriculum_is_saved() {
        let (state, transport) = test_state().await;
        let cookie = login(&state, "ada").await;
        transport.reply(
            r#"{"title": "Tiny GPT", "prerequisites": "Python",
                "modules": [{"id": 1, "title": "Bigrams"}],
                "capstone_project": "Build a GPT"}"#,
        );

        let response = app(&state)
            .oneshot(form_request(
                "/paths/topic",
                &cookie,
                "topic=transformers&level=beginner&duration=4+weeks",
            ))
            .await
            .unwrap();
        assert_eq!(location(&response), "/paths/1");

        let paths = database::learning_path::list_learning_paths(state.db.pool(), 1)
            .await
            .unwrap();
        assert_eq!(paths.len(), 1);

        let body = body_text(app(&state).oneshot(get_request("/paths/1", &cookie)).await.unwrap()).await;
        assert!(body.contains("Bigrams"));
        assert!(body.contains("Build a GPT"));
        assert!(body.contains("/paths/1/modules/1/start"));
    }

    #[tokio::test]
    async fn test_unparsable_curriculum_is_flashed() {
        let (state, transport) = test_state().await;
        let cookie = login(&state, "ada").await;
        transport.reply("Sorry, here is some prose instead.");

        let response = app(&state)
            .oneshot(form_request(
                "/paths/topic",
                &cookie,
                "topic=rust&level=advanced&duration=2+weeks",
            ))
            .await
            .unwrap();
        assert_eq!(location(&response), "/");

        let body = body_text(app(&state).oneshot(get_request("/", &cookie)).await.unwrap()).await;
        assert!(body.contains("Error: Failed to parse curriculum"));
        let paths = database::learning_path::list_learning_paths(state.db.pool(), 1)
            .await
            .unwrap();
        assert!(paths.is_empty());
    }

    #[tokio::test]
    async fn test_syllabus_upload() {
        let (state, transport) = test_state().await;
        let cookie = login(&state, "ada").await;
        transport.reply(r#"{"title": "", "modules": []}"#);

        let boundary = "XBOUNDARY";
        let body = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"syllabus\"; filename=\"course.md\"\r\nContent-Type: text/markdown\r\n\r\n# Week 1\nTopics: tensors\n\r\n--{b}--\r\n",
            b = boundary
        );
        let request = Request::builder()
            .method("POST")
            .uri("/paths/syllabus")
            .header(header::COOKIE, &cookie)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", boundary),
            )
            .body(Body::from(body))
            .unwrap();

        let response = app(&state).oneshot(request).await.unwrap();
        assert_eq!(location(&response), "/paths/1");

        let path = database::learning_path::get_learning_path(state.db.pool(), 1)
            .await
            .unwrap();
        assert_eq!(path.title, "Custom Syllabus");
        assert_eq!(path.source_type, "syllabus");

        let sent = transport.sent.lock().unwrap();
        assert!(sent[0].messages[1].content.contains("Uploaded Syllabus: course.md"));
    }

    #[tokio::test]
    async fn test_unsupported_upload_is_flashed() {
        let (state, _) = test_state().await;
        let cookie = login(&state, "ada").await;

        let body = "--B\r\nContent-Disposition: form-data; name=\"syllabus\"; filename=\"deck.pptx\"\r\n\r\nbinary\r\n--B--\r\n";
        let request = Request::builder()
            .method("POST")
            .uri("/paths/syllabus")
            .header(header::COOKIE, &cookie)
            .header(header::CONTENT_TYPE, "multipart/form-data; boundary=B")
            .body(Body::from(body))
            .unwrap();

        let response = app(&state).oneshot(request).await.unwrap();
        assert_eq!(location(&response), "/");

        let body = body_text(app(&state).oneshot(get_request("/", &cookie)).await.unwrap()).await;
        assert!(body.contains(".pptx"));
    }

    #[tokio::test]
    async fn test_missing_repository_is_flashed() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let github = axum::Router::new().fallback(|| async {
            (StatusCode::NOT_FOUND, r#"{"message": "Not Found"}"#)
        });
        tokio::spawn(async move { axum::serve(listener, github).await });

        let (state, transport) = test_state_with_github(&format!("http://{}", addr)).await;
        let cookie = login(&state, "ada").await;

        let response = app(&state)
            .oneshot(form_request(
                "/paths/github/analyze",
                &cookie,
                "url=https%3A%2F%2Fgithub.com%2Fada%2Fgone",
            ))
            .await
            .unwrap();
        assert_eq!(location(&response), "/");

        let body = body_text(app(&state).oneshot(get_request("/", &cookie)).await.unwrap()).await;
        assert!(body.contains("Repository not found or private"));
        assert!(transport.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_repository_generation_requires_analysis() {
        let (state, transport) = test_state().await;
        let cookie = login(&state, "ada").await;

        let response = app(&state)
            .oneshot(form_request("/paths/github", &cookie, ""))
            .await
            .unwrap();
        assert_eq!(location(&response), "/");
        assert!(transport.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_template_path_title_falls_back() {
        let (state, transport) = test_state().await;
        let cookie = login(&state, "ada").await;
        transport.reply(r#"{"modules": []}"#);

        let response = app(&state)
            .oneshot(form_request("/paths/template", &cookie, "template=systems"))
            .await
            .unwrap();
        assert_eq!(location(&response), "/paths/1");

        let path = database::learning_path::get_learning_path(state.db.pool(), 1)
            .await
            .unwrap();
        assert_eq!(path.source_type, "template");
        assert_eq!(path.title, "🔧 Systems Programming");
    }

    #[tokio::test]
    async fn test_requires_session() {
        let (state, _) = test_state().await;

        let response = app(&state)
            .oneshot(form_request("/paths/topic", "", "topic=x&level=beginner&duration=2+weeks"))
            .await
            .unwrap();
        assert_eq!(location(&response), "/");
        assert!(response.headers().get(header::SET_COOKIE).is_none());
    }
}
