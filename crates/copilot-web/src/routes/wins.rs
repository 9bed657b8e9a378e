//! Tiny wins recording and export.

use axum::extract::State;
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::{IntoResponse, Redirect};
use axum::Form;
use serde::Deserialize;

use crate::routes::local_redirect;
use crate::session::{CurrentSession, FlashLevel};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct WinForm {
    pub kind: String,
    #[serde(default)]
    pub details: String,
    pub next: Option<String>,
}

/// Record a win and return to the page the form was on.
pub async fn record_win(
    State(state): State<AppState>,
    session: CurrentSession,
    Form(form): Form<WinForm>,
) -> Redirect {
    state
        .sessions
        .update(session.id, |ctx| {
            let title = ctx.wins.add_win(&form.kind, &form.details).map(|win| win.title);
            match title {
                Some(title) => ctx.flash(FlashLevel::Success, format!("🎉 {} achieved!", title)),
                None => ctx.flash(
                    FlashLevel::Error,
                    format!("Unknown win type: {}", form.kind),
                ),
            }
        })
        .await;

    Redirect::to(&local_redirect(form.next.as_deref()))
}

/// Download the win log as text.
pub async fn export_wins(session: CurrentSession) -> impl IntoResponse {
    (
        [
            (CONTENT_TYPE, "text/plain; charset=utf-8"),
            (CONTENT_DISPOSITION, "attachment; filename=\"tiny_wins.txt\""),
        ],
        session.context.wins.export(),
    )
}

#[cfg(test)]
mod tests {
    use crate::routes::test_support::*;
    use axum::http::header;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_record_and_export() {
        let (state, _) = test_state().await;
        let cookie = login(&state, "ada").await;

        let response = app(&state)
            .oneshot(form_request(
                "/wins",
                &cookie,
                "kind=first_run&details=hello+world&next=%2Fpaths%2F1",
            ))
            .await
            .unwrap();
        assert_eq!(location(&response), "/paths/1");

        let response = app(&state)
            .oneshot(get_request("/wins/export", &cookie))
            .await
            .unwrap();
        assert!(response
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .unwrap()
            .to_str()
            .unwrap()
            .starts_with("attachment"));
        let body = body_text(response).await;
        assert!(body.contains("🏃 First Run\n   hello world"));
    }

    #[tokio::test]
    async fn test_unknown_kind_is_flashed() {
        let (state, _) = test_state().await;
        let cookie = login(&state, "ada").await;
        // Consume the welcome flash
        app(&state).oneshot(get_request("/", &cookie)).await.unwrap();

        let response = app(&state)
            .oneshot(form_request("/wins", &cookie, "kind=teleport"))
            .await
            .unwrap();
        assert_eq!(location(&response), "/");

        let body = body_text(app(&state).oneshot(get_request("/", &cookie)).await.unwrap()).await;
        assert!(body.contains("Unknown win type: teleport"));
    }
}
