//! Login and logout.

use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Form;
use serde::Deserialize;
use tracing::info;

use crate::error::Result;
use crate::routes::home::LoginTemplate;
use crate::session::{expired_cookie, session_cookie, session_id, FlashLevel};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct LoginForm {
    pub username: String,
}

/// Create (or reuse) the user and start a session.
pub async fn login(State(state): State<AppState>, Form(form): Form<LoginForm>) -> Result<Response> {
    let username = form.username.trim();
    if username.is_empty() {
        return Ok(LoginTemplate::new(Some("Please enter a username".into())).into_response());
    }

    let user_id = database::user::create_user(state.db.pool(), username).await?;
    let session = state.sessions.create(user_id, username).await;
    state
        .sessions
        .flash(session, FlashLevel::Success, format!("Welcome, {}!", username))
        .await;

    info!(user_id, %username, "User logged in");

    Ok(([(SET_COOKIE, session_cookie(session))], Redirect::to("/")).into_response())
}

pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    if let Some(id) = session_id(&headers) {
        state.sessions.destroy(id).await;
    }

    ([(SET_COOKIE, expired_cookie())], Redirect::to("/"))
}

#[cfg(test)]
mod tests {
    use crate::routes::test_support::*;
    use axum::http::{header, StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_login_is_idempotent_per_username() {
        let (state, _) = test_state().await;

        login(&state, "ada").await;
        login(&state, "ada").await;
        login(&state, "grace").await;

        assert_eq!(database::user::count_users(state.db.pool()).await.unwrap(), 2);
        assert_eq!(state.sessions.len().await, 3);
    }

    #[tokio::test]
    async fn test_blank_username_renders_login() {
        let (state, _) = test_state().await;

        let response = app(&state)
            .oneshot(form_request("/login", "", "username=+++"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("Please enter a username"));
        assert_eq!(database::user::count_users(state.db.pool()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_logout_ends_session() {
        let (state, _) = test_state().await;
        let cookie = login(&state, "ada").await;

        let response = app(&state)
            .oneshot(form_request("/logout", &cookie, ""))
            .await
            .unwrap();
        assert_eq!(location(&response), "/");
        assert!(response
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap()
            .contains("Max-Age=0"));
        assert_eq!(state.sessions.len().await, 0);

        // The old cookie now gets the login page
        let response = app(&state).oneshot(get_request("/", &cookie)).await.unwrap();
        assert!(body_text(response).await.contains("Start Learning"));
    }
}
