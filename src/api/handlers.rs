//! HTTP request handlers

use super::assets::serve_static;
use super::AppState;
use crate::chat::ConversationTurn;
use crate::render::markdown_to_html;
use crate::session::{Session, SessionId};
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Form, Router,
};
use axum_extra::extract::cookie::{Cookie, SameSite, SignedCookieJar};
use serde::Deserialize;

const SESSION_COOKIE: &str = "rag_chat_session";

/// Shown in place of an answer when the QA chain fails
pub const GENERIC_ERROR: &str =
    "An error occurred while processing your request. Please check the server logs.";

/// Create the router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(show_chat).post(submit_prompt))
        .route("/clear", get(clear_chat))
        .route("/static/*path", get(serve_static))
        .route("/version", get(get_version))
        .with_state(state)
}

// ============================================================
// Sessions
// ============================================================

/// Resolve the caller's session and (re)issue its cookie.
///
/// The cookie is refreshed on every request so its lifetime slides along
/// with the store's idle TTL.
fn open_session(state: &AppState, jar: SignedCookieJar) -> (SignedCookieJar, Session) {
    let id = jar
        .get(SESSION_COOKIE)
        .and_then(|cookie| cookie.value().parse::<SessionId>().ok());
    let session = state.sessions.open(id);

    let max_age = i64::try_from(state.sessions.ttl().as_secs()).unwrap_or(i64::MAX);
    let cookie = Cookie::build((SESSION_COOKIE, session.id.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(max_age));

    (jar.add(cookie), session)
}

// ============================================================
// Chat
// ============================================================

async fn show_chat(
    State(state): State<AppState>,
    jar: SignedCookieJar,
) -> Result<(SignedCookieJar, Html<String>), AppError> {
    let (jar, session) = open_session(&state, jar);
    let log = session.log.lock().await;
    let page = state.templates.chat_page(log.turns(), None)?;
    Ok((jar, Html(page)))
}

#[derive(Debug, Deserialize)]
struct PromptForm {
    #[serde(default)]
    prompt: String,
}

async fn submit_prompt(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Form(form): Form<PromptForm>,
) -> Result<Response, AppError> {
    let (jar, session) = open_session(&state, jar);

    let prompt = form.prompt.trim();
    if prompt.is_empty() {
        return Ok((jar, Redirect::to("/")).into_response());
    }

    // Held for the whole exchange: one exchange per session at a time
    let mut log = session.log.lock().await;
    let history = log.turns().to_vec();
    log.push(ConversationTurn::user(prompt));

    match state.qa.answer(prompt, &history).await {
        Ok(markdown) => {
            log.push(ConversationTurn::assistant(markdown_to_html(&markdown)));
            Ok((jar, Redirect::to("/")).into_response())
        }
        Err(e) => {
            tracing::error!(
                session = %session.id,
                kind = %e.kind,
                error = %e.message,
                "Error during QA chain execution"
            );
            let page = state.templates.chat_page(log.turns(), Some(GENERIC_ERROR))?;
            Ok((jar, Html(page)).into_response())
        }
    }
}

async fn clear_chat(State(state): State<AppState>, jar: SignedCookieJar) -> impl IntoResponse {
    let (jar, session) = open_session(&state, jar);

    let mut log = session.log.lock().await;
    let cleared = log.len();
    log.clear();
    tracing::debug!(session = %session.id, cleared, "Cleared conversation");

    (jar, Redirect::to("/"))
}

// ============================================================
// Version
// ============================================================

async fn get_version() -> &'static str {
    concat!("rag-chat ", env!("CARGO_PKG_VERSION"))
}

// ============================================================
// Error Handling
// ============================================================

enum AppError {
    Internal(String),
}

impl From<minijinja::Error> for AppError {
    fn from(e: minijinja::Error) -> Self {
        AppError::Internal(format!("Template rendering failed: {e}"))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let AppError::Internal(message) = self;
        tracing::error!(error = %message, "Request failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Html("<h1>500 - Internal Server Error</h1>"),
        )
            .into_response()
    }
}
