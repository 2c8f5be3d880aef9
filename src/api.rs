//! HTTP front end
//!
//! Server-rendered chat page, prompt submission and reset.

mod assets;
mod handlers;
mod templates;

pub use handlers::create_router;

use crate::qa::QaChain;
use crate::session::SessionStore;
use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use std::sync::Arc;
use templates::Templates;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionStore>,
    pub qa: Arc<dyn QaChain>,
    pub templates: Arc<Templates>,
    cookie_key: Key,
}

impl AppState {
    pub fn new(
        sessions: SessionStore,
        qa: Arc<dyn QaChain>,
        cookie_key: Key,
    ) -> Result<Self, minijinja::Error> {
        Ok(Self {
            sessions: Arc::new(sessions),
            qa,
            templates: Arc::new(Templates::new()?),
            cookie_key,
        })
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}
