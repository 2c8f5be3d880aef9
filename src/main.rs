//! RAG Chat - server-rendered chat front end for a question-answering chain
//!
//! Keeps a per-browser conversation in memory, forwards each prompt with its
//! history to the QA chain and renders the Markdown answers as HTML.

mod api;
mod chat;
mod config;
mod qa;
mod render;
mod session;

use api::{create_router, AppState};
use axum_extra::extract::cookie::Key;
use config::AppConfig;
use session::SessionStore;
use tower_http::{compression::CompressionLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env file is fine; real environment variables still apply
    let dotenv_path = dotenv::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rag_chat=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    if let Some(path) = dotenv_path {
        tracing::info!(path = %path.display(), "Loaded environment file");
    }

    // Configuration
    let config = AppConfig::from_env()?;

    let cookie_key = match &config.session_secret {
        Some(secret) => Key::try_from(secret.as_bytes())?,
        None => {
            tracing::info!("RAG_CHAT_SESSION_SECRET not set; sessions will not survive a restart");
            Key::generate()
        }
    };

    // Initialize QA chain
    let qa = qa::build_chain(&config.qa)?;
    tracing::info!(
        chain = %qa.name(),
        endpoint = %config.qa.endpoint,
        timeout_secs = ?config.qa.timeout.map(|t| t.as_secs()),
        "QA chain initialized"
    );

    // Create application state
    let sessions = SessionStore::new(config.session_ttl);
    let state = AppState::new(sessions, qa, cookie_key)?;

    let compression = CompressionLayer::new()
        .gzip(true)
        .br(true)
        .deflate(true)
        .zstd(true);

    let app = create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(compression);

    // Start server
    let addr = config.bind_addr();
    tracing::info!("RAG Chat server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
