//! Question-answering chain abstraction
//!
//! The chat handler only sees [`QaChain`]: give it a prompt plus the prior
//! turns, get back a Markdown answer or a [`QaError`].

mod error;
mod hosted;
#[cfg(test)]
pub mod testing;

pub use error::QaError;
pub use hosted::HostedQaChain;

use crate::chat::ConversationTurn;
use crate::config::QaConfig;
use async_trait::async_trait;
use std::sync::Arc;

/// Answer producer backing the chat page
#[async_trait]
pub trait QaChain: Send + Sync {
    /// Answer `prompt` given the turns that preceded it.
    ///
    /// `history` never includes `prompt` itself.
    async fn answer(&self, prompt: &str, history: &[ConversationTurn]) -> Result<String, QaError>;

    /// Short name used in logs
    fn name(&self) -> &str;
}

/// Build the chain described by the config, wrapped with logging.
pub fn build_chain(config: &QaConfig) -> Result<Arc<dyn QaChain>, reqwest::Error> {
    let inner: Arc<dyn QaChain> = match &config.hf_token {
        Some(token) => Arc::new(HostedQaChain::new(config, token.clone())?),
        None => {
            tracing::warn!("HF_TOKEN is not set; every question will fail until it is configured");
            Arc::new(MissingCredentials)
        }
    };
    Ok(Arc::new(LoggingChain::new(inner)))
}

/// Stand-in used when no token is configured
struct MissingCredentials;

#[async_trait]
impl QaChain for MissingCredentials {
    async fn answer(&self, _prompt: &str, _history: &[ConversationTurn]) -> Result<String, QaError> {
        Err(QaError::auth("HF_TOKEN is not set"))
    }

    fn name(&self) -> &str {
        "unconfigured"
    }
}

/// Logging wrapper for QA chains
pub struct LoggingChain {
    inner: Arc<dyn QaChain>,
    name: String,
}

impl LoggingChain {
    pub fn new(inner: Arc<dyn QaChain>) -> Self {
        let name = inner.name().to_string();
        Self { inner, name }
    }
}

#[async_trait]
impl QaChain for LoggingChain {
    async fn answer(&self, prompt: &str, history: &[ConversationTurn]) -> Result<String, QaError> {
        let start = std::time::Instant::now();
        let result = self.inner.answer(prompt, history).await;
        let duration = start.elapsed();

        match &result {
            Ok(answer) => {
                tracing::info!(
                    chain = %self.name,
                    duration_ms = %duration.as_millis(),
                    history_len = history.len(),
                    answer_len = answer.len(),
                    "QA request completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    chain = %self.name,
                    duration_ms = %duration.as_millis(),
                    history_len = history.len(),
                    kind = %e.kind,
                    error = %e.message,
                    "QA request failed"
                );
            }
        }

        result
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::error::QaErrorKind;
    use super::testing::MockQaChain;
    use super::*;

    #[tokio::test]
    async fn test_missing_token_fails_with_auth() {
        let config = QaConfig {
            hf_token: None,
            endpoint: "http://localhost:1/v1/chat/completions".to_string(),
            model: "m".to_string(),
            timeout: None,
        };
        let chain = build_chain(&config).unwrap();
        assert_eq!(chain.name(), "unconfigured");

        let err = chain.answer("hello", &[]).await.unwrap_err();
        assert_eq!(err.kind, QaErrorKind::Auth);
    }

    #[tokio::test]
    async fn test_token_builds_hosted_chain() {
        let config = QaConfig {
            hf_token: Some("hf_test".to_string()),
            endpoint: "http://localhost:1/v1/chat/completions".to_string(),
            model: "some/model".to_string(),
            timeout: None,
        };
        let chain = build_chain(&config).unwrap();
        assert_eq!(chain.name(), "some/model");
    }

    #[tokio::test]
    async fn test_logging_chain_passes_results_through() {
        let mock = Arc::new(MockQaChain::new());
        mock.queue_answer("**hi**");
        mock.queue_error(QaError::server_error("boom"));

        let chain = LoggingChain::new(mock.clone());
        let history = vec![ConversationTurn::user("earlier")];

        assert_eq!(chain.answer("one", &history).await.unwrap(), "**hi**");
        let err = chain.answer("two", &[]).await.unwrap_err();
        assert_eq!(err.kind, QaErrorKind::ServerError);

        let calls = mock.recorded_calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].prompt, "one");
        assert_eq!(calls[0].history, history);
        assert!(calls[1].history.is_empty());
    }
}
