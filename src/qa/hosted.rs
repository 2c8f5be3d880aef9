//! Hosted QA chain over an `OpenAI`-compatible chat completions endpoint
//!
//! Defaults to the Hugging Face inference router, authenticated with
//! `HF_TOKEN`.

use super::{QaChain, QaError};
use crate::chat::{ConversationTurn, Role};
use crate::config::QaConfig;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

const SYSTEM_PROMPT: &str = "You are a helpful question-answering assistant. \
Answer the user's question accurately and concisely using the conversation so far as context. \
If you do not know the answer, say so instead of making one up. Format answers in Markdown.";

const MAX_TOKENS: u32 = 1024;

pub struct HostedQaChain {
    client: Client,
    token: String,
    endpoint: String,
    model: String,
}

impl HostedQaChain {
    pub fn new(config: &QaConfig, token: String) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            token,
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
        })
    }

    fn translate_request(&self, prompt: &str, history: &[ConversationTurn]) -> ChatRequest {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ChatMessage {
            role: "system".to_string(),
            content: SYSTEM_PROMPT.to_string(),
        });

        messages.extend(history.iter().map(|turn| ChatMessage {
            role: match turn.role {
                Role::User => "user",
                Role::Assistant => "assistant",
            }
            .to_string(),
            content: turn.content.clone(),
        }));

        messages.push(ChatMessage {
            role: "user".to_string(),
            content: prompt.to_string(),
        });

        ChatRequest {
            model: self.model.clone(),
            messages,
            max_tokens: MAX_TOKENS,
            stream: false,
        }
    }

    fn normalize_response(resp: ChatResponse) -> Result<String, QaError> {
        let choice = resp
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| QaError::invalid_response("No choices in response"))?;

        match choice.message.content {
            Some(text) if !text.trim().is_empty() => Ok(text),
            _ => Err(QaError::invalid_response("Response contained no answer text")),
        }
    }

    fn classify_error(status: reqwest::StatusCode, body: &str) -> QaError {
        let message = serde_json::from_str::<ErrorResponse>(body)
            .map(|e| e.error.message())
            .unwrap_or_else(|_| body.to_string());

        match status.as_u16() {
            401 | 403 => QaError::auth(format!("Authentication failed: {message}")),
            429 => QaError::rate_limit(format!("Rate limit exceeded: {message}")),
            500..=599 => QaError::server_error(format!("Server error: {message}")),
            _ => QaError::unknown(format!("HTTP {status}: {message}")),
        }
    }
}

#[async_trait]
impl QaChain for HostedQaChain {
    async fn answer(&self, prompt: &str, history: &[ConversationTurn]) -> Result<String, QaError> {
        let request = self.translate_request(prompt, history);

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.token)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    QaError::network(format!("Request timeout: {e}"))
                } else if e.is_connect() {
                    QaError::network(format!("Connection failed: {e}"))
                } else {
                    QaError::unknown(format!("Request failed: {e}"))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| QaError::network(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(Self::classify_error(status, &body));
        }

        let parsed: ChatResponse = serde_json::from_str(&body).map_err(|e| {
            QaError::invalid_response(format!("Failed to parse response: {e} - body: {body}"))
        })?;

        Self::normalize_response(parsed)
    }

    fn name(&self) -> &str {
        &self.model
    }
}

// Wire types

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    stream: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

/// Providers disagree on shape: `{"error": "..."}` vs `{"error": {"message": "..."}}`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorBody {
    Message(String),
    Detailed { message: String },
}

impl ErrorBody {
    fn message(self) -> String {
        match self {
            ErrorBody::Message(message) | ErrorBody::Detailed { message } => message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qa::error::QaErrorKind;
    use reqwest::StatusCode;

    fn chain() -> HostedQaChain {
        let config = QaConfig {
            hf_token: Some("hf_test".to_string()),
            endpoint: "http://localhost:1/v1/chat/completions".to_string(),
            model: "test/model".to_string(),
            timeout: None,
        };
        HostedQaChain::new(&config, "hf_test".to_string()).unwrap()
    }

    #[test]
    fn test_translate_request_orders_messages() {
        let history = vec![
            ConversationTurn::user("What is Rust?"),
            ConversationTurn::assistant("<p>A language.</p>"),
        ];
        let request = chain().translate_request("Who made it?", &history);

        assert_eq!(request.model, "test/model");
        assert!(!request.stream);
        let roles: Vec<_> = request.messages.iter().map(|m| m.role.as_str()).collect();
        assert_eq!(roles, ["system", "user", "assistant", "user"]);
        assert_eq!(request.messages[1].content, "What is Rust?");
        assert_eq!(request.messages[3].content, "Who made it?");
    }

    #[test]
    fn test_translate_request_serializes() {
        let request = chain().translate_request("hi", &[]);
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["messages"].as_array().unwrap().len(), 2);
        assert_eq!(json["max_tokens"], MAX_TOKENS);
    }

    #[test]
    fn test_normalize_response_takes_first_choice() {
        let resp: ChatResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":"**Yes**"}},{"message":{"content":"no"}}]}"#,
        )
        .unwrap();
        assert_eq!(HostedQaChain::normalize_response(resp).unwrap(), "**Yes**");
    }

    #[test]
    fn test_normalize_response_rejects_empty() {
        let no_choices: ChatResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        let err = HostedQaChain::normalize_response(no_choices).unwrap_err();
        assert_eq!(err.kind, QaErrorKind::InvalidResponse);

        let blank: ChatResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"content":"   "}}]}"#).unwrap();
        assert!(HostedQaChain::normalize_response(blank).is_err());

        let null: ChatResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"content":null}}]}"#).unwrap();
        assert!(HostedQaChain::normalize_response(null).is_err());
    }

    #[test]
    fn test_classify_error_by_status() {
        let cases = [
            (StatusCode::UNAUTHORIZED, QaErrorKind::Auth),
            (StatusCode::FORBIDDEN, QaErrorKind::Auth),
            (StatusCode::TOO_MANY_REQUESTS, QaErrorKind::RateLimit),
            (StatusCode::BAD_GATEWAY, QaErrorKind::ServerError),
            (StatusCode::BAD_REQUEST, QaErrorKind::Unknown),
        ];
        for (status, kind) in cases {
            assert_eq!(HostedQaChain::classify_error(status, "").kind, kind, "{status}");
        }
    }

    #[test]
    fn test_classify_error_extracts_message() {
        let flat = HostedQaChain::classify_error(
            StatusCode::UNAUTHORIZED,
            r#"{"error":"Invalid token"}"#,
        );
        assert!(flat.message.contains("Invalid token"));

        let nested = HostedQaChain::classify_error(
            StatusCode::SERVICE_UNAVAILABLE,
            r#"{"error":{"message":"Model is loading","type":"overloaded"}}"#,
        );
        assert!(nested.message.contains("Model is loading"));

        let raw = HostedQaChain::classify_error(StatusCode::INTERNAL_SERVER_ERROR, "upstream died");
        assert!(raw.message.contains("upstream died"));
    }
}
