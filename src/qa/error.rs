//! QA chain error types

use thiserror::Error;

/// Failure to produce an answer, with the cause kept for logging
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct QaError {
    pub kind: QaErrorKind,
    pub message: String,
}

impl QaError {
    pub fn new(kind: QaErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(QaErrorKind::Network, message)
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::new(QaErrorKind::Auth, message)
    }

    pub fn rate_limit(message: impl Into<String>) -> Self {
        Self::new(QaErrorKind::RateLimit, message)
    }

    pub fn server_error(message: impl Into<String>) -> Self {
        Self::new(QaErrorKind::ServerError, message)
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(QaErrorKind::InvalidResponse, message)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(QaErrorKind::Unknown, message)
    }
}

/// Coarse classification of what went wrong
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QaErrorKind {
    /// Connection failures, timeouts
    Network,
    /// Missing or rejected credentials (401, 403)
    Auth,
    /// Rate limited (429)
    RateLimit,
    /// Backend error (5xx)
    ServerError,
    /// Response could not be interpreted as an answer
    InvalidResponse,
    Unknown,
}

impl QaErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Auth => "auth",
            Self::RateLimit => "rate_limit",
            Self::ServerError => "server_error",
            Self::InvalidResponse => "invalid_response",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for QaErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_kind_and_message() {
        let err = QaError::auth("HF_TOKEN is not set");
        assert_eq!(err.to_string(), "auth: HF_TOKEN is not set");
        assert_eq!(err.kind, QaErrorKind::Auth);
    }

    #[test]
    fn test_constructors_set_kind() {
        assert_eq!(QaError::network("x").kind, QaErrorKind::Network);
        assert_eq!(QaError::rate_limit("x").kind, QaErrorKind::RateLimit);
        assert_eq!(QaError::server_error("x").kind, QaErrorKind::ServerError);
        assert_eq!(
            QaError::invalid_response("x").kind,
            QaErrorKind::InvalidResponse
        );
        assert_eq!(QaError::unknown("x").kind, QaErrorKind::Unknown);
    }
}
