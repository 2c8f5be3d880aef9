//! Runtime configuration from the process environment

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_QA_URL: &str = "https://router.huggingface.co/v1/chat/completions";
pub const DEFAULT_QA_MODEL: &str = "mistralai/Mistral-7B-Instruct-v0.3";
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be {expected}, got {value:?}")]
    Invalid {
        var: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Settings for the hosted QA endpoint
#[derive(Debug, Clone)]
pub struct QaConfig {
    /// Bearer token; the chain reports an auth failure when absent
    pub hf_token: Option<String>,
    pub endpoint: String,
    pub model: String,
    /// Unset means requests wait for the backend indefinitely
    pub timeout: Option<Duration>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: IpAddr,
    pub port: u16,
    pub qa: QaConfig,
    pub session_ttl: Duration,
    /// Cookie signing key material (at least 64 bytes); random per process when unset
    pub session_secret: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the config from an arbitrary variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        // Empty values count as unset
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let host = match var("RAG_CHAT_HOST") {
            Some(v) => v.trim().parse().map_err(|_| ConfigError::Invalid {
                var: "RAG_CHAT_HOST",
                expected: "an IP address",
                value: v,
            })?,
            None => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        };

        let port = parse_number(var("RAG_CHAT_PORT"), "RAG_CHAT_PORT")?.unwrap_or(DEFAULT_PORT);

        let timeout =
            parse_number::<u64>(var("RAG_CHAT_QA_TIMEOUT_SECS"), "RAG_CHAT_QA_TIMEOUT_SECS")?
                .map(Duration::from_secs);

        let session_ttl =
            parse_number::<u64>(var("RAG_CHAT_SESSION_TTL_SECS"), "RAG_CHAT_SESSION_TTL_SECS")?
                .map_or(DEFAULT_SESSION_TTL, Duration::from_secs);

        let session_secret = var("RAG_CHAT_SESSION_SECRET");
        if let Some(secret) = &session_secret {
            if secret.len() < 64 {
                return Err(ConfigError::Invalid {
                    var: "RAG_CHAT_SESSION_SECRET",
                    expected: "at least 64 bytes long",
                    value: format!("<{} bytes>", secret.len()),
                });
            }
        }

        Ok(Self {
            host,
            port,
            qa: QaConfig {
                hf_token: var("HF_TOKEN"),
                endpoint: var("RAG_CHAT_QA_URL").unwrap_or_else(|| DEFAULT_QA_URL.to_string()),
                model: var("RAG_CHAT_QA_MODEL").unwrap_or_else(|| DEFAULT_QA_MODEL.to_string()),
                timeout,
            },
            session_ttl,
            session_secret,
        })
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn parse_number<T: std::str::FromStr>(
    value: Option<String>,
    var: &'static str,
) -> Result<Option<T>, ConfigError> {
    value
        .map(|v| {
            v.trim().parse().map_err(|_| ConfigError::Invalid {
                var,
                expected: "a non-negative integer",
                value: v,
            })
        })
        .transpose()
}
