//! In-memory session store
//!
//! Maps an opaque per-browser [`SessionId`] to that browser's
//! [`ConversationLog`]. Logs are created empty on first access and dropped
//! once a session has been idle for longer than the configured TTL.

use crate::chat::ConversationLog;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Opaque identifier carried in the session cookie
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Shared handle to one session's log.
///
/// The async mutex is held for a whole exchange, so requests for the same
/// session are processed one at a time.
pub type SharedLog = Arc<tokio::sync::Mutex<ConversationLog>>;

/// A session resolved for the current request
pub struct Session {
    pub id: SessionId,
    pub log: SharedLog,
}

struct SessionEntry {
    log: SharedLog,
    last_seen: Instant,
}

/// Thread-safe store of all live sessions
pub struct SessionStore {
    sessions: Mutex<HashMap<SessionId, SessionEntry>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Resolve the session for a request.
    ///
    /// A known id gets its existing log (and its idle timer reset). An unknown
    /// or expired id gets a fresh empty log under the same id. Without an id a
    /// new one is minted. Expired sessions are swept on every call.
    pub fn open(&self, id: Option<SessionId>) -> Session {
        self.open_at(id, Instant::now())
    }

    fn open_at(&self, id: Option<SessionId>, now: Instant) -> Session {
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);

        let before = sessions.len();
        // A locked log has an exchange in flight; it is not idle
        sessions.retain(|_, entry| {
            entry.log.try_lock().is_err()
                || now.saturating_duration_since(entry.last_seen) < self.ttl
        });
        let expired = before - sessions.len();
        if expired > 0 {
            tracing::debug!(expired, live = sessions.len(), "Swept expired sessions");
        }

        let id = id.unwrap_or_else(SessionId::generate);
        let entry = sessions.entry(id).or_insert_with(|| {
            tracing::debug!(session = %id, "Created session");
            SessionEntry {
                log: Arc::new(tokio::sync::Mutex::new(ConversationLog::new())),
                last_seen: now,
            }
        });
        entry.last_seen = now;

        Session {
            id,
            log: entry.log.clone(),
        }
    }

    /// Number of live (not yet swept) sessions
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
