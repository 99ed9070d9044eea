//! Session-scoped conversation state
//!
//! Each web session owns one [`ConversationState`]. The [`SessionStore`] is
//! the only shared registry; a session's state sits behind its own async
//! mutex so turns within one conversation run one at a time.

use chrono::{DateTime, Duration, Utc};
use rand::RngExt;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

use crate::TripMateError;
use crate::llm::ChatMessage;

/// First assistant message of every conversation
pub const GREETING: &str = "Hi! I'm your AI travel assistant. Where would you like to go?";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SessionId(u128);

impl SessionId {
    #[must_use]
    pub fn random() -> Self {
        Self(rand::rng().random::<u128>())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", self.0)
    }
}

impl FromStr for SessionId {
    type Err = TripMateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 32 {
            return Err(TripMateError::validation(format!("Invalid session id '{s}'")));
        }
        u128::from_str_radix(s, 16)
            .map(Self)
            .map_err(|_| TripMateError::validation(format!("Invalid session id '{s}'")))
    }
}

impl TryFrom<String> for SessionId {
    type Error = TripMateError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SessionId> for String {
    fn from(id: SessionId) -> Self {
        id.to_string()
    }
}

/// One user message and the reply it produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exchange {
    pub user: String,
    pub assistant: String,
    pub at: DateTime<Utc>,
}

/// Recorded exchanges of a conversation, oldest first
#[derive(Debug, Clone, Default)]
pub struct ConversationState {
    exchanges: Vec<Exchange>,
}

impl ConversationState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, user: impl Into<String>, assistant: impl Into<String>) {
        // Keep chronological order even if the clock steps backwards
        let now = Utc::now();
        let at = self.exchanges.last().map_or(now, |last| last.at.max(now));
        self.exchanges.push(Exchange {
            user: user.into(),
            assistant: assistant.into(),
            at,
        });
    }

    #[must_use]
    pub fn exchanges(&self) -> &[Exchange] {
        &self.exchanges
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.exchanges.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.exchanges.is_empty()
    }

    /// The last `window` exchanges as alternating user/assistant messages
    #[must_use]
    pub fn recent_messages(&self, window: usize) -> Vec<ChatMessage> {
        let skip = self.exchanges.len().saturating_sub(window);
        self.exchanges[skip..]
            .iter()
            .flat_map(|e| [ChatMessage::user(&e.user), ChatMessage::assistant(&e.assistant)])
            .collect()
    }
}

#[derive(Debug)]
pub struct Session {
    pub id: SessionId,
    pub state: ConversationState,
    pub created_at: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
}

impl Session {
    fn new(id: SessionId) -> Self {
        let now = Utc::now();
        Self {
            id,
            state: ConversationState::new(),
            created_at: now,
            last_active: now,
        }
    }

    pub fn touch(&mut self) {
        self.last_active = Utc::now();
    }
}

pub type SharedSession = Arc<Mutex<Session>>;

/// Registry of live sessions
#[derive(Debug)]
pub struct SessionStore {
    sessions: RwLock<HashMap<SessionId, SharedSession>>,
    max_sessions: usize,
    idle_timeout: Duration,
}

impl SessionStore {
    #[must_use]
    pub fn new(max_sessions: usize, idle_minutes: u32) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            max_sessions,
            idle_timeout: Duration::minutes(i64::from(idle_minutes)),
        }
    }

    /// Start a new conversation
    pub async fn create(&self) -> crate::Result<SessionId> {
        let mut sessions = self.sessions.write().await;
        if sessions.len() >= self.max_sessions {
            return Err(TripMateError::service_unavailable(
                "session store",
                format!("session limit of {} reached", self.max_sessions),
            ));
        }

        let mut id = SessionId::random();
        while sessions.contains_key(&id) {
            id = SessionId::random();
        }
        sessions.insert(id, Arc::new(Mutex::new(Session::new(id))));
        info!(session = %id, active = sessions.len(), "session created");
        Ok(id)
    }

    /// Look up a session and mark it active
    ///
    /// The touch happens under the registry lock, so a sweep cannot remove the
    /// session between lookup and use. A session busy with a turn is touched by
    /// that turn instead.
    pub async fn get(&self, id: SessionId) -> Option<SharedSession> {
        let sessions = self.sessions.read().await;
        let session = sessions.get(&id)?;
        if let Ok(mut guard) = session.try_lock() {
            guard.touch();
        }
        Some(Arc::clone(session))
    }

    /// Destroy a session and its conversation; false if it did not exist
    pub async fn destroy(&self, id: SessionId) -> bool {
        let removed = self.sessions.write().await.remove(&id).is_some();
        if removed {
            info!(session = %id, "session destroyed");
        }
        removed
    }

    /// Destroy sessions idle longer than the configured timeout
    ///
    /// Sessions in the middle of a turn hold their lock and are skipped.
    pub async fn sweep_expired(&self) -> usize {
        let cutoff = Utc::now() - self.idle_timeout;
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| match session.try_lock() {
            Ok(session) => session.last_active >= cutoff,
            Err(_) => true,
        });
        let removed = before - sessions.len();
        if removed > 0 {
            info!(removed, active = sessions.len(), "expired sessions swept");
        } else {
            debug!(active = sessions.len(), "no expired sessions");
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
