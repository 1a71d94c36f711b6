//! In-memory chat sessions keyed by an opaque id.
//!
//! The id map sits behind a short-held `std::sync::Mutex` that is never held across an
//! `.await`. Every session has its own `tokio::sync::Mutex`, held for the whole
//! exchange with the chat provider, so turns of one session are never interleaved
//! while different sessions progress in parallel.
//!
//! Expiry is best-effort: [`SessionStore::create`] schedules a sweep, and
//! [`SessionStore::spawn_sweeper`] can add a periodic one.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::runtime::Handle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::llm::{
    ChatGateway, ChatGatewayError, ChatGatewayRequest, PersonaTemplate, UpstreamRole, UpstreamTurn,
};

pub const DEFAULT_SESSION_TIMEOUT: Duration = Duration::from_secs(600);
pub const DEFAULT_UPSTREAM_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnRole {
    SystemContext,
    User,
    Assistant,
}

impl TurnRole {
    fn upstream_role(self) -> UpstreamRole {
        match self {
            Self::User => UpstreamRole::User,
            Self::SystemContext | Self::Assistant => UpstreamRole::Model,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub role: TurnRole,
    pub text: String,
}

impl Turn {
    fn new(role: TurnRole, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("session not found")]
    NotFound,
    #[error("chat provider request timed out")]
    GatewayTimeout,
    #[error("{0}")]
    Upstream(String),
}

impl From<ChatGatewayError> for SessionError {
    fn from(err: ChatGatewayError) -> Self {
        match err {
            ChatGatewayError::Timeout => Self::GatewayTimeout,
            ChatGatewayError::ProviderFailure(cause) => Self::Upstream(cause),
        }
    }
}

#[derive(Debug)]
struct Session {
    id: String,
    disease: String,
    history: Vec<Turn>,
    last_active: Instant,
}

impl Session {
    fn touch(&mut self, now: Instant) {
        self.last_active = self.last_active.max(now);
    }

    fn is_expired(&self, now: Instant, timeout: Duration) -> bool {
        now.saturating_duration_since(self.last_active) > timeout
    }

    fn upstream_contents(&self) -> Vec<UpstreamTurn> {
        self.history
            .iter()
            .map(|turn| UpstreamTurn {
                role: turn.role.upstream_role(),
                text: turn.text.clone(),
            })
            .collect()
    }
}

type SessionHandle = Arc<tokio::sync::Mutex<Session>>;

#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<Mutex<HashMap<String, SessionHandle>>>,
    gateway: Arc<dyn ChatGateway>,
    persona: PersonaTemplate,
    session_timeout: Duration,
    upstream_timeout: Duration,
}

impl SessionStore {
    pub fn new(gateway: Arc<dyn ChatGateway>, persona: PersonaTemplate) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            gateway,
            persona,
            session_timeout: DEFAULT_SESSION_TIMEOUT,
            upstream_timeout: DEFAULT_UPSTREAM_TIMEOUT,
        }
    }

    pub fn with_session_timeout(mut self, session_timeout: Duration) -> Self {
        self.session_timeout = session_timeout;
        self
    }

    pub fn with_upstream_timeout(mut self, upstream_timeout: Duration) -> Self {
        self.upstream_timeout = upstream_timeout;
        self
    }

    /// Starts a session seeded with the persona prompt for `disease` and returns its id.
    pub fn create(&self, disease: &str) -> String {
        let now = Instant::now();
        let seed = Turn::new(TurnRole::SystemContext, self.persona.render(disease));

        let session_id = {
            let mut sessions = self.lock_sessions();
            let session_id = loop {
                let candidate = Uuid::new_v4().to_string();
                if !sessions.contains_key(&candidate) {
                    break candidate;
                }
            };

            sessions.insert(
                session_id.clone(),
                Arc::new(tokio::sync::Mutex::new(Session {
                    id: session_id.clone(),
                    disease: disease.to_string(),
                    history: vec![seed],
                    last_active: now,
                })),
            );
            session_id
        };

        info!(session_id = %session_id, disease = %disease, "chat session started");
        self.schedule_sweep();
        session_id
    }

    /// Sends `user_text` with the whole transcript to the chat provider and records both turns.
    ///
    /// The user turn stays in the transcript when the provider call fails.
    pub async fn append(&self, session_id: &str, user_text: &str) -> Result<String, SessionError> {
        let handle = self.lookup(session_id).ok_or(SessionError::NotFound)?;
        let mut session = handle.lock().await;

        // Deleted or swept while this call waited for the session lock.
        if !self.is_live(session_id, &handle) {
            return Err(SessionError::NotFound);
        }

        session.touch(Instant::now());
        session.history.push(Turn::new(TurnRole::User, user_text));

        let request =
            ChatGatewayRequest::new(session.upstream_contents()).with_requester_id(&session.id);
        let reply =
            match tokio::time::timeout(self.upstream_timeout, self.gateway.generate(request)).await
            {
                Ok(Ok(reply)) => reply,
                Ok(Err(err)) => {
                    warn!(session_id = %session_id, "chat provider call failed: {err}");
                    return Err(err.into());
                }
                Err(_) => {
                    warn!(
                        session_id = %session_id,
                        timeout_ms = self.upstream_timeout.as_millis() as u64,
                        "chat provider call exceeded timeout"
                    );
                    return Err(SessionError::GatewayTimeout);
                }
            };

        let text = reply.into_text();
        session.history.push(Turn::new(TurnRole::Assistant, text.clone()));
        debug!(
            session_id = %session_id,
            disease = %session.disease,
            turns = session.history.len(),
            "chat exchange recorded"
        );

        Ok(text)
    }

    pub fn delete(&self, session_id: &str) -> Result<(), SessionError> {
        match self.lock_sessions().remove(session_id) {
            Some(_) => {
                info!(session_id = %session_id, "chat session ended");
                Ok(())
            }
            None => Err(SessionError::NotFound),
        }
    }

    pub fn sweep_expired(&self) -> usize {
        self.sweep_expired_at(Instant::now())
    }

    /// Removes every session idle for longer than the session timeout as of `now`.
    /// Sessions with an exchange in flight are active by definition and are kept.
    pub fn sweep_expired_at(&self, now: Instant) -> usize {
        let timeout = self.session_timeout;
        let mut expired = Vec::new();

        self.lock_sessions().retain(|session_id, handle| {
            let keep = match handle.try_lock() {
                Ok(session) => !session.is_expired(now, timeout),
                Err(_) => true,
            };
            if !keep {
                expired.push(session_id.clone());
            }
            keep
        });

        for session_id in &expired {
            info!(session_id = %session_id, "expired chat session removed");
        }

        expired.len()
    }

    pub fn spawn_sweeper(&self, interval: Duration) -> tokio::task::JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                let removed = store.sweep_expired();
                if removed > 0 {
                    debug!(removed, "periodic session sweep");
                }
            }
        })
    }

    pub fn len(&self) -> usize {
        self.lock_sessions().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, session_id: &str) -> bool {
        self.lock_sessions().contains_key(session_id)
    }

    /// Snapshot of the turns of a live session, seed turn first.
    pub async fn transcript(&self, session_id: &str) -> Option<Vec<Turn>> {
        let handle = self.lookup(session_id)?;
        let session = handle.lock().await;
        Some(session.history.clone())
    }

    fn schedule_sweep(&self) {
        match Handle::try_current() {
            Ok(runtime) => {
                let store = self.clone();
                runtime.spawn(async move {
                    store.sweep_expired();
                });
            }
            Err(_) => {
                self.sweep_expired();
            }
        }
    }

    fn lookup(&self, session_id: &str) -> Option<SessionHandle> {
        self.lock_sessions().get(session_id).cloned()
    }

    fn is_live(&self, session_id: &str, handle: &SessionHandle) -> bool {
        self.lock_sessions()
            .get(session_id)
            .is_some_and(|current| Arc::ptr_eq(current, handle))
    }

    fn lock_sessions(&self) -> MutexGuard<'_, HashMap<String, SessionHandle>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[cfg(test)]
    async fn set_last_active(&self, session_id: &str, last_active: Instant) {
        if let Some(handle) = self.lookup(session_id) {
            handle.lock().await.last_active = last_active;
        }
    }
}
