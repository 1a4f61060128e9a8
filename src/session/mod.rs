//! Session state
//!
//! One [`Session`] per conversation. Sessions are plain values owned by the
//! caller and passed into the dialogue engine; the store below only keeps
//! them apart when several conversations are served at once.

pub mod history;

pub use history::{ConversationHistory, ConversationMessage};

use crate::models::{SlotFrame, SoilReading};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;
use uuid::Uuid;

/// Mutable frame for a single conversation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Session {
    /// Slot values collected so far; cleared after each recommendation
    pub slots: SlotFrame,
    /// Crop that follow-up questions refer to
    pub last_crop: Option<String>,
    /// Values behind the most recent recommendation (display only)
    pub last_inputs: Option<SoilReading>,
    pub history: ConversationHistory,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }
}

pub type SessionHandle = Arc<Mutex<Session>>;

/// Trait for session storage
#[async_trait::async_trait]
pub trait SessionStore: Send + Sync {
    /// Fetch the session for `id`, creating an empty one on first use
    async fn session(&self, id: Uuid) -> Result<SessionHandle>;
    /// Drop a conversation; returns whether it existed
    async fn end(&self, id: Uuid) -> Result<bool>;
    async fn active_count(&self) -> Result<usize>;
}

/// In-memory session store
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, SessionHandle>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl SessionStore for InMemorySessionStore {
    async fn session(&self, id: Uuid) -> Result<SessionHandle> {
        {
            let sessions = self.sessions.read().await;
            if let Some(handle) = sessions.get(&id) {
                return Ok(Arc::clone(handle));
            }
        }

        let mut sessions = self.sessions.write().await;
        let handle = sessions
            .entry(id)
            .or_insert_with(|| {
                debug!(session_id = %id, "Starting new session");
                Arc::new(Mutex::new(Session::new()))
            })
            .clone();

        Ok(handle)
    }

    async fn end(&self, id: Uuid) -> Result<bool> {
        let mut sessions = self.sessions.write().await;
        Ok(sessions.remove(&id).is_some())
    }

    async fn active_count(&self) -> Result<usize> {
        Ok(self.sessions.read().await.len())
    }
}
