//! Session registry
//!
//! Process-wide map from session id to the session's playback controller.
//! Entries are created on first use and live for the rest of the process, so
//! a session's volume survives between songs and between playback runs.
//!
//! Lookups across sessions only take the map's read lock; everything that
//! touches one session's queue or state is serialized by that session's
//! controller task, never by this map.

use crate::playback::{PlaybackController, PlaybackServices, SessionHandle};
use jukebox_common::SessionId;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

/// Shared registry of live sessions
#[derive(Clone)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<SessionId, SessionHandle>>>,
    services: PlaybackServices,
}

impl SessionRegistry {
    /// Create an empty registry whose controllers use `services`
    pub fn new(services: PlaybackServices) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            services,
        }
    }

    /// Existing session, or absent if nothing was ever queued for it
    pub async fn get(&self, session_id: SessionId) -> Option<SessionHandle> {
        self.sessions.read().await.get(&session_id).cloned()
    }

    /// Existing session, or a freshly spawned controller
    ///
    /// Must be called from within a tokio runtime.
    pub async fn get_or_create(&self, session_id: SessionId) -> SessionHandle {
        if let Some(handle) = self.get(session_id).await {
            return handle;
        }

        let mut sessions = self.sessions.write().await;
        // Another caller may have created it between the two locks
        sessions
            .entry(session_id)
            .or_insert_with(|| {
                info!(session = %session_id, "Creating playback session");
                PlaybackController::spawn(session_id, self.services.clone())
            })
            .clone()
    }

    /// Number of sessions created so far
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// True before the first session is created
    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// Ids of all known sessions
    pub async fn session_ids(&self) -> Vec<SessionId> {
        let mut ids: Vec<SessionId> = self.sessions.read().await.keys().copied().collect();
        ids.sort();
        ids
    }

    /// Services handed to every controller
    pub fn services(&self) -> &PlaybackServices {
        &self.services
    }
}
