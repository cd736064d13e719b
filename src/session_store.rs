//! In-memory storage of per-browser session state.
//!
//! Sessions are keyed by a random id carried in a cookie. The store is the only
//! mutable shared structure in the service, and it never hands out references:
//! callers check out a copy of one session's state, apply events, and save it
//! back under the same id.

use std::{
    collections::HashMap,
    time::{Duration, Instant},
};

use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use crate::session::SessionState;

// ---

#[derive(Debug)]
struct SessionEntry {
    state: SessionState,
    last_seen: Instant,
}

#[derive(Debug)]
pub struct SessionStore {
    ttl: Duration,
    sessions: Mutex<HashMap<Uuid, SessionEntry>>,
}

impl SessionStore {
    // ---
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Fetch the state for `id`, or start a new session.
    ///
    /// Unknown and expired ids get a fresh id with a default (unauthenticated)
    /// state; an expired session's selection is discarded with it.
    pub async fn checkout(&self, id: Option<Uuid>) -> (Uuid, SessionState) {
        // ---
        let mut sessions = self.sessions.lock().await;
        if let Some(id) = id {
            match sessions.remove(&id) {
                Some(entry) if entry.last_seen.elapsed() < self.ttl => {
                    sessions.insert(
                        id,
                        SessionEntry {
                            state: entry.state.clone(),
                            last_seen: Instant::now(),
                        },
                    );
                    return (id, entry.state);
                }
                Some(_) => debug!("Session {} expired", id),
                None => debug!("Session {} unknown", id),
            }
        }

        let id = Uuid::new_v4();
        sessions.insert(
            id,
            SessionEntry {
                state: SessionState::default(),
                last_seen: Instant::now(),
            },
        );
        (id, SessionState::default())
    }

    /// Store the updated state for `id`.
    ///
    /// Only a session that is still live is updated. Returns false when the
    /// session was removed or purged after checkout, so a logout racing this
    /// request stays in effect.
    pub async fn save(&self, id: Uuid, state: SessionState) -> bool {
        // ---
        match self.sessions.lock().await.get_mut(&id) {
            Some(entry) => {
                entry.state = state;
                entry.last_seen = Instant::now();
                true
            }
            None => {
                debug!("Session {} gone before save", id);
                false
            }
        }
    }

    /// Forget `id` entirely.
    pub async fn remove(&self, id: Uuid) {
        self.sessions.lock().await.remove(&id);
    }

    /// Drop every session idle for longer than the TTL.
    pub async fn purge_expired(&self) -> usize {
        // ---
        let mut sessions = self.sessions.lock().await;
        let before = sessions.len();
        sessions.retain(|_, entry| entry.last_seen.elapsed() < self.ttl);
        before - sessions.len()
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }
}
