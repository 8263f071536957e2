// ==============================================================================
// session.rs - Per-Session Dashboard State
// ==============================================================================
// Description: Slider thresholds, disclosure toggle and literature records
//              held for one browser session
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

use proteomics_processor::models::{DisclosureState, LiteratureRecord, ThresholdState};

/// UI state for one session. Never persisted.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub thresholds: ThresholdState,
    pub disclosure: DisclosureState,
    pub selected_gene: Option<String>,
    /// Legacy record list from the last selection (may be the sentinel)
    pub records: Vec<LiteratureRecord>,
    /// Bumped on every selection; a lookup only stores its records if no
    /// newer selection arrived while it was in flight
    pub selection_seq: u64,
    pub created_at: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
}

impl SessionState {
    fn new() -> Self {
        let now = Utc::now();
        Self {
            thresholds: ThresholdState::default(),
            disclosure: DisclosureState::default(),
            selected_gene: None,
            records: Vec::new(),
            selection_seq: 0,
            created_at: now,
            last_seen: now,
        }
    }

    fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        // A last_seen in the future (clock step) counts as fresh
        (now - self.last_seen).to_std().is_ok_and(|idle| idle >= ttl)
    }
}

pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(60 * 60);

/// Sessions keyed by id. Locks are short and never held across an await.
///
/// A session idle for longer than the TTL is dropped: lazily when it is next
/// touched, and in bulk whenever a new session is created.
#[derive(Debug)]
pub struct SessionStore {
    sessions: Mutex<HashMap<Uuid, SessionState>>,
    ttl: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_ttl(DEFAULT_SESSION_TTL)
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, SessionState>> {
        // State is plain data; a panic mid-update cannot leave it unusable
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn create(&self) -> (Uuid, SessionState) {
        let id = Uuid::new_v4();
        let state = SessionState::new();

        let mut sessions = self.lock();
        let evicted = evict(&mut sessions, state.created_at, self.ttl);
        if evicted > 0 {
            debug!("Evicted {} idle sessions", evicted);
        }
        sessions.insert(id, state.clone());
        (id, state)
    }

    /// Snapshot of a session, refreshing its last-seen time
    pub fn get(&self, id: &Uuid) -> Option<SessionState> {
        self.update(id, |state| state.clone())
    }

    /// Apply `f` to a live session under the lock
    pub fn update<R>(&self, id: &Uuid, f: impl FnOnce(&mut SessionState) -> R) -> Option<R> {
        let now = Utc::now();
        let mut sessions = self.lock();

        if sessions.get(id)?.is_expired(now, self.ttl) {
            sessions.remove(id);
            debug!("Session {} expired", id);
            return None;
        }

        let state = sessions.get_mut(id)?;
        state.last_seen = now;
        Some(f(state))
    }

    /// Drop every session idle for longer than the TTL
    pub fn evict_expired(&self) -> usize {
        evict(&mut self.lock(), Utc::now(), self.ttl)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn evict(sessions: &mut HashMap<Uuid, SessionState>, now: DateTime<Utc>, ttl: Duration) -> usize {
    let before = sessions.len();
    sessions.retain(|_, state| !state.is_expired(now, ttl));
    before - sessions.len()
}
