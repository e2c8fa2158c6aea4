//! Per-conversation session store.
//!
//! Each conversation key maps to its own `SessionState`; nothing is shared
//! between keys. Idle entries are pruned by a periodic sweep.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

use super::state::SessionState;

struct Slot {
    state: SessionState,
    last_activity: Instant,
}

/// Session states keyed by conversation.
#[derive(Default)]
pub struct SessionStore {
    slots: Mutex<HashMap<String, Slot>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` against the state for `key`, creating an idle state on first
    /// use and refreshing its activity time.
    pub async fn with_session<R>(&self, key: &str, f: impl FnOnce(&mut SessionState) -> R) -> R {
        let mut slots = self.slots.lock().await;
        let slot = slots.entry(key.to_string()).or_insert_with(|| Slot {
            state: SessionState::default(),
            last_activity: Instant::now(),
        });
        slot.last_activity = Instant::now();
        let result = f(&mut slot.state);
        if slot.state.is_idle() {
            // Idle states carry no data; keep the map small.
            slots.remove(key);
        }
        result
    }

    /// Snapshot of the state for `key`, if one is active.
    pub async fn get(&self, key: &str) -> Option<SessionState> {
        self.slots.lock().await.get(key).map(|s| s.state.clone())
    }

    /// Number of conversations with an active session.
    pub async fn len(&self) -> usize {
        self.slots.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.slots.lock().await.is_empty()
    }

    /// Drop sessions untouched for longer than `idle_timeout`. Their
    /// collected data is discarded. Returns how many were removed.
    pub async fn prune_stale_sessions(&self, idle_timeout: Duration) -> usize {
        let mut slots = self.slots.lock().await;
        let before = slots.len();
        slots.retain(|key, slot| {
            let keep = slot.last_activity.elapsed() < idle_timeout;
            if !keep {
                tracing::info!(conversation = %key, phase = %slot.state.phase, "Pruning idle session");
            }
            keep
        });
        before - slots.len()
    }
}
