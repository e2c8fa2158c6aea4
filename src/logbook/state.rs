//! Collection phases and per-conversation session state.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::entries::LogEntry;

/// Where a conversation is in the collection flow.
///
/// Progresses: Idle → Collecting(0) → … → Collecting(n-1) → AwaitingEntry →
/// Complete → Idle. `Complete` only exists for the duration of a submit call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionPhase {
    #[default]
    Idle,
    /// Waiting for the field at this schema index.
    Collecting(usize),
    /// Open-ended timestamped entries until the sentinel arrives.
    AwaitingEntry,
    Complete,
}

impl CollectionPhase {
    /// The phase after the field at `index` is accepted, for a schema of
    /// `field_count` fields.
    pub fn after_field(index: usize, field_count: usize) -> Self {
        if index + 1 < field_count {
            Self::Collecting(index + 1)
        } else {
            Self::AwaitingEntry
        }
    }

    /// Whether `submit` input is accepted in this phase.
    pub fn accepts_input(&self) -> bool {
        matches!(self, Self::Collecting(_) | Self::AwaitingEntry)
    }
}

impl std::fmt::Display for CollectionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Collecting(i) => write!(f, "collecting({i})"),
            Self::AwaitingEntry => write!(f, "awaiting_entry"),
            Self::Complete => write!(f, "complete"),
        }
    }
}

/// State of one conversation. Owned by the integration layer, one per
/// conversation key, never shared.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionState {
    /// Identifies one collection run in logs; regenerated on every start.
    pub id: Option<Uuid>,
    pub phase: CollectionPhase,
    /// Accepted values keyed by schema key.
    pub fields: HashMap<String, String>,
    /// Entries in submission order.
    pub entries: Vec<LogEntry>,
}

impl SessionState {
    /// Begin a fresh run, discarding anything collected so far.
    pub fn restart(&mut self) {
        *self = Self {
            id: Some(Uuid::new_v4()),
            phase: CollectionPhase::Collecting(0),
            ..Self::default()
        };
    }

    /// Drop all collected data and return to idle.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_idle(&self) -> bool {
        self.phase == CollectionPhase::Idle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn after_field_walks_to_entries() {
        assert_eq!(
            CollectionPhase::after_field(0, 3),
            CollectionPhase::Collecting(1)
        );
        assert_eq!(
            CollectionPhase::after_field(1, 3),
            CollectionPhase::Collecting(2)
        );
        assert_eq!(
            CollectionPhase::after_field(2, 3),
            CollectionPhase::AwaitingEntry
        );
        assert_eq!(
            CollectionPhase::after_field(0, 1),
            CollectionPhase::AwaitingEntry
        );
    }

    #[test]
    fn accepts_input() {
        assert!(!CollectionPhase::Idle.accepts_input());
        assert!(CollectionPhase::Collecting(3).accepts_input());
        assert!(CollectionPhase::AwaitingEntry.accepts_input());
        assert!(!CollectionPhase::Complete.accepts_input());
    }

    #[test]
    fn restart_clears_data_and_assigns_new_id() {
        let mut state = SessionState::default();
        state.restart();
        let first_id = state.id;
        state.fields.insert("tarih".into(), "2024-01-05".into());
        state.entries.push(LogEntry::new("08:30", "Kontrol"));
        state.phase = CollectionPhase::AwaitingEntry;

        state.restart();
        assert_eq!(state.phase, CollectionPhase::Collecting(0));
        assert!(state.fields.is_empty());
        assert!(state.entries.is_empty());
        assert!(state.id.is_some());
        assert_ne!(state.id, first_id);
    }

    #[test]
    fn reset_returns_to_idle() {
        let mut state = SessionState::default();
        state.restart();
        state.reset();
        assert!(state.is_idle());
        assert!(state.id.is_none());
    }

    #[test]
    fn phase_serde() {
        let json = serde_json::to_string(&CollectionPhase::Collecting(2)).unwrap();
        assert_eq!(json, r#"{"collecting":2}"#);
        let json = serde_json::to_string(&CollectionPhase::AwaitingEntry).unwrap();
        assert_eq!(json, r#""awaiting_entry""#);
        let parsed: CollectionPhase = serde_json::from_str(r#"{"collecting":5}"#).unwrap();
        assert_eq!(parsed, CollectionPhase::Collecting(5));
    }
}
