//! Collection state machine. Drives one session through the schema and the
//! entry phase.
//!
//! The machine holds no per-conversation data; callers own a `SessionState`
//! per conversation and pass it in on every call.

use std::sync::Arc;

use crate::config::LogbookConfig;
use crate::error::CollectionError;

use super::entries::{LogEntry, is_sentinel};
use super::prompts;
use super::report::{self, ReportDocument};
use super::state::{CollectionPhase, SessionState};

/// Outcome of an accepted submission.
#[derive(Debug, Clone)]
pub enum Transition {
    /// A field was stored; ask the next question (or introduce the entry phase).
    Prompt(String),
    /// An entry was appended; acknowledgement text.
    EntryRecorded { entry: LogEntry, message: String },
    /// The sentinel arrived. The session is already back to idle and the
    /// report must be handed to a render sink.
    Completed(ReportDocument),
}

/// Stateless driver over a shared `LogbookConfig`.
#[derive(Debug, Clone)]
pub struct CollectionMachine {
    config: Arc<LogbookConfig>,
}

impl CollectionMachine {
    pub fn new(config: Arc<LogbookConfig>) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LogbookConfig {
        &self.config
    }

    /// Start (or restart) collection from the first field, from any phase.
    /// Returns the greeting with the first question.
    pub fn start(&self, state: &mut SessionState) -> String {
        state.restart();
        tracing::debug!(session = ?state.id, "Collection started");
        match self.config.schema.get(0) {
            Some(first) => prompts::start_message(first),
            None => {
                // Only reachable with a hand-built empty schema.
                state.phase = CollectionPhase::AwaitingEntry;
                prompts::entries_intro(&self.config.sentinel)
            }
        }
    }

    /// Feed one user message into the session.
    ///
    /// Errors are recoverable and leave `state` untouched.
    pub fn submit(
        &self,
        state: &mut SessionState,
        text: &str,
    ) -> Result<Transition, CollectionError> {
        match state.phase {
            CollectionPhase::Collecting(index) => self.submit_field(state, index, text),
            CollectionPhase::AwaitingEntry => self.submit_entry(state, text),
            CollectionPhase::Idle | CollectionPhase::Complete => Err(CollectionError::NotStarted),
        }
    }

    /// Abandon the session. Returns whether anything was in progress.
    pub fn cancel(&self, state: &mut SessionState) -> bool {
        let active = state.phase.accepts_input();
        if active {
            tracing::debug!(session = ?state.id, phase = %state.phase, "Collection cancelled");
        }
        state.reset();
        active
    }

    fn submit_field(
        &self,
        state: &mut SessionState,
        index: usize,
        text: &str,
    ) -> Result<Transition, CollectionError> {
        let schema = &self.config.schema;
        let Some(spec) = schema.get(index) else {
            // Index past the schema: treat as if the fields are done.
            state.phase = CollectionPhase::AwaitingEntry;
            return self.submit_entry(state, text);
        };

        let value = spec.kind.validate(&spec.key, text, &self.config.placeholder)?;
        state.fields.insert(spec.key.clone(), value);
        state.phase = CollectionPhase::after_field(index, schema.len());

        let message = match state.phase {
            CollectionPhase::Collecting(next) => schema
                .get(next)
                .map(|f| f.prompt.clone())
                .unwrap_or_else(|| "Bir sonraki bilgiyi giriniz:".to_string()),
            _ => prompts::entries_intro(&self.config.sentinel),
        };
        Ok(Transition::Prompt(message))
    }

    fn submit_entry(
        &self,
        state: &mut SessionState,
        text: &str,
    ) -> Result<Transition, CollectionError> {
        let sentinel = &self.config.sentinel;

        if is_sentinel(text, sentinel) {
            state.phase = CollectionPhase::Complete;
            let entries = std::mem::take(&mut state.entries);
            let document = report::assemble(&self.config, &state.fields, entries);
            tracing::info!(
                session = ?state.id,
                entries = document.entries.len(),
                "Collection complete"
            );
            state.reset();
            return Ok(Transition::Completed(document));
        }

        let entry = LogEntry::parse(text).ok_or_else(|| CollectionError::MalformedEntry {
            sentinel: sentinel.clone(),
        })?;
        let message = prompts::entry_recorded(&entry, sentinel);
        state.entries.push(entry.clone());
        Ok(Transition::EntryRecorded { entry, message })
    }
}
