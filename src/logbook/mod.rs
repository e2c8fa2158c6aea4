//! Logbook collection. The conversational flow behind a report.
//!
//! A session walks a fixed schema of fields one message at a time, then
//! accepts an open-ended list of `HH:MM note` entries until the sentinel
//! word arrives. The finished session becomes a `ReportDocument`, a
//! structured description that a render sink turns into a file.

pub mod entries;
pub mod machine;
pub mod prompts;
pub mod report;
pub mod schema;
pub mod sessions;
pub mod state;

pub use entries::LogEntry;
pub use machine::{CollectionMachine, Transition};
pub use report::{ReportDocument, ReportField, Section};
pub use schema::{FieldKind, FieldSchema, FieldSpec};
pub use sessions::SessionStore;
pub use state::{CollectionPhase, SessionState};
