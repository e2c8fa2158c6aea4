//! Timestamped entries collected after the fixed fields.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// `HH:MM`, whitespace, then the note. `(?s)` is deliberate: a note
/// typed over several lines is kept whole rather than cut at the first
/// line break or rejected as malformed.
static ENTRY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^([0-9]{2}:[0-9]{2})\s+(.+)$").expect("valid entry regex")
});

/// One `timestamp + note` line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// `HH:MM`, shape-checked only.
    pub timestamp: String,
    pub note: String,
}

impl LogEntry {
    pub fn new(timestamp: &str, note: &str) -> Self {
        Self {
            timestamp: timestamp.to_string(),
            note: note.to_string(),
        }
    }

    /// Parse `"08:30 Güzergah kontrolü yapıldı"`. Returns `None` when the
    /// line does not start with a two-digit `HH:MM` followed by a note.
    pub fn parse(text: &str) -> Option<Self> {
        let caps = ENTRY_PATTERN.captures(text.trim())?;
        Some(Self {
            timestamp: caps[1].to_string(),
            note: caps[2].trim_end().to_string(),
        })
    }
}

/// Whether `text` is the sentinel that ends entry collection.
pub fn is_sentinel(text: &str, sentinel: &str) -> bool {
    text.trim().to_lowercase() == sentinel.to_lowercase()
}
