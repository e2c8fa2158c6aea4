//! Report assembly. Turns a finished session into a structured document.
//!
//! The document is data, not markup: an ordered list of sections that a
//! render sink walks to produce its artifact.

use std::collections::HashMap;

use chrono::{DateTime, Local};
use serde::Serialize;

use super::entries::LogEntry;
use crate::config::LogbookConfig;

/// Display format of the generation timestamp (Turkish locale style).
pub const GENERATED_AT_FORMAT: &str = "%d.%m.%Y %H:%M:%S";

/// One header line of the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportField {
    pub key: String,
    pub label: String,
    pub value: String,
}

/// A node of the document description, in render order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Section {
    Heading { text: String },
    Fields { rows: Vec<ReportField> },
    Table {
        columns: Vec<String>,
        rows: Vec<Vec<String>>,
    },
    Footer { text: String },
}

/// The assembled report, consumed once by a render sink.
#[derive(Debug, Clone, Serialize)]
pub struct ReportDocument {
    pub title: String,
    /// Every schema field, in schema order.
    pub fields: Vec<ReportField>,
    /// Column headers of the entry table.
    pub entry_columns: [String; 2],
    /// Entries in submission order.
    pub entries: Vec<LogEntry>,
    pub generated_at: DateTime<Local>,
    /// Label preceding the timestamp in the footer.
    pub footer_label: String,
}

impl ReportDocument {
    /// Value of a field by schema key.
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.key == key)
            .map(|f| f.value.as_str())
    }

    pub fn generated_at_display(&self) -> String {
        self.generated_at.format(GENERATED_AT_FORMAT).to_string()
    }

    /// Heading, header fields, entry table, footer.
    pub fn sections(&self) -> Vec<Section> {
        vec![
            Section::Heading {
                text: self.title.clone(),
            },
            Section::Fields {
                rows: self.fields.clone(),
            },
            Section::Table {
                columns: self.entry_columns.to_vec(),
                rows: self
                    .entries
                    .iter()
                    .map(|e| vec![e.timestamp.clone(), e.note.clone()])
                    .collect(),
            },
            Section::Footer {
                text: format!("{}: {}", self.footer_label, self.generated_at_display()),
            },
        ]
    }

    /// `<prefix>_<value of the filename field>`, without extension.
    pub fn file_stem(&self, prefix: &str, filename_field: &str) -> String {
        let value = self.field(filename_field).unwrap_or("rapor");
        let safe: String = value
            .chars()
            .map(|c| {
                if c.is_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        format!("{prefix}_{safe}")
    }
}

/// Assemble a report stamped with the current local time.
pub fn assemble(
    config: &LogbookConfig,
    fields: &HashMap<String, String>,
    entries: Vec<LogEntry>,
) -> ReportDocument {
    assemble_at(config, fields, entries, Local::now())
}

/// Assemble a report with an explicit timestamp. Fields missing from the
/// mapping are filled with the placeholder so every schema key appears.
pub fn assemble_at(
    config: &LogbookConfig,
    fields: &HashMap<String, String>,
    entries: Vec<LogEntry>,
    generated_at: DateTime<Local>,
) -> ReportDocument {
    let fields = config
        .schema
        .iter()
        .map(|spec| ReportField {
            key: spec.key.clone(),
            label: spec.label.clone(),
            value: fields
                .get(&spec.key)
                .cloned()
                .unwrap_or_else(|| config.placeholder.clone()),
        })
        .collect();

    ReportDocument {
        title: config.title.clone(),
        fields,
        entry_columns: config.entry_columns.clone(),
        entries,
        generated_at,
        footer_label: config.footer_label.clone(),
    }
}
