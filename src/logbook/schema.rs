//! Field schema. The ordered list of fields collected before the entry phase.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// `YYYY-MM-DD` by shape only; calendar validity is not checked.
static DATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").expect("valid date regex"));

/// `HH:MM` by shape only; ranges are not checked.
static TIME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{2}:[0-9]{2}$").expect("valid time regex"));

/// How a field's raw input is validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// `YYYY-MM-DD`. The placeholder is rejected.
    Date,
    /// `HH:MM`, or the placeholder to mean "not applicable".
    Time,
    /// Anything. Empty input is stored as the placeholder.
    Text,
}

impl FieldKind {
    /// Classify trimmed input as accepted (possibly rewritten) or rejected.
    ///
    /// `field` is only used to label the rejection.
    pub fn validate(
        &self,
        field: &str,
        raw: &str,
        placeholder: &str,
    ) -> Result<String, ValidationError> {
        let value = raw.trim();
        let reject = |reason: String| ValidationError {
            field: field.to_string(),
            reason,
        };
        match self {
            Self::Date => {
                if DATE_PATTERN.is_match(value) {
                    Ok(value.to_string())
                } else {
                    Err(reject(
                        "Lütfen tarihi YYYY-AA-GG formatında giriniz.".to_string(),
                    ))
                }
            }
            Self::Time => {
                if value == placeholder || TIME_PATTERN.is_match(value) {
                    Ok(value.to_string())
                } else {
                    Err(reject(format!(
                        "Lütfen saati HH:DD formatında giriniz veya '{placeholder}' yazınız."
                    )))
                }
            }
            Self::Text => {
                if value.is_empty() {
                    Ok(placeholder.to_string())
                } else {
                    Ok(value.to_string())
                }
            }
        }
    }
}

/// One field to collect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Stable key used in the collected mapping.
    pub key: String,
    /// Label shown in the rendered report.
    pub label: String,
    /// Question sent to the user when this field is next.
    pub prompt: String,
    pub kind: FieldKind,
}

impl FieldSpec {
    pub fn new(key: &str, label: &str, prompt: &str, kind: FieldKind) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            prompt: prompt.to_string(),
            kind,
        }
    }
}

/// Errors building a schema.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("schema must contain at least one field")]
    Empty,

    #[error("duplicate field key: {0}")]
    DuplicateKey(String),
}

/// Ordered, immutable field definitions. Order defines step order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldSchema {
    fields: Vec<FieldSpec>,
}

impl FieldSchema {
    /// Build a schema, rejecting empty lists and duplicate keys.
    pub fn new(fields: Vec<FieldSpec>) -> Result<Self, SchemaError> {
        if fields.is_empty() {
            return Err(SchemaError::Empty);
        }
        for (i, field) in fields.iter().enumerate() {
            if fields[..i].iter().any(|f| f.key == field.key) {
                return Err(SchemaError::DuplicateKey(field.key.clone()));
            }
        }
        Ok(Self { fields })
    }

    /// The travel logbook fields, in the order they are asked.
    pub fn travel_log() -> Self {
        use FieldKind::*;
        Self {
            fields: vec![
                FieldSpec::new("tarih", "Tarih", "Tarihi giriniz (YYYY-AA-GG formatında):", Date),
                FieldSpec::new("gun", "Gün", "Gün (örn: Perşembe):", Text),
                FieldSpec::new("yolaCikisIl", "Yola Çıkış İli", "Yola Çıkış İli:", Text),
                FieldSpec::new(
                    "yolaCikisSaat",
                    "Yola Çıkış Saati",
                    "Yola Çıkış Saati (HH:DD veya -):",
                    Time,
                ),
                FieldSpec::new(
                    "konaklamaIl",
                    "Konaklama İli",
                    "Konaklama İli (boşsa '-' yazabilirsiniz):",
                    Text,
                ),
                FieldSpec::new(
                    "konaklamaNoktasi",
                    "Konaklama Noktası",
                    "Konaklama Noktası:",
                    Text,
                ),
                FieldSpec::new("varist", "Varış Tarihi", "Varış Tarihi (YYYY-AA-GG):", Date),
                FieldSpec::new("varis", "Varış Saati", "Varış Saati (HH:DD veya -):", Time),
            ],
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&FieldSpec> {
        self.fields.get(index)
    }

    pub fn position(&self, key: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.key == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter()
    }
}

impl Default for FieldSchema {
    fn default() -> Self {
        Self::travel_log()
    }
}
