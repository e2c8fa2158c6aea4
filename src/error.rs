//! Error types for the logbook bot.

use std::time::Duration;

/// Top-level error type for the bot.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("No channel enabled. {hint}")]
    NoChannels { hint: String },
}

/// Channel-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("Channel {name} failed to start: {reason}")]
    StartupFailed { name: String, reason: String },

    #[error("Failed to send response on channel {name}: {reason}")]
    SendFailed { name: String, reason: String },

    #[error("Channel {name} is not registered")]
    UnknownChannel { name: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Render sink failures. The message is shown to the user verbatim.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),

    #[error("renderer {program} could not be started: {reason}")]
    Spawn { program: String, reason: String },

    #[error("renderer {program} exited with status {code}: {stderr}")]
    Failed {
        program: String,
        code: i32,
        stderr: String,
    },

    #[error("renderer timed out after {0:?}")]
    Timeout(Duration),

    #[error("renderer produced no output")]
    EmptyOutput,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A field value rejected by its validator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{reason}")]
pub struct ValidationError {
    /// Schema key of the rejected field.
    pub field: String,
    /// Human-readable reason, shown to the user as-is.
    pub reason: String,
}

/// Recoverable errors from the collection state machine.
///
/// None of these change the session state; the `Display` text is the reply
/// sent back to the user.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CollectionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Lütfen 'HH:DD detay' formatında yazınız veya '{sentinel}' yazınız.")]
    MalformedEntry { sentinel: String },

    #[error("Başlamak için /start yazınız.")]
    NotStarted,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_displays_reason_only() {
        let err = CollectionError::from(ValidationError {
            field: "tarih".into(),
            reason: "Lütfen tarihi YYYY-AA-GG formatında giriniz.".into(),
        });
        assert_eq!(
            err.to_string(),
            "Lütfen tarihi YYYY-AA-GG formatında giriniz."
        );
    }

    #[test]
    fn malformed_entry_names_sentinel() {
        let err = CollectionError::MalformedEntry {
            sentinel: "bitir".into(),
        };
        assert!(err.to_string().contains("'bitir'"));
    }

    #[test]
    fn render_timeout_message() {
        let err = RenderError::Timeout(Duration::from_secs(5));
        assert_eq!(err.to_string(), "renderer timed out after 5s");
    }
}
