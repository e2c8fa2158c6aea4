//! Configuration types.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;
use crate::logbook::schema::FieldSchema;

/// What the collection flow asks and how the report is labelled.
#[derive(Debug, Clone)]
pub struct LogbookConfig {
    /// Fields asked before the entry phase, in order.
    pub schema: FieldSchema,
    /// Input that ends the entry phase (matched case-insensitively).
    pub sentinel: String,
    /// Stored in place of empty free-text input; also "n/a" for time fields.
    pub placeholder: String,
    /// Report heading.
    pub title: String,
    /// Column headers of the entry table.
    pub entry_columns: [String; 2],
    pub footer_label: String,
    /// Delivered file name prefix.
    pub report_prefix: String,
    /// Schema key whose value completes the file name.
    pub filename_field: String,
}

impl Default for LogbookConfig {
    fn default() -> Self {
        Self {
            schema: FieldSchema::travel_log(),
            sentinel: "bitir".to_string(),
            placeholder: "-".to_string(),
            title: "Seyir Defteri Raporu".to_string(),
            entry_columns: ["Saat".to_string(), "Detay".to_string()],
            footer_label: "Raporlama Tarihi".to_string(),
            report_prefix: "Report".to_string(),
            filename_field: "tarih".to_string(),
        }
    }
}

/// Which render sink turns reports into files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RendererKind {
    /// Headless Chromium `--print-to-pdf`.
    Pdf { chromium_bin: PathBuf },
    /// The intermediate HTML page, delivered as-is.
    Html,
}

/// Telegram channel settings.
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub bot_token: SecretString,
    /// Usernames or numeric ids; `*` allows everyone.
    pub allowed_users: Vec<String>,
}

/// Process-level settings, read from the environment.
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub telegram: Option<TelegramConfig>,
    pub cli_enabled: bool,
    pub renderer: RendererKind,
    pub render_timeout: Duration,
    /// Where the CLI channel writes delivered reports.
    pub output_dir: PathBuf,
    /// Sessions untouched for this long are dropped.
    pub session_idle_timeout: Duration,
    /// Interval of the idle-session sweep.
    pub prune_interval: Duration,
    /// Daily-rotated log files go here when set.
    pub log_dir: Option<PathBuf>,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            telegram: None,
            cli_enabled: true,
            renderer: RendererKind::Pdf {
                chromium_bin: PathBuf::from("chromium"),
            },
            render_timeout: Duration::from_secs(60),
            output_dir: PathBuf::from("./reports"),
            session_idle_timeout: Duration::from_secs(3600), // 1 hour
            prune_interval: Duration::from_secs(600),        // 10 minutes
            log_dir: None,
        }
    }
}

impl BotConfig {
    /// Build config from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from any key lookup (the environment in production).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let telegram = non_empty("TELEGRAM_BOT_TOKEN")
            .or_else(|| non_empty("BOT_TOKEN"))
            .map(|token| TelegramConfig {
                bot_token: SecretString::from(token.trim().to_string()),
                allowed_users: non_empty("TELEGRAM_ALLOWED_USERS")
                    .unwrap_or_else(|| "*".to_string())
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
            });

        let cli_enabled = match non_empty("LOGBOOK_CLI") {
            Some(v) => parse_bool("LOGBOOK_CLI", &v)?,
            None => telegram.is_none(),
        };

        if telegram.is_none() && !cli_enabled {
            return Err(ConfigError::NoChannels {
                hint: "Set TELEGRAM_BOT_TOKEN or LOGBOOK_CLI=true.".to_string(),
            });
        }

        let renderer = match non_empty("LOGBOOK_RENDERER").as_deref().map(str::trim) {
            None | Some("pdf") => RendererKind::Pdf {
                chromium_bin: non_empty("LOGBOOK_CHROMIUM_BIN")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from("chromium")),
            },
            Some("html") => RendererKind::Html,
            Some(other) => {
                return Err(ConfigError::InvalidValue {
                    key: "LOGBOOK_RENDERER".to_string(),
                    message: format!("expected 'pdf' or 'html', got '{other}'"),
                });
            }
        };

        let render_timeout = match non_empty("LOGBOOK_RENDER_TIMEOUT_SECS") {
            Some(v) => Duration::from_secs(parse_positive("LOGBOOK_RENDER_TIMEOUT_SECS", &v)?),
            None => defaults.render_timeout,
        };

        let session_idle_timeout = match non_empty("LOGBOOK_SESSION_IDLE_MINUTES") {
            Some(v) => {
                let minutes = parse_positive("LOGBOOK_SESSION_IDLE_MINUTES", &v)?;
                let secs = minutes
                    .checked_mul(60)
                    .ok_or_else(|| ConfigError::InvalidValue {
                        key: "LOGBOOK_SESSION_IDLE_MINUTES".to_string(),
                        message: format!("'{v}' minutes is out of range"),
                    })?;
                Duration::from_secs(secs)
            }
            None => defaults.session_idle_timeout,
        };

        let output_dir = non_empty("LOGBOOK_OUTPUT_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.output_dir);

        Ok(Self {
            telegram,
            cli_enabled,
            renderer,
            render_timeout,
            output_dir,
            session_idle_timeout,
            prune_interval: defaults.prune_interval,
            log_dir: non_empty("LOGBOOK_LOG_DIR").map(PathBuf::from),
        })
    }
}

fn parse_positive(key: &str, value: &str) -> Result<u64, ConfigError> {
    match value.trim().parse::<u64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("expected a positive integer, got '{value}'"),
        }),
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("expected true/false, got '{value}'"),
        }),
    }
}
