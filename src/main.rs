use std::sync::Arc;

use logbook_bot::bot::{BotDeps, LogbookBot};
use logbook_bot::channels::{ChannelManager, CliChannel, TelegramChannel};
use logbook_bot::config::{BotConfig, LogbookConfig, RendererKind};
use logbook_bot::logbook::SessionStore;
use logbook_bot::render::create_sink;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = BotConfig::from_env().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        eprintln!("  export TELEGRAM_BOT_TOKEN=123456:ABC...");
        std::process::exit(1);
    });

    // Keep the guard alive so buffered log lines are flushed on exit
    let _log_guard = init_tracing(&config);

    eprintln!("📒 Logbook Bot v{}", env!("CARGO_PKG_VERSION"));
    match &config.renderer {
        RendererKind::Pdf { chromium_bin } => {
            eprintln!("   Renderer: pdf ({})", chromium_bin.display())
        }
        RendererKind::Html => eprintln!("   Renderer: html"),
    }

    let mut channels = ChannelManager::new();
    let mut active_channels = Vec::new();

    if let Some(telegram) = &config.telegram {
        eprintln!(
            "   Telegram: enabled (allowed: {})",
            if telegram.allowed_users.iter().any(|u| u == "*") {
                "everyone".to_string()
            } else {
                telegram.allowed_users.join(", ")
            }
        );
        channels.add(Box::new(TelegramChannel::new(
            telegram.bot_token.clone(),
            telegram.allowed_users.clone(),
        )));
        active_channels.push("telegram");
    }

    if config.cli_enabled {
        eprintln!("   Reports: {}", config.output_dir.display());
        channels.add(Box::new(CliChannel::new(config.output_dir.clone())));
        active_channels.push("cli");
    }

    eprintln!("   Channels: {}", active_channels.join(", "));
    eprintln!("   Type /start to begin a report.\n");

    // Fail fast on a bad token instead of polling with it
    channels.health_check_all().await?;

    let deps = BotDeps {
        logbook: Arc::new(LogbookConfig::default()),
        renderer: create_sink(&config.renderer, config.render_timeout),
        sessions: Arc::new(SessionStore::new()),
    };

    let bot = LogbookBot::new(config, deps, channels);
    bot.run().await?;

    Ok(())
}

fn init_tracing(config: &BotConfig) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter = || {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
    };

    match &config.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "logbook-bot.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter())
                .with_target(false)
                .with_ansi(false)
                .with_writer(writer)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter())
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
            None
        }
    }
}
