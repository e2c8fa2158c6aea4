//! Main bot loop. Dispatches inbound messages to per-conversation sessions
//! and delivers finished reports.

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use tokio::task::JoinSet;

use crate::channels::{ChannelManager, IncomingMessage, OutgoingDocument, OutgoingResponse, StatusUpdate};
use crate::commands::{Submission, SubmissionParser};
use crate::config::{BotConfig, LogbookConfig};
use crate::error::Error;
use crate::logbook::{CollectionMachine, ReportDocument, SessionStore, Transition, prompts};
use crate::render::RenderSink;

/// What a single inbound message resolved to.
#[derive(Debug)]
pub enum Outcome {
    /// Send this text back.
    Reply(String),
    /// The session finished; render and deliver this report.
    Report(ReportDocument),
}

/// Extra time granted to in-flight deliveries at shutdown, on top of the
/// render timeout.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

/// Shared components of the bot.
pub struct BotDeps {
    pub logbook: Arc<LogbookConfig>,
    pub renderer: Arc<dyn RenderSink>,
    pub sessions: Arc<SessionStore>,
}

/// Owns the channels and routes every message through the collection flow.
pub struct LogbookBot {
    config: BotConfig,
    machine: CollectionMachine,
    renderer: Arc<dyn RenderSink>,
    sessions: Arc<SessionStore>,
    channels: Arc<ChannelManager>,
}

impl LogbookBot {
    pub fn new(config: BotConfig, deps: BotDeps, channels: ChannelManager) -> Self {
        Self {
            config,
            machine: CollectionMachine::new(deps.logbook),
            renderer: deps.renderer,
            sessions: deps.sessions,
            channels: Arc::new(channels),
        }
    }

    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    // ── Main loop ───────────────────────────────────────────────────

    /// Run until Ctrl+C or until every channel stream ends.
    pub async fn run(self) -> Result<(), Error> {
        let mut message_stream = self.channels.start_all().await?;

        let sessions = Arc::clone(&self.sessions);
        let idle_timeout = self.config.session_idle_timeout;
        let prune_interval = self.config.prune_interval;
        let pruning_handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(prune_interval);
            interval.tick().await; // Skip immediate first tick
            loop {
                interval.tick().await;
                let pruned = sessions.prune_stale_sessions(idle_timeout).await;
                if pruned > 0 {
                    tracing::info!(pruned, "Pruned idle sessions");
                }
            }
        });

        tracing::info!(
            channels = ?self.channels.names(),
            renderer = self.renderer.name(),
            "Logbook bot ready and listening"
        );

        let mut deliveries = JoinSet::new();

        loop {
            let message = tokio::select! {
                biased;
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Ctrl+C received, shutting down...");
                    break;
                }
                Some(joined) = deliveries.join_next(), if !deliveries.is_empty() => {
                    if let Err(e) = joined {
                        tracing::error!("Report delivery task failed: {e}");
                    }
                    continue;
                }
                msg = message_stream.next() => {
                    match msg {
                        Some(m) => m,
                        None => {
                            tracing::info!("All channel streams ended, shutting down...");
                            break;
                        }
                    }
                }
            };

            // Deliveries run detached so one slow render never blocks other
            // conversations.
            if let Some(delivery) = self.process(&message).await {
                deliveries.spawn(delivery.run());
            }
        }

        tracing::info!("Bot shutting down...");
        pruning_handle.abort();
        self.drain_deliveries(&mut deliveries).await;
        self.channels.shutdown_all().await?;

        Ok(())
    }

    /// Let reports already announced to their users finish, bounded by the
    /// render timeout plus a grace period.
    async fn drain_deliveries(&self, deliveries: &mut JoinSet<()>) {
        if deliveries.is_empty() {
            return;
        }
        let pending = deliveries.len();
        tracing::info!(pending, "Waiting for in-flight report deliveries");

        let limit = self.config.render_timeout + SHUTDOWN_GRACE;
        let drained = tokio::time::timeout(limit, async {
            while let Some(joined) = deliveries.join_next().await {
                if let Err(e) = joined {
                    tracing::error!("Report delivery task failed: {e}");
                }
            }
        })
        .await;

        if drained.is_err() {
            tracing::warn!(
                remaining = deliveries.len(),
                "Report deliveries did not finish in {limit:?}; aborting"
            );
            deliveries.abort_all();
        }
    }

    /// Handle one message end to end: reply, and if a report is ready,
    /// announce it and return the delivery still to be run.
    pub async fn process(&self, message: &IncomingMessage) -> Option<Delivery> {
        match self.handle_message(message).await {
            Outcome::Reply(text) => {
                if let Err(e) = self
                    .channels
                    .respond(message, OutgoingResponse::text(text))
                    .await
                {
                    tracing::error!(channel = %message.channel, "Failed to send reply: {e}");
                }
                None
            }
            Outcome::Report(document) => {
                if let Err(e) = self
                    .channels
                    .respond(message, OutgoingResponse::text(prompts::RENDERING))
                    .await
                {
                    tracing::warn!(channel = %message.channel, "Failed to send render notice: {e}");
                }
                Some(Delivery {
                    channels: Arc::clone(&self.channels),
                    renderer: Arc::clone(&self.renderer),
                    logbook: self.machine.config().clone(),
                    message: message.clone(),
                    document,
                })
            }
        }
    }

    // ── Message dispatch ────────────────────────────────────────────

    /// Resolve a message against its conversation's session.
    pub async fn handle_message(&self, message: &IncomingMessage) -> Outcome {
        let key = message.conversation_key();
        let machine = &self.machine;

        match SubmissionParser::parse(&message.content) {
            Submission::Start => {
                let reply = self
                    .sessions
                    .with_session(&key, |state| machine.start(state))
                    .await;
                tracing::info!(
                    conversation = %key,
                    user = message.user_name.as_deref().unwrap_or(&message.user_id),
                    "Report session started"
                );
                Outcome::Reply(reply)
            }
            Submission::Cancel => {
                let was_active = self
                    .sessions
                    .with_session(&key, |state| machine.cancel(state))
                    .await;
                if was_active {
                    tracing::info!(conversation = %key, "Report session cancelled");
                    Outcome::Reply(prompts::CANCELLED.to_string())
                } else {
                    Outcome::Reply(prompts::NOTHING_TO_CANCEL.to_string())
                }
            }
            Submission::Help => Outcome::Reply(prompts::help(&machine.config().sentinel)),
            Submission::Input { content } => {
                let result = self
                    .sessions
                    .with_session(&key, |state| machine.submit(state, &content))
                    .await;
                match result {
                    Ok(Transition::Prompt(prompt)) => Outcome::Reply(prompt),
                    Ok(Transition::EntryRecorded { message, .. }) => Outcome::Reply(message),
                    Ok(Transition::Completed(document)) => {
                        tracing::info!(
                            conversation = %key,
                            entries = document.entries.len(),
                            "Report ready for rendering"
                        );
                        Outcome::Report(document)
                    }
                    Err(e) => {
                        tracing::debug!(conversation = %key, "Input not accepted: {e}");
                        Outcome::Reply(e.to_string())
                    }
                }
            }
        }
    }
}

/// One finished report, with everything needed to render and deliver it
/// off the main loop.
#[must_use = "a delivery does nothing until run"]
pub struct Delivery {
    channels: Arc<ChannelManager>,
    renderer: Arc<dyn RenderSink>,
    logbook: LogbookConfig,
    message: IncomingMessage,
    document: ReportDocument,
}

impl Delivery {
    /// One attempt: render, send the document, confirm. Any failure is
    /// reported to the user; the session is already closed either way.
    pub async fn run(self) {
        let Self {
            channels,
            renderer,
            logbook,
            message,
            document,
        } = self;

        if let Err(e) = channels
            .send_status(&message.channel, StatusUpdate::UploadingDocument, &message.metadata)
            .await
        {
            tracing::debug!(channel = %message.channel, "Failed to send upload status: {e}");
        }

        let result = match renderer.render(&document).await {
            Ok(artifact) => {
                let stem = document.file_stem(&logbook.report_prefix, &logbook.filename_field);
                let file_name = artifact.file_name(&stem);
                let size = artifact.bytes.len();
                let outgoing = OutgoingDocument {
                    file_name: file_name.clone(),
                    mime_type: artifact.mime_type.to_string(),
                    bytes: artifact.bytes,
                };
                match channels.send_document(&message, outgoing).await {
                    Ok(()) => {
                        tracing::info!(file = %file_name, bytes = size, "Report delivered");
                        Ok(())
                    }
                    Err(e) => Err(e.to_string()),
                }
            }
            Err(e) => Err(e.to_string()),
        };

        let reply = match result {
            Ok(()) => prompts::DELIVERED.to_string(),
            Err(reason) => {
                tracing::error!(
                    conversation = %message.conversation_key(),
                    renderer = renderer.name(),
                    "Report delivery failed: {reason}"
                );
                prompts::render_failed(&reason)
            }
        };

        if let Err(e) = channels
            .respond(&message, OutgoingResponse::text(reply))
            .await
        {
            tracing::error!(channel = %message.channel, "Failed to send delivery result: {e}");
        }
    }
}
