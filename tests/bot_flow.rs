//! Integration tests for the full conversation flow.
//!
//! Each test drives a `LogbookBot` with a recording channel and a stub
//! render sink, then checks what the conversation saw.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use futures::stream;
use serde_json::json;
use tokio::time::timeout;

use logbook_bot::bot::{BotDeps, LogbookBot, Outcome};
use logbook_bot::channels::{
    Channel, ChannelManager, IncomingMessage, MessageStream, OutgoingDocument, OutgoingResponse,
    StatusUpdate,
};
use logbook_bot::config::{BotConfig, LogbookConfig};
use logbook_bot::error::{ChannelError, RenderError};
use logbook_bot::logbook::{CollectionPhase, ReportDocument, SessionStore};
use logbook_bot::render::{RenderSink, RenderedArtifact};

/// Maximum time any delivery is allowed to take before we consider it hung.
const TEST_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq)]
enum Sent {
    Text(String),
    Document { file_name: String, bytes: Vec<u8> },
    Status(StatusUpdate),
}

/// Channel that replays `inbound` from one chat and records everything
/// sent to it.
struct RecordingChannel {
    sent: Arc<Mutex<Vec<Sent>>>,
    inbound: Vec<&'static str>,
    fail_upload: bool,
}

#[async_trait]
impl Channel for RecordingChannel {
    fn name(&self) -> &str {
        "test"
    }

    async fn start(&self) -> Result<MessageStream, ChannelError> {
        let messages: Vec<IncomingMessage> = self
            .inbound
            .iter()
            .map(|text| message("replay", text))
            .collect();
        Ok(Box::pin(stream::iter(messages)))
    }

    async fn respond(
        &self,
        _msg: &IncomingMessage,
        response: OutgoingResponse,
    ) -> Result<(), ChannelError> {
        self.sent.lock().unwrap().push(Sent::Text(response.content));
        Ok(())
    }

    async fn send_document(
        &self,
        _msg: &IncomingMessage,
        document: OutgoingDocument,
    ) -> Result<(), ChannelError> {
        if self.fail_upload {
            return Err(ChannelError::SendFailed {
                name: "test".into(),
                reason: "file too large".into(),
            });
        }
        self.sent.lock().unwrap().push(Sent::Document {
            file_name: document.file_name,
            bytes: document.bytes,
        });
        Ok(())
    }

    async fn send_status(
        &self,
        status: StatusUpdate,
        _metadata: &serde_json::Value,
    ) -> Result<(), ChannelError> {
        self.sent.lock().unwrap().push(Sent::Status(status));
        Ok(())
    }
}

/// Render sink that keeps every document it is given.
struct StubSink {
    fail: bool,
    delay: Duration,
    rendered: Arc<Mutex<Vec<ReportDocument>>>,
}

#[async_trait]
impl RenderSink for StubSink {
    fn name(&self) -> &str {
        "stub"
    }

    async fn render(&self, document: &ReportDocument) -> Result<RenderedArtifact, RenderError> {
        self.rendered.lock().unwrap().push(document.clone());
        tokio::time::sleep(self.delay).await;
        if self.fail {
            return Err(RenderError::Timeout(Duration::from_secs(60)));
        }
        Ok(RenderedArtifact {
            bytes: b"%PDF-stub".to_vec(),
            extension: "pdf",
            mime_type: "application/pdf",
        })
    }
}

fn message(chat: &str, text: &str) -> IncomingMessage {
    IncomingMessage::new("test", "user-1", text).with_metadata(json!({ "chat_id": chat }))
}

#[derive(Default)]
struct Setup {
    fail_render: bool,
    fail_upload: bool,
    render_delay: Duration,
    inbound: Vec<&'static str>,
}

struct Harness {
    bot: LogbookBot,
    sent: Arc<Mutex<Vec<Sent>>>,
    rendered: Arc<Mutex<Vec<ReportDocument>>>,
}

impl Harness {
    fn new(fail_render: bool) -> Self {
        Self::with(Setup {
            fail_render,
            ..Setup::default()
        })
    }

    fn with(setup: Setup) -> Self {
        let sent = Arc::new(Mutex::new(Vec::new()));
        let rendered = Arc::new(Mutex::new(Vec::new()));

        let mut channels = ChannelManager::new();
        channels.add(Box::new(RecordingChannel {
            sent: Arc::clone(&sent),
            inbound: setup.inbound,
            fail_upload: setup.fail_upload,
        }));

        let deps = BotDeps {
            logbook: Arc::new(LogbookConfig::default()),
            renderer: Arc::new(StubSink {
                fail: setup.fail_render,
                delay: setup.render_delay,
                rendered: Arc::clone(&rendered),
            }),
            sessions: Arc::new(SessionStore::new()),
        };

        Self {
            bot: LogbookBot::new(BotConfig::default(), deps, channels),
            sent,
            rendered,
        }
    }

    /// Send one message from chat `chat`, waiting for any delivery it starts.
    async fn say(&self, chat: &str, text: &str) {
        if let Some(delivery) = self.bot.process(&message(chat, text)).await {
            timeout(TEST_TIMEOUT, delivery.run())
                .await
                .expect("delivery timed out");
        }
    }

    fn texts(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter_map(|s| match s {
                Sent::Text(t) => Some(t.clone()),
                _ => None,
            })
            .collect()
    }

    fn last_text(&self) -> String {
        self.texts().last().cloned().unwrap_or_default()
    }

    async fn phase(&self, chat: &str) -> CollectionPhase {
        self.bot
            .sessions()
            .get(&format!("test:{chat}"))
            .await
            .map(|s| s.phase)
            .unwrap_or_default()
    }
}

const FIELDS: [&str; 8] = [
    "2024-01-05",
    "Cuma",
    "Ankara",
    "08:00",
    "",
    "Otel Merkez",
    "2024-01-06",
    "-",
];

async fn fill_fields(h: &Harness, chat: &str) {
    h.say(chat, "/start").await;
    for value in FIELDS {
        h.say(chat, value).await;
    }
}

#[tokio::test]
async fn full_flow_delivers_named_report() {
    let h = Harness::new(false);
    fill_fields(&h, "42").await;
    assert_eq!(h.phase("42").await, CollectionPhase::AwaitingEntry);
    assert!(h.last_text().contains("'bitir'"));

    h.say("42", "08:30 Güzergah kontrolü yapıldı").await;
    assert!(
        h.last_text()
            .starts_with("Saat detayı eklendi: 08:30 - Güzergah kontrolü yapıldı")
    );
    h.say("42", "12:15 Mola").await;
    h.say("42", "Bitir").await;

    let rendered = h.rendered.lock().unwrap().clone();
    assert_eq!(rendered.len(), 1);
    let doc = &rendered[0];
    assert_eq!(doc.field("tarih"), Some("2024-01-05"));
    assert_eq!(doc.field("konaklamaIl"), Some("-"));
    assert_eq!(doc.field("varis"), Some("-"));
    assert_eq!(doc.entries.len(), 2);
    assert_eq!(doc.entries[1].timestamp, "12:15");
    assert_eq!(doc.entries[1].note, "Mola");

    let sent = h.sent.lock().unwrap().clone();
    let tail = &sent[sent.len() - 4..];
    assert_eq!(
        tail,
        [
            Sent::Text("Rapor oluşturuluyor, lütfen bekleyin...".into()),
            Sent::Status(StatusUpdate::UploadingDocument),
            Sent::Document {
                file_name: "Report_2024-01-05.pdf".into(),
                bytes: b"%PDF-stub".to_vec(),
            },
            Sent::Text(
                "Rapor oluşturuldu ve gönderildi. /start ile yeni rapor oluşturabilirsiniz."
                    .into()
            ),
        ]
    );

    assert_eq!(h.phase("42").await, CollectionPhase::Idle);
    assert!(h.bot.sessions().is_empty().await);
}

#[tokio::test]
async fn sentinel_with_no_entries_yields_empty_table() {
    let h = Harness::new(false);
    fill_fields(&h, "7").await;
    h.say("7", "bitir").await;

    let rendered = h.rendered.lock().unwrap().clone();
    assert_eq!(rendered.len(), 1);
    assert!(rendered[0].entries.is_empty());
}

#[tokio::test]
async fn render_failure_reports_reason_and_resets() {
    let h = Harness::new(true);
    fill_fields(&h, "9").await;
    h.say("9", "bitir").await;

    assert_eq!(
        h.last_text(),
        "Rapor oluşturulurken hata oluştu: renderer timed out after 60s"
    );
    assert!(
        !h.sent
            .lock()
            .unwrap()
            .iter()
            .any(|s| matches!(s, Sent::Document { .. }))
    );
    assert_eq!(h.phase("9").await, CollectionPhase::Idle);

    h.say("9", "hello").await;
    assert_eq!(h.last_text(), "Başlamak için /start yazınız.");
}

#[tokio::test]
async fn invalid_input_reprompts_without_advancing() {
    let h = Harness::new(false);
    h.say("1", "/start").await;
    h.say("1", "05.01.2024").await;
    assert_eq!(h.last_text(), "Lütfen tarihi YYYY-AA-GG formatında giriniz.");
    assert_eq!(h.phase("1").await, CollectionPhase::Collecting(0));

    h.say("1", "2024-01-05").await;
    assert_eq!(h.phase("1").await, CollectionPhase::Collecting(1));
}

#[tokio::test]
async fn malformed_entry_is_rejected_and_collection_continues() {
    let h = Harness::new(false);
    fill_fields(&h, "3").await;

    h.say("3", "sabah kontrol").await;
    assert_eq!(
        h.last_text(),
        "Lütfen 'HH:DD detay' formatında yazınız veya 'bitir' yazınız."
    );
    assert_eq!(h.phase("3").await, CollectionPhase::AwaitingEntry);

    h.say("3", "09:00 Kontrol").await;
    h.say("3", "bitir").await;
    assert_eq!(h.rendered.lock().unwrap()[0].entries.len(), 1);
}

#[tokio::test]
async fn messages_before_start_are_refused() {
    let h = Harness::new(false);
    h.say("5", "2024-01-05").await;
    assert_eq!(h.last_text(), "Başlamak için /start yazınız.");
    assert!(h.bot.sessions().is_empty().await);
}

#[tokio::test]
async fn restart_discards_progress() {
    let h = Harness::new(false);
    h.say("2", "/start").await;
    h.say("2", "2024-01-05").await;
    h.say("2", "Cuma").await;
    h.say("2", "/start").await;

    assert_eq!(h.phase("2").await, CollectionPhase::Collecting(0));
    let state = h.bot.sessions().get("test:2").await.unwrap();
    assert!(state.fields.is_empty());
}

#[tokio::test]
async fn cancel_ends_session() {
    let h = Harness::new(false);
    h.say("4", "/iptal").await;
    assert_eq!(h.last_text(), "İptal edilecek aktif bir rapor yok.");

    h.say("4", "/start").await;
    h.say("4", "/iptal").await;
    assert_eq!(
        h.last_text(),
        "Rapor iptal edildi. /start ile yeni rapor oluşturabilirsiniz."
    );
    assert_eq!(h.phase("4").await, CollectionPhase::Idle);
}

#[tokio::test]
async fn conversations_are_isolated() {
    let h = Harness::new(false);
    h.say("a", "/start").await;
    h.say("a", "2024-01-05").await;
    h.say("b", "/start").await;

    assert_eq!(h.phase("a").await, CollectionPhase::Collecting(1));
    assert_eq!(h.phase("b").await, CollectionPhase::Collecting(0));
}

#[tokio::test]
async fn sentinel_during_fields_is_plain_text() {
    let h = Harness::new(false);
    h.say("6", "/start").await;
    h.say("6", "2024-01-05").await;
    let outcome = h
        .bot
        .handle_message(&message("6", "bitir"))
        .await;

    assert!(matches!(outcome, Outcome::Reply(_)));
    let state = h.bot.sessions().get("test:6").await.unwrap();
    assert_eq!(state.fields.get("gun").map(String::as_str), Some("bitir"));
    assert!(h.rendered.lock().unwrap().is_empty());
}

#[tokio::test]
async fn failed_upload_reports_reason_and_resets() {
    let h = Harness::with(Setup {
        fail_upload: true,
        ..Setup::default()
    });
    fill_fields(&h, "11").await;
    h.say("11", "10:00 Varış").await;
    h.say("11", "bitir").await;

    assert_eq!(h.rendered.lock().unwrap().len(), 1);
    assert_eq!(
        h.last_text(),
        "Rapor oluşturulurken hata oluştu: \
         Failed to send response on channel test: file too large"
    );
    assert_eq!(h.phase("11").await, CollectionPhase::Idle);
}

#[tokio::test]
async fn run_waits_for_in_flight_delivery_before_returning() {
    let mut inbound = vec!["/start"];
    inbound.extend(FIELDS);
    inbound.extend(["08:30 Kontrol", "bitir"]);

    let h = Harness::with(Setup {
        render_delay: Duration::from_millis(200),
        inbound,
        ..Setup::default()
    });
    let sent = Arc::clone(&h.sent);

    timeout(TEST_TIMEOUT, h.bot.run())
        .await
        .expect("bot did not stop")
        .unwrap();

    let sent = sent.lock().unwrap().clone();
    assert!(sent.iter().any(|s| matches!(
        s,
        Sent::Document { file_name, .. } if file_name == "Report_2024-01-05.pdf"
    )));
    assert_eq!(
        sent.last(),
        Some(&Sent::Text(
            "Rapor oluşturuldu ve gönderildi. /start ile yeni rapor oluşturabilirsiniz.".into()
        ))
    );
}
