//! Channel trait. The abstraction over chat transports.
//!
//! A channel delivers inbound user messages as a stream and carries replies,
//! status hints and rendered documents back to the originating conversation.

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;

use crate::error::ChannelError;

/// Stream of inbound messages from a channel.
pub type MessageStream = Pin<Box<dyn Stream<Item = IncomingMessage> + Send>>;

/// A message received from a user.
#[derive(Debug, Clone)]
pub struct IncomingMessage {
    /// Name of the channel that produced the message.
    pub channel: String,
    /// Platform user identifier.
    pub user_id: String,
    /// Display name, if the platform provides one.
    pub user_name: Option<String>,
    pub content: String,
    /// Platform-specific data needed to reply (e.g. Telegram `chat_id`).
    pub metadata: serde_json::Value,
}

impl IncomingMessage {
    pub fn new(channel: &str, user_id: &str, content: &str) -> Self {
        Self {
            channel: channel.to_string(),
            user_id: user_id.to_string(),
            user_name: None,
            content: content.to_string(),
            metadata: serde_json::json!({}),
        }
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_user_name(mut self, name: &str) -> Self {
        self.user_name = Some(name.to_string());
        self
    }

    /// Stable key of the conversation this message belongs to:
    /// `<channel>:<chat_id>`, falling back to the user id.
    pub fn conversation_key(&self) -> String {
        let chat = self
            .metadata
            .get("chat_id")
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .unwrap_or(&self.user_id);
        format!("{}:{}", self.channel, chat)
    }
}

/// A text reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingResponse {
    pub content: String,
}

impl OutgoingResponse {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

/// A file sent back to the conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingDocument {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Progress hints. Channels may show or ignore them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusUpdate {
    /// A document is being rendered or uploaded.
    UploadingDocument,
}

#[async_trait]
pub trait Channel: Send + Sync {
    /// Channel name, used to route replies (e.g. "telegram", "cli").
    fn name(&self) -> &str;

    /// Start listening and return the inbound message stream.
    async fn start(&self) -> Result<MessageStream, ChannelError>;

    /// Send a text reply to the conversation of `msg`.
    async fn respond(
        &self,
        msg: &IncomingMessage,
        response: OutgoingResponse,
    ) -> Result<(), ChannelError>;

    /// Deliver a file to the conversation of `msg`.
    async fn send_document(
        &self,
        msg: &IncomingMessage,
        document: OutgoingDocument,
    ) -> Result<(), ChannelError>;

    async fn send_status(
        &self,
        _status: StatusUpdate,
        _metadata: &serde_json::Value,
    ) -> Result<(), ChannelError> {
        Ok(())
    }

    /// Verify the transport is usable (credentials, connectivity).
    async fn health_check(&self) -> Result<(), ChannelError> {
        Ok(())
    }

    async fn shutdown(&self) -> Result<(), ChannelError> {
        Ok(())
    }
}
