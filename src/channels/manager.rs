//! Channel manager. Merges inbound streams and routes replies by channel name.

use futures::stream::{self, StreamExt};

use crate::channels::{
    Channel, IncomingMessage, MessageStream, OutgoingDocument, OutgoingResponse, StatusUpdate,
};
use crate::error::ChannelError;

/// Owns every active channel.
#[derive(Default)]
pub struct ChannelManager {
    channels: Vec<Box<dyn Channel>>,
}

impl ChannelManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, channel: Box<dyn Channel>) {
        self.channels.push(channel);
    }

    pub fn names(&self) -> Vec<&str> {
        self.channels.iter().map(|c| c.name()).collect()
    }

    fn get(&self, name: &str) -> Result<&dyn Channel, ChannelError> {
        self.channels
            .iter()
            .find(|c| c.name() == name)
            .map(|c| c.as_ref())
            .ok_or_else(|| ChannelError::UnknownChannel {
                name: name.to_string(),
            })
    }

    /// Start every channel and merge their streams. Channels that fail to
    /// start are logged and skipped; it is an error only if none start.
    pub async fn start_all(&self) -> Result<MessageStream, ChannelError> {
        let mut streams = Vec::new();
        for channel in &self.channels {
            match channel.start().await {
                Ok(s) => {
                    tracing::info!(channel = channel.name(), "Channel started");
                    streams.push(s);
                }
                Err(e) => tracing::error!(channel = channel.name(), "Channel failed to start: {e}"),
            }
        }
        if streams.is_empty() {
            return Err(ChannelError::StartupFailed {
                name: "all".into(),
                reason: "no channel started".into(),
            });
        }
        Ok(stream::select_all(streams).boxed())
    }

    pub async fn respond(
        &self,
        msg: &IncomingMessage,
        response: OutgoingResponse,
    ) -> Result<(), ChannelError> {
        self.get(&msg.channel)?.respond(msg, response).await
    }

    pub async fn send_document(
        &self,
        msg: &IncomingMessage,
        document: OutgoingDocument,
    ) -> Result<(), ChannelError> {
        self.get(&msg.channel)?.send_document(msg, document).await
    }

    pub async fn send_status(
        &self,
        channel: &str,
        status: StatusUpdate,
        metadata: &serde_json::Value,
    ) -> Result<(), ChannelError> {
        self.get(channel)?.send_status(status, metadata).await
    }

    /// Check every channel before starting. Fails on the first unhealthy
    /// channel so a bad token stops the process at startup.
    pub async fn health_check_all(&self) -> Result<(), ChannelError> {
        for channel in &self.channels {
            if let Err(e) = channel.health_check().await {
                tracing::error!(channel = channel.name(), "Health check failed: {e}");
                return Err(e);
            }
        }
        Ok(())
    }

    pub async fn shutdown_all(&self) -> Result<(), ChannelError> {
        for channel in &self.channels {
            if let Err(e) = channel.shutdown().await {
                tracing::warn!(channel = channel.name(), "Shutdown failed: {e}");
            }
        }
        Ok(())
    }
}
