//! CLI channel. Stdin/stdout REPL for local use.

use std::path::PathBuf;

use async_trait::async_trait;
use futures::stream;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::channels::{
    Channel, IncomingMessage, MessageStream, OutgoingDocument, OutgoingResponse, StatusUpdate,
};
use crate::error::ChannelError;

/// Reads lines from stdin, prints replies to stdout and writes delivered
/// documents into `output_dir`.
pub struct CliChannel {
    output_dir: PathBuf,
}

impl CliChannel {
    pub fn new(output_dir: PathBuf) -> Self {
        Self { output_dir }
    }

    /// Write a document into the output directory and return its path.
    pub async fn save_document(&self, document: &OutgoingDocument) -> Result<PathBuf, ChannelError> {
        tokio::fs::create_dir_all(&self.output_dir).await?;
        let path = self.output_dir.join(&document.file_name);
        tokio::fs::write(&path, &document.bytes).await?;
        Ok(path)
    }
}

#[async_trait]
impl Channel for CliChannel {
    fn name(&self) -> &str {
        "cli"
    }

    async fn start(&self) -> Result<MessageStream, ChannelError> {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();

        tokio::spawn(async move {
            let stdin = tokio::io::stdin();
            let reader = BufReader::new(stdin);
            let mut lines = reader.lines();

            eprint!("> ");

            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        // Empty lines are valid input (placeholder for free-text fields).
                        let msg = IncomingMessage::new("cli", "local-user", line.trim());
                        if tx.send(msg).is_err() {
                            break;
                        }
                    }
                    Ok(None) => break, // EOF
                    Err(e) => {
                        tracing::error!("Error reading stdin: {}", e);
                        break;
                    }
                }
            }
        });

        let stream = stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|msg| (msg, rx))
        });

        Ok(Box::pin(stream))
    }

    async fn respond(
        &self,
        _msg: &IncomingMessage,
        response: OutgoingResponse,
    ) -> Result<(), ChannelError> {
        println!("\n{}\n", response.content);
        eprint!("> ");
        Ok(())
    }

    async fn send_document(
        &self,
        _msg: &IncomingMessage,
        document: OutgoingDocument,
    ) -> Result<(), ChannelError> {
        let path = self.save_document(&document).await?;
        println!("\n📄 {}", path.display());
        Ok(())
    }

    async fn send_status(
        &self,
        status: StatusUpdate,
        _metadata: &serde_json::Value,
    ) -> Result<(), ChannelError> {
        match status {
            StatusUpdate::UploadingDocument => eprintln!("⏳ ..."),
        }
        Ok(())
    }
}
