//! PDF rendering through headless Chromium's `--print-to-pdf`.
//!
//! The HTML page and the PDF live in a temporary directory that is removed
//! when rendering returns, whatever the outcome.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

use crate::error::RenderError;
use crate::logbook::ReportDocument;

use super::html::HtmlRenderer;
use super::{RenderSink, RenderedArtifact};

/// Default render timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Maximum stderr kept in error messages.
const MAX_STDERR_CHARS: usize = 500;

/// Renders the report HTML to PDF with a Chromium binary.
#[derive(Debug, Clone)]
pub struct ChromiumRenderer {
    binary: PathBuf,
    timeout: Duration,
    html: HtmlRenderer,
}

impl ChromiumRenderer {
    pub fn new(binary: PathBuf) -> Self {
        Self {
            binary,
            timeout: DEFAULT_TIMEOUT,
            html: HtmlRenderer::new(),
        }
    }

    /// Set the render timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn program(&self) -> String {
        self.binary.display().to_string()
    }

    fn command(&self, html_path: &Path, pdf_path: &Path) -> Command {
        let mut command = Command::new(&self.binary);
        command
            .args([
                "--headless",
                "--disable-gpu",
                "--no-sandbox",
                "--disable-setuid-sandbox",
                "--no-pdf-header-footer",
            ])
            .arg(format!("--print-to-pdf={}", pdf_path.display()))
            .arg(format!("file://{}", html_path.display()))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        command
    }
}

#[async_trait]
impl RenderSink for ChromiumRenderer {
    fn name(&self) -> &str {
        "chromium"
    }

    async fn render(&self, document: &ReportDocument) -> Result<RenderedArtifact, RenderError> {
        let html = self.html.render_html(document)?;

        let workdir = tempfile::tempdir()?;
        let html_path = workdir.path().join("report.html");
        let pdf_path = workdir.path().join("report.pdf");
        tokio::fs::write(&html_path, html).await?;

        let child = self
            .command(&html_path, &pdf_path)
            .spawn()
            .map_err(|e| RenderError::Spawn {
                program: self.program(),
                reason: e.to_string(),
            })?;

        // On timeout the dropped future drops the child, which kills it.
        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => result?,
            Err(_) => return Err(RenderError::Timeout(self.timeout)),
        };

        if !output.status.success() {
            let stderr: String = String::from_utf8_lossy(&output.stderr)
                .trim()
                .chars()
                .take(MAX_STDERR_CHARS)
                .collect();
            return Err(RenderError::Failed {
                program: self.program(),
                code: output.status.code().unwrap_or(-1),
                stderr,
            });
        }

        let bytes = match tokio::fs::read(&pdf_path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(RenderError::EmptyOutput);
            }
            Err(e) => return Err(e.into()),
        };
        if bytes.is_empty() {
            return Err(RenderError::EmptyOutput);
        }

        tracing::debug!(bytes = bytes.len(), "Chromium rendered PDF");
        Ok(RenderedArtifact {
            bytes,
            extension: "pdf",
            mime_type: "application/pdf",
        })
    }
}
