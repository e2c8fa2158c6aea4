//! Render sinks. Turn a `ReportDocument` into a deliverable file.

pub mod chromium;
pub mod html;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::config::RendererKind;
use crate::error::RenderError;
use crate::logbook::ReportDocument;

pub use chromium::ChromiumRenderer;
pub use html::HtmlRenderer;

/// Rendered report bytes plus what the caller needs to name the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedArtifact {
    pub bytes: Vec<u8>,
    /// File extension without the dot.
    pub extension: &'static str,
    pub mime_type: &'static str,
}

impl RenderedArtifact {
    /// `<stem>.<extension>`.
    pub fn file_name(&self, stem: &str) -> String {
        format!("{stem}.{}", self.extension)
    }
}

/// Converts a structured report into an opaque binary artifact.
#[async_trait]
pub trait RenderSink: Send + Sync {
    fn name(&self) -> &str;

    async fn render(&self, document: &ReportDocument) -> Result<RenderedArtifact, RenderError>;
}

/// Build the render sink selected by configuration.
pub fn create_sink(kind: &RendererKind, timeout: Duration) -> Arc<dyn RenderSink> {
    match kind {
        RendererKind::Pdf { chromium_bin } => Arc::new(
            ChromiumRenderer::new(chromium_bin.clone()).with_timeout(timeout),
        ),
        RendererKind::Html => Arc::new(HtmlRenderer::new()),
    }
}
