//! HTML rendering of the report document through a minijinja template.

use async_trait::async_trait;
use minijinja::{Environment, context};

use crate::error::RenderError;
use crate::logbook::ReportDocument;

use super::{RenderSink, RenderedArtifact};

/// The `.html` suffix turns on minijinja's HTML auto-escaping.
const TEMPLATE_NAME: &str = "report.html";

const REPORT_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="tr">
<head>
    <meta charset="UTF-8" />
    <title>{{ title }}</title>
    <style>
        @page { size: A4; margin: 40px 30px; }
        body { font-family: 'Arial', sans-serif; margin: 40px; background: #f0f2f5; color: #2c3e50; }
        h1 { text-align: center; color: #2980b9; }
        .info { margin-bottom: 20px; }
        .info div { margin: 4px 0; font-weight: bold; }
        table { width: 100%; border-collapse: collapse; margin-top: 20px; }
        th, td { border: 1px solid #2980b9; padding: 8px; text-align: left; white-space: pre-wrap; }
        th { background-color: #2980b9; color: white; }
        tbody tr:nth-child(odd) { background: #f2f6fc; }
        footer { font-size: 10px; color: #888; margin-top: 40px; text-align: center; }
    </style>
</head>
<body>
{%- for section in sections %}
{%- if section.type == "heading" %}
    <h1>{{ section.text }}</h1>
{%- elif section.type == "fields" %}
    <div class="info">
    {%- for row in section.rows %}
        <div>{{ row.label }}: {{ row.value }}</div>
    {%- endfor %}
    </div>
{%- elif section.type == "table" %}
    <table>
        <thead>
            <tr>{% for column in section.columns %}<th>{{ column }}</th>{% endfor %}</tr>
        </thead>
        <tbody>
        {%- for row in section.rows %}
            <tr>{% for cell in row %}<td>{{ cell }}</td>{% endfor %}</tr>
        {%- endfor %}
        </tbody>
    </table>
{%- elif section.type == "footer" %}
    <footer>{{ section.text }}</footer>
{%- endif %}
{%- endfor %}
</body>
</html>
"#;

/// Renders the report as a standalone HTML page.
#[derive(Debug, Clone, Default)]
pub struct HtmlRenderer;

impl HtmlRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Render the page markup. Shared with the PDF renderer.
    pub fn render_html(&self, document: &ReportDocument) -> Result<String, RenderError> {
        let mut env = Environment::new();
        env.add_template(TEMPLATE_NAME, REPORT_TEMPLATE)?;
        let template = env.get_template(TEMPLATE_NAME)?;
        let html = template.render(context! {
            title => &document.title,
            sections => document.sections(),
        })?;
        Ok(html)
    }
}

#[async_trait]
impl RenderSink for HtmlRenderer {
    fn name(&self) -> &str {
        "html"
    }

    async fn render(&self, document: &ReportDocument) -> Result<RenderedArtifact, RenderError> {
        let html = self.render_html(document)?;
        Ok(RenderedArtifact {
            bytes: html.into_bytes(),
            extension: "html",
            mime_type: "text/html",
        })
    }
}
