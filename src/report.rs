//! Profile reports
//!
//! [`HtmlReport`] fills the report template from a [`ProfileRecord`].
//! [`PdfReport`] prints that same HTML through a headless browser page.
//! Sections whose source is empty are left out; every interpolated value is
//! escaped.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use html_escape::{encode_double_quoted_attribute, encode_text};
use thiserror::Error;
use tracing::{info, warn};

use crate::BrowserConfig;
use crate::browser::{BrowserError, SessionLauncher};
use crate::profile::ProfileRecord;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Browser session could not be started for PDF rendering: {0}")]
    SessionStart(#[source] BrowserError),

    #[error("PDF rendering failed: {0}")]
    Render(#[source] BrowserError),
}

/// Renders a record into a byte stream
#[async_trait]
pub trait ReportRenderer: Send + Sync {
    async fn render(&self, record: &ProfileRecord) -> Result<Vec<u8>, ReportError>;

    /// MIME type of the rendered bytes
    fn content_type(&self) -> &'static str;
}

const STYLE: &str = r#"
  * { margin: 0; padding: 0; box-sizing: border-box; }
  body { font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif; padding: 40px; color: #333; line-height: 1.6; }
  .header { background: linear-gradient(135deg, #667eea 0%, #764ba2 100%); color: white; padding: 30px; margin: -40px -40px 30px -40px; border-radius: 0 0 15px 15px; }
  .header h1 { font-size: 36px; margin-bottom: 8px; }
  .header .subtitle { font-size: 18px; opacity: 0.95; }
  .header .meta { margin-top: 15px; font-size: 14px; opacity: 0.9; }
  .section { margin-bottom: 30px; background: #f8f9fa; padding: 20px; border-radius: 10px; border-left: 4px solid #667eea; }
  .section h2 { color: #667eea; font-size: 22px; margin-bottom: 15px; padding-bottom: 10px; border-bottom: 2px solid #e0e0e0; }
  .section p { margin-bottom: 12px; text-align: justify; }
  .snippet-list { list-style: none; counter-reset: snippet-counter; }
  .snippet-list li { counter-increment: snippet-counter; margin-bottom: 15px; padding-left: 35px; position: relative; }
  .snippet-list li:before { content: counter(snippet-counter); position: absolute; left: 0; top: 0; background: #667eea; color: white; width: 25px; height: 25px; border-radius: 50%; display: flex; align-items: center; justify-content: center; font-weight: bold; font-size: 14px; }
  .footer { margin-top: 40px; padding-top: 20px; border-top: 2px solid #e0e0e0; text-align: center; color: #666; font-size: 12px; }
  .thumbnail { float: right; margin-left: 20px; margin-bottom: 10px; border-radius: 10px; box-shadow: 0 4px 8px rgba(0,0,0,0.1); }
"#;

/// Fill the report template for `record`, dated `generated`
#[must_use]
pub fn render_html(record: &ProfileRecord, generated: NaiveDate) -> String {
    let panel = &record.knowledge_panel;
    let reference = &record.reference;
    let title = encode_text(record.display_title());

    let mut html = String::with_capacity(8 * 1024);
    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str(&format!("<title>{title}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n"));

    html.push_str("<div class=\"header\">\n");
    html.push_str(&format!("  <h1>{title}</h1>\n"));
    if let Some(subtitle) = &panel.subtitle {
        html.push_str(&format!(
            "  <div class=\"subtitle\">{}</div>\n",
            encode_text(subtitle)
        ));
    }
    html.push_str("  <div class=\"meta\">\n");
    if let Some(born) = &panel.born {
        html.push_str(&format!("    Born: {}<br>\n", encode_text(born)));
    }
    html.push_str(&format!("    Generated: {}\n", generated.format("%B %-d, %Y")));
    html.push_str("  </div>\n</div>\n");

    if let Some(thumbnail) = &reference.thumbnail {
        html.push_str(&format!(
            "<img src=\"{}\" alt=\"{}\" class=\"thumbnail\" width=\"200\">\n",
            encode_double_quoted_attribute(thumbnail),
            encode_double_quoted_attribute(&record.name)
        ));
    }

    if !reference.extract.is_empty() {
        html.push_str(&section("Overview", &reference.extract));
    }
    if let Some(description) = &panel.description {
        html.push_str(&section("Profile Summary", description));
    }
    if !record.snippets.is_empty() {
        html.push_str("<div class=\"section\">\n  <h2>Key Information</h2>\n  <ul class=\"snippet-list\">\n");
        for snippet in &record.snippets {
            html.push_str(&format!("    <li>{}</li>\n", encode_text(snippet)));
        }
        html.push_str("  </ul>\n</div>\n");
    }

    html.push_str(
        "<div class=\"footer\">\n\
         \x20 <p>This report was automatically generated using Profile Finder</p>\n\
         \x20 <p>Data sources: Wikipedia, Google Knowledge Graph, and Google Search</p>\n\
         </div>\n</body>\n</html>\n",
    );
    html
}

fn section(heading: &str, body: &str) -> String {
    format!(
        "<div class=\"section\">\n  <h2>{heading}</h2>\n  <p>{}</p>\n</div>\n",
        encode_text(body)
    )
}

/// HTML report renderer
#[derive(Debug, Clone, Default)]
pub struct HtmlReport {
    date: Option<NaiveDate>,
}

impl HtmlReport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a fixed generation date instead of today
    #[must_use]
    pub fn with_date(date: NaiveDate) -> Self {
        Self { date: Some(date) }
    }

    #[must_use]
    pub fn render_string(&self, record: &ProfileRecord) -> String {
        render_html(record, self.date.unwrap_or_else(|| Local::now().date_naive()))
    }
}

#[async_trait]
impl ReportRenderer for HtmlReport {
    async fn render(&self, record: &ProfileRecord) -> Result<Vec<u8>, ReportError> {
        Ok(self.render_string(record).into_bytes())
    }

    fn content_type(&self) -> &'static str {
        "text/html; charset=utf-8"
    }
}

/// PDF report renderer backed by a short-lived browser session
#[derive(Clone)]
pub struct PdfReport {
    launcher: Arc<dyn SessionLauncher>,
    browser: BrowserConfig,
    html: HtmlReport,
}

impl PdfReport {
    pub fn new(launcher: Arc<dyn SessionLauncher>, browser: BrowserConfig) -> Self {
        Self {
            launcher,
            browser,
            html: HtmlReport::new(),
        }
    }

    #[must_use]
    pub fn with_html(mut self, html: HtmlReport) -> Self {
        self.html = html;
        self
    }
}

#[async_trait]
impl ReportRenderer for PdfReport {
    async fn render(&self, record: &ProfileRecord) -> Result<Vec<u8>, ReportError> {
        let markup = self.html.render_string(record);

        let session = self
            .launcher
            .acquire(&self.browser)
            .await
            .map_err(ReportError::SessionStart)?;

        let printed = async {
            let page = session.new_page().await?;
            let printed = match page.set_content(&markup).await {
                Ok(()) => page.print_pdf().await,
                Err(e) => Err(e),
            };
            if let Err(e) = page.close().await {
                warn!("Failed to close report page: {}", e);
            }
            printed
        }
        .await;

        if let Err(e) = session.release().await {
            warn!("Browser session release failed after PDF rendering: {}", e);
        }

        let bytes = printed.map_err(ReportError::Render)?;
        info!("Rendered {} byte PDF report for '{}'", bytes.len(), record.name);
        Ok(bytes)
    }

    fn content_type(&self) -> &'static str {
        "application/pdf"
    }
}
