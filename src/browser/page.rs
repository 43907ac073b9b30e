//! chromiumoxide page backend

use async_trait::async_trait;
use chromiumoxide::page::Page;
use chromiumoxide_cdp::cdp::browser_protocol::emulation::{
    SetLocaleOverrideParams, SetUserAgentOverrideParams,
};
use chromiumoxide_cdp::cdp::browser_protocol::network::{Headers, SetExtraHttpHeadersParams};
use chromiumoxide_cdp::cdp::browser_protocol::page::{
    AddScriptToEvaluateOnNewDocumentParams, PrintToPdfParams,
};
use serde::Deserialize;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::{BrowserError, BrowserResult, SessionPage};
use crate::BrowserConfig;
use crate::extraction::{DomQuery, DomQueryError, ExtractRule, Locator};

/// Runs before any page script; hides the most common automation tells
pub const STEALTH_INIT_SCRIPT: &str = r#"
Object.defineProperty(navigator, 'webdriver', { get: () => undefined });
Object.defineProperty(navigator, 'plugins', { get: () => [1, 2, 3, 4, 5] });
window.chrome = window.chrome || { runtime: {} };
"#;

const IDLE_POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoadState {
    ready_state: String,
    resources: u64,
}

#[derive(Deserialize)]
struct SelectorOutcome {
    valid: bool,
    values: Vec<String>,
}

/// A live browser page
#[derive(Clone)]
pub struct ChromiumPage {
    page: Page,
}

impl ChromiumPage {
    pub(crate) fn new(page: Page) -> Self {
        Self { page }
    }

    /// Apply the session fingerprint before the first navigation
    ///
    /// Each step is best-effort; a page that only partially accepted the
    /// overrides is still usable.
    pub(crate) async fn apply_fingerprint(&self, config: &BrowserConfig) {
        if let Err(e) = self
            .page
            .execute(AddScriptToEvaluateOnNewDocumentParams::new(STEALTH_INIT_SCRIPT))
            .await
        {
            warn!("Failed to install stealth init script: {}", e);
        }

        let mut user_agent = SetUserAgentOverrideParams::new(config.user_agent.clone());
        user_agent.accept_language = Some(config.accept_language.clone());
        if let Err(e) = self.page.execute(user_agent).await {
            warn!("Failed to override user agent: {}", e);
        }

        let locale = SetLocaleOverrideParams {
            locale: Some(config.locale.clone()),
        };
        if let Err(e) = self.page.execute(locale).await {
            warn!("Failed to override locale: {}", e);
        }

        let headers = Headers::new(serde_json::json!({
            "Accept-Language": config.accept_language,
        }));
        if let Err(e) = self
            .page
            .execute(SetExtraHttpHeadersParams::new(headers))
            .await
        {
            warn!("Failed to set extra HTTP headers: {}", e);
        }
    }

    fn selector_script(locator: &Locator, first_only: bool) -> Result<String, DomQueryError> {
        let selector = serde_json::to_string(&locator.selector)
            .map_err(|e| DomQueryError::Evaluation(e.to_string()))?;
        let attribute = match &locator.rule {
            ExtractRule::TextContent => "null".to_string(),
            ExtractRule::Attribute(name) => serde_json::to_string(name)
                .map_err(|e| DomQueryError::Evaluation(e.to_string()))?,
        };
        let limit = if first_only { 1 } else { 0 };

        Ok(format!(
            r#"(() => {{
  const selector = {selector};
  const attribute = {attribute};
  const limit = {limit};
  let nodes;
  try {{
    nodes = limit === 1
      ? [document.querySelector(selector)].filter((n) => n !== null)
      : Array.from(document.querySelectorAll(selector));
  }} catch (e) {{
    return {{ valid: false, values: [] }};
  }}
  const values = nodes
    .map((n) => attribute === null ? (n.textContent || '') : n.getAttribute(attribute))
    .filter((v) => v !== null);
  return {{ valid: true, values }};
}})()"#
        ))
    }

    async fn run_selector(
        &self,
        locator: &Locator,
        first_only: bool,
    ) -> Result<Vec<String>, DomQueryError> {
        let script = Self::selector_script(locator, first_only)?;
        let outcome: SelectorOutcome = self
            .page
            .evaluate(script)
            .await
            .map_err(|e| DomQueryError::Evaluation(e.to_string()))?
            .into_value()
            .map_err(|e| DomQueryError::Evaluation(e.to_string()))?;

        if !outcome.valid {
            return Err(DomQueryError::InvalidSelector {
                selector: locator.selector.clone(),
                reason: "rejected by the document's selector engine".to_string(),
            });
        }
        Ok(outcome.values)
    }

    async fn load_state(&self) -> BrowserResult<LoadState> {
        self.page
            .evaluate(
                "({ readyState: document.readyState, \
                    resources: performance.getEntriesByType('resource').length })",
            )
            .await
            .map_err(|e| BrowserError::EvaluationFailed(e.to_string()))?
            .into_value()
            .map_err(|e| BrowserError::EvaluationFailed(e.to_string()))
    }
}

#[async_trait]
impl DomQuery for ChromiumPage {
    async fn query_all(&self, locator: &Locator) -> Result<Vec<String>, DomQueryError> {
        self.run_selector(locator, false).await
    }

    async fn query_first(&self, locator: &Locator) -> Result<Option<String>, DomQueryError> {
        Ok(self.run_selector(locator, true).await?.into_iter().next())
    }
}

#[async_trait]
impl SessionPage for ChromiumPage {
    async fn navigate(&self, url: &str, timeout: Duration) -> BrowserResult<()> {
        info!("Navigating to {}", url);
        match tokio::time::timeout(timeout, self.page.goto(url)).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(BrowserError::NavigationFailed(e.to_string())),
            Err(_) => Err(BrowserError::NavigationTimeout(timeout)),
        }
    }

    async fn wait_for_network_idle(&self, idle: Duration, timeout: Duration) -> BrowserResult<()> {
        let start = Instant::now();
        let mut last_count: Option<u64> = None;
        let mut stable_since = Instant::now();

        loop {
            let state = self.load_state().await?;
            if last_count != Some(state.resources) {
                last_count = Some(state.resources);
                stable_since = Instant::now();
            }

            if state.ready_state == "complete" && stable_since.elapsed() >= idle {
                debug!(
                    "Network idle after {:?} ({} resources)",
                    start.elapsed(),
                    state.resources
                );
                return Ok(());
            }

            if start.elapsed() >= timeout {
                return Err(BrowserError::NavigationTimeout(timeout));
            }

            tokio::time::sleep(IDLE_POLL_INTERVAL).await;
        }
    }

    async fn set_content(&self, html: &str) -> BrowserResult<()> {
        self.page
            .set_content(html)
            .await
            .map(|_| ())
            .map_err(|e| BrowserError::NavigationFailed(e.to_string()))
    }

    async fn print_pdf(&self) -> BrowserResult<Vec<u8>> {
        let params = PrintToPdfParams {
            print_background: Some(true),
            ..Default::default()
        };
        self.page
            .pdf(params)
            .await
            .map_err(|e| BrowserError::EvaluationFailed(e.to_string()))
    }

    async fn close(self: Box<Self>) -> BrowserResult<()> {
        self.page
            .close()
            .await
            .map_err(|e| BrowserError::CloseFailed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selector_script_escapes_selector_text() {
        let locator = Locator::text(r#"div[data-attrid="kc:/people/person:born"] span"#);
        let script = ChromiumPage::selector_script(&locator, false).unwrap();
        assert!(script.contains(r#"const selector = "div[data-attrid=\"kc:/people/person:born\"] span";"#));
        assert!(script.contains("const attribute = null;"));
        assert!(script.contains("const limit = 0;"));
    }

    #[test]
    fn selector_script_carries_attribute_rule() {
        let locator = Locator::attribute("img", "src");
        let script = ChromiumPage::selector_script(&locator, true).unwrap();
        assert!(script.contains(r#"const attribute = "src";"#));
        assert!(script.contains("const limit = 1;"));
    }
}
