//! Search results extraction
//!
//! Loads the search engine's results page for `"<name> biography"` and pulls
//! a bounded, deduplicated list of text snippets from it. The loaded page is
//! left open so the knowledge panel can be read from the same document.
//!
//! Nothing in here fails: a page that cannot be loaded simply yields no
//! snippets.

use std::time::Duration;

use tracing::{debug, info, warn};
use url::Url;

use crate::browser::SessionPage;
use crate::extraction::{DomQuery, extract_list};
use crate::profile::{ProfileQuery, SnippetList};
use crate::utils::wait_for_any;
use crate::{Config, SearchConfig, SettleStrategy};

/// Whether the results page is available for extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultsPage {
    Loaded,
    Unavailable,
}

impl ResultsPage {
    #[must_use]
    pub fn is_loaded(self) -> bool {
        matches!(self, ResultsPage::Loaded)
    }
}

/// Build the search URL for a profile query
pub fn search_url(config: &SearchConfig, query: &ProfileQuery) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(&config.endpoint)?;
    url.query_pairs_mut()
        .append_pair("q", &format!("{}{}", query.as_str(), config.query_suffix));
    Ok(url)
}

/// Navigate to the results page and wait for it to settle
///
/// Navigation failure makes the page unavailable. A network that never goes
/// idle is tolerated: extraction proceeds on whatever has rendered.
pub async fn load_results(
    page: &dyn SessionPage,
    query: &ProfileQuery,
    config: &Config,
) -> ResultsPage {
    let url = match search_url(&config.search, query) {
        Ok(url) => url,
        Err(e) => {
            warn!("Invalid search endpoint '{}': {}", config.search.endpoint, e);
            return ResultsPage::Unavailable;
        }
    };

    let nav = &config.navigation;
    let timeout = Duration::from_millis(nav.timeout_ms);
    if let Err(e) = page.navigate(url.as_str(), timeout).await {
        warn!("Search results page unavailable for '{}': {}", query, e);
        return ResultsPage::Unavailable;
    }

    if let Err(e) = page
        .wait_for_network_idle(Duration::from_millis(nav.network_idle_ms), timeout)
        .await
    {
        warn!("Network did not go idle, extracting anyway: {}", e);
    }

    settle(page, config).await;
    ResultsPage::Loaded
}

async fn settle<D: DomQuery + ?Sized>(dom: &D, config: &Config) {
    match &config.navigation.settle {
        SettleStrategy::Fixed { delay_ms } => {
            debug!("Settling for {}ms", delay_ms);
            tokio::time::sleep(Duration::from_millis(*delay_ms)).await;
        }
        SettleStrategy::ContentReady { timeout_ms } => {
            let ready = wait_for_any(
                dom,
                &config.strategies.snippets,
                Duration::from_millis(*timeout_ms),
            )
            .await;
            if !ready {
                debug!("No snippet locator matched before the readiness timeout");
            }
        }
    }
}

/// Extract snippets from an already rendered results document
pub async fn snippets_from<D: DomQuery + ?Sized>(dom: &D, config: &Config) -> SnippetList {
    let snippets = extract_list(
        dom,
        &config.strategies.snippets,
        config.search.max_snippets,
        config.search.min_snippet_length,
    )
    .await;
    SnippetList::new(snippets)
}

/// Load the results page and extract its snippets
pub async fn extract_snippets(
    page: &dyn SessionPage,
    query: &ProfileQuery,
    config: &Config,
) -> (ResultsPage, SnippetList) {
    let state = load_results(page, query, config).await;
    if !state.is_loaded() {
        return (state, SnippetList::default());
    }

    let snippets = snippets_from(page, config).await;
    info!("Extracted {} search snippets for '{}'", snippets.len(), query);
    (state, snippets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::HtmlDom;

    #[test]
    fn search_url_encodes_name_and_suffix() {
        let query = ProfileQuery::new("Ada Lovelace & co").unwrap();
        let url = search_url(&SearchConfig::default(), &query).unwrap();
        assert_eq!(url.host_str(), Some("www.google.com"));
        assert_eq!(url.path(), "/search");
        let (key, value) = url.query_pairs().next().unwrap();
        assert_eq!(key, "q");
        assert_eq!(value, "Ada Lovelace & co biography");
        assert!(!url.as_str().contains(' '));
        assert!(url.as_str().contains("%26"));
    }

    #[test]
    fn search_url_rejects_bad_endpoint() {
        let config = SearchConfig {
            endpoint: "not a url".to_string(),
            ..Default::default()
        };
        let query = ProfileQuery::new("Ada Lovelace").unwrap();
        assert!(search_url(&config, &query).is_err());
    }

    #[tokio::test]
    async fn snippets_respect_configured_bounds() {
        let body: String = (1..=8)
            .map(|i| format!(r#"<div class="VwiC3b">Biographical snippet number {i} of eight</div>"#))
            .collect();
        let dom = HtmlDom::new(format!("<html><body>{body}</body></html>"));

        let snippets = snippets_from(&dom, &Config::default()).await;
        assert_eq!(snippets.len(), 5);
        assert_eq!(snippets.as_slice()[0], "Biographical snippet number 1 of eight");
    }
}
