//! Encyclopedia summary lookup
//!
//! A plain HTTP GET against a REST summary endpoint, independent of the
//! browser. The source is optional: every failure degrades to an empty
//! [`ReferenceSummary`].

use std::time::Duration;

use reqwest::header::{ACCEPT, USER_AGENT};
use serde::Deserialize;
use tracing::{debug, info, warn};
use url::Url;

use crate::ReferenceConfig;
use crate::profile::{ProfileQuery, ReferenceSummary};

#[derive(Debug, Deserialize)]
struct SummaryResponse {
    #[serde(default)]
    extract: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    thumbnail: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    #[serde(default)]
    source: Option<String>,
}

impl From<SummaryResponse> for ReferenceSummary {
    fn from(response: SummaryResponse) -> Self {
        ReferenceSummary {
            extract: response.extract.unwrap_or_default(),
            title: response.title.unwrap_or_default(),
            thumbnail: response
                .thumbnail
                .and_then(|t| t.source)
                .and_then(|source| normalize_thumbnail(&source)),
        }
    }
}

/// Keep only absolute http(s) URLs
fn normalize_thumbnail(source: &str) -> Option<String> {
    let source = source.trim();
    match Url::parse(source) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Some(url.to_string()),
        Ok(_) | Err(_) => {
            if !source.is_empty() {
                debug!("Discarding malformed thumbnail URL: {}", source);
            }
            None
        }
    }
}

/// Client for the reference summary API
#[derive(Debug, Clone)]
pub struct ReferenceClient {
    http: reqwest::Client,
    base_url: String,
    user_agent: String,
}

impl ReferenceClient {
    pub fn new(config: &ReferenceConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            user_agent: config.user_agent.clone(),
        })
    }

    /// Summary URL: the percent-encoded name is the last path segment
    #[must_use]
    pub fn summary_url(&self, query: &ProfileQuery) -> String {
        format!("{}/{}", self.base_url, urlencoding::encode(query.as_str()))
    }

    /// Fetch and normalize the summary for `query`
    pub async fn extract_summary(&self, query: &ProfileQuery) -> ReferenceSummary {
        let url = self.summary_url(query);
        debug!("Requesting reference summary: {}", url);

        let response = match self
            .http
            .get(&url)
            .header(USER_AGENT, &self.user_agent)
            .header(ACCEPT, "application/json")
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!("Reference API request failed for '{}': {}", query, e);
                return ReferenceSummary::default();
            }
        };

        let status = response.status();
        if !status.is_success() {
            warn!("Reference API returned {} for '{}'", status, query);
            return ReferenceSummary::default();
        }

        let body = match response.bytes().await {
            Ok(body) => body,
            Err(e) => {
                warn!("Failed to read reference API body for '{}': {}", query, e);
                return ReferenceSummary::default();
            }
        };

        match serde_json::from_slice::<SummaryResponse>(&body) {
            Ok(parsed) => {
                let summary = ReferenceSummary::from(parsed);
                info!(
                    "Reference summary for '{}': title={:?}, {} chars of extract",
                    query,
                    summary.title,
                    summary.extract.chars().count()
                );
                summary
            }
            Err(e) => {
                warn!("Malformed reference API response for '{}': {}", query, e);
                ReferenceSummary::default()
            }
        }
    }
}
