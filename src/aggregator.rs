//! Source aggregation
//!
//! Runs the browser-backed extractors and the reference API for one query and
//! merges their results. Only failing to start the browser is fatal; every
//! source degrades to empty values on its own.
//!
//! # Flow
//! 1. Acquire a session (fatal on failure, before any other request)
//! 2. Concurrently:
//!    - open one page, load the results, read snippets then the panel
//!    - fetch the reference summary
//! 3. Release the session, logging (not returning) release errors
//! 4. Compose the record
//!
//! Steps 1 and 2 share one deadline of `query_timeout_secs`. Release runs
//! after it regardless, under its own [`RELEASE_TIMEOUT`].

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::time::Instant;
use tracing::{info, warn};

use crate::{Config, ConfigError};
use crate::browser::{BrowserError, BrowserSession, SessionLauncher};
use crate::knowledge_panel::extract_panel;
use crate::profile::{KnowledgePanel, ProfileQuery, ProfileRecord, QueryError, SnippetList};
use crate::reference_api::ReferenceClient;
use crate::web_search::{ResultsPage, extract_snippets};

#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("Invalid profile query: {0}")]
    InvalidQuery(#[from] QueryError),

    #[error("Browser session could not be started: {0}")]
    SessionStart(#[source] BrowserError),

    #[error("Failed to build reference API client: {0}")]
    ClientSetup(#[from] reqwest::Error),

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

/// Bound on shutting a session down once the query is done
pub const RELEASE_TIMEOUT: Duration = Duration::from_secs(10);

/// Resolves profile queries into merged records
#[derive(Clone)]
pub struct ProfileAggregator {
    launcher: Arc<dyn SessionLauncher>,
    reference: ReferenceClient,
    config: Arc<Config>,
}

impl ProfileAggregator {
    pub fn new(launcher: Arc<dyn SessionLauncher>, config: Config) -> Result<Self, ProfileError> {
        config.validate()?;
        let reference = ReferenceClient::new(&config.reference)?;
        Ok(Self {
            launcher,
            reference,
            config: Arc::new(config),
        })
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Resolve one query into a [`ProfileRecord`]
    pub async fn aggregate(&self, query: &ProfileQuery) -> Result<ProfileRecord, ProfileError> {
        info!("Resolving profile for '{}'", query);

        let budget = Duration::from_secs(self.config.query_timeout_secs);
        let deadline = Instant::now() + budget;

        let acquire = self.launcher.acquire(&self.config.browser);
        let session = match tokio::time::timeout_at(deadline, acquire).await {
            Ok(Ok(session)) => session,
            Ok(Err(e)) => return Err(ProfileError::SessionStart(e)),
            Err(_) => return Err(ProfileError::SessionStart(BrowserError::LaunchTimeout(budget))),
        };

        let ((snippets, panel), reference) = tokio::join!(
            bounded(deadline, "search results", self.search_page(session.as_ref(), query)),
            bounded(deadline, "reference summary", self.reference.extract_summary(query)),
        );

        match tokio::time::timeout(RELEASE_TIMEOUT, session.release()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("Browser session release failed: {}", e),
            Err(_) => warn!("Browser session release exceeded {:?}, abandoning it", RELEASE_TIMEOUT),
        }

        let record = ProfileRecord::new(query, snippets, panel, reference);
        info!(
            "Profile for '{}': {} snippets, panel {}, reference {}",
            query,
            record.snippets.len(),
            if record.knowledge_panel.is_empty() { "empty" } else { "present" },
            if record.reference.is_empty() { "empty" } else { "present" },
        );
        Ok(record)
    }

    /// Snippets and knowledge panel from a single results page
    async fn search_page(
        &self,
        session: &dyn BrowserSession,
        query: &ProfileQuery,
    ) -> (SnippetList, KnowledgePanel) {
        let page = match session.new_page().await {
            Ok(page) => page,
            Err(e) => {
                warn!("Could not open search page: {}", e);
                return Default::default();
            }
        };

        let (state, snippets) = extract_snippets(page.as_ref(), query, &self.config).await;
        let panel = extract_panel(page.as_ref(), state, &self.config.strategies.panel).await;

        if let Err(e) = page.close().await {
            warn!("Failed to close search page: {}", e);
        }
        if state == ResultsPage::Unavailable {
            info!("Search sources unavailable for '{}'", query);
        }
        (snippets, panel)
    }
}

/// Run `fut` until the query deadline, degrading to its default on timeout
async fn bounded<T: Default>(
    deadline: Instant,
    source: &str,
    fut: impl std::future::Future<Output = T>,
) -> T {
    match tokio::time::timeout_at(deadline, fut).await {
        Ok(value) => value,
        Err(_) => {
            warn!("{} did not finish before the query deadline", source);
            T::default()
        }
    }
}
