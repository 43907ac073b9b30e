//! Browser sessions
//!
//! A session is one headless browser process owned by exactly one query. The
//! traits here are the seam between the aggregation engine and the browser:
//! [`crate::SessionManager`] implements them over chromiumoxide, and tests
//! implement them over HTML snapshots.

mod page;
mod wrapper;

pub use crate::browser_setup::{download_managed_browser, find_browser_executable};
pub use page::{ChromiumPage, STEALTH_INIT_SCRIPT};
pub use wrapper::BrowserWrapper;

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use crate::BrowserConfig;
use crate::extraction::DomQuery;

#[derive(Error, Debug)]
pub enum BrowserError {
    #[error("Failed to find browser executable: {0}")]
    NotFound(String),

    #[error("Failed to launch browser: {0}")]
    LaunchFailed(String),

    #[error("Browser did not start within {0:?}")]
    LaunchTimeout(Duration),

    #[error("Failed to create page: {0}")]
    PageCreationFailed(String),

    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    #[error("Navigation timed out after {0:?}")]
    NavigationTimeout(Duration),

    #[error("Page evaluation failed: {0}")]
    EvaluationFailed(String),

    #[error("Failed to close browser: {0}")]
    CloseFailed(String),

    #[error("IO error: {0}")]
    IoError(String),
}

impl From<std::io::Error> for BrowserError {
    fn from(err: std::io::Error) -> Self {
        BrowserError::IoError(err.to_string())
    }
}

pub type BrowserResult<T> = Result<T, BrowserError>;

/// Starts browser sessions
#[async_trait]
pub trait SessionLauncher: Send + Sync {
    /// Start a new, exclusively owned session
    ///
    /// Failure here is fatal for the query that asked for it.
    async fn acquire(&self, config: &BrowserConfig) -> BrowserResult<Box<dyn BrowserSession>>;
}

/// A running browser owned by one query
#[async_trait]
pub trait BrowserSession: Send + Sync {
    /// Open a fresh page with the session fingerprint applied
    async fn new_page(&self) -> BrowserResult<Box<dyn SessionPage>>;

    /// Shut the browser down and remove its profile directory
    async fn release(self: Box<Self>) -> BrowserResult<()>;
}

/// A page inside a session
#[async_trait]
pub trait SessionPage: DomQuery {
    /// Navigate and wait for the load lifecycle, bounded by `timeout`
    async fn navigate(&self, url: &str, timeout: Duration) -> BrowserResult<()>;

    /// Wait until no new network resources appear for `idle`, bounded by `timeout`
    async fn wait_for_network_idle(&self, idle: Duration, timeout: Duration) -> BrowserResult<()>;

    /// Replace the document with `html`
    async fn set_content(&self, html: &str) -> BrowserResult<()>;

    /// Print the current document to PDF
    async fn print_pdf(&self) -> BrowserResult<Vec<u8>>;

    async fn close(self: Box<Self>) -> BrowserResult<()>;
}
