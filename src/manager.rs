//! Scoped browser sessions
//!
//! Every query gets its own browser process and its own profile directory.
//! There is no process-wide browser: a session lives exactly as long as the
//! query that acquired it, so concurrent queries cannot interfere and a
//! finished query cannot leave Chrome running.
//!
//! Release closes Chrome, waits for the process to exit, then removes the
//! profile directory. If a session is dropped without release (panic,
//! cancellation), `BrowserWrapper::drop` aborts the handler, chromiumoxide
//! kills the child process, and the profile directory is removed.

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::info;

use crate::BrowserConfig;
use crate::browser::{
    BrowserError, BrowserResult, BrowserSession, BrowserWrapper, ChromiumPage, SessionLauncher,
    SessionPage,
};

/// Launches one chromiumoxide browser per acquired session
#[derive(Debug, Clone, Default)]
pub struct SessionManager;

impl SessionManager {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SessionLauncher for SessionManager {
    async fn acquire(&self, config: &BrowserConfig) -> BrowserResult<Box<dyn BrowserSession>> {
        let user_data_dir =
            std::env::temp_dir().join(format!("profile_finder_{}", uuid::Uuid::new_v4()));

        let (browser, handler) = crate::browser_setup::launch_browser(config, user_data_dir.clone())
            .await
            .map_err(|e| BrowserError::LaunchFailed(format!("{e:#}")))?;

        info!("Browser session started ({})", user_data_dir.display());
        Ok(Box::new(ChromiumSession {
            wrapper: Mutex::new(BrowserWrapper::new(browser, handler, user_data_dir)),
            config: config.clone(),
        }))
    }
}

/// A running browser owned by one query
pub struct ChromiumSession {
    wrapper: Mutex<BrowserWrapper>,
    config: BrowserConfig,
}

#[async_trait]
impl BrowserSession for ChromiumSession {
    async fn new_page(&self) -> BrowserResult<Box<dyn SessionPage>> {
        let page = {
            let wrapper = self.wrapper.lock().await;
            wrapper
                .browser()
                .new_page("about:blank")
                .await
                .map_err(|e| BrowserError::PageCreationFailed(e.to_string()))?
        };

        let page = ChromiumPage::new(page);
        page.apply_fingerprint(&self.config).await;
        Ok(Box::new(page))
    }

    async fn release(self: Box<Self>) -> BrowserResult<()> {
        let mut wrapper = self.wrapper.into_inner();
        info!("Releasing browser session");
        wrapper.shutdown().await.map_err(BrowserError::CloseFailed)
    }
}
