//! Owned browser process plus its CDP event handler task

use chromiumoxide::browser::Browser;
use std::path::{Path, PathBuf};
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Wrapper for Browser and its event handler task
///
/// The handler task is aborted on drop. Dropping `Browser` kills the Chrome
/// child process, so a wrapper that is dropped without `shutdown` (panic,
/// cancelled query) still does not leak a process.
pub struct BrowserWrapper {
    browser: Browser,
    handler: JoinHandle<()>,
    user_data_dir: Option<PathBuf>,
}

impl BrowserWrapper {
    pub(crate) fn new(browser: Browser, handler: JoinHandle<()>, user_data_dir: PathBuf) -> Self {
        Self {
            browser,
            handler,
            user_data_dir: Some(user_data_dir),
        }
    }

    pub(crate) fn browser(&self) -> &Browser {
        &self.browser
    }

    pub fn user_data_dir(&self) -> Option<&Path> {
        self.user_data_dir.as_deref()
    }

    /// Close Chrome, wait for the process to exit, then remove the profile
    ///
    /// Every step runs even if an earlier one fails; the first error is
    /// returned.
    pub(crate) async fn shutdown(&mut self) -> Result<(), String> {
        let mut first_error = None;

        if let Err(e) = self.browser.close().await {
            warn!("Failed to close browser cleanly: {}", e);
            first_error.get_or_insert(e.to_string());
        }
        if let Err(e) = self.browser.wait().await {
            warn!("Failed to wait for browser exit: {}", e);
            first_error.get_or_insert(e.to_string());
        }
        self.cleanup_temp_dir();

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Remove the profile directory
    ///
    /// Must run after the browser process has exited, otherwise Chrome may
    /// still hold files open.
    pub fn cleanup_temp_dir(&mut self) {
        if let Some(path) = self.user_data_dir.take() {
            info!("Cleaning up profile directory: {}", path.display());
            if let Err(e) = std::fs::remove_dir_all(&path) {
                warn!(
                    "Failed to clean up profile directory {}: {}. Manual cleanup may be required.",
                    path.display(),
                    e
                );
            }
        }
    }
}

impl Drop for BrowserWrapper {
    fn drop(&mut self) {
        self.handler.abort();
        if self.user_data_dir.is_some() {
            warn!("Browser session dropped without release, removing profile directory in Drop");
            self.cleanup_temp_dir();
        }
    }
}
