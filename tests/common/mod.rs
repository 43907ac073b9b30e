// Shared fixtures for integration tests
//
// `FixtureLauncher` stands in for a real browser: each page serves a static
// HTML snapshot through `HtmlDom` and every lifecycle call is counted.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use profile_finder::extraction::{DomQuery, DomQueryError, HtmlDom, Locator};
use profile_finder::{
    BrowserConfig, BrowserError, BrowserResult, BrowserSession, Config, SessionLauncher,
    SessionPage, SettleStrategy,
};

pub const RESULTS_HTML: &str = r#"<html><body>
  <div id="search">
    <div class="g"><div class="VwiC3b">Ada Lovelace was an English mathematician and writer.</div></div>
    <div class="g"><div class="VwiC3b">She is often regarded as the first computer programmer.</div></div>
    <div class="g"><div class="VwiC3b">Short one</div></div>
    <div class="g"><div class="VwiC3b">Ada Lovelace was an English mathematician and writer.</div></div>
  </div>
  <div id="rhs">
    <h2 data-attrid="title">Ada Lovelace</h2>
    <div data-attrid="subtitle"><span>English mathematician</span></div>
    <div class="kno-rdesc"><span>Augusta Ada King, Countess of Lovelace, was an English mathematician.</span></div>
    <div data-attrid="kc:/people/person:born"><span class="LrzXr">December 10, 1815, London</span></div>
  </div>
</body></html>"#;

pub const EMPTY_HTML: &str = "<html><body><p>No results</p></body></html>";

/// How fixture pages respond to navigation
#[derive(Debug, Clone)]
pub enum PageBehavior {
    Serve(String),
    NavigationFails,
    Hangs,
}

#[derive(Debug, Clone, Default)]
pub struct Counters {
    pub acquired: Arc<AtomicUsize>,
    pub pages_opened: Arc<AtomicUsize>,
    pub pages_closed: Arc<AtomicUsize>,
    pub released: Arc<AtomicUsize>,
    pub navigated: Arc<Mutex<Vec<String>>>,
}

impl Counters {
    pub fn acquired(&self) -> usize {
        self.acquired.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }

    pub fn pages_opened(&self) -> usize {
        self.pages_opened.load(Ordering::SeqCst)
    }

    pub fn pages_closed(&self) -> usize {
        self.pages_closed.load(Ordering::SeqCst)
    }

    pub fn navigated(&self) -> Vec<String> {
        self.navigated.lock().unwrap().clone()
    }
}

pub struct FixtureLauncher {
    behavior: PageBehavior,
    fail_acquire: bool,
    acquire_delay: Duration,
    release_hangs: bool,
    release_fails: bool,
    pub counters: Counters,
}

impl FixtureLauncher {
    fn with_behavior(behavior: PageBehavior) -> Self {
        Self {
            behavior,
            fail_acquire: false,
            acquire_delay: Duration::ZERO,
            release_hangs: false,
            release_fails: false,
            counters: Counters::default(),
        }
    }

    pub fn serving(html: &str) -> Arc<Self> {
        Arc::new(Self::with_behavior(PageBehavior::Serve(html.to_string())))
    }

    pub fn failing_navigation() -> Arc<Self> {
        Arc::new(Self::with_behavior(PageBehavior::NavigationFails))
    }

    pub fn hanging() -> Arc<Self> {
        Arc::new(Self::with_behavior(PageBehavior::Hangs))
    }

    pub fn unlaunchable() -> Arc<Self> {
        Arc::new(Self {
            fail_acquire: true,
            ..Self::with_behavior(PageBehavior::NavigationFails)
        })
    }

    /// Sessions take `delay` to start
    pub fn slow_start(html: &str, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            acquire_delay: delay,
            ..Self::with_behavior(PageBehavior::Serve(html.to_string()))
        })
    }

    /// Sessions never finish shutting down
    pub fn stuck_release(html: &str) -> Arc<Self> {
        Arc::new(Self {
            release_hangs: true,
            ..Self::with_behavior(PageBehavior::Serve(html.to_string()))
        })
    }

    /// Sessions report an error when shut down
    pub fn failing_release(html: &str) -> Arc<Self> {
        Arc::new(Self {
            release_fails: true,
            ..Self::with_behavior(PageBehavior::Serve(html.to_string()))
        })
    }
}

#[async_trait]
impl SessionLauncher for FixtureLauncher {
    async fn acquire(&self, _config: &BrowserConfig) -> BrowserResult<Box<dyn BrowserSession>> {
        if self.fail_acquire {
            return Err(BrowserError::LaunchFailed("no browser in fixture".to_string()));
        }
        if !self.acquire_delay.is_zero() {
            tokio::time::sleep(self.acquire_delay).await;
        }
        self.counters.acquired.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FixtureSession {
            behavior: self.behavior.clone(),
            release_hangs: self.release_hangs,
            release_fails: self.release_fails,
            counters: self.counters.clone(),
        }))
    }
}

struct FixtureSession {
    behavior: PageBehavior,
    release_hangs: bool,
    release_fails: bool,
    counters: Counters,
}

#[async_trait]
impl BrowserSession for FixtureSession {
    async fn new_page(&self) -> BrowserResult<Box<dyn SessionPage>> {
        self.counters.pages_opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FixturePage {
            dom: Mutex::new(HtmlDom::new("<html><body></body></html>")),
            behavior: self.behavior.clone(),
            counters: self.counters.clone(),
        }))
    }

    async fn release(self: Box<Self>) -> BrowserResult<()> {
        if self.release_hangs {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        self.counters.released.fetch_add(1, Ordering::SeqCst);
        if self.release_fails {
            return Err(BrowserError::CloseFailed("browser already gone".to_string()));
        }
        Ok(())
    }
}

struct FixturePage {
    dom: Mutex<HtmlDom>,
    behavior: PageBehavior,
    counters: Counters,
}

#[async_trait]
impl DomQuery for FixturePage {
    async fn query_all(&self, locator: &Locator) -> Result<Vec<String>, DomQueryError> {
        let dom = self.dom.lock().unwrap().clone();
        dom.query_all(locator).await
    }
}

#[async_trait]
impl SessionPage for FixturePage {
    async fn navigate(&self, url: &str, _timeout: Duration) -> BrowserResult<()> {
        self.counters.navigated.lock().unwrap().push(url.to_string());
        match &self.behavior {
            PageBehavior::Serve(html) => {
                *self.dom.lock().unwrap() = HtmlDom::new(html.clone());
                Ok(())
            }
            PageBehavior::NavigationFails => {
                Err(BrowserError::NavigationFailed("net::ERR_NAME_NOT_RESOLVED".to_string()))
            }
            PageBehavior::Hangs => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(())
            }
        }
    }

    async fn wait_for_network_idle(&self, _idle: Duration, _timeout: Duration) -> BrowserResult<()> {
        Ok(())
    }

    async fn set_content(&self, html: &str) -> BrowserResult<()> {
        *self.dom.lock().unwrap() = HtmlDom::new(html);
        Ok(())
    }

    async fn print_pdf(&self) -> BrowserResult<Vec<u8>> {
        let html = self.dom.lock().unwrap().html().to_string();
        let mut pdf = b"%PDF-1.4\n".to_vec();
        pdf.extend_from_slice(html.as_bytes());
        Ok(pdf)
    }

    async fn close(self: Box<Self>) -> BrowserResult<()> {
        self.counters.pages_closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Fast config pointing the reference client at `reference_base`
pub fn test_config(reference_base: &str) -> Config {
    let mut config = Config::default();
    config.navigation.settle = SettleStrategy::Fixed { delay_ms: 0 };
    config.reference.base_url = reference_base.to_string();
    config.reference.timeout_secs = 5;
    config
}

pub fn summary_body(extract: &str, title: &str, thumbnail: Option<&str>) -> String {
    serde_json::json!({
        "type": "standard",
        "title": title,
        "extract": extract,
        "thumbnail": thumbnail.map(|source| serde_json::json!({ "source": source, "width": 320 })),
    })
    .to_string()
}
