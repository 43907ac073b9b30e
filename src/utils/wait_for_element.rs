//! Content-readiness polling
//!
//! Alternative to the fixed settling delay: poll until any of the given
//! locators matches, backing off exponentially between attempts.

use std::time::{Duration, Instant};

use tracing::debug;

use crate::extraction::{DomQuery, Locator};

/// Wait until any locator matches at least one element
///
/// Returns `true` when content appeared, `false` on timeout. Query errors
/// count as "not yet".
///
/// # Polling Strategy
/// - Starts at 100ms intervals
/// - Doubles each retry, capped at 1 second
/// - Total duration limited by `timeout`
pub async fn wait_for_any<D: DomQuery + ?Sized>(
    dom: &D,
    locators: &[Locator],
    timeout: Duration,
) -> bool {
    let start = Instant::now();
    let mut poll_interval = Duration::from_millis(100);
    let max_interval = Duration::from_secs(1);

    loop {
        for locator in locators {
            if let Ok(Some(_)) = dom.query_first(locator).await {
                debug!(
                    "Content ready via '{}' after {:?}",
                    locator.selector,
                    start.elapsed()
                );
                return true;
            }
        }

        let elapsed = start.elapsed();
        if elapsed >= timeout {
            debug!("Content not ready after {:?}", elapsed);
            return false;
        }

        tokio::time::sleep(poll_interval.min(timeout - elapsed)).await;
        poll_interval = (poll_interval * 2).min(max_interval);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::HtmlDom;

    #[tokio::test]
    async fn returns_immediately_when_content_present() {
        let dom = HtmlDom::new(r#"<div class="VwiC3b">hello</div>"#);
        let ready = wait_for_any(&dom, &[Locator::text(".VwiC3b")], Duration::from_secs(5)).await;
        assert!(ready);
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_timeout() {
        let dom = HtmlDom::new("<p>nothing</p>");
        let ready = wait_for_any(&dom, &[Locator::text(".VwiC3b")], Duration::from_millis(500)).await;
        assert!(!ready);
    }
}
