//! Default fingerprint and endpoint values
//!
//! Kept together so the browser fingerprint stays internally consistent
//! (user agent, locale and Accept-Language should describe the same client).

/// Desktop Chrome user agent presented by the headless browser
pub const CHROME_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36";

pub const DEFAULT_LOCALE: &str = "en-US";

pub const DEFAULT_ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";

/// Search results page; the query goes in the `q` parameter
pub const SEARCH_ENDPOINT: &str = "https://www.google.com/search";

/// Appended to the name to bias results toward biographical pages
pub const SEARCH_QUERY_SUFFIX: &str = " biography";

/// Encyclopedia summary endpoint; the encoded name is the final path segment
pub const REFERENCE_ENDPOINT: &str = "https://en.wikipedia.org/api/rest_v1/page/summary";

/// Identifying client header sent to the reference API
pub const REFERENCE_USER_AGENT: &str = concat!("ProfileFinder/", env!("CARGO_PKG_VERSION"));
