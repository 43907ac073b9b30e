//! Selector-fallback extraction
//!
//! Search-engine markup is unversioned and changes without notice, so every
//! logical field is described by an ordered list of [`Locator`]s. Locators
//! are tried most-specific first and silently degrade to looser ones.
//!
//! The DOM itself is reached through [`DomQuery`], implemented by the live
//! browser page ([`crate::browser::ChromiumPage`]) and by static HTML
//! snapshots ([`HtmlDom`]).

mod html;
pub mod strategies;

pub use html::HtmlDom;
pub use strategies::{PanelStrategies, StrategyTable};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, trace};

/// How a matched element is turned into a string
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractRule {
    /// The element's `textContent`
    #[default]
    TextContent,
    /// The value of the named attribute
    Attribute(String),
}

/// A (selector, extraction-rule) pair
///
/// Deserializes from a bare selector string, or from
/// `{ selector: "...", attribute: "..." }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "LocatorSpec", into = "LocatorSpec")]
pub struct Locator {
    pub selector: String,
    pub rule: ExtractRule,
}

impl Locator {
    #[must_use]
    pub fn text(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            rule: ExtractRule::TextContent,
        }
    }

    #[must_use]
    pub fn attribute(selector: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            rule: ExtractRule::Attribute(name.into()),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum LocatorSpec {
    Selector(String),
    Full {
        selector: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        attribute: Option<String>,
    },
}

impl From<LocatorSpec> for Locator {
    fn from(spec: LocatorSpec) -> Self {
        match spec {
            LocatorSpec::Selector(selector) => Locator::text(selector),
            LocatorSpec::Full {
                selector,
                attribute: Some(name),
            } => Locator::attribute(selector, name),
            LocatorSpec::Full {
                selector,
                attribute: None,
            } => Locator::text(selector),
        }
    }
}

impl From<Locator> for LocatorSpec {
    fn from(locator: Locator) -> Self {
        match locator.rule {
            ExtractRule::TextContent => LocatorSpec::Selector(locator.selector),
            ExtractRule::Attribute(name) => LocatorSpec::Full {
                selector: locator.selector,
                attribute: Some(name),
            },
        }
    }
}

/// Failures while querying a DOM
///
/// Never escapes this module's extraction functions: a failed query is a miss.
#[derive(Error, Debug)]
pub enum DomQueryError {
    #[error("Invalid selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("DOM evaluation failed: {0}")]
    Evaluation(String),
}

/// Read-only selector queries against a rendered document
#[async_trait]
pub trait DomQuery: Send + Sync {
    /// Extracted value of every element matching `locator`, in document order
    ///
    /// Values are raw (untrimmed). Elements lacking the requested attribute
    /// are skipped.
    async fn query_all(&self, locator: &Locator) -> Result<Vec<String>, DomQueryError>;

    /// Extracted value of the first element matching `locator`
    async fn query_first(&self, locator: &Locator) -> Result<Option<String>, DomQueryError> {
        Ok(self.query_all(locator).await?.into_iter().next())
    }
}

/// Resolve a single field; empty string when nothing resolves
///
/// Each locator contributes only its first match. If that match is empty
/// after trimming, the next locator is tried.
pub async fn extract_field<D: DomQuery + ?Sized>(dom: &D, locators: &[Locator]) -> String {
    for locator in locators {
        match dom.query_first(locator).await {
            Ok(Some(value)) => {
                let trimmed = value.trim();
                if !trimmed.is_empty() {
                    trace!("Field resolved via '{}'", locator.selector);
                    return trimmed.to_string();
                }
            }
            Ok(None) => {}
            Err(e) => debug!("Locator '{}' failed: {}", locator.selector, e),
        }
    }
    String::new()
}

/// Like [`extract_field`], with "unresolved" as `None`
pub async fn resolve_field<D: DomQuery + ?Sized>(dom: &D, locators: &[Locator]) -> Option<String> {
    let value = extract_field(dom, locators).await;
    (!value.is_empty()).then_some(value)
}

/// Collect up to `max` distinct entries longer than `min_len` characters
///
/// Locators are consulted in order. Duplicates are detected across every
/// locator tried so far. Once `max` entries are held, no further locators are
/// queried.
pub async fn extract_list<D: DomQuery + ?Sized>(
    dom: &D,
    locators: &[Locator],
    max: usize,
    min_len: usize,
) -> Vec<String> {
    let mut collected: Vec<String> = Vec::new();

    for locator in locators {
        if collected.len() >= max {
            break;
        }
        let values = match dom.query_all(locator).await {
            Ok(values) => values,
            Err(e) => {
                debug!("Locator '{}' failed: {}", locator.selector, e);
                continue;
            }
        };

        for value in values {
            let text = value.trim();
            if text.chars().count() > min_len && !collected.iter().any(|c| c == text) {
                collected.push(text.to_string());
            }
        }
    }

    collected.truncate(max);
    collected
}
