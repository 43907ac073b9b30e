//! Default locator tables for the search results page
//!
//! Ordered most-specific first. Class names are obfuscated build artifacts of
//! the results page and rotate; the `data-attrid` forms are the structured
//! hooks and tend to outlive them.

use serde::{Deserialize, Serialize};

use super::Locator;

/// Locator tables for every field extracted from the results page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyTable {
    #[serde(default = "default_snippet_locators")]
    pub snippets: Vec<Locator>,

    #[serde(default)]
    pub panel: PanelStrategies,
}

/// Per-field locator lists for the knowledge panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelStrategies {
    #[serde(default = "default_title_locators")]
    pub title: Vec<Locator>,

    #[serde(default = "default_subtitle_locators")]
    pub subtitle: Vec<Locator>,

    #[serde(default = "default_description_locators")]
    pub description: Vec<Locator>,

    #[serde(default = "default_born_locators")]
    pub born: Vec<Locator>,
}

fn texts(selectors: &[&str]) -> Vec<Locator> {
    selectors.iter().map(|s| Locator::text(*s)).collect()
}

fn default_snippet_locators() -> Vec<Locator> {
    texts(&[
        ".VwiC3b",
        ".hgKElc",
        ".IsZvec",
        ".aCOpRe",
        ".s",
        "div[data-content-feature=\"1\"] .VwiC3b",
    ])
}

fn default_title_locators() -> Vec<Locator> {
    texts(&[
        "h2[data-attrid=\"title\"]",
        "div[data-attrid=\"title\"]",
        ".SPZz6b",
        ".qrShPb",
        "h2.qrShPb",
    ])
}

fn default_subtitle_locators() -> Vec<Locator> {
    texts(&[
        "span[data-attrid=\"subtitle\"]",
        "div[data-attrid=\"subtitle\"]",
        ".wwUB2c",
        ".kno-ecr-pt",
    ])
}

fn default_description_locators() -> Vec<Locator> {
    texts(&[
        "div[data-attrid=\"description\"] span",
        ".kno-rdesc span",
        ".PZPZlf",
    ])
}

fn default_born_locators() -> Vec<Locator> {
    texts(&[
        "div[data-attrid=\"kc:/people/person:born\"] span.LrzXr",
        "div[data-attrid=\"kc:/people/person:born\"] span",
        "div[data-attrid=\"Born\"] .Z1hOCe",
        ".Z1hOCe",
    ])
}

impl Default for StrategyTable {
    fn default() -> Self {
        Self {
            snippets: default_snippet_locators(),
            panel: PanelStrategies::default(),
        }
    }
}

impl Default for PanelStrategies {
    fn default() -> Self {
        Self {
            title: default_title_locators(),
            subtitle: default_subtitle_locators(),
            description: default_description_locators(),
            born: default_born_locators(),
        }
    }
}
