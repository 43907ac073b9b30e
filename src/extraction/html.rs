//! Static HTML snapshot backend for [`DomQuery`]

use async_trait::async_trait;
use scraper::{Html, Selector};

use super::{DomQuery, DomQueryError, ExtractRule, Locator};

/// A parsed-on-demand HTML document
///
/// Holds the raw markup and parses it per query, which keeps the type `Send`
/// and makes repeated queries independent of each other.
#[derive(Debug, Clone)]
pub struct HtmlDom {
    html: String,
}

impl HtmlDom {
    #[must_use]
    pub fn new(html: impl Into<String>) -> Self {
        Self { html: html.into() }
    }

    #[must_use]
    pub fn html(&self) -> &str {
        &self.html
    }

    fn select(&self, locator: &Locator) -> Result<Vec<String>, DomQueryError> {
        let selector =
            Selector::parse(&locator.selector).map_err(|e| DomQueryError::InvalidSelector {
                selector: locator.selector.clone(),
                reason: e.to_string(),
            })?;
        let document = Html::parse_document(&self.html);

        let values = document
            .select(&selector)
            .filter_map(|element| match &locator.rule {
                ExtractRule::TextContent => Some(element.text().collect::<String>()),
                ExtractRule::Attribute(name) => element.value().attr(name).map(str::to_string),
            })
            .collect();
        Ok(values)
    }
}

#[async_trait]
impl DomQuery for HtmlDom {
    async fn query_all(&self, locator: &Locator) -> Result<Vec<String>, DomQueryError> {
        self.select(locator)
    }
}
