//! Profile data model
//!
//! The merged [`ProfileRecord`] is a pure composition of three independently
//! produced sub-results. None of them reference each other.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum accepted name length (characters)
pub const MAX_QUERY_LENGTH: usize = 256;

/// Upper bound on the number of snippets in a [`SnippetList`]
pub const MAX_SNIPPETS: usize = 5;

/// Snippets must be strictly longer than this many characters
pub const MIN_SNIPPET_LENGTH: usize = 20;

/// Errors raised when constructing a [`ProfileQuery`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("Profile query cannot be empty or whitespace-only")]
    Empty,

    #[error("Profile query is too long ({0} characters, maximum {MAX_QUERY_LENGTH})")]
    TooLong(usize),
}

/// A validated person name
///
/// Holds the name exactly as given; surrounding whitespace only matters for
/// the emptiness check. The same value is the cache key and, once
/// percent-encoded, the path/query component of outbound requests.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProfileQuery(String);

impl ProfileQuery {
    pub fn new(name: impl AsRef<str>) -> Result<Self, QueryError> {
        let name = name.as_ref();
        if name.trim().is_empty() {
            return Err(QueryError::Empty);
        }
        let len = name.chars().count();
        if len > MAX_QUERY_LENGTH {
            return Err(QueryError::TooLong(len));
        }
        Ok(Self(name.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ProfileQuery {
    type Error = QueryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ProfileQuery> for String {
    fn from(query: ProfileQuery) -> Self {
        query.0
    }
}

impl std::fmt::Display for ProfileQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Bounded, deduplicated search snippets in first-encountered order
///
/// Every list holds at most [`MAX_SNIPPETS`] distinct trimmed entries, each
/// longer than [`MIN_SNIPPET_LENGTH`] characters, however it was built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct SnippetList(Vec<String>);

impl SnippetList {
    /// Keep the qualifying entries of `snippets`, in order
    #[must_use]
    pub fn new(snippets: Vec<String>) -> Self {
        let mut kept: Vec<String> = Vec::with_capacity(MAX_SNIPPETS);
        for snippet in snippets {
            if kept.len() == MAX_SNIPPETS {
                break;
            }
            let text = snippet.trim();
            if text.chars().count() > MIN_SNIPPET_LENGTH && !kept.iter().any(|k| k == text) {
                kept.push(text.to_string());
            }
        }
        Self(kept)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }
}

impl From<Vec<String>> for SnippetList {
    fn from(snippets: Vec<String>) -> Self {
        Self::new(snippets)
    }
}

impl From<SnippetList> for Vec<String> {
    fn from(list: SnippetList) -> Self {
        list.0
    }
}

impl<'a> IntoIterator for &'a SnippetList {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Structured side-panel summary from the search results page
///
/// `None` means the field did not resolve through any locator. Serialized as
/// `null`, never omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgePanel {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub description: Option<String>,
    pub born: Option<String>,
}

impl KnowledgePanel {
    /// True when no field resolved
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.subtitle.is_none()
            && self.description.is_none()
            && self.born.is_none()
    }
}

/// Normalized encyclopedia summary
///
/// `extract` and `title` are empty when the source had nothing. `thumbnail`
/// is either an absolute URL or `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceSummary {
    pub extract: String,
    pub title: String,
    pub thumbnail: Option<String>,
}

impl ReferenceSummary {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.extract.is_empty() && self.title.is_empty() && self.thumbnail.is_none()
    }
}

/// The merged output of one query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub name: String,
    pub snippets: SnippetList,
    pub knowledge_panel: KnowledgePanel,
    pub reference: ReferenceSummary,
}

impl ProfileRecord {
    #[must_use]
    pub fn new(
        query: &ProfileQuery,
        snippets: SnippetList,
        knowledge_panel: KnowledgePanel,
        reference: ReferenceSummary,
    ) -> Self {
        Self {
            name: query.as_str().to_string(),
            snippets,
            knowledge_panel,
            reference,
        }
    }

    /// Best display title: encyclopedia title, then panel title, then the name
    #[must_use]
    pub fn display_title(&self) -> &str {
        if !self.reference.title.is_empty() {
            &self.reference.title
        } else if let Some(title) = self.knowledge_panel.title.as_deref() {
            title
        } else {
            &self.name
        }
    }
}
