//! Tag and free-text filtering of a loaded document list.
//!
//! The filter keeps a document when both predicates hold:
//!
//! - tag: no tag is selected, or the document carries exactly that tag
//!   (case-sensitive);
//! - search: the query is blank, or its lowercase form is a substring of the
//!   lowercased title, excerpt or any tag.
//!
//! Output preserves the input order. Filtering never fails.

use serde::Deserialize;

use crate::models::Document;

/// Query-string parameters accepted by list endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterParams {
    /// Selected tag; empty means none.
    #[serde(default)]
    pub tag: Option<String>,
    /// Free-text query.
    #[serde(default)]
    pub q: Option<String>,
}

impl FilterParams {
    /// The selected tag; an empty `tag` selects nothing.
    pub fn selected_tag(&self) -> Option<&str> {
        self.tag.as_deref().filter(|t| !t.is_empty())
    }

    /// The search query; a missing `q` is the empty query.
    pub fn query(&self) -> &str {
        self.q.as_deref().unwrap_or("")
    }
}

/// A selected tag plus a search query, ready to test documents against.
#[derive(Debug, Clone, Default)]
pub struct DocumentFilter {
    selected_tag: Option<String>,
    /// Lowercased query, `None` when blank.
    needle: Option<String>,
}

impl DocumentFilter {
    pub fn new(selected_tag: Option<&str>, query: &str) -> Self {
        let needle = if query.trim().is_empty() {
            None
        } else {
            Some(query.to_lowercase())
        };

        Self {
            selected_tag: selected_tag.map(str::to_string),
            needle,
        }
    }

    pub fn from_params(params: &FilterParams) -> Self {
        Self::new(params.selected_tag(), params.query())
    }

    /// Whether the filter lets everything through.
    pub fn is_unfiltered(&self) -> bool {
        self.selected_tag.is_none() && self.needle.is_none()
    }

    pub fn matches(&self, document: &Document) -> bool {
        self.matches_tag(document) && self.matches_query(document)
    }

    fn matches_tag(&self, document: &Document) -> bool {
        match &self.selected_tag {
            None => true,
            Some(tag) => document.tags.iter().any(|t| t == tag),
        }
    }

    fn matches_query(&self, document: &Document) -> bool {
        let Some(needle) = &self.needle else {
            return true;
        };

        document.title.to_lowercase().contains(needle.as_str())
            || document
                .excerpt
                .as_deref()
                .unwrap_or("")
                .to_lowercase()
                .contains(needle.as_str())
            || document
                .tags
                .iter()
                .any(|tag| tag.to_lowercase().contains(needle.as_str()))
    }

    /// Borrowing variant of [`DocumentFilter::apply`].
    pub fn select<'a>(&self, documents: &'a [Document]) -> Vec<&'a Document> {
        documents.iter().filter(|d| self.matches(d)).collect()
    }

    /// Keep the matching documents, in their original order.
    pub fn apply(&self, documents: Vec<Document>) -> Vec<Document> {
        if self.is_unfiltered() {
            return documents;
        }
        documents.into_iter().filter(|d| self.matches(d)).collect()
    }
}

/// Filter `documents` by an optional tag and a free-text query.
pub fn filter_documents<'a>(
    documents: &'a [Document],
    selected_tag: Option<&str>,
    query: &str,
) -> Vec<&'a Document> {
    DocumentFilter::new(selected_tag, query).select(documents)
}
