//! The document feed: store list, fallback substitution and filtering.

mod fallback;

pub use fallback::fallback_documents;

use serde::Serialize;

use crate::errors::AppError;
use crate::filter::DocumentFilter;
use crate::models::Document;

/// Tags always offered for selection, ahead of any tags found in documents.
pub const FEATURED_TAGS: [&str; 6] = ["SaaS", "UI", "AI", "Reference", "ProductVision", "Workflow"];

/// Notice attached to a feed served from the sample list after a failed load.
pub const FALLBACK_NOTICE: &str =
    "Using sample prompts. Database connection needed for full functionality.";

/// Where the feed's documents came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedSource {
    Store,
    Fallback,
}

/// A document as rendered in the feed.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedItem {
    #[serde(flatten)]
    pub document: Document,
    pub read_time: String,
}

impl From<Document> for FeedItem {
    fn from(document: Document) -> Self {
        let read_time = document.read_time();
        Self {
            document,
            read_time,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Feed {
    pub documents: Vec<FeedItem>,
    pub source: FeedSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
    pub total: usize,
}

/// Pick the feed's source list from a store load result.
///
/// A failed load falls back to the samples with a notice; an empty one falls
/// back silently. The load is never retried.
pub fn resolve_source(
    loaded: Result<Vec<Document>, AppError>,
) -> (Vec<Document>, FeedSource, Option<String>) {
    match loaded {
        Ok(documents) if !documents.is_empty() => (documents, FeedSource::Store, None),
        Ok(_) => (fallback_documents(), FeedSource::Fallback, None),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load documents, serving sample list");
            (
                fallback_documents(),
                FeedSource::Fallback,
                Some(FALLBACK_NOTICE.to_string()),
            )
        }
    }
}

/// Build the feed from a store load result and the caller's filter.
pub fn build_feed(loaded: Result<Vec<Document>, AppError>, filter: &DocumentFilter) -> Feed {
    let (documents, source, notice) = resolve_source(loaded);

    let documents: Vec<FeedItem> = filter
        .apply(documents)
        .into_iter()
        .map(FeedItem::from)
        .collect();
    let total = documents.len();

    Feed {
        documents,
        source,
        notice,
        total,
    }
}

/// Featured tags followed by every other tag in `documents`, first-seen order.
pub fn available_tags(documents: &[Document]) -> Vec<String> {
    let mut tags: Vec<String> = FEATURED_TAGS.iter().map(|t| t.to_string()).collect();
    for tag in documents.iter().flat_map(|d| d.tags.iter()) {
        if !tags.contains(tag) {
            tags.push(tag.clone());
        }
    }
    tags
}
