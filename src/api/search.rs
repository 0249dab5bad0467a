//! Search API endpoints.

use axum::extract::{Query, State};
use serde::{Deserialize, Serialize};

use super::{success, ApiResult};
use crate::auth::CurrentUser;
use crate::errors::AppError;
use crate::models::Document;
use crate::AppState;

/// Search query parameters.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    /// Search query string.
    #[serde(default)]
    pub q: String,
    /// Maximum number of results (default: 20).
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Offset for pagination (default: 0).
    #[serde(default)]
    pub offset: usize,
}

fn default_limit() -> usize {
    20
}

/// Ranked search results with paging metadata.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub results: Vec<SearchResultItem>,
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
}

/// Single search result item.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResultItem {
    pub document: Document,
    pub score: f32,
}

/// Maximum number of search results allowed.
const MAX_SEARCH_LIMIT: usize = 100;

/// Deepest page offset accepted.
const MAX_SEARCH_OFFSET: usize = 10_000;

/// GET /api/search - Ranked full-text search over visible documents.
pub async fn search_documents(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(params): Query<SearchQuery>,
) -> ApiResult<SearchResponse> {
    let limit = params.limit.min(MAX_SEARCH_LIMIT);
    if params.offset > MAX_SEARCH_OFFSET {
        return Err(AppError::BadRequest(format!(
            "Offset must not exceed {}",
            MAX_SEARCH_OFFSET
        )));
    }

    let hits = state.search.search(&params.q, limit, params.offset)?;

    // The index holds every document; visibility is checked against the store
    let mut results = Vec::with_capacity(hits.len());
    for hit in hits {
        match state.repo.get_document(&hit.document_id).await? {
            Some(document) if document.is_visible_to(&user.id) => {
                results.push(SearchResultItem {
                    document,
                    score: hit.score,
                });
            }
            Some(_) => {}
            None => {
                tracing::warn!(document_id = %hit.document_id, "Index entry without stored document");
            }
        }
    }

    let total = results.len();

    success(SearchResponse {
        results,
        total,
        limit,
        offset: params.offset,
    })
}
