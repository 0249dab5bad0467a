//! Feed and tag endpoints.

use axum::extract::{Query, State};

use super::{success, ApiResult};
use crate::auth::CurrentUser;
use crate::feed::{available_tags, build_feed, Feed};
use crate::filter::{DocumentFilter, FilterParams};
use crate::AppState;

/// GET /api/feed - The caller's feed, filtered by tag and query.
///
/// Store failures never surface as errors here; the feed switches to the
/// sample list instead.
pub async fn get_feed(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(params): Query<FilterParams>,
) -> ApiResult<Feed> {
    let loaded = state.repo.list_visible_documents(&user.id).await;
    let feed = build_feed(loaded, &DocumentFilter::from_params(&params));

    tracing::debug!(
        user_id = %user.id,
        source = ?feed.source,
        total = feed.total,
        "Feed served"
    );

    success(feed)
}

/// GET /api/tags - Featured tags plus every tag on the caller's visible documents.
pub async fn list_tags(State(state): State<AppState>, user: CurrentUser) -> ApiResult<Vec<String>> {
    let documents = state.repo.list_visible_documents(&user.id).await?;
    success(available_tags(&documents))
}
