//! Document API endpoints.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use super::{success, ApiResult};
use crate::auth::CurrentUser;
use crate::errors::AppError;
use crate::filter::{filter_documents, FilterParams};
use crate::models::{CreateDocumentRequest, Document, UpdateDocumentRequest};
use crate::AppState;

/// Query parameters for GET /api/documents.
#[derive(Debug, Default, Deserialize)]
pub struct ListDocumentsQuery {
    /// `me` restricts the list to the caller's own documents.
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(flatten)]
    pub filter: FilterParams,
}

/// GET /api/documents - List documents from the store, filtered by tag and query.
pub async fn list_documents(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(params): Query<ListDocumentsQuery>,
) -> ApiResult<Vec<Document>> {
    let documents = match params.owner.as_deref() {
        None | Some("") => state.repo.list_visible_documents(&user.id).await?,
        Some("me") => state.repo.list_documents_by_owner(&user.id).await?,
        Some(other) => {
            return Err(AppError::BadRequest(format!(
                "Unsupported owner filter: {}",
                other
            )))
        }
    };

    let filter = &params.filter;

    success(
        filter_documents(&documents, filter.selected_tag(), filter.query())
            .into_iter()
            .cloned()
            .collect(),
    )
}

/// GET /api/documents/:id - Get a single document.
pub async fn get_document(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Document> {
    success(load_visible(&state, &user, &id).await?)
}

/// POST /api/documents - Create a new document.
pub async fn create_document(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<CreateDocumentRequest>,
) -> ApiResult<Document> {
    let request = request.normalized()?;

    let owned = state.repo.count_documents_by_owner(&user.id).await?;
    if owned >= state.config.max_documents {
        return Err(AppError::Validation(format!(
            "Document limit of {} reached",
            state.config.max_documents
        )));
    }

    let document = state.repo.create_document(&user.id, &request).await?;
    tracing::info!(document_id = %document.id, owner_id = %user.id, "Document created");

    if let Err(e) = state.search.index_document(&document).await {
        tracing::warn!(document_id = %document.id, "Failed to index document: {}", e);
    }

    success(document)
}

/// PUT /api/documents/:id - Update a document owned by the caller.
pub async fn update_document(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(request): Json<UpdateDocumentRequest>,
) -> ApiResult<Document> {
    let request = request.normalized()?;
    load_owned(&state, &user, &id).await?;

    let document = state.repo.update_document(&id, &request).await?;
    tracing::info!(document_id = %document.id, "Document updated");

    if let Err(e) = state.search.index_document(&document).await {
        tracing::warn!(document_id = %document.id, "Failed to re-index document: {}", e);
    }

    success(document)
}

/// DELETE /api/documents/:id - Delete a document owned by the caller.
pub async fn delete_document(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<()> {
    load_owned(&state, &user, &id).await?;

    state.repo.delete_document(&id).await?;
    tracing::info!(document_id = %id, "Document deleted");

    if let Err(e) = state.search.remove_document(&id).await {
        tracing::warn!(document_id = %id, "Failed to remove document from index: {}", e);
    }

    success(())
}

/// Documents the caller cannot see are reported as missing.
async fn load_visible(
    state: &AppState,
    user: &CurrentUser,
    id: &str,
) -> Result<Document, AppError> {
    state
        .repo
        .get_document(id)
        .await?
        .filter(|d| d.is_visible_to(&user.id))
        .ok_or_else(|| AppError::NotFound(format!("Document {} not found", id)))
}

async fn load_owned(state: &AppState, user: &CurrentUser, id: &str) -> Result<Document, AppError> {
    let document = load_visible(state, user, id).await?;
    if document.owner_id != user.id {
        return Err(AppError::Forbidden(
            "Only the owner can modify this document".to_string(),
        ));
    }
    Ok(document)
}
