//! Batch write endpoints: JSON bulk upload, category update over an id
//! set, and category-wide delete. Each maps to one transactional store
//! call.

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use redline_db::StoreError;
use redline_types::api::{BulkUploadRequest, UpdateCategoryRequest};

use crate::AppState;
use crate::error::ApiError;

pub async fn bulk_upload_feedback(
    State(state): State<AppState>,
    Json(req): Json<BulkUploadRequest>,
) -> Result<Response, ApiError> {
    if req.feedbacks.is_empty() {
        return Err(ApiError::Validation(
            "No feedback entries provided in the request body.".into(),
        ));
    }

    let db = state.clone();
    let inserted = tokio::task::spawn_blocking(move || db.db.bulk_create(&req.feedbacks))
        .await
        .map_err(|e| ApiError::Internal(format!("task join error: {e}")))??;

    info!("Bulk upload inserted {} feedback comments", inserted);
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Feedback comments uploaded successfully" })),
    )
        .into_response())
}

pub async fn update_categories(
    State(state): State<AppState>,
    Json(req): Json<UpdateCategoryRequest>,
) -> Result<Response, ApiError> {
    let new_category = req.new_category.unwrap_or_default();

    let updated = state
        .db
        .batch_update_category(&req.feedback_ids, &new_category)
        .map_err(|err| match err {
            StoreError::Validation(msg) => ApiError::Validation(msg),
            other => ApiError::Internal(format!("Failed to update feedback comments: {other}")),
        })?;

    info!("Batch category update touched {} comments", updated);
    Ok(Json(json!({ "message": "Feedback comments updated successfully." })).into_response())
}

#[derive(Debug, Deserialize)]
pub struct DeleteByCategoryQuery {
    pub category: Option<String>,
}

pub async fn delete_by_category(
    State(state): State<AppState>,
    Query(query): Query<DeleteByCategoryQuery>,
) -> Result<Response, ApiError> {
    let category = query.category.unwrap_or_default();

    let deleted = state
        .db
        .delete_by_category(&category)
        .map_err(|err| match err {
            StoreError::Validation(msg) => ApiError::Validation(msg),
            other => ApiError::Internal(format!("Failed to delete feedback comments: {other}")),
        })?;

    info!("Deleted {} comments in category '{}'", deleted, category);
    Ok(Json(json!({
        "message": format!("All feedback comments in category '{category}' deleted successfully.")
    }))
    .into_response())
}
