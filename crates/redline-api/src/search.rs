//! Programmatic read endpoints: description search, max-length filter, and
//! the summary statistics report.

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use serde_json::json;

use redline_db::models::FeedbackRow;
use redline_types::api::FeedbackResponse;

use crate::AppState;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub phrase: String,
}

pub async fn feedback_by_phrase(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Response, ApiError> {
    let phrase = query.phrase.trim().to_string();

    let db = state.clone();
    let rows = tokio::task::spawn_blocking(move || db.db.search_by_description_substring(&phrase))
        .await
        .map_err(|e| ApiError::Internal(format!("task join error: {e}")))??;

    if rows.is_empty() {
        // An empty result is an outcome, not a handler failure.
        return Ok((
            StatusCode::NOT_FOUND,
            Json(json!({ "message": "No feedback comments found." })),
        )
            .into_response());
    }

    Ok(Json(to_responses(rows)).into_response())
}

#[derive(Debug, Deserialize)]
pub struct MaxLengthQuery {
    pub max_length: Option<String>,
}

pub async fn feedback_by_max_length(
    State(state): State<AppState>,
    Query(query): Query<MaxLengthQuery>,
) -> Result<Response, ApiError> {
    let max_length: u32 = query
        .max_length
        .as_deref()
        .and_then(|raw| raw.trim().parse().ok())
        .ok_or_else(|| {
            ApiError::Validation("Invalid max length value. Please provide a valid integer.".into())
        })?;

    let rows = state.db.filter_by_max_description_length(max_length)?;

    if rows.is_empty() {
        return Ok((
            StatusCode::NOT_FOUND,
            Json(json!({ "message": "Sorry, no comments meet this criteria." })),
        )
            .into_response());
    }

    Ok(Json(to_responses(rows)).into_response())
}

pub async fn summary_statistics(State(state): State<AppState>) -> Result<Response, ApiError> {
    let average = state.db.average_description_length().map_err(|e| {
        ApiError::Internal(format!("Failed to retrieve average comment length: {e}"))
    })?;

    // `average` is null when the table is empty.
    Ok(Json(json!({ "average_comment_length": average })).into_response())
}

fn to_responses(rows: Vec<FeedbackRow>) -> Vec<FeedbackResponse> {
    rows.into_iter()
        .map(|row| FeedbackResponse::from(row.into_feedback()))
        .collect()
}
