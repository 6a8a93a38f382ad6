//! HTTP surface of the redline feedback service: one handler per store
//! operation, each doing typed parameter extraction, a single store call,
//! and response shaping. Browser-facing routes render HTML or redirect;
//! programmatic routes speak JSON.

pub mod archive;
pub mod bulk;
pub mod error;
pub mod render;
pub mod search;
pub mod views;

use std::sync::Arc;

use axum::{
    Router,
    routing::{delete, get, post},
};

use redline_db::Database;

use crate::archive::ArchivePaths;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub archive: ArchivePaths,
}

/// All feedback routes, nested under `/feedback`.
pub fn router(state: AppState) -> Router {
    let routes = Router::new()
        .route("/", get(views::view_feedback))
        .route(
            "/add",
            get(views::add_feedback_form).post(views::add_feedback),
        )
        .route("/counts", get(views::counts))
        .route(
            "/edit/{feedback_id}",
            get(views::edit_feedback_form).post(views::edit_feedback),
        )
        .route("/delete/{feedback_id}", post(views::delete_feedback))
        .route("/bulk-upload", post(bulk::bulk_upload_feedback))
        .route("/search", get(search::feedback_by_phrase))
        .route("/by-max-length", get(search::feedback_by_max_length))
        .route(
            "/update-category",
            axum::routing::put(bulk::update_categories).patch(bulk::update_categories),
        )
        .route("/delete-by-category", delete(bulk::delete_by_category))
        .route("/summary-statistics", get(search::summary_statistics))
        .route(
            "/archive",
            post(archive::archive_old_feedback).put(archive::archive_old_feedback),
        );

    // `nest` does not serve the nested `/` route at the trailing-slash path
    // (`/feedback/`), so register the list handler there explicitly.
    Router::new()
        .route("/feedback/", get(views::view_feedback))
        .nest("/feedback", routes)
        .with_state(state)
}
