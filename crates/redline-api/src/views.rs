//! Browser-facing flows: add/edit forms, the paginated list, per-section
//! counts, and the post-redirect-get cycle the forms drive.

use axum::Form;
use axum::extract::{Path, Query, State};
use axum::response::{Html, Redirect};
use serde::Deserialize;

use redline_db::PER_PAGE;
use redline_db::models::{FeedbackRow, NewFeedback, SortOrder};
use redline_types::api::FeedbackForm;
use redline_types::models::Feedback;

use crate::AppState;
use crate::error::ApiError;
use crate::render;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub related_section: String,
    #[serde(default = "default_sort")]
    pub sort: String,
    #[serde(default = "default_page")]
    pub page: u32,
    pub edited_feedback_id: Option<i64>,
}

fn default_sort() -> String {
    "asc".to_string()
}

fn default_page() -> u32 {
    1
}

pub async fn view_feedback(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Html<String>, ApiError> {
    let filter = query.related_section.trim().to_string();
    let sort = SortOrder::parse(&query.sort);
    let page_number = query.page;

    // Run the blocking DB read off the async runtime.
    let db = state.clone();
    let section = filter.clone();
    let page = tokio::task::spawn_blocking(move || db.db.list(&section, sort, page_number))
        .await
        .map_err(|e| ApiError::Internal(format!("task join error: {e}")))??;

    let total_pages = page.total_pages();
    let current_page = page.page;
    let items: Vec<Feedback> = page.items.into_iter().map(FeedbackRow::into_feedback).collect();

    Ok(Html(render::feedback_list(
        &items,
        current_page,
        total_pages,
        &filter,
        sort,
        query.edited_feedback_id,
    )))
}

pub async fn add_feedback_form() -> Html<String> {
    Html(render::add_feedback_form())
}

pub async fn add_feedback(
    State(state): State<AppState>,
    Form(form): Form<FeedbackForm>,
) -> Result<Redirect, ApiError> {
    state.db.create(&new_feedback_from_form(form))?;

    // Land on the page that now shows the new comment (append-at-end order).
    let total = state.db.count_all()?;
    let per_page = u64::from(PER_PAGE);
    let last_page = total / per_page + u64::from(total % per_page != 0);

    Ok(Redirect::to(&format!("/feedback/?page={last_page}")))
}

#[derive(Debug, Deserialize)]
pub struct EditQuery {
    #[serde(default = "default_page")]
    pub page: u32,
}

pub async fn edit_feedback_form(
    State(state): State<AppState>,
    Path(feedback_id): Path<i64>,
    Query(query): Query<EditQuery>,
) -> Result<Html<String>, ApiError> {
    let feedback = state.db.get(feedback_id)?.into_feedback();
    Ok(Html(render::edit_feedback_form(&feedback, query.page)))
}

pub async fn edit_feedback(
    State(state): State<AppState>,
    Path(feedback_id): Path<i64>,
    Query(query): Query<EditQuery>,
    Form(form): Form<FeedbackForm>,
) -> Result<Redirect, ApiError> {
    state.db.update(feedback_id, &new_feedback_from_form(form))?;

    // Send the browser back to the page it came from, flagging the edited
    // row so the list can highlight it.
    Ok(Redirect::to(&format!(
        "/feedback/?page={}&edited_feedback_id={}",
        query.page, feedback_id
    )))
}

pub async fn delete_feedback(
    State(state): State<AppState>,
    Path(feedback_id): Path<i64>,
) -> Result<Redirect, ApiError> {
    state.db.delete(feedback_id)?;
    Ok(Redirect::to("/feedback/"))
}

pub async fn counts(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    let appendix = state.db.count_by_section_substring("Appendix")?;
    let r#abstract = state.db.count_by_section_substring("Abstract")?;
    let executive_summary = state.db.count_by_section_substring("Executive Summary")?;

    Ok(Html(render::section_counts(
        appendix,
        r#abstract,
        executive_summary,
    )))
}

fn new_feedback_from_form(form: FeedbackForm) -> NewFeedback {
    NewFeedback {
        category: form.category,
        description: form.description,
        resolved_status: form.resolved_status,
        priority_level: Some(form.priority_level),
        related_section: Some(form.related_section),
        assigned_to: Some(form.assigned_to),
    }
}
