//! Contract tests for the feedback HTTP surface, driven through the router
//! with in-memory state.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use axum::response::Response;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use redline_api::archive::ArchivePaths;
use redline_api::{AppState, AppStateInner, router};
use redline_db::Database;
use redline_db::models::NewFeedback;

const FORM_BODY: &str = "category=Completeness&description=Needs+more+detail&resolved_status=No\
                         &priority_level=High&related_section=Abstract&assigned_to=Avery";

fn test_app() -> (Router, AppState, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let state: AppState = Arc::new(AppStateInner {
        db: Database::open_in_memory().unwrap(),
        archive: ArchivePaths::in_dir(dir.path()),
    });
    (router(state.clone()), state, dir)
}

fn seed(state: &AppState, description: &str, section: &str) -> i64 {
    state
        .db
        .create(&NewFeedback {
            category: "Completeness".into(),
            description: description.into(),
            resolved_status: "No".into(),
            priority_level: Some("High".into()),
            related_section: Some(section.into()),
            assigned_to: Some("Avery".into()),
        })
        .unwrap()
        .id
}

fn backdate(state: &AppState, id: i64, stamp: &str) {
    let sql = format!(
        "UPDATE feedback SET created_date = '{stamp}', last_updated_date = '{stamp}' WHERE id = {id}"
    );
    state
        .db
        .with_conn_mut(|conn| {
            conn.execute(&sql, [])?;
            Ok(())
        })
        .unwrap();
}

async fn get(app: &Router, uri: &str) -> Response {
    app.clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn post_form(app: &Router, uri: &str, body: &str) -> Response {
    app.clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
}

async fn send_json(app: &Router, method: &str, uri: &str, body: &Value) -> Response {
    app.clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(body).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap()
}

async fn body_string(response: Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn body_json(response: Response) -> Value {
    serde_json::from_str(&body_string(response).await).unwrap()
}

fn location(response: &Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap()
}

#[tokio::test]
async fn add_redirects_to_the_last_list_page() {
    let (app, state, _dir) = test_app();

    let response = post_form(&app, "/feedback/add", FORM_BODY).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/feedback/?page=1");

    for _ in 0..5 {
        post_form(&app, "/feedback/add", FORM_BODY).await;
    }
    assert_eq!(state.db.count_all().unwrap(), 6);

    // The seventh comment at five per page lands on page two.
    let response = post_form(&app, "/feedback/add", FORM_BODY).await;
    assert_eq!(location(&response), "/feedback/?page=2");
}

#[tokio::test]
async fn add_form_page_renders() {
    let (app, _state, _dir) = test_app();
    let response = get(&app, "/feedback/add").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_string(response).await.contains("name=\"description\""));
}

#[tokio::test]
async fn list_renders_seeded_comments() {
    let (app, state, _dir) = test_app();
    let id = seed(&state, "Tighten the abstract.", "Abstract");

    let response = get(&app, "/feedback/").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_string(response).await.contains("Tighten the abstract."));

    let response = get(&app, &format!("/feedback/?edited_feedback_id={id}")).await;
    assert!(body_string(response).await.contains("class=\"edited\""));
}

#[tokio::test]
async fn list_applies_section_filter() {
    let (app, state, _dir) = test_app();
    seed(&state, "Appendix comment.", "appendix A");
    seed(&state, "Abstract comment.", "Abstract");

    let response = get(&app, "/feedback/?related_section=Appendix").await;
    let html = body_string(response).await;
    assert!(html.contains("Appendix comment."));
    assert!(!html.contains("Abstract comment."));
}

#[tokio::test]
async fn edit_updates_and_redirects_with_the_edited_id() {
    let (app, state, _dir) = test_app();
    let id = seed(&state, "Before the edit.", "Abstract");

    let response = get(&app, &format!("/feedback/edit/{id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_string(response).await.contains("Before the edit."));

    let form = "category=Detail&description=After+the+edit&resolved_status=Yes\
                &priority_level=Low&related_section=Appendix&assigned_to=Sam";
    let response = post_form(&app, &format!("/feedback/edit/{id}?page=2"), form).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        location(&response),
        format!("/feedback/?page=2&edited_feedback_id={id}")
    );

    let row = state.db.get(id).unwrap();
    assert_eq!(row.description, "After the edit");
    assert_eq!(row.resolved_status, "Yes");
}

#[tokio::test]
async fn edit_of_a_missing_comment_is_404() {
    let (app, _state, _dir) = test_app();
    let response = get(&app, "/feedback/edit/999").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = post_form(&app, "/feedback/edit/999", FORM_BODY).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_removes_and_redirects() {
    let (app, state, _dir) = test_app();
    let id = seed(&state, "Remove me.", "Abstract");

    let response = post_form(&app, &format!("/feedback/delete/{id}"), "").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/feedback/");
    assert_eq!(state.db.count_all().unwrap(), 0);

    let response = post_form(&app, &format!("/feedback/delete/{id}"), "").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn counts_page_reports_section_totals() {
    let (app, state, _dir) = test_app();
    seed(&state, "One.", "Appendix A");
    seed(&state, "Two.", "appendix B");
    seed(&state, "Three.", "Executive Summary");

    let response = get(&app, "/feedback/counts").await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_string(response).await;
    assert!(html.contains("<td>Appendix</td><td>2</td>"));
    assert!(html.contains("<td>Executive Summary</td><td>1</td>"));
}

#[tokio::test]
async fn bulk_upload_creates_every_entry() {
    let (app, state, _dir) = test_app();
    let body = json!({ "feedbacks": [
        { "category": "Structure", "description": "First.", "resolved_status": "No",
          "priority_level": "Low", "related_section": "Appendix", "assigned_to": "Sam" },
        { "category": "Clarity", "description": "Second.", "resolved_status": "Yes",
          "priority_level": "High", "related_section": "Abstract", "assigned_to": "Avery" },
    ]});

    let response = send_json(&app, "POST", "/feedback/bulk-upload", &body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(
        body_json(response).await["message"],
        "Feedback comments uploaded successfully"
    );
    assert_eq!(state.db.count_all().unwrap(), 2);
}

#[tokio::test]
async fn bulk_upload_rejects_empty_and_incomplete_batches() {
    let (app, state, _dir) = test_app();

    let response = send_json(&app, "POST", "/feedback/bulk-upload", &json!({ "feedbacks": [] })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // priority_level is missing from the second entry; nothing may persist.
    let body = json!({ "feedbacks": [
        { "category": "Structure", "description": "First.", "resolved_status": "No",
          "priority_level": "Low", "related_section": "Appendix", "assigned_to": "Sam" },
        { "category": "Clarity", "description": "Second.", "resolved_status": "Yes",
          "related_section": "Abstract", "assigned_to": "Avery" },
    ]});
    let response = send_json(&app, "POST", "/feedback/bulk-upload", &body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(state.db.count_all().unwrap(), 0);
}

#[tokio::test]
async fn search_returns_matches_with_formatted_dates() {
    let (app, state, _dir) = test_app();
    let id = seed(&state, "Find this feedback.", "Abstract");
    backdate(&state, id, "2022-01-15 08:00:00");
    seed(&state, "Unrelated.", "Abstract");

    let response = get(&app, "/feedback/search?phrase=Find").await;
    assert_eq!(response.status(), StatusCode::OK);
    let results = body_json(response).await;
    assert_eq!(results.as_array().unwrap().len(), 1);
    assert_eq!(results[0]["description"], "Find this feedback.");
    assert_eq!(results[0]["created_date"], "15/01/2022");
}

#[tokio::test]
async fn search_with_no_matches_is_404() {
    let (app, _state, _dir) = test_app();
    let response = get(&app, "/feedback/search?phrase=missing").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        body_json(response).await["message"],
        "No feedback comments found."
    );
}

#[tokio::test]
async fn by_max_length_validates_the_parameter() {
    let (app, state, _dir) = test_app();
    seed(&state, "short", "Abstract");

    for uri in [
        "/feedback/by-max-length",
        "/feedback/by-max-length?max_length=abc",
        "/feedback/by-max-length?max_length=-3",
    ] {
        let response = get(&app, uri).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await["error"],
            "Invalid max length value. Please provide a valid integer."
        );
    }
}

#[tokio::test]
async fn by_max_length_filters_and_404s_on_no_match() {
    let (app, state, _dir) = test_app();
    seed(&state, "short", "Abstract");
    seed(&state, "a description well over twenty characters", "Abstract");

    let response = get(&app, "/feedback/by-max-length?max_length=20").await;
    assert_eq!(response.status(), StatusCode::OK);
    let results = body_json(response).await;
    assert_eq!(results.as_array().unwrap().len(), 1);
    assert_eq!(results[0]["description"], "short");

    let response = get(&app, "/feedback/by-max-length?max_length=2").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        body_json(response).await["message"],
        "Sorry, no comments meet this criteria."
    );
}

#[tokio::test]
async fn update_category_applies_to_known_ids() {
    let (app, state, _dir) = test_app();
    let id = seed(&state, "Recategorize.", "Abstract");

    let body = json!({ "feedback_ids": [id, 999], "new_category": "Clarity" });
    let response = send_json(&app, "PATCH", "/feedback/update-category", &body).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(state.db.get(id).unwrap().category, "Clarity");

    // PUT is accepted as well.
    let body = json!({ "feedback_ids": [id], "new_category": "Structure" });
    let response = send_json(&app, "PUT", "/feedback/update-category", &body).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(state.db.get(id).unwrap().category, "Structure");
}

#[tokio::test]
async fn update_category_requires_both_inputs() {
    let (app, _state, _dir) = test_app();
    let body = json!({ "feedback_ids": [], "new_category": "Clarity" });
    let response = send_json(&app, "PUT", "/feedback/update-category", &body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["error"],
        "Please provide both feedback IDs and a new category."
    );

    let body = json!({ "feedback_ids": [1] });
    let response = send_json(&app, "PUT", "/feedback/update-category", &body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn delete_by_category_reports_the_category() {
    let (app, state, _dir) = test_app();
    seed(&state, "One.", "Abstract");

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/feedback/delete-by-category?category=Completeness")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await["message"],
        "All feedback comments in category 'Completeness' deleted successfully."
    );
    assert_eq!(state.db.count_all().unwrap(), 0);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/feedback/delete-by-category")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn summary_statistics_reports_the_average() {
    let (app, state, _dir) = test_app();

    let response = get(&app, "/feedback/summary-statistics").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["average_comment_length"], Value::Null);

    seed(&state, "abcd", "Abstract");
    seed(&state, "abcdef", "Abstract");
    let response = get(&app, "/feedback/summary-statistics").await;
    assert_eq!(body_json(response).await["average_comment_length"], 5.0);
}

#[tokio::test]
async fn archive_rejects_a_malformed_date() {
    let (app, _state, _dir) = test_app();
    for body in [json!({ "date_threshold": "01-01-2023" }), json!({})] {
        let response = send_json(&app, "POST", "/feedback/archive", &body).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await["error"],
            "Invalid date format. Use YYYY-MM-DD for the date"
        );
    }
}

#[tokio::test]
async fn archive_with_no_old_comments_writes_no_files() {
    let (app, state, _dir) = test_app();
    seed(&state, "Fresh comment.", "Abstract");

    let response = send_json(
        &app,
        "POST",
        "/feedback/archive",
        &json!({ "date_threshold": "2000-01-01" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await["message"],
        "No feedback comments older than the specified date."
    );
    assert!(!state.archive.json_path.exists());
    assert!(!state.archive.csv_path.exists());
}

#[tokio::test]
async fn archive_exports_old_comments_to_both_files() {
    let (app, state, _dir) = test_app();
    let id = seed(&state, "Stale, needs review.", "Appendix");
    backdate(&state, id, "2022-01-01 00:00:00");
    seed(&state, "Fresh comment.", "Abstract");

    let response = send_json(
        &app,
        "PUT",
        "/feedback/archive",
        &json!({ "date_threshold": "2023-01-01" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await["message"],
        "Old feedback comments archived successfully."
    );

    // The record is still live; archiving is a snapshot, not a move.
    assert_eq!(state.db.count_all().unwrap(), 2);

    let json_file = std::fs::read_to_string(&state.archive.json_path).unwrap();
    assert!(json_file.contains("\"Stale, needs review.\""));
    assert!(json_file.contains("\"2022-01-01 00:00:00\""));
    assert!(!json_file.contains("Fresh comment."));

    let csv_file = std::fs::read_to_string(&state.archive.csv_path).unwrap();
    let mut lines = csv_file.lines();
    assert!(lines.next().unwrap().starts_with("ID,Category,Description"));
    let row = lines.next().unwrap();
    assert!(row.contains("\"Stale, needs review.\""));
    assert!(row.contains("2022-01-01 00:00:00"));

    // A second archive call appends rows without repeating the header.
    send_json(
        &app,
        "PUT",
        "/feedback/archive",
        &json!({ "date_threshold": "2023-01-01" }),
    )
    .await;
    let csv_file = std::fs::read_to_string(&state.archive.csv_path).unwrap();
    assert_eq!(csv_file.matches("ID,Category").count(), 1);
    assert_eq!(csv_file.lines().count(), 3);
}
