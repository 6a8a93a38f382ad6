//! Age-based archival: snapshot comments whose last update predates a
//! threshold into flat JSON and CSV files. The export never deletes or
//! marks records, and the file appends are not transactional with the
//! database read or with each other.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use axum::Json;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;
use serde_json::json;
use tracing::info;

use redline_db::models::FeedbackRow;
use redline_types::api::ArchiveRequest;

use crate::AppState;
use crate::error::ApiError;

/// Where the two export files live.
#[derive(Debug, Clone)]
pub struct ArchivePaths {
    pub json_path: PathBuf,
    pub csv_path: PathBuf,
}

impl ArchivePaths {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            json_path: dir.join("archived_feedback.json"),
            csv_path: dir.join("archived_feedback.csv"),
        }
    }
}

const CSV_HEADER: [&str; 9] = [
    "ID",
    "Category",
    "Description",
    "Resolved Status",
    "Priority Level",
    "Related Section",
    "Assigned To",
    "Created Date",
    "Last Updated Date",
];

/// Snapshot of one archived comment. Timestamps keep their stored
/// second-precision text form; unset fields export as JSON null and empty
/// CSV cells.
#[derive(Debug, Serialize)]
struct ArchivedFeedback {
    id: i64,
    category: String,
    description: String,
    resolved_status: String,
    priority_level: Option<String>,
    related_section: Option<String>,
    assigned_to: Option<String>,
    created_date: String,
    last_updated_date: String,
}

impl From<&FeedbackRow> for ArchivedFeedback {
    fn from(row: &FeedbackRow) -> Self {
        Self {
            id: row.id,
            category: row.category.clone(),
            description: row.description.clone(),
            resolved_status: row.resolved_status.clone(),
            priority_level: row.priority_level.clone(),
            related_section: row.related_section.clone(),
            assigned_to: row.assigned_to.clone(),
            created_date: row.created_date.clone(),
            last_updated_date: row.last_updated_date.clone(),
        }
    }
}

pub async fn archive_old_feedback(
    State(state): State<AppState>,
    Json(req): Json<ArchiveRequest>,
) -> Result<Response, ApiError> {
    let threshold = req
        .date_threshold
        .as_deref()
        .and_then(|raw| NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok())
        .ok_or_else(|| {
            ApiError::Validation("Invalid date format. Use YYYY-MM-DD for the date".into())
        })?;

    // The threshold is interpreted at UTC midnight; the comparison is
    // strictly `last_updated_date < threshold`.
    let cutoff = threshold.and_time(NaiveTime::MIN).and_utc();

    let db = state.clone();
    let rows = tokio::task::spawn_blocking(move || db.db.find_older_than(cutoff))
        .await
        .map_err(|e| ApiError::Internal(format!("task join error: {e}")))??;

    if rows.is_empty() {
        return Ok(Json(
            json!({ "message": "No feedback comments older than the specified date." }),
        )
        .into_response());
    }

    let records: Vec<ArchivedFeedback> = rows.iter().map(ArchivedFeedback::from).collect();

    append_json(&state.archive.json_path, &records)
        .map_err(|e| ApiError::Internal(format!("Error writing to JSON file: {e}")))?;
    append_csv(&state.archive.csv_path, &records)
        .map_err(|e| ApiError::Internal(format!("Error writing to CSV file: {e}")))?;

    info!(
        "Archived {} feedback comments older than {}",
        records.len(),
        threshold
    );
    Ok(Json(json!({ "message": "Old feedback comments archived successfully." })).into_response())
}

/// Appends one pretty-printed JSON array per call; the file accumulates
/// newline-separated arrays rather than forming a single JSON document.
fn append_json(path: &Path, records: &[ArchivedFeedback]) -> std::io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    let body = serde_json::to_string_pretty(records)?;
    file.write_all(body.as_bytes())?;
    file.write_all(b"\n")?;
    Ok(())
}

fn append_csv(path: &Path, records: &[ArchivedFeedback]) -> std::io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;

    // The header goes in only when the file is currently empty.
    if file.metadata()?.len() == 0 {
        writeln!(file, "{}", CSV_HEADER.join(","))?;
    }

    for record in records {
        let fields = [
            record.id.to_string(),
            record.category.clone(),
            record.description.clone(),
            record.resolved_status.clone(),
            record.priority_level.clone().unwrap_or_default(),
            record.related_section.clone().unwrap_or_default(),
            record.assigned_to.clone().unwrap_or_default(),
            record.created_date.clone(),
            record.last_updated_date.clone(),
        ];
        let line: Vec<String> = fields.iter().map(|f| csv_field(f)).collect();
        writeln!(file, "{}", line.join(","))?;
    }

    Ok(())
}

/// RFC 4180 quoting: fields holding a comma, quote, or line break are
/// wrapped in quotes with inner quotes doubled.
fn csv_field(raw: &str) -> String {
    if raw.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", raw.replace('"', "\"\""))
    } else {
        raw.to_string()
    }
}
