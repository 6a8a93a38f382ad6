use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::warn;

use redline_types::models::Feedback;

/// Timestamp layout used in the feedback table (UTC, second precision).
pub(crate) const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Database row for the feedback table. Distinct from the redline-types
/// domain model to keep the DB layer's string timestamps out of the API.
#[derive(Debug, Clone)]
pub struct FeedbackRow {
    pub id: i64,
    pub category: String,
    pub description: String,
    pub resolved_status: String,
    pub priority_level: Option<String>,
    pub related_section: Option<String>,
    pub assigned_to: Option<String>,
    pub created_date: String,
    pub last_updated_date: String,
}

impl FeedbackRow {
    pub fn into_feedback(self) -> Feedback {
        let created_date = parse_timestamp(&self.created_date, self.id);
        let last_updated_date = parse_timestamp(&self.last_updated_date, self.id);
        Feedback {
            id: self.id,
            category: self.category,
            description: self.description,
            resolved_status: self.resolved_status,
            priority_level: self.priority_level,
            related_section: self.related_section,
            assigned_to: self.assigned_to,
            created_date,
            last_updated_date,
        }
    }
}

/// Fields supplied by the caller when creating or replacing a comment.
/// Ids and timestamps are always system-assigned.
#[derive(Debug, Clone)]
pub struct NewFeedback {
    pub category: String,
    pub description: String,
    pub resolved_status: String,
    pub priority_level: Option<String>,
    pub related_section: Option<String>,
    pub assigned_to: Option<String>,
}

/// List sort order over `created_date`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn parse(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "asc" => Self::Asc,
            "desc" => Self::Desc,
            // Invalid sort values fall back to ascending; this fallback is
            // part of the contract, not an accident.
            _ => Self::Asc,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// One page of list results.
#[derive(Debug)]
pub struct FeedbackPage {
    pub items: Vec<FeedbackRow>,
    pub page: u32,
    pub per_page: u32,
    pub total: u64,
}

impl FeedbackPage {
    pub fn total_pages(&self) -> u64 {
        self.total.div_ceil(u64::from(self.per_page))
    }
}

pub(crate) fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

fn parse_timestamp(raw: &str, id: i64) -> DateTime<Utc> {
    raw.parse::<DateTime<Utc>>()
        .or_else(|_| {
            // Stored as "YYYY-MM-DD HH:MM:SS" without a timezone; parse as
            // naive UTC and convert.
            NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT).map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            warn!("Corrupt timestamp '{}' on feedback {}: {}", raw, id, e);
            DateTime::default()
        })
}
