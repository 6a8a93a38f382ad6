use chrono::{DateTime, Utc};

/// A single reviewer comment tied to a document section.
///
/// `created_date` is set once at insert; `last_updated_date` is refreshed
/// on every edit and is never earlier than `created_date`.
#[derive(Debug, Clone, PartialEq)]
pub struct Feedback {
    pub id: i64,
    pub category: String,
    pub description: String,
    pub resolved_status: String,
    pub priority_level: Option<String>,
    pub related_section: Option<String>,
    pub assigned_to: Option<String>,
    pub created_date: DateTime<Utc>,
    pub last_updated_date: DateTime<Utc>,
}
