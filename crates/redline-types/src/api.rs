use serde::{Deserialize, Serialize};

use crate::models::Feedback;

// -- Forms (browser-facing) --

/// Field set submitted by the add and edit forms. The store accepts the
/// text as-is; empty inputs arrive as empty strings.
#[derive(Debug, Deserialize)]
pub struct FeedbackForm {
    pub category: String,
    pub description: String,
    pub resolved_status: String,
    pub priority_level: String,
    pub related_section: String,
    pub assigned_to: String,
}

// -- Bulk upload --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BulkUploadRequest {
    #[serde(default)]
    pub feedbacks: Vec<BulkFeedbackEntry>,
}

/// One entry of a bulk upload. Every field is optional at the wire level;
/// the store rejects the whole batch when any entry leaves one unset.
#[derive(Debug, Clone, Deserialize)]
pub struct BulkFeedbackEntry {
    pub category: Option<String>,
    pub description: Option<String>,
    pub resolved_status: Option<String>,
    pub priority_level: Option<String>,
    pub related_section: Option<String>,
    pub assigned_to: Option<String>,
}

// -- Batch category update --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateCategoryRequest {
    #[serde(default)]
    pub feedback_ids: Vec<i64>,
    pub new_category: Option<String>,
}

// -- Archive --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArchiveRequest {
    pub date_threshold: Option<String>,
}

// -- Responses --

/// JSON wire shape of a feedback record; dates are `DD/MM/YYYY`.
#[derive(Debug, Serialize)]
pub struct FeedbackResponse {
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

impl From<Feedback> for FeedbackResponse {
    fn from(feedback: Feedback) -> Self {
        Self {
            id: feedback.id,
            category: feedback.category,
            description: feedback.description,
            resolved_status: feedback.resolved_status,
            priority_level: feedback.priority_level,
            related_section: feedback.related_section,
            assigned_to: feedback.assigned_to,
            created_date: feedback.created_date.format("%d/%m/%Y").to_string(),
            last_updated_date: feedback.last_updated_date.format("%d/%m/%Y").to_string(),
        }
    }
}
