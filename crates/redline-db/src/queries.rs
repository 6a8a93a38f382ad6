use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension};

use redline_types::api::BulkFeedbackEntry;

use crate::error::{Result, StoreError};
use crate::models::{FeedbackPage, FeedbackRow, NewFeedback, SortOrder, format_timestamp};
use crate::{Database, PER_PAGE};

const ROW_COLUMNS: &str = "id, category, description, resolved_status, priority_level, \
     related_section, assigned_to, created_date, last_updated_date";

const SECTION_FILTER: &str =
    "(?1 = '' OR instr(lower(coalesce(related_section, '')), lower(?1)) > 0)";

impl Database {
    // -- Single-record operations --

    /// Assigns an id and sets both timestamps to the same instant.
    pub fn create(&self, fields: &NewFeedback) -> Result<FeedbackRow> {
        let now = format_timestamp(Utc::now());
        self.with_conn_mut(|conn| {
            insert_feedback(conn, fields, &now)?;
            let id = conn.last_insert_rowid();
            query_feedback_by_id(conn, id)?.ok_or(StoreError::NotFound(id))
        })
    }

    pub fn get(&self, id: i64) -> Result<FeedbackRow> {
        self.with_conn(|conn| query_feedback_by_id(conn, id)?.ok_or(StoreError::NotFound(id)))
    }

    /// Full field replacement. `last_updated_date` is touched explicitly on
    /// every successful edit; `created_date` is left alone.
    pub fn update(&self, id: i64, fields: &NewFeedback) -> Result<FeedbackRow> {
        let now = format_timestamp(Utc::now());
        self.with_conn_mut(|conn| {
            let changed = conn.execute(
                "UPDATE feedback
                 SET category = ?1, description = ?2, resolved_status = ?3,
                     priority_level = ?4, related_section = ?5, assigned_to = ?6,
                     last_updated_date = ?7
                 WHERE id = ?8",
                rusqlite::params![
                    fields.category,
                    fields.description,
                    fields.resolved_status,
                    fields.priority_level,
                    fields.related_section,
                    fields.assigned_to,
                    now,
                    id,
                ],
            )?;
            if changed == 0 {
                return Err(StoreError::NotFound(id));
            }
            query_feedback_by_id(conn, id)?.ok_or(StoreError::NotFound(id))
        })
    }

    pub fn delete(&self, id: i64) -> Result<()> {
        self.with_conn_mut(|conn| {
            let deleted = conn.execute("DELETE FROM feedback WHERE id = ?1", [id])?;
            if deleted == 0 {
                return Err(StoreError::NotFound(id));
            }
            Ok(())
        })
    }

    // -- Listing --

    /// Case-insensitive substring filter on `related_section` (empty filter
    /// matches every record), ordered by `created_date`, sliced to the
    /// requested 1-indexed page. Out-of-range pages yield an empty list.
    pub fn list(&self, section_filter: &str, sort: SortOrder, page: u32) -> Result<FeedbackPage> {
        self.with_conn(|conn| query_feedback_page(conn, section_filter, sort, page))
    }

    pub fn count_all(&self) -> Result<u64> {
        self.with_conn(|conn| {
            let total: i64 = conn.query_row("SELECT COUNT(*) FROM feedback", [], |row| row.get(0))?;
            Ok(total as u64)
        })
    }

    pub fn count_by_section_substring(&self, substring: &str) -> Result<u64> {
        self.with_conn(|conn| {
            let total: i64 = conn.query_row(
                &format!("SELECT COUNT(*) FROM feedback WHERE {SECTION_FILTER}"),
                [substring],
                |row| row.get(0),
            )?;
            Ok(total as u64)
        })
    }

    // -- Batch operations --

    /// Inserts every entry in one transaction. Validation runs first: a
    /// single incomplete entry rejects the whole batch before any write.
    pub fn bulk_create(&self, entries: &[BulkFeedbackEntry]) -> Result<usize> {
        let rows = entries
            .iter()
            .map(complete_entry)
            .collect::<Result<Vec<_>>>()?;

        let now = format_timestamp(Utc::now());
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            for fields in &rows {
                insert_feedback(&tx, fields, &now)?;
            }
            tx.commit()?;
            Ok(rows.len())
        })
    }

    /// Sets the category on every listed id. Unknown ids are silently
    /// skipped. The write does not touch `last_updated_date` — the batch
    /// path mirrors the single UPDATE statement it issues.
    pub fn batch_update_category(&self, ids: &[i64], new_category: &str) -> Result<usize> {
        if ids.is_empty() || new_category.is_empty() {
            return Err(StoreError::Validation(
                "Please provide both feedback IDs and a new category.".into(),
            ));
        }

        self.with_conn_mut(|conn| {
            let placeholders: Vec<String> =
                (2..=ids.len() + 1).map(|i| format!("?{}", i)).collect();
            let sql = format!(
                "UPDATE feedback SET category = ?1 WHERE id IN ({})",
                placeholders.join(", ")
            );

            let mut params: Vec<&dyn rusqlite::types::ToSql> = vec![&new_category];
            params.extend(ids.iter().map(|id| id as &dyn rusqlite::types::ToSql));

            let changed = conn.execute(&sql, params.as_slice())?;
            Ok(changed)
        })
    }

    /// Deletes every comment whose category matches exactly. Zero matching
    /// comments is a successful no-op.
    pub fn delete_by_category(&self, category: &str) -> Result<usize> {
        if category.is_empty() {
            return Err(StoreError::Validation(
                "Please provide a category to delete.".into(),
            ));
        }

        self.with_conn_mut(|conn| {
            let deleted = conn.execute("DELETE FROM feedback WHERE category = ?1", [category])?;
            Ok(deleted)
        })
    }

    // -- Queries over descriptions --

    pub fn search_by_description_substring(&self, phrase: &str) -> Result<Vec<FeedbackRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {ROW_COLUMNS} FROM feedback
                 WHERE (?1 = '' OR instr(lower(description), lower(?1)) > 0)
                 ORDER BY id"
            ))?;
            let rows = stmt
                .query_map([phrase], map_feedback_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Comments whose description is at most `max_len` characters long.
    pub fn filter_by_max_description_length(&self, max_len: u32) -> Result<Vec<FeedbackRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {ROW_COLUMNS} FROM feedback
                 WHERE length(description) <= ?1
                 ORDER BY id"
            ))?;
            let rows = stmt
                .query_map([max_len], map_feedback_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn average_description_length(&self) -> Result<Option<f64>> {
        self.with_conn(|conn| {
            let avg: Option<f64> = conn.query_row(
                "SELECT AVG(length(description)) FROM feedback",
                [],
                |row| row.get(0),
            )?;
            Ok(avg)
        })
    }

    /// Comments whose `last_updated_date` is strictly before the threshold.
    pub fn find_older_than(&self, threshold: DateTime<Utc>) -> Result<Vec<FeedbackRow>> {
        let cutoff = format_timestamp(threshold);
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {ROW_COLUMNS} FROM feedback
                 WHERE last_updated_date < ?1
                 ORDER BY id"
            ))?;
            let rows = stmt
                .query_map([cutoff], map_feedback_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

fn insert_feedback(conn: &Connection, fields: &NewFeedback, now: &str) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO feedback (category, description, resolved_status, priority_level,
                               related_section, assigned_to, created_date, last_updated_date)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        rusqlite::params![
            fields.category,
            fields.description,
            fields.resolved_status,
            fields.priority_level,
            fields.related_section,
            fields.assigned_to,
            now,
            now,
        ],
    )?;
    Ok(())
}

fn complete_entry(entry: &BulkFeedbackEntry) -> Result<NewFeedback> {
    fn require(field: &Option<String>) -> Result<String> {
        field.clone().ok_or_else(|| {
            StoreError::Validation(
                "Validation failed. Please ensure all required fields are provided for each \
                 feedback entry."
                    .into(),
            )
        })
    }

    Ok(NewFeedback {
        category: require(&entry.category)?,
        description: require(&entry.description)?,
        resolved_status: require(&entry.resolved_status)?,
        priority_level: Some(require(&entry.priority_level)?),
        related_section: Some(require(&entry.related_section)?),
        assigned_to: Some(require(&entry.assigned_to)?),
    })
}

fn query_feedback_by_id(conn: &Connection, id: i64) -> Result<Option<FeedbackRow>> {
    let mut stmt = conn.prepare(&format!("SELECT {ROW_COLUMNS} FROM feedback WHERE id = ?1"))?;
    let row = stmt.query_row([id], map_feedback_row).optional()?;
    Ok(row)
}

fn query_feedback_page(
    conn: &Connection,
    section_filter: &str,
    sort: SortOrder,
    page: u32,
) -> Result<FeedbackPage> {
    let total: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM feedback WHERE {SECTION_FILTER}"),
        [section_filter],
        |row| row.get(0),
    )?;

    // Tiebreak on id so asc and desc are exact mirrors even when several
    // comments share a created_date.
    let order = match sort {
        SortOrder::Asc => "created_date ASC, id ASC",
        SortOrder::Desc => "created_date DESC, id DESC",
    };

    let page = page.max(1);
    let offset = i64::from(page - 1) * i64::from(PER_PAGE);

    let mut stmt = conn.prepare(&format!(
        "SELECT {ROW_COLUMNS} FROM feedback
         WHERE {SECTION_FILTER}
         ORDER BY {order}
         LIMIT ?2 OFFSET ?3"
    ))?;
    let items = stmt
        .query_map(
            rusqlite::params![section_filter, PER_PAGE, offset],
            map_feedback_row,
        )?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(FeedbackPage {
        items,
        page,
        per_page: PER_PAGE,
        total: total as u64,
    })
}

fn map_feedback_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<FeedbackRow> {
    Ok(FeedbackRow {
        id: row.get(0)?,
        category: row.get(1)?,
        description: row.get(2)?,
        resolved_status: row.get(3)?,
        priority_level: row.get(4)?,
        related_section: row.get(5)?,
        assigned_to: row.get(6)?,
        created_date: row.get(7)?,
        last_updated_date: row.get(8)?,
    })
}
