use rusqlite::Connection;
use tracing::info;

use crate::error::Result;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS feedback (
            id                 INTEGER PRIMARY KEY AUTOINCREMENT,
            category           TEXT NOT NULL,
            description        TEXT NOT NULL,
            resolved_status    TEXT NOT NULL,
            priority_level     TEXT,
            related_section    TEXT,
            assigned_to        TEXT,
            created_date       TEXT NOT NULL,
            last_updated_date  TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_feedback_created
            ON feedback(created_date);
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
