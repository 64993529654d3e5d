//! Append-only repository for the `application_events` table.

use rusqlite::params;

use super::{Database, DatabaseError};

/// A raw application event row from the database.
#[derive(Debug, Clone)]
pub struct EventRow {
    pub id: String,
    pub application_id: String,
    pub status: String,
    pub source: String,
    /// Optional JSON blob with classification detail.
    pub metadata: Option<String>,
    pub created_at: String,
}

/// Appends an event record.
pub fn insert(db: &Database, row: &EventRow) -> Result<(), DatabaseError> {
    db.with_conn(|conn| insert_with(conn, row))
}

/// Append against a held connection, for composing into a transaction.
pub(crate) fn insert_with(
    conn: &rusqlite::Connection,
    row: &EventRow,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO application_events (id, application_id, status, source, metadata, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            row.id,
            row.application_id,
            row.status,
            row.source,
            row.metadata,
            row.created_at,
        ],
    )?;
    Ok(())
}

/// Lists events for an application, oldest first.
pub fn list_by_application(
    db: &Database,
    application_id: &str,
) -> Result<Vec<EventRow>, DatabaseError> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare(
            "SELECT id, application_id, status, source, metadata, created_at
             FROM application_events WHERE application_id = ?1
             ORDER BY created_at ASC, id ASC",
        )?;
        let rows: Vec<EventRow> = stmt
            .query_map(params![application_id], |row| {
                Ok(EventRow {
                    id: row.get(0)?,
                    application_id: row.get(1)?,
                    status: row.get(2)?,
                    source: row.get(3)?,
                    metadata: row.get(4)?,
                    created_at: row.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    })
}

/// Counts events for an application.
pub fn count_by_application(db: &Database, application_id: &str) -> Result<u64, DatabaseError> {
    db.with_conn(|conn| {
        let count: u64 = conn.query_row(
            "SELECT COUNT(*) FROM application_events WHERE application_id = ?1",
            params![application_id],
            |r| r.get(0),
        )?;
        Ok(count)
    })
}
