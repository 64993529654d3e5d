//! Application repository for the `applications` table.
//!
//! The `(account_id, fingerprint)` uniqueness constraint is the
//! idempotency guarantee for concurrent ingestions: a colliding insert
//! surfaces as `DatabaseError::DuplicateFingerprint` instead of a
//! second row.

use rusqlite::params;

use super::{Database, DatabaseError};

/// A raw application row from the database.
#[derive(Debug, Clone)]
pub struct ApplicationRow {
    pub id: String,
    pub account_id: String,
    pub fingerprint: String,
    pub company: String,
    pub position: String,
    pub source_url: Option<String>,
    /// Last known status, kept in sync with the newest event.
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Inserts an application record. A `(account_id, fingerprint)`
/// collision maps to `DuplicateFingerprint`.
pub fn insert(db: &Database, row: &ApplicationRow) -> Result<(), DatabaseError> {
    db.with_conn(|conn| insert_with(conn, row))
}

/// Insert against a held connection, for composing into a transaction.
pub(crate) fn insert_with(
    conn: &rusqlite::Connection,
    row: &ApplicationRow,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO applications
         (id, account_id, fingerprint, company, position, source_url, status, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            row.id,
            row.account_id,
            row.fingerprint,
            row.company,
            row.position,
            row.source_url,
            row.status,
            row.created_at,
            row.updated_at,
        ],
    )
    .map_err(|e| {
        if DatabaseError::is_constraint_violation(&e) {
            DatabaseError::DuplicateFingerprint {
                fingerprint: row.fingerprint.clone(),
            }
        } else {
            DatabaseError::Sqlite(e)
        }
    })?;
    Ok(())
}

/// Finds the application for a fingerprint within an account.
pub fn find_by_fingerprint(
    db: &Database,
    account_id: &str,
    fingerprint: &str,
) -> Result<Option<ApplicationRow>, DatabaseError> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare(
            "SELECT id, account_id, fingerprint, company, position, source_url, status, created_at, updated_at
             FROM applications WHERE account_id = ?1 AND fingerprint = ?2",
        )?;
        let mut rows = stmt.query_map(params![account_id, fingerprint], map_row)?;
        match rows.next() {
            Some(Ok(row)) => Ok(Some(row)),
            Some(Err(e)) => Err(DatabaseError::Sqlite(e)),
            None => Ok(None),
        }
    })
}

/// Updates the last known status of an application.
pub fn update_status(
    db: &Database,
    id: &str,
    status: &str,
    updated_at: &str,
) -> Result<(), DatabaseError> {
    db.with_conn(|conn| update_status_with(conn, id, status, updated_at))
}

/// Status update against a held connection, for composing into a
/// transaction.
pub(crate) fn update_status_with(
    conn: &rusqlite::Connection,
    id: &str,
    status: &str,
    updated_at: &str,
) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE applications SET status = ?2, updated_at = ?3 WHERE id = ?1",
        params![id, status, updated_at],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity: "application",
            id: id.to_string(),
        });
    }
    Ok(())
}

/// Counts applications held by an account.
pub fn count_by_account(db: &Database, account_id: &str) -> Result<u64, DatabaseError> {
    db.with_conn(|conn| {
        let count: u64 = conn.query_row(
            "SELECT COUNT(*) FROM applications WHERE account_id = ?1",
            params![account_id],
            |r| r.get(0),
        )?;
        Ok(count)
    })
}

fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ApplicationRow> {
    Ok(ApplicationRow {
        id: row.get(0)?,
        account_id: row.get(1)?,
        fingerprint: row.get(2)?,
        company: row.get(3)?,
        position: row.get(4)?,
        source_url: row.get(5)?,
        status: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}
