//! Account repository for the `accounts` table.

use rusqlite::params;

use super::{Database, DatabaseError};

/// A raw account row from the database.
#[derive(Debug, Clone)]
pub struct AccountRow {
    pub id: String,
    pub email: String,
    /// Maximum applications this account may hold. `None` means unlimited.
    pub plan_limit: Option<i64>,
    pub created_at: String,
}

/// Inserts an account record.
pub fn insert(db: &Database, row: &AccountRow) -> Result<(), DatabaseError> {
    db.with_conn(|conn| {
        conn.execute(
            "INSERT INTO accounts (id, email, plan_limit, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![row.id, row.email, row.plan_limit, row.created_at],
        )?;
        Ok(())
    })
}

/// Finds an account by id.
pub fn find_by_id(db: &Database, id: &str) -> Result<Option<AccountRow>, DatabaseError> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare(
            "SELECT id, email, plan_limit, created_at FROM accounts WHERE id = ?1",
        )?;
        let mut rows = stmt.query_map(params![id], |row| {
            Ok(AccountRow {
                id: row.get(0)?,
                email: row.get(1)?,
                plan_limit: row.get(2)?,
                created_at: row.get(3)?,
            })
        })?;
        match rows.next() {
            Some(Ok(row)) => Ok(Some(row)),
            Some(Err(e)) => Err(DatabaseError::Sqlite(e)),
            None => Ok(None),
        }
    })
}

/// Updates the plan limit for an account. `None` removes the limit.
pub fn set_plan_limit(
    db: &Database,
    id: &str,
    plan_limit: Option<i64>,
) -> Result<(), DatabaseError> {
    db.with_conn(|conn| {
        let changed = conn.execute(
            "UPDATE accounts SET plan_limit = ?2 WHERE id = ?1",
            params![id, plan_limit],
        )?;
        if changed == 0 {
            return Err(DatabaseError::NotFound {
                entity: "account",
                id: id.to_string(),
            });
        }
        Ok(())
    })
}
