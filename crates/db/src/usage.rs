use rusqlite::{Row, params};
use spool_core::UsageRecord;

use crate::Db;
use crate::error::Result;

fn row_to_usage(row: &Row<'_>) -> rusqlite::Result<UsageRecord> {
    Ok(UsageRecord {
        id: row.get(0)?,
        spool_id: row.get(1)?,
        used_at: row.get(2)?,
        weight: row.get(3)?,
        note: row.get(4)?,
    })
}

impl Db {
    /// Append one usage row. The log is insert-only; nothing in the exposed
    /// API updates or deletes rows.
    pub fn insert_usage(
        &self,
        spool_id: &str,
        used_at: &str,
        weight: f64,
        note: Option<&str>,
    ) -> Result<i64> {
        self.conn.execute(
            r#"
            INSERT INTO usage (spool_id, used_at, weight, note)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![spool_id, used_at, weight, note],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn list_all_usage(&self) -> Result<Vec<UsageRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, spool_id, used_at, weight, note
            FROM usage
            ORDER BY used_at DESC, id DESC
            "#,
        )?;
        let rows = stmt.query_map([], row_to_usage)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub fn list_usage_for_spool(&self, spool_id: &str) -> Result<Vec<UsageRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, spool_id, used_at, weight, note
            FROM usage
            WHERE spool_id = ?1
            ORDER BY used_at DESC, id DESC
            "#,
        )?;
        let rows = stmt.query_map([spool_id], row_to_usage)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub fn count_usage(&self) -> Result<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM usage", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}
