//! Activity log repository for Postmask.

use rusqlite::{params, Row};

use super::types::{ActivityAction, ActivityEntry, NewActivity};
use crate::db::Database;
use crate::{PostmaskError, Result};

/// Repository for the append-only activity log.
pub struct ActivityRepository<'a> {
    db: &'a Database,
}

impl<'a> ActivityRepository<'a> {
    /// Create a new ActivityRepository with the given database reference.
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Append a new activity entry.
    pub fn append(&self, entry: &NewActivity) -> Result<ActivityEntry> {
        let payload = entry
            .payload
            .as_ref()
            .map(|p| serde_json::to_string(p))
            .transpose()
            .map_err(|e| PostmaskError::Database(format!("payload encode: {e}")))?;

        self.db.conn().execute(
            "INSERT INTO activity_log (alias_id, action, actor_user_id, payload)
             VALUES (?, ?, ?, ?)",
            params![
                entry.alias_id,
                entry.action.as_str(),
                entry.actor_user_id,
                payload
            ],
        )?;

        let id = self.db.conn().last_insert_rowid();
        self.get_by_id(id)?
            .ok_or_else(|| PostmaskError::NotFound("activity entry".to_string()))
    }

    /// Get an entry by ID.
    pub fn get_by_id(&self, id: i64) -> Result<Option<ActivityEntry>> {
        use rusqlite::OptionalExtension;

        let entry = self
            .db
            .conn()
            .query_row(
                "SELECT id, alias_id, action, actor_user_id, payload, created_at
                 FROM activity_log WHERE id = ?",
                [id],
                Self::map_row,
            )
            .optional()?;
        Ok(entry)
    }

    /// List entries for an alias, newest first.
    pub fn list_for_alias(&self, alias_id: i64) -> Result<Vec<ActivityEntry>> {
        let mut stmt = self.db.conn().prepare(
            "SELECT id, alias_id, action, actor_user_id, payload, created_at
             FROM activity_log
             WHERE alias_id = ?
             ORDER BY created_at DESC, id DESC",
        )?;

        let entries: Vec<ActivityEntry> = stmt
            .query_map([alias_id], Self::map_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(entries)
    }

    /// Count entries for an alias.
    pub fn count_for_alias(&self, alias_id: i64) -> Result<i64> {
        let count = self.db.conn().query_row(
            "SELECT COUNT(*) FROM activity_log WHERE alias_id = ?",
            [alias_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Map a database row to an ActivityEntry.
    fn map_row(row: &Row) -> rusqlite::Result<ActivityEntry> {
        let action_str: String = row.get(2)?;
        let action = action_str.parse::<ActivityAction>().map_err(|_| {
            rusqlite::Error::FromSqlConversionFailure(
                2,
                rusqlite::types::Type::Text,
                format!("bad activity action: {action_str}").into(),
            )
        })?;

        Ok(ActivityEntry {
            id: row.get(0)?,
            alias_id: row.get(1)?,
            action,
            actor_user_id: row.get(3)?,
            payload: row.get(4)?,
            created_at: row.get(5)?,
        })
    }
}
