//! Alias repository for Postmask.

use rusqlite::{params, OptionalExtension, Row};

use super::types::{Alias, Collaborator, CollaboratorRole, NewAlias};
use crate::db::Database;
use crate::{PostmaskError, Result};

/// Check whether a rusqlite error is a UNIQUE constraint violation.
fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error {
                code: rusqlite::ErrorCode::ConstraintViolation,
                ..
            },
            _,
        )
    )
}

/// Repository for alias and collaborator persistence.
pub struct AliasRepository<'a> {
    db: &'a Database,
}

impl<'a> AliasRepository<'a> {
    /// Create a new AliasRepository with the given database reference.
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Create a new alias.
    ///
    /// The UNIQUE constraint on the address column is the final arbiter of
    /// global uniqueness; a violation is reported as a conflict.
    pub fn create(&self, new_alias: &NewAlias) -> Result<Alias> {
        self.db
            .conn()
            .execute(
                "INSERT INTO aliases (user_id, local_part, address, is_collaborative)
                 VALUES (?, ?, ?, ?)",
                params![
                    new_alias.user_id,
                    new_alias.local_part,
                    new_alias.address,
                    new_alias.is_collaborative as i32
                ],
            )
            .map_err(|e| {
                if is_unique_violation(&e) {
                    PostmaskError::Conflict(format!(
                        "alias address {} is already taken",
                        new_alias.address
                    ))
                } else {
                    e.into()
                }
            })?;

        let id = self.db.conn().last_insert_rowid();
        self.get_by_id(id)?
            .ok_or_else(|| PostmaskError::NotFound("alias".to_string()))
    }

    /// Get an alias by ID.
    pub fn get_by_id(&self, id: i64) -> Result<Option<Alias>> {
        let alias = self
            .db
            .conn()
            .query_row(
                "SELECT id, user_id, local_part, address, is_collaborative, is_active,
                        emails_sent, emails_received, created_at, updated_at
                 FROM aliases WHERE id = ?",
                [id],
                Self::map_row,
            )
            .optional()?;
        Ok(alias)
    }

    /// Get an alias by address.
    ///
    /// Addresses are stored lower-cased; the lookup normalizes its input so
    /// mixed-case inbound recipients still match.
    pub fn get_by_address(&self, address: &str) -> Result<Option<Alias>> {
        let alias = self
            .db
            .conn()
            .query_row(
                "SELECT id, user_id, local_part, address, is_collaborative, is_active,
                        emails_sent, emails_received, created_at, updated_at
                 FROM aliases WHERE address = lower(?)",
                [address],
                Self::map_row,
            )
            .optional()?;
        Ok(alias)
    }

    /// List aliases owned by a user, newest first.
    pub fn list_for_owner(&self, user_id: i64) -> Result<Vec<Alias>> {
        let mut stmt = self.db.conn().prepare(
            "SELECT id, user_id, local_part, address, is_collaborative, is_active,
                    emails_sent, emails_received, created_at, updated_at
             FROM aliases
             WHERE user_id = ?
             ORDER BY created_at DESC, id DESC",
        )?;

        let aliases: Vec<Alias> = stmt
            .query_map([user_id], Self::map_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(aliases)
    }

    /// List every alias a user owns or collaborates on, newest first.
    pub fn list_accessible(&self, user_id: i64) -> Result<Vec<Alias>> {
        let mut stmt = self.db.conn().prepare(
            "SELECT id, user_id, local_part, address, is_collaborative, is_active,
                    emails_sent, emails_received, created_at, updated_at
             FROM aliases
             WHERE user_id = ?1
                OR id IN (SELECT alias_id FROM alias_collaborators WHERE user_id = ?1)
             ORDER BY created_at DESC, id DESC",
        )?;

        let aliases: Vec<Alias> = stmt
            .query_map([user_id], Self::map_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(aliases)
    }

    /// Count personal (non-collaborative) aliases owned by a user.
    ///
    /// Only these count against the free-plan quota.
    pub fn count_personal(&self, user_id: i64) -> Result<i64> {
        let count = self.db.conn().query_row(
            "SELECT COUNT(*) FROM aliases WHERE user_id = ? AND is_collaborative = 0",
            [user_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Set the active flag. Returns false if the alias does not exist.
    pub fn set_active(&self, id: i64, active: bool) -> Result<bool> {
        let rows = self.db.conn().execute(
            "UPDATE aliases SET is_active = ?, updated_at = datetime('now') WHERE id = ?",
            params![active as i32, id],
        )?;
        Ok(rows > 0)
    }

    /// Atomically increment the sent counter.
    pub fn increment_sent(&self, id: i64) -> Result<()> {
        self.db.conn().execute(
            "UPDATE aliases SET emails_sent = emails_sent + 1, updated_at = datetime('now')
             WHERE id = ?",
            [id],
        )?;
        Ok(())
    }

    /// Atomically increment the received counter.
    pub fn increment_received(&self, id: i64) -> Result<()> {
        self.db.conn().execute(
            "UPDATE aliases SET emails_received = emails_received + 1, updated_at = datetime('now')
             WHERE id = ?",
            [id],
        )?;
        Ok(())
    }

    /// Add a collaborator to an alias.
    pub fn add_collaborator(
        &self,
        alias_id: i64,
        user_id: i64,
        role: CollaboratorRole,
    ) -> Result<Collaborator> {
        self.db
            .conn()
            .execute(
                "INSERT INTO alias_collaborators (alias_id, user_id, role) VALUES (?, ?, ?)",
                params![alias_id, user_id, role.as_str()],
            )
            .map_err(|e| {
                if is_unique_violation(&e) {
                    PostmaskError::Conflict("user is already a collaborator".to_string())
                } else {
                    e.into()
                }
            })?;

        let id = self.db.conn().last_insert_rowid();
        self.db
            .conn()
            .query_row(
                "SELECT id, alias_id, user_id, role, added_at
                 FROM alias_collaborators WHERE id = ?",
                [id],
                Self::map_collaborator_row,
            )
            .map_err(Into::into)
    }

    /// Remove a collaborator. Returns false if no matching entry existed.
    pub fn remove_collaborator(&self, alias_id: i64, user_id: i64) -> Result<bool> {
        let rows = self.db.conn().execute(
            "DELETE FROM alias_collaborators WHERE alias_id = ? AND user_id = ?",
            params![alias_id, user_id],
        )?;
        Ok(rows > 0)
    }

    /// List collaborators of an alias in insertion order.
    pub fn list_collaborators(&self, alias_id: i64) -> Result<Vec<Collaborator>> {
        let mut stmt = self.db.conn().prepare(
            "SELECT id, alias_id, user_id, role, added_at
             FROM alias_collaborators
             WHERE alias_id = ?
             ORDER BY id ASC",
        )?;

        let collaborators: Vec<Collaborator> = stmt
            .query_map([alias_id], Self::map_collaborator_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(collaborators)
    }

    /// Get a single collaborator entry.
    pub fn get_collaborator(&self, alias_id: i64, user_id: i64) -> Result<Option<Collaborator>> {
        let collaborator = self
            .db
            .conn()
            .query_row(
                "SELECT id, alias_id, user_id, role, added_at
                 FROM alias_collaborators WHERE alias_id = ? AND user_id = ?",
                params![alias_id, user_id],
                Self::map_collaborator_row,
            )
            .optional()?;
        Ok(collaborator)
    }

    /// Map a database row to an Alias.
    fn map_row(row: &Row) -> rusqlite::Result<Alias> {
        Ok(Alias {
            id: row.get(0)?,
            user_id: row.get(1)?,
            local_part: row.get(2)?,
            address: row.get(3)?,
            is_collaborative: row.get::<_, i32>(4)? != 0,
            is_active: row.get::<_, i32>(5)? != 0,
            emails_sent: row.get(6)?,
            emails_received: row.get(7)?,
            created_at: row.get(8)?,
            updated_at: row.get(9)?,
        })
    }

    /// Map a database row to a Collaborator.
    fn map_collaborator_row(row: &Row) -> rusqlite::Result<Collaborator> {
        let role_str: String = row.get(3)?;
        let role = role_str.parse::<CollaboratorRole>().map_err(|_| {
            rusqlite::Error::FromSqlConversionFailure(
                3,
                rusqlite::types::Type::Text,
                format!("bad collaborator role: {role_str}").into(),
            )
        })?;

        Ok(Collaborator {
            id: row.get(0)?,
            alias_id: row.get(1)?,
            user_id: row.get(2)?,
            role,
            added_at: row.get(4)?,
        })
    }
}
