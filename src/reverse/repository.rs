//! Reverse-alias repository for Postmask.

use rusqlite::{params, OptionalExtension, Row};

use super::types::ReverseAlias;
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

/// Repository for reverse-alias persistence.
pub struct ReverseAliasRepository<'a> {
    db: &'a Database,
}

impl<'a> ReverseAliasRepository<'a> {
    /// Create a new ReverseAliasRepository with the given database reference.
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Insert a new mapping.
    ///
    /// The partial unique index on (alias_id, recipient_email) where active
    /// turns a concurrent mint for the same pair into a conflict; callers
    /// re-read the winning row.
    pub fn insert(
        &self,
        reverse_id: &str,
        alias_id: i64,
        recipient_email: &str,
        alias_address: &str,
    ) -> Result<ReverseAlias> {
        self.db
            .conn()
            .execute(
                "INSERT INTO reverse_aliases (reverse_id, alias_id, recipient_email, alias_address)
                 VALUES (?, ?, ?, ?)",
                params![reverse_id, alias_id, recipient_email, alias_address],
            )
            .map_err(|e| {
                if is_unique_violation(&e) {
                    PostmaskError::Conflict(format!(
                        "active reverse alias already exists for {recipient_email}"
                    ))
                } else {
                    e.into()
                }
            })?;

        let id = self.db.conn().last_insert_rowid();
        self.get_by_id(id)?
            .ok_or_else(|| PostmaskError::NotFound("reverse alias".to_string()))
    }

    /// Get a mapping by row ID, regardless of state.
    pub fn get_by_id(&self, id: i64) -> Result<Option<ReverseAlias>> {
        let reverse = self
            .db
            .conn()
            .query_row(
                "SELECT id, reverse_id, alias_id, recipient_email, alias_address,
                        emails_sent, emails_received, is_active, created_at,
                        last_used_at, deactivated_at
                 FROM reverse_aliases WHERE id = ?",
                [id],
                Self::map_row,
            )
            .optional()?;
        Ok(reverse)
    }

    /// Resolve an *active* mapping by its opaque identifier.
    ///
    /// Inactive mappings do not resolve; the inbound router treats them as
    /// unknown recipients.
    pub fn resolve_active(&self, reverse_id: &str) -> Result<Option<ReverseAlias>> {
        let reverse = self
            .db
            .conn()
            .query_row(
                "SELECT id, reverse_id, alias_id, recipient_email, alias_address,
                        emails_sent, emails_received, is_active, created_at,
                        last_used_at, deactivated_at
                 FROM reverse_aliases WHERE reverse_id = ? AND is_active = 1",
                [reverse_id],
                Self::map_row,
            )
            .optional()?;
        Ok(reverse)
    }

    /// Find the active mapping for an (alias, recipient) pair.
    pub fn find_active_pair(
        &self,
        alias_id: i64,
        recipient_email: &str,
    ) -> Result<Option<ReverseAlias>> {
        let reverse = self
            .db
            .conn()
            .query_row(
                "SELECT id, reverse_id, alias_id, recipient_email, alias_address,
                        emails_sent, emails_received, is_active, created_at,
                        last_used_at, deactivated_at
                 FROM reverse_aliases
                 WHERE alias_id = ? AND recipient_email = ? AND is_active = 1",
                params![alias_id, recipient_email],
                Self::map_row,
            )
            .optional()?;
        Ok(reverse)
    }

    /// List all mappings for an alias, newest first.
    pub fn list_for_alias(&self, alias_id: i64) -> Result<Vec<ReverseAlias>> {
        let mut stmt = self.db.conn().prepare(
            "SELECT id, reverse_id, alias_id, recipient_email, alias_address,
                    emails_sent, emails_received, is_active, created_at,
                    last_used_at, deactivated_at
             FROM reverse_aliases
             WHERE alias_id = ?
             ORDER BY created_at DESC, id DESC",
        )?;

        let reverses: Vec<ReverseAlias> = stmt
            .query_map([alias_id], Self::map_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(reverses)
    }

    /// Record an outbound send through a mapping.
    pub fn record_outbound(&self, id: i64) -> Result<()> {
        self.db.conn().execute(
            "UPDATE reverse_aliases
             SET emails_sent = emails_sent + 1, last_used_at = datetime('now')
             WHERE id = ?",
            [id],
        )?;
        Ok(())
    }

    /// Record an inbound reply through a mapping.
    pub fn record_inbound(&self, id: i64) -> Result<()> {
        self.db.conn().execute(
            "UPDATE reverse_aliases
             SET emails_received = emails_received + 1, last_used_at = datetime('now')
             WHERE id = ?",
            [id],
        )?;
        Ok(())
    }

    /// Deactivate a mapping. Returns false if it did not exist.
    ///
    /// Reactivation is not supported; a later send to the same recipient
    /// mints a fresh identifier.
    pub fn deactivate(&self, id: i64) -> Result<bool> {
        let rows = self.db.conn().execute(
            "UPDATE reverse_aliases
             SET is_active = 0, deactivated_at = datetime('now')
             WHERE id = ? AND is_active = 1",
            [id],
        )?;
        Ok(rows > 0)
    }

    /// Map a database row to a ReverseAlias.
    fn map_row(row: &Row) -> rusqlite::Result<ReverseAlias> {
        Ok(ReverseAlias {
            id: row.get(0)?,
            reverse_id: row.get(1)?,
            alias_id: row.get(2)?,
            recipient_email: row.get(3)?,
            alias_address: row.get(4)?,
            emails_sent: row.get(5)?,
            emails_received: row.get(6)?,
            is_active: row.get::<_, i32>(7)? != 0,
            created_at: row.get(8)?,
            last_used_at: row.get(9)?,
            deactivated_at: row.get(10)?,
        })
    }
}
