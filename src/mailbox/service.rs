//! Mailbox service for Postmask.
//!
//! Access-guarded mailbox reads and deletions. All checks route through the
//! alias access guard, so a missing entry and an entry on an inaccessible
//! alias are indistinguishable to the caller.

use crate::alias::AliasService;
use crate::db::Database;
use crate::{PostmaskError, Result};

use super::repository::MailboxRepository;
use super::types::{Direction, MailboxEntry};

/// Service for mailbox operations.
pub struct MailboxService<'a> {
    db: &'a Database,
    domain: &'a str,
}

impl<'a> MailboxService<'a> {
    /// Create a new MailboxService over the given database and alias domain.
    pub fn new(db: &'a Database, domain: &'a str) -> Self {
        Self { db, domain }
    }

    /// List entries of an alias on behalf of a caller with read access.
    pub fn list_for_alias(&self, alias_id: i64, caller_id: i64) -> Result<Vec<MailboxEntry>> {
        AliasService::new(self.db, self.domain).get_for_read(alias_id, caller_id)?;
        MailboxRepository::new(self.db).list_for_alias(alias_id)
    }

    /// Get an entry on behalf of a caller with read access.
    ///
    /// Received entries are marked read on first view.
    pub fn get_entry(&self, entry_id: i64, caller_id: i64) -> Result<MailboxEntry> {
        let repo = MailboxRepository::new(self.db);
        let entry = repo
            .get_by_id(entry_id)?
            .ok_or_else(|| PostmaskError::NotFound("mailbox entry".to_string()))?;

        AliasService::new(self.db, self.domain)
            .get_for_read(entry.alias_id, caller_id)
            .map_err(|_| PostmaskError::NotFound("mailbox entry".to_string()))?;

        if entry.direction == Direction::Received && !entry.is_read {
            repo.mark_read(entry.id)?;
            return repo
                .get_by_id(entry.id)?
                .ok_or_else(|| PostmaskError::NotFound("mailbox entry".to_string()));
        }

        Ok(entry)
    }

    /// Hard-delete an entry on behalf of a caller with read access.
    pub fn delete_entry(&self, entry_id: i64, caller_id: i64) -> Result<()> {
        let repo = MailboxRepository::new(self.db);
        let entry = repo
            .get_by_id(entry_id)?
            .ok_or_else(|| PostmaskError::NotFound("mailbox entry".to_string()))?;

        AliasService::new(self.db, self.domain)
            .get_for_read(entry.alias_id, caller_id)
            .map_err(|_| PostmaskError::NotFound("mailbox entry".to_string()))?;

        repo.delete(entry.id)?;
        tracing::info!(entry = entry.id, alias = entry.alias_id, "mailbox entry deleted");
        Ok(())
    }
}
