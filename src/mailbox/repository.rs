//! Mailbox repository for Postmask.

use chrono::{DateTime, NaiveDateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};

use super::types::{Direction, MailboxEntry, NewMailboxEntry};
use crate::db::Database;
use crate::{PostmaskError, Result};

/// Repository for mailbox entry persistence.
pub struct MailboxRepository<'a> {
    db: &'a Database,
}

impl<'a> MailboxRepository<'a> {
    /// Create a new MailboxRepository with the given database reference.
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Create a new mailbox entry.
    pub fn create(&self, entry: &NewMailboxEntry) -> Result<MailboxEntry> {
        self.db.conn().execute(
            "INSERT INTO mailbox_entries
                 (alias_id, direction, counterpart, subject, body, is_reply,
                  reverse_alias_id, transport_id, sender_user_id)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                entry.alias_id,
                entry.direction.as_str(),
                entry.counterpart,
                entry.subject,
                entry.body,
                entry.is_reply as i32,
                entry.reverse_alias_id,
                entry.transport_id,
                entry.sender_user_id,
            ],
        )?;

        let id = self.db.conn().last_insert_rowid();
        self.get_by_id(id)?
            .ok_or_else(|| PostmaskError::NotFound("mailbox entry".to_string()))
    }

    /// Get an entry by ID.
    pub fn get_by_id(&self, id: i64) -> Result<Option<MailboxEntry>> {
        let entry = self
            .db
            .conn()
            .query_row(
                "SELECT id, alias_id, direction, counterpart, subject, body,
                        is_read, is_forwarded, is_reply, reverse_alias_id,
                        transport_id, sender_user_id, created_at
                 FROM mailbox_entries WHERE id = ?",
                [id],
                Self::map_row,
            )
            .optional()?;
        Ok(entry)
    }

    /// List entries for an alias, newest first.
    pub fn list_for_alias(&self, alias_id: i64) -> Result<Vec<MailboxEntry>> {
        let mut stmt = self.db.conn().prepare(
            "SELECT id, alias_id, direction, counterpart, subject, body,
                    is_read, is_forwarded, is_reply, reverse_alias_id,
                    transport_id, sender_user_id, created_at
             FROM mailbox_entries
             WHERE alias_id = ?
             ORDER BY created_at DESC, id DESC",
        )?;

        let entries: Vec<MailboxEntry> = stmt
            .query_map([alias_id], Self::map_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(entries)
    }

    /// Count entries for an alias.
    pub fn count_for_alias(&self, alias_id: i64) -> Result<i64> {
        let count = self.db.conn().query_row(
            "SELECT COUNT(*) FROM mailbox_entries WHERE alias_id = ?",
            [alias_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Count unread received entries for an alias.
    pub fn count_unread(&self, alias_id: i64) -> Result<i64> {
        let count = self.db.conn().query_row(
            "SELECT COUNT(*) FROM mailbox_entries
             WHERE alias_id = ? AND direction = 'received' AND is_read = 0",
            [alias_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Mark an entry as read.
    pub fn mark_read(&self, id: i64) -> Result<bool> {
        let rows = self
            .db
            .conn()
            .execute("UPDATE mailbox_entries SET is_read = 1 WHERE id = ?", [id])?;
        Ok(rows > 0)
    }

    /// Mark an entry as forwarded.
    pub fn mark_forwarded(&self, id: i64) -> Result<bool> {
        let rows = self.db.conn().execute(
            "UPDATE mailbox_entries SET is_forwarded = 1 WHERE id = ?",
            [id],
        )?;
        Ok(rows > 0)
    }

    /// Hard-delete an entry. Returns false if it did not exist.
    pub fn delete(&self, id: i64) -> Result<bool> {
        let rows = self
            .db
            .conn()
            .execute("DELETE FROM mailbox_entries WHERE id = ?", [id])?;
        Ok(rows > 0)
    }

    /// Map a database row to a MailboxEntry.
    fn map_row(row: &Row) -> rusqlite::Result<MailboxEntry> {
        let direction_str: String = row.get(2)?;
        let direction = direction_str.parse::<Direction>().map_err(|_| {
            rusqlite::Error::FromSqlConversionFailure(
                2,
                rusqlite::types::Type::Text,
                format!("bad direction: {direction_str}").into(),
            )
        })?;

        Ok(MailboxEntry {
            id: row.get(0)?,
            alias_id: row.get(1)?,
            direction,
            counterpart: row.get(3)?,
            subject: row.get(4)?,
            body: row.get(5)?,
            is_read: row.get::<_, i32>(6)? != 0,
            is_forwarded: row.get::<_, i32>(7)? != 0,
            is_reply: row.get::<_, i32>(8)? != 0,
            reverse_alias_id: row.get(9)?,
            transport_id: row.get(10)?,
            sender_user_id: row.get(11)?,
            created_at: parse_timestamp(&row.get::<_, String>(12)?),
        })
    }
}

/// Parse a stored timestamp.
///
/// SQLite's datetime('now') produces "YYYY-MM-DD HH:MM:SS"; RFC 3339 is
/// accepted too for rows written by other tooling.
fn parse_timestamp(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|_| Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (Database, i64) {
        let db = Database::open_in_memory().unwrap();
        let alias_id = {
            db.conn()
                .execute(
                    "INSERT INTO users (email, name) VALUES ('owner@example.com', 'Owner')",
                    [],
                )
                .unwrap();
            let user_id = db.conn().last_insert_rowid();
            db.conn()
                .execute(
                    "INSERT INTO aliases (user_id, local_part, address)
                     VALUES (?, 'sales', 'sales@m.test')",
                    [user_id],
                )
                .unwrap();
            db.conn().last_insert_rowid()
        };
        (db, alias_id)
    }

    #[test]
    fn test_create_received_entry() {
        let (db, alias_id) = setup();
        let repo = MailboxRepository::new(&db);

        let entry = repo
            .create(&NewMailboxEntry::received(
                alias_id,
                "ext@example.org",
                "Hello",
                "Body",
            ))
            .unwrap();

        assert!(entry.id > 0);
        assert_eq!(entry.direction, Direction::Received);
        assert!(!entry.is_read);
        assert!(!entry.is_forwarded);
        assert!(!entry.is_reply);
    }

    #[test]
    fn test_create_reply_entry_links_reverse() {
        let (db, alias_id) = setup();
        db.conn()
            .execute(
                "INSERT INTO reverse_aliases (reverse_id, alias_id, recipient_email, alias_address)
                 VALUES ('ra_x', ?, 'ext@example.org', 'sales@m.test')",
                [alias_id],
            )
            .unwrap();
        let reverse_id = db.conn().last_insert_rowid();

        let repo = MailboxRepository::new(&db);
        let entry = repo
            .create(&NewMailboxEntry::reply(
                alias_id,
                "ext@example.org",
                "Re: Hello",
                "Body",
                reverse_id,
            ))
            .unwrap();

        assert!(entry.is_reply);
        assert_eq!(entry.reverse_alias_id, Some(reverse_id));
    }

    #[test]
    fn test_list_newest_first() {
        let (db, alias_id) = setup();
        let repo = MailboxRepository::new(&db);

        repo.create(&NewMailboxEntry::received(alias_id, "a@x.com", "One", "B"))
            .unwrap();
        repo.create(&NewMailboxEntry::received(alias_id, "b@x.com", "Two", "B"))
            .unwrap();

        let entries = repo.list_for_alias(alias_id).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].subject, "Two");
        assert_eq!(entries[1].subject, "One");
    }

    #[test]
    fn test_flags() {
        let (db, alias_id) = setup();
        let repo = MailboxRepository::new(&db);

        let entry = repo
            .create(&NewMailboxEntry::received(alias_id, "a@x.com", "S", "B"))
            .unwrap();

        assert!(repo.mark_read(entry.id).unwrap());
        assert!(repo.mark_forwarded(entry.id).unwrap());

        let entry = repo.get_by_id(entry.id).unwrap().unwrap();
        assert!(entry.is_read);
        assert!(entry.is_forwarded);
    }

    #[test]
    fn test_count_unread() {
        let (db, alias_id) = setup();
        let repo = MailboxRepository::new(&db);

        let a = repo
            .create(&NewMailboxEntry::received(alias_id, "a@x.com", "S", "B"))
            .unwrap();
        repo.create(&NewMailboxEntry::received(alias_id, "b@x.com", "S", "B"))
            .unwrap();
        // Sent entries never count as unread
        repo.create(&NewMailboxEntry::sent(alias_id, "c@x.com", "S", "B", 1))
            .unwrap();

        assert_eq!(repo.count_unread(alias_id).unwrap(), 2);
        repo.mark_read(a.id).unwrap();
        assert_eq!(repo.count_unread(alias_id).unwrap(), 1);
    }

    #[test]
    fn test_hard_delete() {
        let (db, alias_id) = setup();
        let repo = MailboxRepository::new(&db);

        let entry = repo
            .create(&NewMailboxEntry::received(alias_id, "a@x.com", "S", "B"))
            .unwrap();

        assert!(repo.delete(entry.id).unwrap());
        assert!(repo.get_by_id(entry.id).unwrap().is_none());
        assert!(!repo.delete(entry.id).unwrap());
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let sqlite = parse_timestamp("2024-03-01 12:30:45");
        assert_eq!(sqlite.to_rfc3339(), "2024-03-01T12:30:45+00:00");

        let rfc = parse_timestamp("2024-03-01T12:30:45+00:00");
        assert_eq!(rfc, sqlite);
    }
}
