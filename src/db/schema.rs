//! Database schema and migrations for Postmask.
//!
//! This module contains all database migrations that will be applied
//! sequentially when the database is first opened or upgraded.

/// Database migrations.
///
/// Each migration is a SQL script that will be executed in order.
/// The schema_version table tracks which migrations have been applied.
pub const MIGRATIONS: &[&str] = &[
    // v1: Initial schema - users table
    r#"
-- Users table. Accounts are created by the external registration flow;
-- this core only reads identity, plan tier and the real address.
CREATE TABLE users (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    email       TEXT NOT NULL UNIQUE COLLATE NOCASE,
    name        TEXT NOT NULL,
    plan        TEXT NOT NULL DEFAULT 'free',  -- 'free' or 'pro'
    is_active   INTEGER NOT NULL DEFAULT 1,
    created_at  TEXT NOT NULL DEFAULT (datetime('now'))
);
"#,
    // v2: Aliases and collaborator membership
    r#"
-- Alias mailboxes. The address is derived (localpart@domain), lower-cased
-- and immutable once created.
CREATE TABLE aliases (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id          INTEGER NOT NULL REFERENCES users(id),
    local_part       TEXT NOT NULL,
    address          TEXT NOT NULL UNIQUE,
    is_collaborative INTEGER NOT NULL DEFAULT 0,
    is_active        INTEGER NOT NULL DEFAULT 1,
    emails_sent      INTEGER NOT NULL DEFAULT 0,
    emails_received  INTEGER NOT NULL DEFAULT 0,
    created_at       TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at       TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX idx_aliases_user_id ON aliases(user_id);

CREATE TABLE alias_collaborators (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    alias_id    INTEGER NOT NULL REFERENCES aliases(id) ON DELETE CASCADE,
    user_id     INTEGER NOT NULL REFERENCES users(id),
    role        TEXT NOT NULL DEFAULT 'member',  -- 'member' or 'viewer'
    added_at    TEXT NOT NULL DEFAULT (datetime('now')),
    UNIQUE(alias_id, user_id)
);

CREATE INDEX idx_collaborators_alias_id ON alias_collaborators(alias_id);
CREATE INDEX idx_collaborators_user_id ON alias_collaborators(user_id);
"#,
    // v3: Reverse aliases
    r#"
-- Minted addresses standing in for (alias, external recipient) pairs.
CREATE TABLE reverse_aliases (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    reverse_id      TEXT NOT NULL UNIQUE,
    alias_id        INTEGER NOT NULL REFERENCES aliases(id),
    recipient_email TEXT NOT NULL,
    alias_address   TEXT NOT NULL,
    emails_sent     INTEGER NOT NULL DEFAULT 0,
    emails_received INTEGER NOT NULL DEFAULT 0,
    is_active       INTEGER NOT NULL DEFAULT 1,
    created_at      TEXT NOT NULL DEFAULT (datetime('now')),
    last_used_at    TEXT,
    deactivated_at  TEXT
);

CREATE INDEX idx_reverse_aliases_alias_id ON reverse_aliases(alias_id);

-- At most one active mapping per (alias, recipient) pair. Concurrent mints
-- race into this index; the loser re-reads the winner.
CREATE UNIQUE INDEX ux_reverse_active_pair
    ON reverse_aliases(alias_id, recipient_email) WHERE is_active = 1;
"#,
    // v4: Mailbox entries
    r#"
-- One row per inbound or outbound message.
CREATE TABLE mailbox_entries (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    alias_id         INTEGER NOT NULL REFERENCES aliases(id),
    direction        TEXT NOT NULL,  -- 'sent' or 'received'
    counterpart      TEXT NOT NULL,
    subject          TEXT NOT NULL,
    body             TEXT NOT NULL,
    is_read          INTEGER NOT NULL DEFAULT 0,
    is_forwarded     INTEGER NOT NULL DEFAULT 0,
    is_reply         INTEGER NOT NULL DEFAULT 0,
    reverse_alias_id INTEGER REFERENCES reverse_aliases(id),
    transport_id     TEXT,
    sender_user_id   INTEGER REFERENCES users(id),
    created_at       TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX idx_mailbox_alias_id ON mailbox_entries(alias_id);
CREATE INDEX idx_mailbox_created_at ON mailbox_entries(created_at);
"#,
    // v5: Activity log
    r#"
-- Append-only audit trail for collaborative actions.
CREATE TABLE activity_log (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    alias_id       INTEGER NOT NULL REFERENCES aliases(id),
    action         TEXT NOT NULL,
    actor_user_id  INTEGER NOT NULL REFERENCES users(id),
    payload        TEXT,
    created_at     TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX idx_activity_alias_id ON activity_log(alias_id);
"#,
];
