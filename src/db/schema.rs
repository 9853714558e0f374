//! Database schema and migrations for filevault.
//!
//! Migrations are applied in order when the database is opened; the
//! `schema_version` table records which ones have run.

/// Database migrations.
pub const MIGRATIONS: &[&str] = &[
    // v1: entries (files and folders)
    r#"
CREATE TABLE entries (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    owner_id    INTEGER NOT NULL,
    name        TEXT NOT NULL CHECK (length(name) > 0),
    entry_type  TEXT NOT NULL CHECK (entry_type IN ('folder', 'file', 'image')),
    is_public   INTEGER NOT NULL DEFAULT 0,
    parent_id   INTEGER REFERENCES entries(id),
    content_id  TEXT,                    -- BlobStore key, NULL for folders
    created_at  TEXT NOT NULL DEFAULT (datetime('now')),
    CHECK ((entry_type = 'folder') = (content_id IS NULL))
);

CREATE INDEX idx_entries_owner_parent ON entries(owner_id, parent_id, id);
CREATE UNIQUE INDEX idx_entries_content_id ON entries(content_id);

CREATE TRIGGER entries_content_id_immutable
BEFORE UPDATE OF content_id ON entries
WHEN OLD.content_id IS NOT NEW.content_id
BEGIN
    SELECT RAISE(ABORT, 'content_id is immutable');
END;
"#,
    // v2: sessions written by the external login service
    r#"
CREATE TABLE sessions (
    token       TEXT PRIMARY KEY,
    user_id     INTEGER NOT NULL,
    expires_at  TEXT NOT NULL,           -- UTC, 'YYYY-MM-DD HH:MM:SS'
    created_at  TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX idx_sessions_user_id ON sessions(user_id);
CREATE INDEX idx_sessions_expires_at ON sessions(expires_at);
"#,
];
