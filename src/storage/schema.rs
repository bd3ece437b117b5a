//! Database schema definitions

/// SQL schema for the relay database
pub const SCHEMA_SQL: &str = r#"
-- Upstream catalog, one row per group a backend advertises
CREATE TABLE IF NOT EXISTS subscriptions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    high INTEGER NOT NULL DEFAULT 0,
    low INTEGER NOT NULL DEFAULT 0,
    type TEXT NOT NULL,
    source TEXT NOT NULL,
    UNIQUE(name, type, source)
);

-- Locally materialized working set
CREATE TABLE IF NOT EXISTS groups (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    source TEXT NOT NULL,
    low INTEGER NOT NULL DEFAULT 0,
    high INTEGER NOT NULL DEFAULT 0,
    UNIQUE(name, source)
);

CREATE TABLE IF NOT EXISTS articles (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    group_name TEXT NOT NULL,
    group_source TEXT NOT NULL,
    number INTEGER NOT NULL,
    message_id TEXT NOT NULL DEFAULT '',
    headers TEXT NOT NULL,                -- JSON array of [name, value] pairs
    body BLOB NOT NULL,
    bytes INTEGER NOT NULL,
    lines INTEGER NOT NULL,
    UNIQUE(group_name, group_source, number)
);

CREATE INDEX IF NOT EXISTS idx_articles_message_id
    ON articles(group_name, group_source, message_id);

CREATE TABLE IF NOT EXISTS users (
    name TEXT PRIMARY KEY,
    pass_digest TEXT NOT NULL             -- blake3, hex encoded
);
"#;
