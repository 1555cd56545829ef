//! SQLite schema and pool setup.
//!
//! The schema carries the integrity rules the rest of the crate relies on:
//! case-insensitive username uniqueness and conversation freshness are
//! enforced by triggers inside the writing transaction, and participant or
//! message rows disappear with their conversation/profile via cascades.
//! Timestamps are unix seconds assigned by SQLite so ordering stays
//! server-authoritative; row ids are UUIDv7 strings, which sort in
//! creation order and tie-break same-second rows.

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS profiles (
    id TEXT PRIMARY KEY,
    username TEXT NOT NULL,
    display_name TEXT NOT NULL,
    avatar_url TEXT,
    status TEXT NOT NULL DEFAULT 'offline' CHECK (status IN ('online','offline')),
    last_seen INTEGER NOT NULL DEFAULT (CAST(strftime('%s','now') AS INTEGER)),
    created_at INTEGER NOT NULL DEFAULT (CAST(strftime('%s','now') AS INTEGER))
);

CREATE INDEX IF NOT EXISTS idx_profiles_username
    ON profiles (username COLLATE NOCASE);

CREATE TABLE IF NOT EXISTS conversations (
    id TEXT PRIMARY KEY,
    title TEXT,
    is_group INTEGER NOT NULL DEFAULT 0,
    created_at INTEGER NOT NULL DEFAULT (CAST(strftime('%s','now') AS INTEGER)),
    updated_at INTEGER NOT NULL DEFAULT (CAST(strftime('%s','now') AS INTEGER))
);

CREATE INDEX IF NOT EXISTS idx_conversations_updated_at
    ON conversations (updated_at DESC);

CREATE TABLE IF NOT EXISTS conversation_participants (
    conversation_id TEXT NOT NULL REFERENCES conversations(id) ON DELETE CASCADE,
    profile_id TEXT NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
    joined_at INTEGER NOT NULL DEFAULT (CAST(strftime('%s','now') AS INTEGER)),
    PRIMARY KEY (conversation_id, profile_id)
);

CREATE INDEX IF NOT EXISTS idx_participants_profile
    ON conversation_participants (profile_id);

CREATE TABLE IF NOT EXISTS messages (
    id TEXT PRIMARY KEY,
    conversation_id TEXT NOT NULL REFERENCES conversations(id) ON DELETE CASCADE,
    sender_id TEXT NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
    content TEXT NOT NULL,
    kind TEXT NOT NULL DEFAULT 'text' CHECK (kind IN ('text','image','file','audio')),
    file_url TEXT,
    is_read INTEGER NOT NULL DEFAULT 0,
    created_at INTEGER NOT NULL DEFAULT (CAST(strftime('%s','now') AS INTEGER))
);

CREATE INDEX IF NOT EXISTS idx_messages_conversation
    ON messages (conversation_id, id);

CREATE TRIGGER IF NOT EXISTS trg_profiles_username_insert
BEFORE INSERT ON profiles
FOR EACH ROW
WHEN EXISTS (
    SELECT 1 FROM profiles WHERE username = NEW.username COLLATE NOCASE
)
BEGIN
    SELECT RAISE(ABORT, 'username already taken');
END;

CREATE TRIGGER IF NOT EXISTS trg_profiles_username_update
BEFORE UPDATE OF username ON profiles
FOR EACH ROW
WHEN EXISTS (
    SELECT 1 FROM profiles
    WHERE username = NEW.username COLLATE NOCASE AND id <> NEW.id
)
BEGIN
    SELECT RAISE(ABORT, 'username already taken');
END;

CREATE TRIGGER IF NOT EXISTS trg_messages_touch_conversation
AFTER INSERT ON messages
BEGIN
    UPDATE conversations
    SET updated_at = CAST(strftime('%s','now') AS INTEGER)
    WHERE id = NEW.conversation_id;
END;
"#;

pub async fn connect(url: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(url)?
        .create_if_missing(true)
        .foreign_keys(true);

    SqlitePoolOptions::new()
        .max_connections(16)
        .connect_with(options)
        .await
}

/// Single-connection in-memory pool. A `:memory:` database lives and dies
/// with its connection, so the pool must never open a second one or let
/// the first go idle.
pub async fn connect_memory() -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;
    init_schema(&pool).await?;
    Ok(pool)
}

pub async fn init_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::raw_sql(SCHEMA).execute(pool).await?;
    Ok(())
}
