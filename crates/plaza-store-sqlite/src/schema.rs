//! SQL schema for the Plaza SQLite store.
//!
//! Executed once at connection startup. Migrations are out of scope; the
//! `user_version` pragma records which layout a file was created with.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    email           TEXT    NOT NULL UNIQUE,   -- at most 120 chars
    password        TEXT    NOT NULL,          -- opaque credential
    is_active       INTEGER NOT NULL,
    username        TEXT    NOT NULL UNIQUE,   -- at most 50 chars
    full_name       TEXT,                      -- at most 100 chars
    bio             TEXT,
    profile_picture TEXT,                      -- at most 255 chars
    created_at      TEXT    NOT NULL           -- RFC 3339 UTC, microseconds
);

-- Posts and comments are append-only.
CREATE TABLE IF NOT EXISTS posts (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    image_url   TEXT    NOT NULL,
    description TEXT,
    created_at  TEXT    NOT NULL,
    user_id     INTEGER NOT NULL REFERENCES users(id)
);

CREATE TABLE IF NOT EXISTS comments (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    content    TEXT    NOT NULL,
    created_at TEXT    NOT NULL,
    user_id    INTEGER NOT NULL REFERENCES users(id),
    post_id    INTEGER NOT NULL REFERENCES posts(id)
);

-- \"follower_id follows user_id\".
CREATE TABLE IF NOT EXISTS followers (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id     INTEGER NOT NULL REFERENCES users(id),
    follower_id INTEGER NOT NULL REFERENCES users(id),
    UNIQUE (user_id, follower_id),
    CHECK  (user_id != follower_id)
);

CREATE INDEX IF NOT EXISTS posts_author_time_idx  ON posts(user_id, created_at, id);
CREATE INDEX IF NOT EXISTS comments_post_idx      ON comments(post_id);
CREATE INDEX IF NOT EXISTS followers_follower_idx ON followers(follower_id);

PRAGMA user_version = 2;
";
