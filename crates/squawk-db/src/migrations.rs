use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            username    TEXT NOT NULL UNIQUE,
            email       TEXT NOT NULL UNIQUE,
            password    TEXT NOT NULL,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS posts (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            text          TEXT NOT NULL,
            prompt        TEXT,
            temperature   REAL,
            generated_by  TEXT NOT NULL,
            score         INTEGER,
            created_at    TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- One vote per voter per post, enforced here rather than by callers.
        CREATE TABLE IF NOT EXISTS votes (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            post_id     INTEGER NOT NULL REFERENCES posts(id),
            voter       TEXT NOT NULL,
            value       INTEGER NOT NULL CHECK (value IN (1, -1)),
            created_at  TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE(post_id, voter)
        );

        CREATE INDEX IF NOT EXISTS idx_votes_post
            ON votes(post_id);
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
