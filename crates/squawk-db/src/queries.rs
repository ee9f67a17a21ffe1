use anyhow::Result;
use chrono::Utc;
use rusqlite::{Connection, Row, ToSql};
use squawk_types::models::{Credentials, NewPost, Post, User, Vote, VoteValue};
use tracing::debug;

use crate::Database;
use crate::models::{Registration, VoteOutcome};
use crate::repo::{PostRepository, UserRepository, VoteRepository};

const USER_COLUMNS: &str = "id, username, email, password, created_at";
const POST_COLUMNS: &str = "id, text, prompt, temperature, generated_by, score, created_at";
const VOTE_COLUMNS: &str = "id, post_id, voter, value, created_at";

// -- Users --

impl UserRepository for Database {
    fn create_user(&self, username: &str, email: &str, password_hash: &str) -> Result<Registration> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            if exists(&tx, "SELECT 1 FROM users WHERE username = ?1", username)? {
                return Ok(Registration::UsernameTaken);
            }
            if exists(&tx, "SELECT 1 FROM users WHERE email = ?1", email)? {
                return Ok(Registration::EmailTaken);
            }

            let created_at = Utc::now();
            tx.execute(
                "INSERT INTO users (username, email, password, created_at) VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![username, email, password_hash, created_at],
            )?;
            let id = tx.last_insert_rowid();
            tx.commit()?;

            Ok(Registration::Created(User {
                id,
                username: username.to_string(),
                email: email.to_string(),
                created_at,
            }))
        })
    }

    fn get_user_by_username(&self, username: &str) -> Result<Option<Credentials>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?1");
            conn.query_row(&sql, [username], |row| {
                Ok(Credentials {
                    user: user_from_row(row)?,
                    password_hash: row.get(3)?,
                })
            })
            .optional()
        })
    }

    fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1");
            conn.query_row(&sql, [id], user_from_row).optional()
        })
    }

    fn user_count(&self) -> Result<u64> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
            Ok(u64::try_from(count)?)
        })
    }
}

// -- Posts --

impl PostRepository for Database {
    fn insert_post(&self, post: &NewPost) -> Result<Post> {
        self.with_conn_mut(|conn| {
            let created_at = Utc::now();
            conn.execute(
                "INSERT INTO posts (text, prompt, temperature, generated_by, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![
                    post.text,
                    post.prompt,
                    post.temperature,
                    post.generated_by,
                    created_at
                ],
            )?;

            Ok(Post {
                id: conn.last_insert_rowid(),
                text: post.text.clone(),
                prompt: post.prompt.clone(),
                temperature: post.temperature,
                generated_by: post.generated_by.clone(),
                score: None,
                created_at,
            })
        })
    }

    fn get_post(&self, id: i64) -> Result<Option<Post>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {POST_COLUMNS} FROM posts WHERE id = ?1");
            conn.query_row(&sql, [id], post_from_row).optional()
        })
    }

    fn list_posts(&self) -> Result<Vec<Post>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {POST_COLUMNS} FROM posts ORDER BY id DESC");
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([], post_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    fn set_score(&self, id: i64, score: Option<i64>) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "UPDATE posts SET score = ?1 WHERE id = ?2",
                rusqlite::params![score, id],
            )?;
            Ok(())
        })
    }

    fn delete_post(&self, id: i64) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let votes = tx.execute("DELETE FROM votes WHERE post_id = ?1", [id])?;
            let posts = tx.execute("DELETE FROM posts WHERE id = ?1", [id])?;
            tx.commit()?;

            debug!("Deleted post {} ({} votes)", id, votes);
            Ok(posts > 0)
        })
    }
}

// -- Votes --

impl VoteRepository for Database {
    fn record_vote(&self, voter: &str, post_id: i64, value: VoteValue) -> Result<VoteOutcome> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            if !exists(&tx, "SELECT 1 FROM posts WHERE id = ?1", post_id)? {
                return Ok(VoteOutcome::UnknownPost);
            }

            // UNIQUE(post_id, voter) turns a second vote into a no-op insert.
            let created_at = Utc::now();
            let inserted = tx.execute(
                "INSERT INTO votes (post_id, voter, value, created_at) VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(post_id, voter) DO NOTHING",
                rusqlite::params![post_id, voter, value.delta(), created_at],
            )?;
            if inserted == 0 {
                return Ok(VoteOutcome::AlreadyVoted);
            }
            let id = tx.last_insert_rowid();

            tx.execute(
                "UPDATE posts SET score = COALESCE(score, 0) + ?1 WHERE id = ?2",
                rusqlite::params![value.delta(), post_id],
            )?;
            tx.commit()?;

            Ok(VoteOutcome::Recorded(Vote {
                id,
                post_id,
                voter: voter.to_string(),
                value,
                created_at,
            }))
        })
    }

    fn votes_for(&self, post_id: i64) -> Result<Vec<Vote>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {VOTE_COLUMNS} FROM votes WHERE post_id = ?1 ORDER BY id");
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([post_id], vote_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

fn exists(conn: &Connection, sql: &str, param: impl ToSql) -> Result<bool> {
    Ok(conn.query_row(sql, [param], |_| Ok(())).optional()?.is_some())
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        created_at: row.get(4)?,
    })
}

fn post_from_row(row: &Row<'_>) -> rusqlite::Result<Post> {
    Ok(Post {
        id: row.get(0)?,
        text: row.get(1)?,
        prompt: row.get(2)?,
        temperature: row.get(3)?,
        generated_by: row.get(4)?,
        score: row.get(5)?,
        created_at: row.get(6)?,
    })
}

fn vote_from_row(row: &Row<'_>) -> rusqlite::Result<Vote> {
    let raw: i64 = row.get(3)?;
    let value = VoteValue::from_delta(raw).ok_or(rusqlite::Error::IntegralValueOutOfRange(3, raw))?;
    Ok(Vote {
        id: row.get(0)?,
        post_id: row.get(1)?,
        voter: row.get(2)?,
        value,
        created_at: row.get(4)?,
    })
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
