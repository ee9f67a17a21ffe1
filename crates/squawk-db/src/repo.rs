use anyhow::Result;
use squawk_types::models::{Credentials, NewPost, Post, User, Vote, VoteValue};

use crate::models::{Registration, VoteOutcome};

/// Credential store.
pub trait UserRepository: Send + Sync {
    /// Insert a user unless the username or email is already taken.
    /// The username is checked first.
    fn create_user(&self, username: &str, email: &str, password_hash: &str) -> Result<Registration>;

    fn get_user_by_username(&self, username: &str) -> Result<Option<Credentials>>;

    fn get_user_by_id(&self, id: i64) -> Result<Option<User>>;

    fn user_count(&self) -> Result<u64>;
}

/// Post store. Posts are immutable apart from their cached score.
pub trait PostRepository: Send + Sync {
    fn insert_post(&self, post: &NewPost) -> Result<Post>;

    fn get_post(&self, id: i64) -> Result<Option<Post>>;

    /// Every post, newest first.
    fn list_posts(&self) -> Result<Vec<Post>>;

    fn set_score(&self, id: i64, score: Option<i64>) -> Result<()>;

    /// Remove a post and its votes. Returns false if no such post existed.
    fn delete_post(&self, id: i64) -> Result<bool>;
}

/// Vote ledger.
pub trait VoteRepository: Send + Sync {
    /// Append a vote for `voter` on `post_id`.
    ///
    /// The insert is conditional on the (post, voter) pair being new, and the
    /// post's cached score moves by the vote's delta in the same transaction.
    fn record_vote(&self, voter: &str, post_id: i64, value: VoteValue) -> Result<VoteOutcome>;

    /// Votes on a post in the order they were cast.
    fn votes_for(&self, post_id: i64) -> Result<Vec<Vote>>;
}
