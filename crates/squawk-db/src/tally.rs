use std::str::FromStr;

use anyhow::{Result, bail};
use squawk_types::models::Post;
use squawk_types::tally::tally;
use tracing::debug;

use crate::repo::{PostRepository, VoteRepository};

/// When feed scores are brought up to date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TallyPolicy {
    /// Scores are maintained on every vote insert; reads trust the cache.
    #[default]
    Incremental,
    /// Every post is recomputed from its votes on every feed read.
    Eager,
}

impl FromStr for TallyPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "incremental" => Ok(TallyPolicy::Incremental),
            "eager" => Ok(TallyPolicy::Eager),
            other => bail!("unknown tally policy '{}'", other),
        }
    }
}

/// Recompute `post`'s score from the ledger and store it.
///
/// A post with no votes keeps whatever score it had (normally none).
pub fn recompute_score<R>(repo: &R, post: &mut Post) -> Result<Option<i64>>
where
    R: PostRepository + VoteRepository + ?Sized,
{
    let votes = repo.votes_for(post.id)?;
    let score = tally(&votes);
    if score.is_some() {
        repo.set_score(post.id, score)?;
        post.score = score;
    }
    Ok(score)
}

/// Posts for the feed, newest first, with scores settled per `policy`.
pub fn feed<R>(repo: &R, policy: TallyPolicy) -> Result<Vec<Post>>
where
    R: PostRepository + VoteRepository + ?Sized,
{
    let mut posts = repo.list_posts()?;
    if policy == TallyPolicy::Eager {
        for post in &mut posts {
            recompute_score(repo, post)?;
        }
        debug!("Recomputed scores for {} posts", posts.len());
    }
    Ok(posts)
}
