use axum::{
    Extension,
    extract::State,
    response::Redirect,
};
use tracing::{debug, warn};

use squawk_db::{VoteOutcome, VoteRepository};
use squawk_types::models::VoteValue;

use crate::error::{ApiError, Result};
use crate::extract::PostId;
use crate::middleware::Session;
use crate::{AppState, blocking};

pub async fn upvote(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    PostId(post_id): PostId,
) -> Result<Redirect> {
    cast(&state, &session, post_id, VoteValue::Up).await
}

pub async fn downvote(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    PostId(post_id): PostId,
) -> Result<Redirect> {
    cast(&state, &session, post_id, VoteValue::Down).await
}

async fn cast(
    state: &AppState,
    session: &Session,
    post_id: i64,
    value: VoteValue,
) -> Result<Redirect> {
    let voter = session.require()?.username.clone();

    let outcome = {
        let voter = voter.clone();
        blocking(state, move |db| db.record_vote(&voter, post_id, value)).await?
    };

    match outcome {
        VoteOutcome::Recorded(vote) => {
            debug!("{} voted {:?} on post {}", vote.voter, vote.value, vote.post_id);
            Ok(Redirect::to("/"))
        }
        VoteOutcome::AlreadyVoted => {
            warn!("{} already voted on post {}", voter, post_id);
            Err(ApiError::Forbidden)
        }
        VoteOutcome::UnknownPost => Err(ApiError::NotFound),
    }
}
