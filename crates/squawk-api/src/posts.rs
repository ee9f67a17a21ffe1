use axum::{
    Extension, Form, Json,
    extract::State,
    response::Redirect,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::{info, warn};

use squawk_db::{PostRepository, tally};
use squawk_gen::GenerationRequest;
use squawk_types::api::{FeedPage, PostForm, PostView};
use squawk_types::models::{Level, NewPost};

use crate::error::{ApiError, Result};
use crate::extract::PostId;
use crate::middleware::Session;
use crate::{AppState, blocking, flash};

/// GET /: the feed, with scores settled according to the tally policy.
pub async fn feed(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<FeedPage>)> {
    let policy = state.tally_policy;
    let posts = blocking(&state, move |db| tally::feed(db, policy)).await?;

    let (jar, flash) = flash::take(jar);
    Ok((
        jar,
        Json(FeedPage {
            title: "The Greatest Main Page".to_string(),
            flash,
            current_user: session.username(),
            levels: FeedPage::level_choices(),
            posts: posts.into_iter().map(PostView::from).collect(),
        }),
    ))
}

/// POST /: generate a post. No login needed.
pub async fn create_post(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<PostForm>,
) -> Result<(CookieJar, Redirect)> {
    let level = match form.level() {
        Ok(level) => level,
        Err(problem) => return Ok(flash::redirect(jar, problem, "/")),
    };

    let request = GenerationRequest {
        prompt: form.prompt(),
        temperature: level.map(Level::temperature),
    };

    // Generator failures are not retried; they become a 500.
    let text = state.generator.generate(&request).await?;

    let new_post = NewPost {
        text,
        prompt: request.prompt,
        temperature: request.temperature,
        generated_by: state.generator.name().to_string(),
    };
    let post = blocking(&state, move |db| db.insert_post(&new_post)).await?;

    info!(
        "Created post {} (prompt: {:?}, temperature: {:?})",
        post.id, post.prompt, post.temperature
    );
    Ok((jar, Redirect::to("/")))
}

/// GET /delete/{post_id}: admin only.
pub async fn delete_post(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    PostId(post_id): PostId,
) -> Result<Redirect> {
    let user = session.require()?;
    if !user.is_admin() {
        warn!("User {} tried to delete post {}", user.username, post_id);
        return Err(ApiError::Forbidden);
    }

    let deleted = blocking(&state, move |db| db.delete_post(post_id)).await?;
    if !deleted {
        return Err(ApiError::NotFound);
    }

    info!("Post {} deleted by {}", post_id, user.username);
    Ok(Redirect::to("/"))
}
