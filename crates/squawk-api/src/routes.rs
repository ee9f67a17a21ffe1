use axum::{Router, middleware, routing::get};

use crate::error::ApiError;
use crate::middleware::resolve_session;
use crate::{AppState, auth, posts, votes};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(posts::feed).post(posts::create_post))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", get(auth::logout))
        .route("/upvote/{post_id}", get(votes::upvote).post(votes::upvote))
        .route("/downvote/{post_id}", get(votes::downvote).post(votes::downvote))
        .route("/delete/{post_id}", get(posts::delete_post))
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(state.clone(), resolve_session))
        .with_state(state)
}

async fn not_found() -> ApiError {
    ApiError::NotFound
}
