use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use tracing::debug;

use crate::error::ApiError;

/// Numeric `{post_id}` path segment. Anything that is not an integer is
/// treated as a page that does not exist.
#[derive(Debug, Clone, Copy)]
pub struct PostId(pub i64);

impl<S> FromRequestParts<S> for PostId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<i64>::from_request_parts(parts, state).await {
            Ok(Path(id)) => Ok(PostId(id)),
            Err(rejection) => {
                debug!("Unroutable post id in {}: {}", parts.uri.path(), rejection);
                Err(ApiError::NotFound)
            }
        }
    }
}
