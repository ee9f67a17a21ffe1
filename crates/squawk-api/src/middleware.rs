use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use jsonwebtoken::{DecodingKey, Validation, decode};
use squawk_db::UserRepository;
use squawk_types::api::Claims;
use squawk_types::models::User;
use tracing::debug;

use crate::error::{ApiError, Result};
use crate::{AppState, blocking};

pub const SESSION_COOKIE: &str = "squawk_session";

/// Who is making the request. Resolved once per request by
/// [`resolve_session`] and handed to handlers as an extension.
#[derive(Debug, Clone, Default)]
pub struct Session(pub Option<User>);

impl Session {
    pub fn user(&self) -> Option<&User> {
        self.0.as_ref()
    }

    /// The logged-in user, or `Forbidden`.
    pub fn require(&self) -> Result<&User> {
        self.user().ok_or(ApiError::Forbidden)
    }

    pub fn username(&self) -> Option<String> {
        self.user().map(|u| u.username.clone())
    }
}

/// Turn the session cookie into a [`Session`] extension.
///
/// A missing, forged or expired token, or one naming a user that no longer
/// exists, yields an anonymous session rather than an error.
pub async fn resolve_session(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Result<Response> {
    let claims = jar
        .get(SESSION_COOKIE)
        .and_then(|cookie| decode_token(&state.jwt_secret, cookie.value()));

    let user = match claims {
        Some(claims) => blocking(&state, move |db| db.get_user_by_id(claims.sub)).await?,
        None => None,
    };

    req.extensions_mut().insert(Session(user));
    Ok(next.run(req).await)
}

pub fn decode_token(secret: &str, token: &str) -> Option<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| debug!("Rejected session token: {}", e))
    .ok()
    .map(|data| data.claims)
}

pub fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}
