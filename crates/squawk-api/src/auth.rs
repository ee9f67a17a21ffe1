use anyhow::anyhow;
use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{
    Extension, Form, Json,
    extract::State,
    response::Redirect,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use jsonwebtoken::{EncodingKey, Header, encode};
use tracing::{info, warn};

use squawk_db::{Database, Registration, UserRepository};
use squawk_types::api::{Claims, FormPage, LoginForm, RegisterForm};
use squawk_types::flash::Flash;
use squawk_types::models::{ADMIN_USERNAME, User};

use crate::error::Result;
use crate::middleware::{SESSION_COOKIE, Session, session_cookie};
use crate::{AppState, blocking, flash};

const ADMIN_EMAIL: &str = "admin@example.com";

pub async fn register_page(
    Extension(session): Extension<Session>,
    jar: CookieJar,
) -> (CookieJar, Json<FormPage>) {
    form_page(jar, &session, "Register", &["username", "email", "password"])
}

pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<RegisterForm>,
) -> Result<(CookieJar, Redirect)> {
    if let Err(problem) = form.validate() {
        return Ok(flash::redirect(jar, problem, "/register"));
    }

    let username = form.username.trim().to_string();
    let email = form.email.trim().to_string();
    let password = form.password;

    let outcome = blocking(&state, move |db| {
        let password_hash = hash_password(&password)?;
        db.create_user(&username, &email, &password_hash)
    })
    .await?;

    Ok(match outcome {
        Registration::Created(user) => {
            info!("Registered user {} (id {})", user.username, user.id);
            flash::redirect(jar, Flash::Registered, "/login")
        }
        Registration::UsernameTaken => flash::redirect(jar, Flash::UsernameTaken, "/register"),
        Registration::EmailTaken => flash::redirect(jar, Flash::EmailTaken, "/register"),
    })
}

pub async fn login_page(
    Extension(session): Extension<Session>,
    jar: CookieJar,
) -> (CookieJar, Json<FormPage>) {
    form_page(jar, &session, "Please log in", &["username", "password"])
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<(CookieJar, Redirect)> {
    if let Err(problem) = form.validate() {
        return Ok(flash::redirect(jar, problem, "/login"));
    }

    let username = form.username.trim().to_string();
    let password = form.password;

    // Unknown user and wrong password look the same from here on.
    let user = blocking(&state, move |db| {
        let Some(creds) = db.get_user_by_username(&username)? else {
            return Ok(None);
        };
        Ok(verify_password(&creds.password_hash, &password).then_some(creds.user))
    })
    .await?;

    let Some(user) = user else {
        warn!("Login failed");
        return Ok(flash::redirect(jar, Flash::LoginFailed, "/login"));
    };

    let token = create_token(&state.jwt_secret, &user, state.session_days)?;
    info!("User {} logged in", user.username);

    let jar = jar.add(session_cookie(token));
    Ok(flash::redirect(jar, Flash::LoggedIn, "/"))
}

pub async fn logout(jar: CookieJar) -> (CookieJar, Redirect) {
    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    flash::redirect(jar, Flash::LoggedOut, "/login")
}

/// Create the `admin` account unless it already exists.
/// Returns true when a new account was created.
pub fn seed_admin(db: &Database, password: &str) -> anyhow::Result<bool> {
    if db.get_user_by_username(ADMIN_USERNAME)?.is_some() {
        return Ok(false);
    }

    let password_hash = hash_password(password)?;
    match db.create_user(ADMIN_USERNAME, ADMIN_EMAIL, &password_hash)? {
        Registration::Created(_) => {
            info!("Seeded {} account", ADMIN_USERNAME);
            Ok(true)
        }
        // The email is held by someone else; leave it alone.
        Registration::EmailTaken => {
            warn!("Could not seed {} account: {} already registered", ADMIN_USERNAME, ADMIN_EMAIL);
            Ok(false)
        }
        // Registered concurrently between the lookup and the insert.
        Registration::UsernameTaken => {
            info!("{} account already exists", ADMIN_USERNAME);
            Ok(false)
        }
    }
}

fn form_page(
    jar: CookieJar,
    session: &Session,
    title: &str,
    fields: &[&str],
) -> (CookieJar, Json<FormPage>) {
    let (jar, flash) = flash::take(jar);
    (
        jar,
        Json(FormPage {
            title: title.to_string(),
            flash,
            current_user: session.username(),
            fields: fields.iter().map(|f| f.to_string()).collect(),
        }),
    )
}

/// Argon2id hash in PHC string format.
pub fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow!("password hashing failed: {}", e))?;
    Ok(hash.to_string())
}

pub fn verify_password(password_hash: &str, password: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(password_hash) else {
        warn!("Stored password hash is not a valid PHC string");
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

fn create_token(secret: &str, user: &User, days: i64) -> anyhow::Result<String> {
    let claims = Claims {
        sub: user.id,
        username: user.username.clone(),
        exp: (chrono::Utc::now() + chrono::Duration::days(days)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::decode_token;
    use chrono::Utc;

    #[test]
    fn password_hash_verifies_only_the_right_password() {
        let hash = hash_password("hunter2").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password(&hash, "hunter2"));
        assert!(!verify_password(&hash, "hunter3"));
        assert!(!verify_password("not-a-hash", "hunter2"));
    }

    #[test]
    fn token_round_trip_and_wrong_secret() {
        let user = User {
            id: 12,
            username: "alice".into(),
            email: "alice@example.com".into(),
            created_at: Utc::now(),
        };
        let token = create_token("secret", &user, 1).unwrap();

        let claims = decode_token("secret", &token).unwrap();
        assert_eq!(claims.sub, 12);
        assert_eq!(claims.username, "alice");
        assert!(decode_token("other-secret", &token).is_none());
    }

    #[test]
    fn expired_token_is_rejected() {
        let user = User {
            id: 1,
            username: "bob".into(),
            email: "bob@example.com".into(),
            created_at: Utc::now(),
        };
        let token = create_token("secret", &user, -2).unwrap();
        assert!(decode_token("secret", &token).is_none());
    }

    #[test]
    fn seed_admin_is_idempotent() {
        let db = Database::open_in_memory().unwrap();
        assert!(seed_admin(&db, "pw").unwrap());
        assert!(!seed_admin(&db, "pw").unwrap());
        assert_eq!(db.user_count().unwrap(), 1);

        let creds = db.get_user_by_username(ADMIN_USERNAME).unwrap().unwrap();
        assert!(creds.user.is_admin());
        assert!(verify_password(&creds.password_hash, "pw"));
    }

    #[test]
    fn seed_admin_leaves_a_taken_email_alone() {
        let db = Database::open_in_memory().unwrap();
        let hash = hash_password("pw").unwrap();
        db.create_user("mallory", ADMIN_EMAIL, &hash).unwrap();

        assert!(!seed_admin(&db, "pw").unwrap());
        assert!(db.get_user_by_username(ADMIN_USERNAME).unwrap().is_none());
        assert_eq!(db.user_count().unwrap(), 1);
    }
}
