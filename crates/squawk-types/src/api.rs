use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::flash::Flash;
use crate::models::{Level, Post};

// -- Session claims --

/// Claims carried in the signed session cookie. `sub` is the user id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub username: String,
    pub exp: usize,
}

// -- Forms --

#[derive(Debug, Default, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl RegisterForm {
    /// Field checks, in the order the form shows them.
    pub fn validate(&self) -> Result<(), Flash> {
        if self.username.trim().is_empty() {
            return Err(Flash::UsernameRequired);
        }
        if !looks_like_email(&self.email) {
            return Err(Flash::EmailInvalid);
        }
        if self.password.is_empty() {
            return Err(Flash::PasswordRequired);
        }
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> Result<(), Flash> {
        if self.username.trim().is_empty() {
            return Err(Flash::UsernameRequired);
        }
        if self.password.is_empty() {
            return Err(Flash::PasswordRequired);
        }
        Ok(())
    }
}

/// Post creation form. Both fields are optional; a blank prompt counts as none.
#[derive(Debug, Default, Deserialize)]
pub struct PostForm {
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub level: Option<String>,
}

impl PostForm {
    pub fn prompt(&self) -> Option<String> {
        self.prompt
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
    }

    /// `Ok(None)` when no level was submitted, `Err` when it is not one of
    /// the offered choices.
    pub fn level(&self) -> Result<Option<Level>, Flash> {
        let Some(raw) = self.level.as_deref().map(str::trim).filter(|l| !l.is_empty()) else {
            return Ok(None);
        };
        raw.parse::<u8>()
            .ok()
            .and_then(Level::from_value)
            .map(Some)
            .ok_or(Flash::LevelInvalid)
    }
}

fn looks_like_email(email: &str) -> bool {
    let email = email.trim();
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !email.contains(char::is_whitespace)
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
}

// -- Pages --

#[derive(Debug, Serialize, Deserialize)]
pub struct FormPage {
    pub title: String,
    pub flash: Option<String>,
    pub current_user: Option<String>,
    pub fields: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LevelChoice {
    pub value: u8,
    pub label: String,
    pub selected: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PostView {
    pub id: i64,
    pub text: String,
    pub prompt: Option<String>,
    pub temperature: Option<f64>,
    pub generated_by: String,
    pub score: Option<i64>,
    pub created_at: DateTime<Utc>,
    /// `HH:MM:SS DD.MM.YYYY`, the way the feed displays it.
    pub posted_at: String,
}

impl From<Post> for PostView {
    fn from(post: Post) -> Self {
        Self {
            posted_at: post.created_at.format("%H:%M:%S %d.%m.%Y").to_string(),
            id: post.id,
            text: post.text,
            prompt: post.prompt,
            temperature: post.temperature,
            generated_by: post.generated_by,
            score: post.score,
            created_at: post.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FeedPage {
    pub title: String,
    pub flash: Option<String>,
    pub current_user: Option<String>,
    pub levels: Vec<LevelChoice>,
    pub posts: Vec<PostView>,
}

impl FeedPage {
    pub fn level_choices() -> Vec<LevelChoice> {
        Level::ALL
            .into_iter()
            .map(|level| LevelChoice {
                value: level.value(),
                label: level.label().to_string(),
                selected: level == Level::DEFAULT,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_shapes() {
        assert!(looks_like_email("alice@example.com"));
        assert!(looks_like_email("a.b@mail.example.org"));
        assert!(!looks_like_email(""));
        assert!(!looks_like_email("alice"));
        assert!(!looks_like_email("@example.com"));
        assert!(!looks_like_email("alice@localhost"));
        assert!(!looks_like_email("alice@@example.com"));
        assert!(!looks_like_email("al ice@example.com"));
    }

    #[test]
    fn register_form_reports_first_bad_field() {
        let form = RegisterForm {
            username: " ".into(),
            email: "nope".into(),
            password: String::new(),
        };
        assert_eq!(form.validate(), Err(Flash::UsernameRequired));

        let form = RegisterForm {
            username: "alice".into(),
            email: "alice@example.com".into(),
            password: String::new(),
        };
        assert_eq!(form.validate(), Err(Flash::PasswordRequired));
    }

    #[test]
    fn post_form_blank_fields_are_absent() {
        let form = PostForm {
            prompt: Some("   ".into()),
            level: Some(String::new()),
        };
        assert_eq!(form.prompt(), None);
        assert_eq!(form.level(), Ok(None));
    }

    #[test]
    fn post_form_level_must_be_a_choice() {
        let form = PostForm {
            prompt: Some(" hello ".into()),
            level: Some("99".into()),
        };
        assert_eq!(form.prompt().as_deref(), Some("hello"));
        assert_eq!(form.level(), Ok(Some(Level::Lunacy)));

        let form = PostForm {
            prompt: None,
            level: Some("4".into()),
        };
        assert_eq!(form.level(), Err(Flash::LevelInvalid));
    }

    #[test]
    fn post_view_formats_timestamp() {
        let created_at = DateTime::parse_from_rfc3339("2024-03-09T14:05:07Z")
            .unwrap()
            .with_timezone(&Utc);
        let view = PostView::from(Post {
            id: 3,
            text: "hi".into(),
            prompt: None,
            temperature: Some(0.5),
            generated_by: "markov".into(),
            score: None,
            created_at,
        });
        assert_eq!(view.posted_at, "14:05:07 09.03.2024");
    }
}
