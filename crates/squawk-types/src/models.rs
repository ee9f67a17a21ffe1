use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Username that is allowed to delete posts.
pub const ADMIN_USERNAME: &str = "admin";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.username == ADMIN_USERNAME
    }
}

/// A user together with the stored password hash. Never leaves the server.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub user: User,
    pub password_hash: String,
}

/// A generated post as stored in the feed.
///
/// `score` is the cached tally of the post's votes. It stays `None` until
/// the first vote arrives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub text: String,
    pub prompt: Option<String>,
    pub temperature: Option<f64>,
    pub generated_by: String,
    pub score: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// Everything needed to insert a post; ids and timestamps come from storage.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub text: String,
    pub prompt: Option<String>,
    pub temperature: Option<f64>,
    pub generated_by: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VoteValue {
    Up,
    Down,
}

impl VoteValue {
    /// Contribution of this vote to a post's score.
    pub fn delta(self) -> i64 {
        match self {
            VoteValue::Up => 1,
            VoteValue::Down => -1,
        }
    }

    pub fn from_delta(delta: i64) -> Option<Self> {
        match delta {
            1 => Some(VoteValue::Up),
            -1 => Some(VoteValue::Down),
            _ => None,
        }
    }
}

/// One entry in the vote ledger. `voter` is the voter's username.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub id: i64,
    pub post_id: i64,
    pub voter: String,
    pub value: VoteValue,
    pub created_at: DateTime<Utc>,
}

/// Randomness levels offered by the post form.
///
/// The generator receives `level / 10` as its temperature, so the extreme
/// level hands it 9.9.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Level {
    Normal,
    ColadUp,
    Maganificent,
    SleepDeprived,
    Lunacy,
}

impl Level {
    pub const ALL: [Level; 5] = [
        Level::Normal,
        Level::ColadUp,
        Level::Maganificent,
        Level::SleepDeprived,
        Level::Lunacy,
    ];

    pub const DEFAULT: Level = Level::Maganificent;

    pub fn value(self) -> u8 {
        match self {
            Level::Normal => 1,
            Level::ColadUp => 3,
            Level::Maganificent => 5,
            Level::SleepDeprived => 7,
            Level::Lunacy => 99,
        }
    }

    pub fn from_value(value: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|level| level.value() == value)
    }

    pub fn label(self) -> &'static str {
        match self {
            Level::Normal => "Relatively Normal",
            Level::ColadUp => "Cola'd-up",
            Level::Maganificent => "MAGAnificent",
            Level::SleepDeprived => "Sleep Deprived",
            Level::Lunacy => "Complete Lunacy",
        }
    }

    pub fn temperature(self) -> f64 {
        f64::from(self.value()) / 10.0
    }
}
