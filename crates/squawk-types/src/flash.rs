/// One-shot messages shown on the next page after a redirect.
///
/// Only the short code travels in the cookie; the text is looked up when the
/// page is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flash {
    UsernameTaken,
    EmailTaken,
    Registered,
    LoginFailed,
    LoggedIn,
    LoggedOut,
    UsernameRequired,
    EmailInvalid,
    PasswordRequired,
    LevelInvalid,
}

impl Flash {
    const ALL: [Flash; 10] = [
        Flash::UsernameTaken,
        Flash::EmailTaken,
        Flash::Registered,
        Flash::LoginFailed,
        Flash::LoggedIn,
        Flash::LoggedOut,
        Flash::UsernameRequired,
        Flash::EmailInvalid,
        Flash::PasswordRequired,
        Flash::LevelInvalid,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Flash::UsernameTaken => "username_taken",
            Flash::EmailTaken => "email_taken",
            Flash::Registered => "registered",
            Flash::LoginFailed => "login_failed",
            Flash::LoggedIn => "logged_in",
            Flash::LoggedOut => "logged_out",
            Flash::UsernameRequired => "username_required",
            Flash::EmailInvalid => "email_invalid",
            Flash::PasswordRequired => "password_required",
            Flash::LevelInvalid => "level_invalid",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.code() == code)
    }

    pub fn message(self) -> &'static str {
        match self {
            Flash::UsernameTaken => "Username is already taken :(",
            Flash::EmailTaken => "Email is already registered for a user.",
            Flash::Registered => "Registration successful!",
            Flash::LoginFailed => "Login failed",
            Flash::LoggedIn => "Login successful",
            Flash::LoggedOut => "...and you're fired!",
            Flash::UsernameRequired => "Username is required.",
            Flash::EmailInvalid => "Invalid email address.",
            Flash::PasswordRequired => "Password is required.",
            Flash::LevelInvalid => "Not a valid sanity level.",
        }
    }
}
