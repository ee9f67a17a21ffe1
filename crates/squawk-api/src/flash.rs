use axum::response::Redirect;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use squawk_types::flash::Flash;

pub const FLASH_COOKIE: &str = "squawk_flash";

pub fn set(jar: CookieJar, flash: Flash) -> CookieJar {
    jar.add(
        Cookie::build((FLASH_COOKIE, flash.code()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax),
    )
}

/// Consume the pending flash, if any, returning its display text.
pub fn take(jar: CookieJar) -> (CookieJar, Option<String>) {
    let Some(code) = jar.get(FLASH_COOKIE).map(|c| c.value().to_string()) else {
        return (jar, None);
    };
    let message = Flash::from_code(&code).map(|f| f.message().to_string());
    (jar.remove(Cookie::build(FLASH_COOKIE).path("/")), message)
}

/// Flash a message and send the browser to `to`.
pub fn redirect(jar: CookieJar, flash: Flash, to: &str) -> (CookieJar, Redirect) {
    (set(jar, flash), Redirect::to(to))
}
