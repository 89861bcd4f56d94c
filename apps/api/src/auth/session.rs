//! Session cookie construction.

use tower_cookies::cookie::time::Duration;
use tower_cookies::cookie::SameSite;
use tower_cookies::Cookie;

pub const SESSION_COOKIE: &str = "session";
/// Fixed session lifetime: 7 days, in seconds.
pub const SESSION_TTL_SECS: i64 = 60 * 60 * 24 * 7;

/// Builds the `session` cookie: http-only, path `/`, SameSite=Lax, and
/// `Secure` when running in production.
pub fn session_cookie(value: String, production: bool) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, value);
    cookie.set_http_only(true);
    if production {
        cookie.set_secure(true);
    }
    cookie.set_same_site(SameSite::Lax);
    cookie.set_max_age(Duration::seconds(SESSION_TTL_SECS));
    cookie.set_path("/");
    cookie
}

/// An immediately expiring `session` cookie, used by sign-out.
pub fn expired_session_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, "");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_max_age(Duration::ZERO);
    cookie.set_path("/");
    cookie
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie("abc".to_string(), false);
        assert_eq!(cookie.name(), "session");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(
            cookie.max_age(),
            Some(Duration::seconds(60 * 60 * 24 * 7))
        );
        assert_ne!(cookie.secure(), Some(true));
    }

    #[test]
    fn test_session_cookie_secure_in_production() {
        let cookie = session_cookie("abc".to_string(), true);
        assert_eq!(cookie.secure(), Some(true));
    }
}
