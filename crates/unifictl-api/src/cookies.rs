// Clearable cookie store.
//
// reqwest's `Jar` has no way to drop its contents, and the call guard needs
// to forget the session cookie without rebuilding the connection pool. This
// wraps a `Jar` behind a lock so it can be swapped for an empty one.

use std::sync::{PoisonError, RwLock};

use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::HeaderValue;
use url::Url;

/// Cookie store owned by one session's HTTP client.
#[derive(Debug, Default)]
pub struct SessionCookies {
    jar: RwLock<Jar>,
}

impl SessionCookies {
    /// Drop every stored cookie.
    pub fn clear(&self) {
        *self.jar.write().unwrap_or_else(PoisonError::into_inner) = Jar::default();
    }

    /// Whether a cookie called `name` would be sent to `url`.
    pub fn contains(&self, url: &Url, name: &str) -> bool {
        let Some(header) = self.cookies(url) else {
            return false;
        };
        let Ok(pairs) = header.to_str() else {
            return false;
        };
        pairs
            .split(';')
            .filter_map(|pair| pair.trim().split_once('='))
            .any(|(key, _)| key == name)
    }

    /// Seed a cookie as if the controller had set it.
    pub fn add_cookie_str(&self, cookie: &str, url: &Url) {
        self.jar
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .add_cookie_str(cookie, url);
    }
}

impl CookieStore for SessionCookies {
    fn set_cookies(&self, cookie_headers: &mut dyn Iterator<Item = &HeaderValue>, url: &Url) {
        self.jar
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .set_cookies(cookie_headers, url);
    }

    fn cookies(&self, url: &Url) -> Option<HeaderValue> {
        self.jar
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .cookies(url)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn contains_matches_exact_cookie_name() {
        let url = Url::parse("https://ctrl.example:8443/").unwrap();
        let cookies = SessionCookies::default();
        cookies.add_cookie_str("csrf_token=abc; Path=/", &url);
        assert!(!cookies.contains(&url, "unifises"));

        cookies.add_cookie_str("unifises=s3ss10n; Path=/", &url);
        assert!(cookies.contains(&url, "unifises"));
        assert!(!cookies.contains(&url, "unifi"));
    }

    #[test]
    fn clear_forgets_everything() {
        let url = Url::parse("https://ctrl.example:8443/").unwrap();
        let cookies = SessionCookies::default();
        cookies.add_cookie_str("unifises=s3ss10n; Path=/", &url);
        cookies.clear();
        assert!(!cookies.contains(&url, "unifises"));
        assert!(cookies.cookies(&url).is_none());
    }
}
