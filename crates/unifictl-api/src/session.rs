// Session state
//
// Owns the base URL, the stored credentials and the live transport handle
// (reqwest client + cookie store). Login state is never cached: it is read
// straight out of the cookie store every time it is asked for.

use std::fmt;
use std::sync::Arc;

use secrecy::SecretString;
use tracing::{debug, trace};
use url::Url;

use crate::cookies::SessionCookies;
use crate::envelope::{self, Data, Outcome, RawResponse};
use crate::error::Error;
use crate::transport::{Timeouts, TlsMode, TransportConfig};

/// Name of the cookie the controller sets on a successful login.
pub const SESSION_COOKIE: &str = "unifises";

// ── Configuration ────────────────────────────────────────────────────

/// Everything needed to construct a [`Session`].
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Controller root, e.g. `https://192.168.1.2:8443`.
    pub base_url: String,
    pub transport: TransportConfig,
    /// Promote raw request/response dumps from `trace` to `debug`.
    pub debug: bool,
    pub username: Option<String>,
    pub password: Option<SecretString>,
}

impl SessionConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            transport: TransportConfig::default(),
            debug: false,
            username: None,
            password: None,
        }
    }

    pub fn verify_tls(mut self, verify: bool) -> Self {
        self.transport.tls = TlsMode::from_verify(verify);
        self
    }

    pub fn tls(mut self, tls: TlsMode) -> Self {
        self.transport.tls = tls;
        self
    }

    pub fn timeouts(mut self, timeouts: Timeouts) -> Self {
        self.transport.timeouts = timeouts;
        self
    }

    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn password(mut self, password: impl Into<SecretString>) -> Self {
        self.password = Some(password.into());
        self
    }
}

// ── Session ──────────────────────────────────────────────────────────

/// One authenticated relationship with a controller.
///
/// Every network operation takes `&mut self`: a session serves one logical
/// caller at a time. Wrap it in a `tokio::sync::Mutex` to share it between
/// tasks.
pub struct Session {
    base_url: Url,
    pub(crate) username: Option<String>,
    pub(crate) password: Option<SecretString>,
    transport: TransportConfig,
    root_cert: Option<reqwest::Certificate>,
    debug: bool,
    http: reqwest::Client,
    cookies: Arc<SessionCookies>,
}

impl Session {
    /// Validate the configuration and build an unauthenticated session.
    pub fn new(config: SessionConfig) -> Result<Self, Error> {
        let base_url = parse_base_url(&config.base_url)?;
        let cookies = Arc::new(SessionCookies::default());
        let root_cert = config.transport.load_root_certificate()?;
        let http = config
            .transport
            .build_client(root_cert.as_ref(), Arc::clone(&cookies))?;
        debug!(%base_url, "session created");
        Ok(Self {
            base_url,
            username: config.username,
            password: config.password,
            transport: config.transport,
            root_cert,
            debug: config.debug,
            http,
            cookies,
        })
    }

    /// Shorthand for the common construction parameters.
    pub fn construct(
        base_url: &str,
        verify_tls: bool,
        debug: bool,
        username: Option<&str>,
        password: Option<&str>,
    ) -> Result<Self, Error> {
        let mut config = SessionConfig::new(base_url)
            .verify_tls(verify_tls)
            .debug(debug);
        config.username = username.map(String::from);
        config.password = password.map(|p| SecretString::from(p.to_owned()));
        Self::new(config)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn timeouts(&self) -> &Timeouts {
        &self.transport.timeouts
    }

    pub fn is_debug(&self) -> bool {
        self.debug
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Resolve `path` against the base URL.
    ///
    /// `"/api/s/default/stat/sta"` on `https://ctrl.example:8443` gives
    /// `https://ctrl.example:8443/api/s/default/stat/sta`.
    pub fn endpoint(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path)?)
    }

    /// Whether the cookie store holds the session cookie.
    pub fn is_authenticated(&self) -> bool {
        self.cookies.contains(&self.base_url, SESSION_COOKIE)
    }

    /// Drop all cookies but keep the HTTP client and its connection pool.
    pub fn clear_cookies(&self) {
        trace!("clearing cookies");
        self.cookies.clear();
    }

    /// Replace the transport handle with a fresh one.
    ///
    /// The old client and all cookies are dropped. Cookies are cleared
    /// first, so the session is unauthenticated even if the rebuild fails.
    pub fn reset_session(&mut self) -> Result<(), Error> {
        self.cookies.clear();
        let cookies = Arc::new(SessionCookies::default());
        self.http = self
            .transport
            .build_client(self.root_cert.as_ref(), Arc::clone(&cookies))?;
        self.cookies = cookies;
        trace!("transport session reset");
        Ok(())
    }

    // ── Decoding ─────────────────────────────────────────────────────

    /// Decode a guarded response, returning `data` on `rc: "ok"`.
    pub fn decode(&self, response: &RawResponse) -> Result<Outcome<Data>, Error> {
        if !response.is_json() {
            self.dump("non-JSON response", response);
        }
        envelope::decode(response)
    }

    /// Decode a guarded response in the boolean convention.
    pub fn decode_flag(&self, response: &RawResponse) -> Result<bool, Error> {
        self.decode(response).map(|outcome| outcome.is_accepted())
    }

    /// Emit a raw response dump, at `debug` when the session's debug flag is
    /// set and at `trace` otherwise.
    pub(crate) fn dump(&self, label: &str, response: &RawResponse) {
        let status = response.status().as_u16();
        let content_type = response.content_type().unwrap_or("-");
        let headers = response.headers();
        let body = response.text();
        if self.debug {
            debug!(label, status, content_type, ?headers, body = %body, "response dump");
        } else {
            trace!(label, status, content_type, ?headers, body = %body, "response dump");
        }
    }

    /// Request counterpart of [`dump`](Self::dump). Cookies are attached by
    /// the client at send time and never appear here.
    pub(crate) fn dump_request(&self, request: &reqwest::Request, body: Option<&serde_json::Value>) {
        let method = request.method().as_str();
        let url = request.url().as_str();
        let headers = request.headers();
        let body = body.map(ToString::to_string).unwrap_or_default();
        if self.debug {
            debug!(method, url, ?headers, body = %body, "request dump");
        } else {
            trace!(method, url, ?headers, body = %body, "request dump");
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("base_url", &self.base_url.as_str())
            .field("username", &self.username)
            .field("authenticated", &self.is_authenticated())
            .field("debug", &self.debug)
            .finish_non_exhaustive()
    }
}

fn parse_base_url(raw: &str) -> Result<Url, Error> {
    let url = Url::parse(raw)
        .map_err(|e| Error::Configuration(format!("invalid base URL {raw:?}: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(Error::Configuration(format!(
            "base URL must be http or https, got {:?}",
            url.scheme()
        )));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(Error::Configuration(format!("base URL {raw:?} has no host")));
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn accepts_absolute_http_urls() {
        for url in [
            "http://example.com",
            "http://example.com:8443",
            "https://example.com",
            "https://example.com:8443",
        ] {
            assert!(Session::construct(url, false, false, None, None).is_ok(), "{url}");
        }
    }

    #[test]
    fn rejects_malformed_urls() {
        for url in ["", "blablabla", "/api/login", "ftp://example.com", "mailto:a@b.c"] {
            let result = Session::construct(url, false, false, None, None);
            assert!(matches!(result, Err(Error::Configuration(_))), "{url}");
        }
    }

    #[test]
    fn endpoint_joins_against_base() {
        let session = Session::construct("https://ctrl.example:8443", true, false, None, None).unwrap();
        assert_eq!(
            session.endpoint("/api/s/default/stat/sta").unwrap().as_str(),
            "https://ctrl.example:8443/api/s/default/stat/sta"
        );

        let session = Session::construct("https://example.com", false, false, None, None).unwrap();
        assert_eq!(
            session.endpoint("api/bla/bla").unwrap().as_str(),
            "https://example.com/api/bla/bla"
        );
    }

    #[test]
    fn authentication_follows_the_cookie() {
        let mut session = Session::construct("https://ctrl.example:8443", false, false, None, None).unwrap();
        assert!(!session.is_authenticated());

        let base = session.base_url().clone();
        session.cookies.add_cookie_str("unifises=abc; Path=/", &base);
        assert!(session.is_authenticated());

        session.clear_cookies();
        assert!(!session.is_authenticated());

        session.cookies.add_cookie_str("unifises=abc; Path=/", &base);
        session.reset_session().unwrap();
        assert!(!session.is_authenticated());
    }

    #[test]
    fn debug_output_hides_password() {
        let session = Session::construct(
            "https://ctrl.example:8443",
            false,
            true,
            Some("admin"),
            Some("hunter2"),
        )
        .unwrap();
        let rendered = format!("{session:?}");
        assert!(rendered.contains("admin"));
        assert!(!rendered.contains("hunter2"));
    }
}
