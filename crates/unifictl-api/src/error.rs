use thiserror::Error;

/// Top-level error type for the `unifictl-api` crate.
///
/// A controller answering `rc: "error"` is *not* an error here: that is a
/// normal reply surfaced as [`Outcome::Rejected`](crate::Outcome::Rejected)
/// or `false`. Everything below means the call itself could not complete.
#[derive(Debug, Error)]
pub enum Error {
    // ── Construction ────────────────────────────────────────────────
    /// Malformed construction parameters (bad base URL, unreadable CA cert).
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    // ── Authentication ──────────────────────────────────────────────
    /// Missing credentials, or the login handshake produced no session cookie.
    #[error("Login failed: {0}")]
    Login(String),

    /// The call guard kept hitting `api.err.LoginRequired` until its retry
    /// budget ran out.
    #[error("Reconnection to controller failed after {attempts} attempts")]
    Reconnection { attempts: u8 },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (timeout, connection refused, TLS failure).
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// A request path could not be resolved against the base URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ── Response shape ──────────────────────────────────────────────
    /// The controller replied with something other than JSON.
    #[error("Content type should be json (got {content_type:?}, HTTP {status})")]
    Format {
        status: u16,
        content_type: Option<String>,
    },

    /// JSON body that is not a `{data, meta}` envelope, with the raw body
    /// for debugging.
    #[error("Unexpected response shape: {message}")]
    Schema { message: String, body: String },

    // ── Parameters ──────────────────────────────────────────────────
    /// A parameter was rejected before any request was made.
    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    /// No managed site owns the given device.
    #[error("Device {mac} does not belong to any known site")]
    DeviceNotFound { mac: String },
}

impl Error {
    pub(crate) fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }

    /// Returns `true` if supplying (different) credentials could fix this.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Login(_) | Self::Reconnection { .. })
    }

    /// Returns `true` for network-level failures a caller may choose to retry.
    ///
    /// The session itself never retries these.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }

    /// Returns `true` if this is a request timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_timeout())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_failures_are_classified() {
        assert!(Error::Login("Missing login information".into()).is_auth_failure());
        assert!(Error::Reconnection { attempts: 3 }.is_auth_failure());
        assert!(!Error::validation("site", "empty").is_auth_failure());
    }

    #[test]
    fn format_error_mentions_json() {
        let err = Error::Format {
            status: 200,
            content_type: Some("text/html".into()),
        };
        assert!(err.to_string().starts_with("Content type should be json"));
        assert!(!err.is_transient());
    }
}
