// Transport configuration for building the session's reqwest::Client.
//
// The session rebuilds its client on every reset, so everything needed to
// do that (TLS policy, timeouts) lives here and is cloned into the session.
// A custom CA is read from disk once, when the session is created.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::cookies::SessionCookies;
use crate::error::Error;

/// TLS verification mode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsMode {
    /// Use the system certificate store.
    System,
    /// Use a custom CA certificate from the given PEM file.
    CustomCa(PathBuf),
    /// Accept any certificate (self-signed controllers).
    #[default]
    DangerAcceptInvalid,
}

impl TlsMode {
    /// Map a plain verify flag onto a mode.
    pub fn from_verify(verify: bool) -> Self {
        if verify {
            Self::System
        } else {
            Self::DangerAcceptInvalid
        }
    }
}

/// Per call-type request timeouts.
///
/// Login must fail fast on an unreachable controller, so it gets its own
/// short budget instead of sharing the client-wide one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    /// `POST /api/login`.
    pub login: Duration,
    /// `cmd/stamgr` commands (guest authorization, block, kick...).
    pub command: Duration,
    /// `stat/device` and report POSTs.
    pub report: Duration,
    /// Client-wide default for everything else.
    pub request: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            login: Duration::from_secs(4),
            command: Duration::from_secs(6),
            report: Duration::from_secs(4),
            request: Duration::from_secs(30),
        }
    }
}

/// Transport configuration shared by every client a session builds.
#[derive(Debug, Clone, Default)]
pub struct TransportConfig {
    pub tls: TlsMode,
    pub timeouts: Timeouts,
}

impl TransportConfig {
    /// Read the custom CA certificate, if the TLS mode names one.
    ///
    /// Done once per session so rebuilding the client never touches the
    /// filesystem.
    pub fn load_root_certificate(&self) -> Result<Option<reqwest::Certificate>, Error> {
        let TlsMode::CustomCa(path) = &self.tls else {
            return Ok(None);
        };
        let cert_pem = std::fs::read(path).map_err(|e| {
            Error::Configuration(format!("failed to read CA cert {}: {e}", path.display()))
        })?;
        let cert = reqwest::Certificate::from_pem(&cert_pem)
            .map_err(|e| Error::Configuration(format!("invalid CA cert: {e}")))?;
        Ok(Some(cert))
    }

    /// Build a `reqwest::Client` wired to the given cookie store.
    ///
    /// `root_cert` is the certificate returned by
    /// [`load_root_certificate`](Self::load_root_certificate).
    pub fn build_client(
        &self,
        root_cert: Option<&reqwest::Certificate>,
        cookies: Arc<SessionCookies>,
    ) -> Result<reqwest::Client, Error> {
        let mut builder = reqwest::Client::builder()
            .timeout(self.timeouts.request)
            .user_agent(concat!("unifictl/", env!("CARGO_PKG_VERSION")))
            .cookie_provider(cookies);

        match &self.tls {
            TlsMode::System => {}
            TlsMode::CustomCa(path) => {
                let cert = root_cert.ok_or_else(|| {
                    Error::Configuration(format!("CA cert {} was not loaded", path.display()))
                })?;
                builder = builder.add_root_certificate(cert.clone());
            }
            TlsMode::DangerAcceptInvalid => {
                builder = builder.danger_accept_invalid_certs(true);
            }
        }

        builder
            .build()
            .map_err(|e| Error::Configuration(format!("failed to build HTTP client: {e}")))
    }
}
