// Call guard
//
// Two guards compose around every protected call:
//
// - the precondition guard logs in before a domain operation when the
//   session holds no cookie;
// - the recovery guard wraps the HTTP verbs themselves and, when the
//   controller answers `401 api.err.LoginRequired`, clears cookies, logs in
//   again with the stored credentials and replays the request, up to a fixed
//   number of attempts.
//
// Nothing else is retried: transport errors, 5xx and `rc: "error"` replies
// are handed back after a single call.

use std::time::Duration;

use reqwest::Method;
use tracing::{debug, warn};

use crate::envelope::RawResponse;
use crate::error::Error;
use crate::session::Session;

/// Total attempts (first call included) before giving up on a session that
/// keeps expiring.
pub const RETRY_BUDGET: u8 = 3;

/// Where a session stands with respect to the call guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    NeedsAuth,
    Authenticated,
    /// Re-authenticating after the `n`th expired attempt.
    RetryingAfterExpiry(u8),
    Failed,
}

/// Attempts left for one guarded call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RetryBudget {
    total: u8,
    used: u8,
}

impl RetryBudget {
    pub(crate) fn new(total: u8) -> Self {
        Self { total, used: 0 }
    }

    /// Record an expired attempt. Returns the attempt number, or `None` once
    /// the budget is spent.
    pub(crate) fn spend(&mut self) -> Option<u8> {
        self.used = self.used.saturating_add(1);
        (self.used < self.total).then_some(self.used)
    }
}

/// How one attempt ended.
#[derive(Debug)]
enum Verdict {
    Settled(RawResponse),
    Expired,
}

fn classify(response: RawResponse) -> Verdict {
    if response.is_session_expired() {
        Verdict::Expired
    } else {
        Verdict::Settled(response)
    }
}

impl Session {
    /// The guard state as seen between calls.
    pub fn guard_state(&self) -> GuardState {
        if self.is_authenticated() {
            GuardState::Authenticated
        } else {
            GuardState::NeedsAuth
        }
    }

    /// Precondition guard: log in with the stored credentials if there is no
    /// session cookie.
    pub async fn ensure_authenticated(&mut self) -> Result<(), Error> {
        if self.is_authenticated() {
            return Ok(());
        }
        debug!(state = ?GuardState::NeedsAuth, "no session cookie; logging in");
        if self.login(None, None).await? {
            Ok(())
        } else {
            Err(Error::Login(
                "controller did not issue a session cookie".into(),
            ))
        }
    }

    /// Guarded `GET`.
    pub async fn get(
        &mut self,
        path: &str,
        body: Option<&serde_json::Value>,
        timeout: Option<Duration>,
    ) -> Result<RawResponse, Error> {
        self.execute(Method::GET, path, body, timeout).await
    }

    /// Guarded `POST`.
    pub async fn post(
        &mut self,
        path: &str,
        body: Option<&serde_json::Value>,
        timeout: Option<Duration>,
    ) -> Result<RawResponse, Error> {
        self.execute(Method::POST, path, body, timeout).await
    }

    /// Guarded `PUT`.
    pub async fn put(
        &mut self,
        path: &str,
        body: Option<&serde_json::Value>,
        timeout: Option<Duration>,
    ) -> Result<RawResponse, Error> {
        self.execute(Method::PUT, path, body, timeout).await
    }

    /// Guarded `DELETE`.
    pub async fn delete(
        &mut self,
        path: &str,
        body: Option<&serde_json::Value>,
        timeout: Option<Duration>,
    ) -> Result<RawResponse, Error> {
        self.execute(Method::DELETE, path, body, timeout).await
    }

    /// Recovery guard around a single logical request.
    async fn execute(
        &mut self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
        timeout: Option<Duration>,
    ) -> Result<RawResponse, Error> {
        let url = self.endpoint(path)?;
        let mut budget = RetryBudget::new(RETRY_BUDGET);

        loop {
            debug!(%method, %url, "request");
            let mut builder = self.http().request(method.clone(), url.clone());
            if let Some(body) = body {
                builder = builder.json(body);
            }
            if let Some(timeout) = timeout {
                builder = builder.timeout(timeout);
            }
            let request = builder.build().map_err(Error::Transport)?;
            self.dump_request(&request, body);
            let resp = self
                .http()
                .execute(request)
                .await
                .map_err(Error::Transport)?;
            let resp = RawResponse::read(resp).await?;

            match classify(resp) {
                Verdict::Settled(resp) => {
                    self.dump("response", &resp);
                    return Ok(resp);
                }
                Verdict::Expired => {
                    let Some(attempt) = budget.spend() else {
                        warn!(state = ?GuardState::Failed, %url, "session keeps expiring; giving up");
                        return Err(Error::Reconnection {
                            attempts: RETRY_BUDGET,
                        });
                    };
                    warn!(
                        state = ?GuardState::RetryingAfterExpiry(attempt),
                        "session expired; reconnecting to controller"
                    );
                    self.clear_cookies();
                    // A login that yields no cookie is not fatal here: the
                    // replay will expire again and spend the budget.
                    let authenticated = self.login(None, None).await?;
                    debug!(authenticated, "relogin finished");
                }
            }
        }
    }
}
