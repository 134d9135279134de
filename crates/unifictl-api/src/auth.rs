// Login protocol
//
// Cookie-based login against `POST /api/login`. Success is judged purely by
// whether the controller left a session cookie behind, never by the body.

use reqwest::header::REFERER;
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use tracing::debug;

use crate::envelope::RawResponse;
use crate::error::Error;
use crate::session::Session;

const LOGIN_PATH: &str = "/api/login";
const LOGIN_REFERER_PATH: &str = "/login";
const LOGOUT_PATH: &str = "/logout";

impl Session {
    /// Authenticate with the controller.
    ///
    /// Supplied credentials replace the stored ones; `None` keeps what is
    /// stored. If the session already holds a cookie and nothing new was
    /// supplied, this returns `Ok(true)` without touching the network.
    ///
    /// Returns whether the session cookie is present after the handshake.
    pub async fn login(
        &mut self,
        username: Option<&str>,
        password: Option<&SecretString>,
    ) -> Result<bool, Error> {
        let same_user = username.is_none_or(|u| self.username.as_deref() == Some(u));
        let same_password = password.is_none_or(|p| {
            self.password
                .as_ref()
                .is_some_and(|stored| stored.expose_secret() == p.expose_secret())
        });
        if same_user && same_password && self.is_authenticated() {
            debug!("already logged in; reusing session cookie");
            return Ok(true);
        }

        if let Some(username) = username {
            self.username = Some(username.to_owned());
        }
        if let Some(password) = password {
            self.password = Some(password.clone());
        }
        let (Some(username), Some(password)) = (self.username.clone(), self.password.clone())
        else {
            return Err(Error::Login("Missing login information".into()));
        };

        // Start from an empty jar so stale cookies never reach the login call.
        self.reset_session()?;

        let url = self.endpoint(LOGIN_PATH)?;
        let referer = self.endpoint(LOGIN_REFERER_PATH)?;
        debug!(%url, username = %username, "logging in");

        let body = json!({
            "username": username,
            "password": password.expose_secret(),
        });

        let resp = self
            .http()
            .post(url)
            .header(REFERER, referer.as_str())
            .json(&body)
            .timeout(self.timeouts().login)
            .send()
            .await
            .map_err(Error::Transport)?;

        let resp = RawResponse::read(resp).await?;
        self.dump("login", &resp);

        let authenticated = self.is_authenticated();
        debug!(authenticated, status = resp.status().as_u16(), "login finished");
        Ok(authenticated)
    }

    /// End the current session.
    ///
    /// Returns `Ok(false)` without a request when not logged in. Otherwise
    /// the logout call is best-effort and the session is reset no matter how
    /// it went.
    pub async fn logout(&mut self) -> Result<bool, Error> {
        if !self.is_authenticated() {
            return Ok(false);
        }

        let url = self.endpoint(LOGOUT_PATH)?;
        debug!(%url, "logging out");
        match self
            .http()
            .post(url)
            .timeout(self.timeouts().command)
            .send()
            .await
        {
            Ok(resp) => debug!(status = resp.status().as_u16(), "logout sent"),
            Err(e) => debug!(error = %e, "logout request failed; dropping session anyway"),
        }

        self.reset_session()?;
        Ok(true)
    }
}
