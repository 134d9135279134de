// Domain operations
//
// Thin callers of the guarded verbs: validate parameters, make sure the
// session is logged in, build the site-scoped path and JSON body, decode the
// envelope. Each area lives in its own file as inherent methods on `Session`.

pub mod clients;
pub mod guests;
pub mod sites;
pub mod stats;

use std::time::Duration;

use crate::envelope::{Data, Outcome};
use crate::error::Error;
use crate::params::SiteName;
use crate::session::Session;

/// `/api/s/{site}/{suffix}`
pub(crate) fn site_path(site: &SiteName, suffix: &str) -> String {
    format!("/api/s/{site}/{suffix}")
}

impl Session {
    /// Logged-in `GET`, decoded to `data`.
    pub(crate) async fn fetch(
        &mut self,
        path: &str,
        body: Option<&serde_json::Value>,
        timeout: Option<Duration>,
    ) -> Result<Outcome<Data>, Error> {
        self.ensure_authenticated().await?;
        let resp = self.get(path, body, timeout).await?;
        self.decode(&resp)
    }

    /// Logged-in `POST`, decoded to `data`.
    pub(crate) async fn submit(
        &mut self,
        path: &str,
        body: Option<&serde_json::Value>,
        timeout: Option<Duration>,
    ) -> Result<Outcome<Data>, Error> {
        self.ensure_authenticated().await?;
        let resp = self.post(path, body, timeout).await?;
        self.decode(&resp)
    }

    /// Logged-in `POST` in the boolean convention.
    pub(crate) async fn command(
        &mut self,
        path: &str,
        body: &serde_json::Value,
        timeout: Option<Duration>,
    ) -> Result<bool, Error> {
        self.submit(path, Some(body), timeout)
            .await
            .map(|outcome| outcome.is_accepted())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn site_paths_are_rooted() {
        let site: SiteName = "ab12cd34".parse().unwrap();
        assert_eq!(site_path(&site, "stat/sta"), "/api/s/ab12cd34/stat/sta");
    }
}
