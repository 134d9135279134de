// Client and login-session endpoints
//
// Read-only views of stations: who is online, who was ever seen, guest
// authorizations, and per-client login sessions. Time bounds go over the
// wire in milliseconds.

use serde_json::json;
use tracing::debug;

use crate::api::site_path;
use crate::envelope::{Data, Outcome};
use crate::error::Error;
use crate::params::{ListSessions, MacAddress, SESSIONS_SPAN, SiteName, TimeRange, Validate};
use crate::session::Session;

/// One year, the default look-back for client history listings.
pub const DEFAULT_WITHIN_HOURS: u32 = 365 * 24;

impl Session {
    /// Login sessions for all clients on a site, or a single client.
    ///
    /// `GET /api/s/{site}/stat/session` with `{"type", "start", "end", "mac"?}`.
    /// The window defaults to the 7 days before `end` (now).
    pub async fn list_sessions(&mut self, params: &ListSessions) -> Result<Outcome<Data>, Error> {
        params.validate()?;
        let (start, end) = params.range.resolve(SESSIONS_SPAN)?;

        let mut body = json!({
            "type": params.client_type.to_string(),
            "start": start,
            "end": end,
        });
        if let (Some(mac), Some(obj)) = (&params.client_mac, body.as_object_mut()) {
            obj.insert("mac".into(), json!(mac.to_lowercase()));
        }

        debug!(site = %params.site, client_type = %params.client_type, start, end, "listing sessions");
        self.fetch(&site_path(&params.site, "stat/session"), Some(&body), None)
            .await
    }

    /// The most recent login sessions of one client, newest first.
    ///
    /// `GET /api/s/{site}/stat/session` with `{"mac", "_limit", "_sort": "-assoc_time"}`
    pub async fn latest_sessions(
        &mut self,
        client_mac: &MacAddress,
        limit: u32,
        site: &SiteName,
    ) -> Result<Outcome<Data>, Error> {
        if limit == 0 {
            return Err(Error::validation("limit", "must be at least 1"));
        }
        debug!(mac = %client_mac, limit, %site, "listing latest sessions");
        self.fetch(
            &site_path(site, "stat/session"),
            Some(&json!({
                "mac": client_mac.to_lowercase(),
                "_limit": limit,
                "_sort": "-assoc_time",
            })),
            None,
        )
        .await
    }

    /// Guest authorizations granted in a time window (7 days by default).
    ///
    /// `GET /api/s/{site}/stat/authorization`
    pub async fn list_authorizations(
        &mut self,
        range: &TimeRange,
        site: &SiteName,
    ) -> Result<Outcome<Data>, Error> {
        range.validate()?;
        let (start, end) = range.resolve(SESSIONS_SPAN)?;
        debug!(%site, start, end, "listing authorizations");
        self.fetch(
            &site_path(site, "stat/authorization"),
            Some(&json!({ "start": start, "end": end })),
            None,
        )
        .await
    }

    /// Every client ever seen on a site within the last `within_hours`.
    ///
    /// `GET /api/s/{site}/stat/allusers`. The per-client counters in the reply
    /// are all-time totals regardless of the window.
    pub async fn list_all_users(
        &mut self,
        within_hours: u32,
        site: &SiteName,
    ) -> Result<Outcome<Data>, Error> {
        debug!(within_hours, %site, "listing all users");
        self.fetch(
            &site_path(site, "stat/allusers"),
            Some(&json!({
                "type": "all",
                "conn": "all",
                "within": within_hours,
            })),
            None,
        )
        .await
    }

    /// Guests with a valid authorization within the last `within_hours`.
    ///
    /// `GET /api/s/{site}/stat/guest`
    pub async fn list_guests(
        &mut self,
        within_hours: u32,
        site: &SiteName,
    ) -> Result<Outcome<Data>, Error> {
        debug!(within_hours, %site, "listing guests");
        self.fetch(
            &site_path(site, "stat/guest"),
            Some(&json!({ "within": within_hours })),
            None,
        )
        .await
    }

    /// Online clients, or a single one when `client_mac` is given.
    ///
    /// `GET /api/s/{site}/stat/sta/{mac}`, sent without a body.
    pub async fn list_online_clients(
        &mut self,
        client_mac: Option<&MacAddress>,
        site: &SiteName,
    ) -> Result<Outcome<Data>, Error> {
        let mac = client_mac.map(MacAddress::to_lowercase).unwrap_or_default();
        debug!(mac = %mac, %site, "listing online clients");
        self.fetch(&site_path(site, &format!("stat/sta/{mac}")), None, None)
            .await
    }

    /// Stored information about one client.
    ///
    /// `GET /api/s/{site}/stat/user/{mac}`
    pub async fn client_info(
        &mut self,
        client_mac: &MacAddress,
        site: &SiteName,
    ) -> Result<Outcome<Data>, Error> {
        debug!(mac = %client_mac, %site, "fetching client info");
        let path = site_path(site, &format!("stat/user/{}", client_mac.to_lowercase()));
        self.fetch(&path, None, None).await
    }

    /// All connected clients with their live stats.
    ///
    /// `GET /api/s/{site}/stat/sta`
    pub async fn list_clients(&mut self, site: &SiteName) -> Result<Outcome<Data>, Error> {
        debug!(%site, "listing connected clients");
        self.fetch(&site_path(site, "stat/sta"), None, None).await
    }
}
