// Guest and station commands
//
// Everything here posts to `cmd/stamgr` and answers in the boolean
// convention: `true` when the controller accepted the command, `false` when
// it answered `rc: "error"`.

use serde_json::json;
use tracing::debug;

use crate::api::site_path;
use crate::error::Error;
use crate::params::{AuthorizeGuest, MacAddress, SiteName, Validate};
use crate::session::Session;

impl Session {
    /// Authorize a guest client on the hotspot portal.
    ///
    /// `POST /api/s/{site}/cmd/stamgr` with `{"cmd": "authorize-guest", ...}`
    ///
    /// Without an explicit site, the site owning `ap_mac` is looked up with
    /// [`find_device_site`](Self::find_device_site) (costly); with neither,
    /// `default` is used.
    pub async fn authorize_guest(&mut self, params: &AuthorizeGuest) -> Result<bool, Error> {
        params.validate()?;
        self.ensure_authenticated().await?;

        let site = match (&params.site, &params.ap_mac) {
            (Some(site), _) => site.clone(),
            (None, Some(ap_mac)) => self.require_device_site(ap_mac).await?,
            (None, None) => SiteName::default(),
        };

        let mut body = serde_json::Map::new();
        body.insert("cmd".into(), json!("authorize-guest"));
        body.insert("mac".into(), json!(params.client_mac.to_lowercase()));
        body.insert("minutes".into(), json!(params.minutes));
        if let Some(up) = params.up_kbps {
            body.insert("up".into(), json!(up));
        }
        if let Some(down) = params.down_kbps {
            body.insert("down".into(), json!(down));
        }
        if let Some(ap_mac) = &params.ap_mac {
            body.insert("ap_mac".into(), json!(ap_mac.to_lowercase()));
        }
        if let Some(quota) = params.quota_mb {
            body.insert("MB_limit".into(), json!(quota));
        }

        debug!(mac = %params.client_mac, minutes = params.minutes, %site, "authorizing guest");
        let timeout = self.timeouts().command;
        self.command(
            &site_path(&site, "cmd/stamgr"),
            &serde_json::Value::Object(body),
            Some(timeout),
        )
        .await
    }

    /// Revoke a guest authorization.
    ///
    /// `POST /api/s/{site}/cmd/stamgr` with `{"cmd": "unauthorize-guest", "mac": "..."}`
    pub async fn unauthorize_guest(
        &mut self,
        client_mac: &MacAddress,
        site: &SiteName,
    ) -> Result<bool, Error> {
        self.station_command("unauthorize-guest", client_mac, site)
            .await
    }

    /// Disconnect a client so it reassociates.
    ///
    /// `POST /api/s/{site}/cmd/stamgr` with `{"cmd": "kick-sta", "mac": "..."}`
    pub async fn reconnect_client(
        &mut self,
        client_mac: &MacAddress,
        site: &SiteName,
    ) -> Result<bool, Error> {
        self.station_command("kick-sta", client_mac, site).await
    }

    /// Block a client.
    ///
    /// `POST /api/s/{site}/cmd/stamgr` with `{"cmd": "block-sta", "mac": "..."}`
    pub async fn block_client(
        &mut self,
        client_mac: &MacAddress,
        site: &SiteName,
    ) -> Result<bool, Error> {
        self.station_command("block-sta", client_mac, site).await
    }

    /// Unblock a client.
    ///
    /// `POST /api/s/{site}/cmd/stamgr` with `{"cmd": "unblock-sta", "mac": "..."}`
    pub async fn unblock_client(
        &mut self,
        client_mac: &MacAddress,
        site: &SiteName,
    ) -> Result<bool, Error> {
        self.station_command("unblock-sta", client_mac, site).await
    }

    /// Forget clients entirely (history included).
    ///
    /// `POST /api/s/{site}/cmd/stamgr` with `{"cmd": "forget-sta", "macs": [...]}`
    pub async fn forget_clients(
        &mut self,
        client_macs: &[MacAddress],
        site: &SiteName,
    ) -> Result<bool, Error> {
        if client_macs.is_empty() {
            return Err(Error::validation("client_macs", "at least one MAC is required"));
        }
        self.ensure_authenticated().await?;

        let macs: Vec<String> = client_macs.iter().map(MacAddress::to_lowercase).collect();
        debug!(count = macs.len(), %site, "forgetting clients");
        let timeout = self.timeouts().command;
        self.command(
            &site_path(site, "cmd/stamgr"),
            &json!({
                "cmd": "forget-sta",
                "macs": macs,
            }),
            Some(timeout),
        )
        .await
    }

    async fn station_command(
        &mut self,
        cmd: &str,
        client_mac: &MacAddress,
        site: &SiteName,
    ) -> Result<bool, Error> {
        self.ensure_authenticated().await?;
        debug!(cmd, mac = %client_mac, %site, "station command");
        let timeout = self.timeouts().command;
        self.command(
            &site_path(site, "cmd/stamgr"),
            &json!({
                "cmd": cmd,
                "mac": client_mac.to_lowercase(),
            }),
            Some(timeout),
        )
        .await
    }
}
