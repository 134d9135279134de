// Site and device endpoints
//
// Site listing is controller-scoped (`/api/self/sites`); everything else is
// under `/api/s/{site}/`.

use serde_json::json;
use tracing::debug;

use crate::api::site_path;
use crate::envelope::{Data, Outcome};
use crate::error::Error;
use crate::models::{DeviceRecord, SiteRecord};
use crate::params::{MacAddress, SiteName};
use crate::session::Session;

impl Session {
    /// List all sites visible to the authenticated user.
    ///
    /// `GET /api/self/sites`
    pub async fn list_sites(&mut self) -> Result<Outcome<Data>, Error> {
        debug!("listing sites");
        self.fetch("/api/self/sites", None, None).await
    }

    /// List devices on a site, or a single device when `device_mac` is given.
    ///
    /// `GET /api/s/{site}/stat/device/{mac}`
    pub async fn list_devices(
        &mut self,
        site: &SiteName,
        device_mac: Option<&MacAddress>,
    ) -> Result<Outcome<Data>, Error> {
        let mac = device_mac.map(MacAddress::to_lowercase).unwrap_or_default();
        debug!(%site, mac = %mac, "listing devices");
        self.fetch(&site_path(site, &format!("stat/device/{mac}")), None, None)
            .await
    }

    /// Find the site a device belongs to.
    ///
    /// Walks every site's device list, so this costs one request per site.
    /// Returns `None` when no site manages the device.
    pub async fn find_device_site(&mut self, mac: &MacAddress) -> Result<Option<SiteName>, Error> {
        let sites: Vec<SiteRecord> = match self.list_sites().await? {
            Outcome::Accepted(data) => data.parse()?,
            Outcome::Rejected { message } => {
                debug!(?message, "site listing rejected; device site unknown");
                return Ok(None);
            }
        };

        for site in sites {
            let site: SiteName = site.name.parse()?;
            let Outcome::Accepted(data) = self.list_devices(&site, None).await? else {
                continue;
            };
            let devices: Vec<DeviceRecord> = data.parse()?;
            let owned = devices
                .iter()
                .any(|device| device.mac.parse::<MacAddress>().is_ok_and(|m| &m == mac));
            if owned {
                debug!(%mac, %site, "device site found");
                return Ok(Some(site));
            }
        }

        debug!(%mac, "device not managed by any site");
        Ok(None)
    }

    /// Like [`find_device_site`](Self::find_device_site), but a missing
    /// device is an error.
    pub(crate) async fn require_device_site(&mut self, mac: &MacAddress) -> Result<SiteName, Error> {
        self.find_device_site(mac)
            .await?
            .ok_or_else(|| Error::DeviceNotFound {
                mac: mac.to_string(),
            })
    }

    /// Basic device list (MAC, type, adoption state) for a site.
    ///
    /// `GET /api/s/{site}/stat/device-basic`. `type` is `uap` for access
    /// points and `usw` for switches.
    pub async fn list_devices_basic(&mut self, site: &SiteName) -> Result<Outcome<Data>, Error> {
        debug!(%site, "listing basic device info");
        self.fetch(&site_path(site, "stat/device-basic"), None, None)
            .await
    }

    /// Full device statistics, optionally filtered to the given MACs.
    ///
    /// `POST /api/s/{site}/stat/device` with `{"macs": [...]}`
    pub async fn device_stats(
        &mut self,
        site: &SiteName,
        macs: Option<&[MacAddress]>,
    ) -> Result<Outcome<Data>, Error> {
        let macs: Option<Vec<String>> =
            macs.map(|macs| macs.iter().map(MacAddress::to_lowercase).collect());
        debug!(%site, ?macs, "fetching device stats");
        let timeout = self.timeouts().report;
        self.submit(
            &site_path(site, "stat/device"),
            Some(&json!({ "macs": macs })),
            Some(timeout),
        )
        .await
    }

    /// Adopted/connected/pending counts per device type.
    ///
    /// `POST /api/s/{site}/stat/widget/health`
    pub async fn widget_health(&mut self, site: &SiteName) -> Result<Outcome<Data>, Error> {
        debug!(%site, "fetching widget health");
        self.submit(&site_path(site, "stat/widget/health"), None, None)
            .await
    }
}
