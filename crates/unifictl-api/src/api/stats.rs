// Historical statistics
//
// `stat/report/{granularity}.{kind}` reports. The controller keeps 5-minute
// data only as long as its retention policy allows, and per-client reports
// need "Clients Historical Data" enabled in the controller settings.
// Replies are loosely-typed JSON since the field set follows `attrs`.

use serde_json::json;
use tracing::debug;

use crate::api::site_path;
use crate::envelope::{Data, Outcome};
use crate::error::Error;
use crate::params::{
    ApStats, GatewayStats, Granularity, Report, SPEEDTEST_SPAN, SiteName, TimeRange, UserStats,
    Validate, attrs_with_time,
};
use crate::session::Session;

const SITE_ATTRS: &[&str] = &[
    "bytes",
    "wan-tx_bytes",
    "wan-rx_bytes",
    "wlan_bytes",
    "num_sta",
    "lan-num_sta",
    "wlan-num_sta",
    "time",
];
const AP_ATTRS: &[&str] = &["bytes", "num_sta", "time"];
const SPEEDTEST_ATTRS: &[&str] = &["xput_download", "xput_upload", "latency", "time"];
const REPORT_SITE_ATTRS: &[&str] = &["wlan_bytes", "wlan-num_sta", "time"];
const REPORT_AP_ATTRS: &[&str] = &["bytes", "num_sta", "time"];

fn report_path(site: &SiteName, granularity: Granularity, kind: &str) -> String {
    site_path(site, &format!("stat/report/{granularity}.{kind}"))
}

impl Session {
    /// Site-wide traffic and client counts.
    ///
    /// `GET /api/s/{site}/stat/report/{granularity}.site`. Without a start,
    /// the window is 12 hours (5 minutes), 7 days (hourly) or 30 days (daily).
    pub async fn site_stats(
        &mut self,
        granularity: Granularity,
        range: &TimeRange,
        site: &SiteName,
    ) -> Result<Outcome<Data>, Error> {
        range.validate()?;
        let (start, end) = range.resolve(granularity.default_site_span())?;
        debug!(%granularity, %site, start, end, "fetching site stats");
        self.fetch(
            &report_path(site, granularity, "site"),
            Some(&json!({
                "attrs": SITE_ATTRS,
                "start": start,
                "end": end,
            })),
            None,
        )
        .await
    }

    /// Per access point traffic and client counts.
    ///
    /// `GET /api/s/{site}/stat/report/{granularity}.ap`. With `ap_mac` and no
    /// site, the owning site is looked up first (costly).
    pub async fn ap_stats(&mut self, params: &ApStats) -> Result<Outcome<Data>, Error> {
        params.validate()?;
        let (start, end) = params
            .range
            .resolve(params.granularity.default_device_span())?;
        self.ensure_authenticated().await?;

        let mut body = json!({
            "attrs": AP_ATTRS,
            "start": start,
            "end": end,
        });
        let site = match (&params.site, &params.ap_mac) {
            (Some(site), _) => site.clone(),
            (None, Some(ap_mac)) => self.require_device_site(ap_mac).await?,
            (None, None) => SiteName::default(),
        };
        if let (Some(ap_mac), Some(obj)) = (&params.ap_mac, body.as_object_mut()) {
            obj.insert("mac".into(), json!(ap_mac.to_lowercase()));
        }

        debug!(granularity = %params.granularity, %site, start, end, "fetching AP stats");
        self.fetch(&report_path(&site, params.granularity, "ap"), Some(&body), None)
            .await
    }

    /// Per-client stats. `time` is always added to the requested attributes.
    ///
    /// `GET /api/s/{site}/stat/report/{granularity}.user`
    pub async fn user_stats(&mut self, params: &UserStats) -> Result<Outcome<Data>, Error> {
        params.validate()?;
        let (start, end) = params
            .range
            .resolve(params.granularity.default_device_span())?;
        debug!(granularity = %params.granularity, mac = %params.user_mac, start, end, "fetching user stats");
        self.fetch(
            &report_path(&params.site, params.granularity, "user"),
            Some(&json!({
                "mac": params.user_mac.to_lowercase(),
                "attrs": attrs_with_time(&params.attrs),
                "start": start,
                "end": end,
            })),
            None,
        )
        .await
    }

    /// Gateway stats. `time` is always added to the requested attributes.
    ///
    /// `GET /api/s/{site}/stat/report/{granularity}.gw`. Needs a gateway on
    /// the site; the daily window defaults to a full year.
    pub async fn gateway_stats(&mut self, params: &GatewayStats) -> Result<Outcome<Data>, Error> {
        params.validate()?;
        let (start, end) = params
            .range
            .resolve(params.granularity.default_gateway_span())?;
        debug!(granularity = %params.granularity, site = %params.site, start, end, "fetching gateway stats");
        self.fetch(
            &report_path(&params.site, params.granularity, "gw"),
            Some(&json!({
                "attrs": attrs_with_time(&params.attrs),
                "start": start,
                "end": end,
            })),
            None,
        )
        .await
    }

    /// Gateway speed test results, last 24 hours by default.
    ///
    /// `GET /api/s/{site}/stat/report/archive.speedtest`
    pub async fn speedtest_results(
        &mut self,
        range: &TimeRange,
        site: &SiteName,
    ) -> Result<Outcome<Data>, Error> {
        range.validate()?;
        let (start, end) = range.resolve(SPEEDTEST_SPAN)?;
        debug!(%site, start, end, "fetching speed test results");
        self.fetch(
            &site_path(site, "stat/report/archive.speedtest"),
            Some(&json!({
                "attrs": SPEEDTEST_ATTRS,
                "start": start,
                "end": end,
            })),
            None,
        )
        .await
    }

    /// Total users and traffic per interval, as a POST report.
    ///
    /// `POST /api/s/{site}/stat/report/{granularity}.site`
    pub async fn report_site(&mut self, params: &Report) -> Result<Outcome<Data>, Error> {
        params.validate()?;
        let body = report_body(params, REPORT_SITE_ATTRS);
        debug!(site = %params.site, granularity = %params.granularity, "fetching site report");
        self.submit(
            &report_path(&params.site, params.granularity, "site"),
            Some(&body),
            None,
        )
        .await
    }

    /// Per access point report, as a POST.
    ///
    /// `POST /api/s/{site}/stat/report/{granularity}.ap`
    pub async fn report_ap(&mut self, params: &Report) -> Result<Outcome<Data>, Error> {
        params.validate()?;
        let body = report_body(params, REPORT_AP_ATTRS);
        debug!(site = %params.site, granularity = %params.granularity, "fetching AP report");
        let timeout = self.timeouts().report;
        self.submit(
            &report_path(&params.site, params.granularity, "ap"),
            Some(&body),
            Some(timeout),
        )
        .await
    }
}

fn report_body(params: &Report, default_attrs: &[&str]) -> serde_json::Value {
    let attrs: Vec<String> = params.attrs.clone().unwrap_or_else(|| {
        default_attrs.iter().map(|a| (*a).to_owned()).collect()
    });
    json!({
        "start": params.from.timestamp_millis(),
        "end": params.to.timestamp_millis(),
        "attrs": attrs,
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use chrono::{TimeZone, Utc};

    use super::*;

    #[test]
    fn report_paths() {
        let site = SiteName::default();
        assert_eq!(
            report_path(&site, Granularity::FiveMinutes, "site"),
            "/api/s/default/stat/report/5minutes.site"
        );
        assert_eq!(
            report_path(&site, Granularity::Daily, "gw"),
            "/api/s/default/stat/report/daily.gw"
        );
    }

    #[test]
    fn report_body_uses_defaults_and_millis() {
        let from = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let to = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        let report = Report::new(SiteName::default(), from, to);
        let body = report_body(&report, REPORT_SITE_ATTRS);
        assert_eq!(body["start"], json!(1_704_067_200_000_i64));
        assert_eq!(body["end"], json!(1_704_153_600_000_i64));
        assert_eq!(body["attrs"], json!(["wlan_bytes", "wlan-num_sta", "time"]));
    }
}
