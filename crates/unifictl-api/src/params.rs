// Parameter validation
//
// Typed parameters for the domain operations. Shapes that can be checked on
// their own (MAC addresses, site names, enums) are enforced by construction;
// cross-field rules live in each struct's `Validate` impl, which every
// operation runs before touching the network.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::error::Error;

/// Cross-field checks run at the boundary of each operation.
pub trait Validate {
    fn validate(&self) -> Result<(), Error>;
}

// ── MAC address ──────────────────────────────────────────────────────

/// A MAC address, normalized to `AA:BB:CC:DD:EE:FF`.
///
/// Accepts six hex octets separated by `:`, `-` or nothing, in any case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MacAddress(String);

impl MacAddress {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lower-case form, as the controller stores it.
    pub fn to_lowercase(&self) -> String {
        self.0.to_ascii_lowercase()
    }
}

impl FromStr for MacAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::validation("mac", format!("{s:?} is not a MAC address"));

        let bytes = s.as_bytes();
        let mut octets = Vec::with_capacity(6);
        let mut pos = 0;
        while pos < bytes.len() {
            let pair = bytes.get(pos..pos + 2).ok_or_else(invalid)?;
            if !pair.iter().all(u8::is_ascii_hexdigit) {
                return Err(invalid());
            }
            octets.push(pair.to_ascii_uppercase());
            pos += 2;
            if octets.len() < 6 && matches!(bytes.get(pos), Some(b':' | b'-')) {
                pos += 1;
            }
        }
        if octets.len() != 6 {
            return Err(invalid());
        }

        let joined = octets
            .iter()
            .map(|octet| String::from_utf8_lossy(octet).into_owned())
            .collect::<Vec<_>>()
            .join(":");
        Ok(Self(joined))
    }
}

impl TryFrom<String> for MacAddress {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MacAddress> for String {
    fn from(mac: MacAddress) -> Self {
        mac.0
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ── Site name ────────────────────────────────────────────────────────

/// A controller site identifier (`default`, or the short id of any other site).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SiteName(String);

impl SiteName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SiteName {
    fn default() -> Self {
        Self("default".into())
    }
}

impl FromStr for SiteName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(Error::validation("site", "value is not a UniFi site id"));
        }
        if s.contains('/') {
            return Err(Error::validation("site", format!("{s:?} contains '/'")));
        }
        Ok(Self(s.to_owned()))
    }
}

impl TryFrom<String> for SiteName {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SiteName> for String {
    fn from(site: SiteName) -> Self {
        site.0
    }
}

impl fmt::Display for SiteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ── Enumerated options ───────────────────────────────────────────────

/// Report granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, AsRefStr)]
pub enum Granularity {
    #[strum(serialize = "5minutes")]
    FiveMinutes,
    #[strum(serialize = "hourly")]
    Hourly,
    #[default]
    #[strum(serialize = "daily")]
    Daily,
}

/// `stat/session` client filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum ClientType {
    #[default]
    All,
    Guest,
    User,
}

/// Attributes accepted by per-client (`.user`) reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum UserStatAttr {
    RxBytes,
    TxBytes,
    Signal,
    RxRate,
    TxRate,
    RxRetries,
    TxRetries,
    RxPackets,
    TxPackets,
}

/// Attributes accepted by gateway (`.gw`) reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, AsRefStr)]
pub enum GatewayStatAttr {
    #[strum(serialize = "mem")]
    Mem,
    #[strum(serialize = "cpu")]
    Cpu,
    #[strum(serialize = "loadavg_5")]
    LoadAvg5,
    #[strum(serialize = "lan-rx_errors")]
    LanRxErrors,
    #[strum(serialize = "lan-tx_errors")]
    LanTxErrors,
    #[strum(serialize = "lan-rx_bytes")]
    LanRxBytes,
    #[strum(serialize = "lan-tx_bytes")]
    LanTxBytes,
    #[strum(serialize = "lan-rx_packets")]
    LanRxPackets,
    #[strum(serialize = "lan-tx_packets")]
    LanTxPackets,
    #[strum(serialize = "lan-rx_dropped")]
    LanRxDropped,
    #[strum(serialize = "lan-tx_dropped")]
    LanTxDropped,
}

/// Append `time` to an attribute list unless it is already there.
pub(crate) fn attrs_with_time<A: AsRef<str>>(attrs: &[A]) -> Vec<String> {
    let mut out: Vec<String> = attrs.iter().map(|a| a.as_ref().to_owned()).collect();
    if !out.iter().any(|a| a == "time") {
        out.push("time".into());
    }
    out
}

// ── Time ranges ──────────────────────────────────────────────────────

const HOUR_MS: i64 = 60 * 60 * 1000;
const DAY_MS: i64 = 24 * HOUR_MS;

/// One end of a time range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeBound {
    /// Unix timestamp in seconds.
    Seconds(i64),
    At(DateTime<Utc>),
}

impl TimeBound {
    fn millis(self) -> i64 {
        match self {
            Self::Seconds(secs) => secs.saturating_mul(1000),
            Self::At(at) => at.timestamp_millis(),
        }
    }
}

impl From<DateTime<Utc>> for TimeBound {
    fn from(at: DateTime<Utc>) -> Self {
        Self::At(at)
    }
}

/// Optional `start`/`end`; missing ends are filled in per operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeRange {
    pub start: Option<TimeBound>,
    pub end: Option<TimeBound>,
}

impl TimeRange {
    pub fn new(start: Option<TimeBound>, end: Option<TimeBound>) -> Self {
        Self { start, end }
    }

    pub fn between(start: impl Into<TimeBound>, end: impl Into<TimeBound>) -> Self {
        Self {
            start: Some(start.into()),
            end: Some(end.into()),
        }
    }

    /// Resolve to `(start_ms, end_ms)`. `end` defaults to now, `start` to
    /// `end - default_span`. Fails unless `0 < start < end`.
    pub fn resolve(&self, default_span: Duration) -> Result<(i64, i64), Error> {
        self.resolve_at(default_span, Utc::now())
    }

    pub(crate) fn resolve_at(
        &self,
        default_span: Duration,
        now: DateTime<Utc>,
    ) -> Result<(i64, i64), Error> {
        let end = self.end.map_or_else(|| now.timestamp_millis(), TimeBound::millis);
        let span = i64::try_from(default_span.as_millis()).unwrap_or(i64::MAX);
        let start = self
            .start
            .map_or_else(|| end.saturating_sub(span), TimeBound::millis);
        if start <= 0 || start >= end {
            return Err(Error::validation(
                "time range",
                "start must be before end (and both positive)",
            ));
        }
        Ok((start, end))
    }
}

impl Validate for TimeRange {
    fn validate(&self) -> Result<(), Error> {
        match (self.start, self.end) {
            (Some(start), Some(end)) if start.millis() >= end.millis() => Err(Error::validation(
                "time range",
                "start must be before end (and both positive)",
            )),
            _ => Ok(()),
        }
    }
}

impl Granularity {
    /// Window used when a site report gets no explicit start.
    pub fn default_site_span(self) -> Duration {
        match self {
            Self::FiveMinutes => span_ms(12 * HOUR_MS),
            Self::Hourly => span_ms(7 * DAY_MS),
            Self::Daily => span_ms(30 * DAY_MS),
        }
    }

    /// Window for access point and client reports.
    pub fn default_device_span(self) -> Duration {
        match self {
            Self::FiveMinutes => span_ms(12 * HOUR_MS),
            Self::Hourly | Self::Daily => span_ms(7 * DAY_MS),
        }
    }

    /// Window for gateway reports.
    pub fn default_gateway_span(self) -> Duration {
        match self {
            Self::FiveMinutes => span_ms(12 * HOUR_MS),
            Self::Hourly => span_ms(7 * DAY_MS),
            Self::Daily => span_ms(365 * DAY_MS),
        }
    }
}

fn span_ms(ms: i64) -> Duration {
    Duration::from_millis(u64::try_from(ms).unwrap_or_default())
}

pub(crate) const SESSIONS_SPAN: Duration = Duration::from_secs(7 * 24 * 60 * 60);
pub(crate) const SPEEDTEST_SPAN: Duration = Duration::from_secs(24 * 60 * 60);

// ── Operation parameters ─────────────────────────────────────────────

/// Parameters for `authorize_guest`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizeGuest {
    pub client_mac: MacAddress,
    /// Minutes from now until the authorization expires.
    pub minutes: u32,
    /// Resolved from `ap_mac` when absent, else `default`.
    pub site: Option<SiteName>,
    /// Access point the client is attached to (speeds up authorization).
    pub ap_mac: Option<MacAddress>,
    /// Upload limit in kbps.
    pub up_kbps: Option<u32>,
    /// Download limit in kbps.
    pub down_kbps: Option<u32>,
    /// Transfer quota in MB.
    pub quota_mb: Option<u32>,
}

impl AuthorizeGuest {
    pub fn new(client_mac: MacAddress, minutes: u32) -> Self {
        Self {
            client_mac,
            minutes,
            site: None,
            ap_mac: None,
            up_kbps: None,
            down_kbps: None,
            quota_mb: None,
        }
    }
}

impl Validate for AuthorizeGuest {
    fn validate(&self) -> Result<(), Error> {
        if self.minutes == 0 {
            return Err(Error::validation("minutes", "must be at least 1"));
        }
        Ok(())
    }
}

/// Parameters for `list_sessions`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListSessions {
    pub client_mac: Option<MacAddress>,
    pub client_type: ClientType,
    pub range: TimeRange,
    pub site: SiteName,
}

impl Validate for ListSessions {
    fn validate(&self) -> Result<(), Error> {
        self.range.validate()
    }
}

/// Parameters for `ap_stats`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApStats {
    pub granularity: Granularity,
    pub ap_mac: Option<MacAddress>,
    pub range: TimeRange,
    /// Resolved from `ap_mac` when absent, else `default`.
    pub site: Option<SiteName>,
}

impl Validate for ApStats {
    fn validate(&self) -> Result<(), Error> {
        self.range.validate()
    }
}

/// Parameters for `user_stats`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserStats {
    pub granularity: Granularity,
    pub user_mac: MacAddress,
    pub attrs: Vec<UserStatAttr>,
    pub range: TimeRange,
    pub site: SiteName,
}

impl UserStats {
    pub fn new(granularity: Granularity, user_mac: MacAddress) -> Self {
        Self {
            granularity,
            user_mac,
            attrs: vec![UserStatAttr::RxBytes, UserStatAttr::TxBytes],
            range: TimeRange::default(),
            site: SiteName::default(),
        }
    }
}

impl Validate for UserStats {
    fn validate(&self) -> Result<(), Error> {
        if self.attrs.is_empty() {
            return Err(Error::validation("attrs", "at least one attribute is required"));
        }
        self.range.validate()
    }
}

/// Parameters for `gateway_stats`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayStats {
    pub granularity: Granularity,
    pub attrs: Vec<GatewayStatAttr>,
    pub range: TimeRange,
    pub site: SiteName,
}

impl GatewayStats {
    pub fn new(granularity: Granularity) -> Self {
        Self {
            granularity,
            attrs: vec![
                GatewayStatAttr::Mem,
                GatewayStatAttr::Cpu,
                GatewayStatAttr::LoadAvg5,
            ],
            range: TimeRange::default(),
            site: SiteName::default(),
        }
    }
}

impl Validate for GatewayStats {
    fn validate(&self) -> Result<(), Error> {
        if self.attrs.is_empty() {
            return Err(Error::validation("attrs", "at least one attribute is required"));
        }
        self.range.validate()
    }
}

/// Parameters for the POST report endpoints (`report_site`, `report_ap`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub site: SiteName,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    pub granularity: Granularity,
    /// Overrides the per-report default attribute list.
    pub attrs: Option<Vec<String>>,
}

impl Report {
    pub fn new(site: SiteName, from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        Self {
            site,
            from,
            to,
            granularity: Granularity::Daily,
            attrs: None,
        }
    }
}

impl Validate for Report {
    fn validate(&self) -> Result<(), Error> {
        if self.from >= self.to {
            return Err(Error::validation("date range", "start must be before end"));
        }
        if self.attrs.as_ref().is_some_and(Vec::is_empty) {
            return Err(Error::validation("attrs", "at least one attribute is required"));
        }
        Ok(())
    }
}
