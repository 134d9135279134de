// unifictl-api: Async Rust client for the UniFi controller management API
//
// A `Session` owns the cookie-based login state. Protected calls go through a
// call guard that logs in on demand and recovers from expired sessions; every
// reply is decoded from the controller's `{data, meta}` envelope.

pub mod api;
pub mod auth;
pub mod cookies;
pub mod envelope;
pub mod error;
pub mod guard;
pub mod models;
pub mod params;
pub mod session;
pub mod transport;

pub use api::clients::DEFAULT_WITHIN_HOURS;
pub use envelope::{Data, Envelope, LOGIN_REQUIRED, Outcome, RawResponse, ResultCode};
pub use error::Error;
pub use guard::{GuardState, RETRY_BUDGET};
pub use models::{DeviceRecord, SiteRecord};
pub use params::{
    ApStats, AuthorizeGuest, ClientType, GatewayStatAttr, GatewayStats, Granularity, ListSessions,
    MacAddress, Report, SiteName, TimeBound, TimeRange, UserStatAttr, UserStats, Validate,
};
pub use session::{SESSION_COOKIE, Session, SessionConfig};
pub use transport::{Timeouts, TlsMode, TransportConfig};
