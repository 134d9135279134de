//! Command dispatch: bridges CLI args -> session calls -> JSON output.

pub mod clients;
pub mod guests;
pub mod sites;
pub mod stats;

use chrono::Utc;
use unifictl_api::{Session, SiteName, TimeBound, TimeRange};

use crate::cli::Command;
use crate::error::CliError;

/// Dispatch a controller-bound command to its handler.
///
/// `site` is `None` when the user named none. Guest authorization and AP
/// stats then let the access point decide; everything else uses `default`.
pub async fn dispatch(
    cmd: Command,
    session: &mut Session,
    site: Option<&SiteName>,
) -> Result<(), CliError> {
    let scoped = site.cloned().unwrap_or_default();
    match cmd {
        Command::Login => sites::login(session).await,
        Command::Sites => sites::list(session).await,
        Command::Devices(args) => sites::devices(session, args, &scoped).await,
        Command::FindDevice(args) => sites::find_device(session, args).await,
        Command::Health => sites::health(session, &scoped).await,
        Command::Clients(args) => clients::list(session, args, &scoped).await,
        Command::Sessions(args) => clients::sessions(session, args, &scoped).await,
        Command::Guest(args) => guests::handle(session, args, site).await,
        Command::Stats(args) => stats::handle(session, args, site).await,
        // Handled before a session exists
        Command::Completions(_) => Ok(()),
    }
}

/// `--hours N` as a range ending now; `None` leaves the default window.
pub(crate) fn window(hours: Option<u32>) -> TimeRange {
    match hours {
        Some(hours) => {
            let start = Utc::now().timestamp() - i64::from(hours) * 3600;
            TimeRange::new(Some(TimeBound::Seconds(start)), None)
        }
        None => TimeRange::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_defaults_to_open_range() {
        assert_eq!(window(None), TimeRange::default());
        let range = window(Some(2));
        assert!(matches!(range.start, Some(TimeBound::Seconds(_))));
        assert!(range.end.is_none());
    }
}
