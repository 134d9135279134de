//! Historical statistics reports.

use unifictl_api::{ApStats, GatewayStats, Session, SiteName, UserStats};

use crate::cli::{StatsArgs, StatsCommand};
use crate::error::CliError;
use crate::output;

use super::window;

pub async fn handle(
    session: &mut Session,
    args: StatsArgs,
    site: Option<&SiteName>,
) -> Result<(), CliError> {
    let scoped = site.cloned().unwrap_or_default();
    let outcome = match args.command {
        StatsCommand::Site(w) => {
            session
                .site_stats(w.granularity, &window(w.hours), &scoped)
                .await?
        }
        StatsCommand::Ap { window: w, mac } => {
            let params = ApStats {
                granularity: w.granularity,
                ap_mac: mac,
                range: window(w.hours),
                site: site.cloned(),
            };
            session.ap_stats(&params).await?
        }
        StatsCommand::User {
            window: w,
            mac,
            attrs,
        } => {
            let mut params = UserStats::new(w.granularity, mac);
            params.attrs = attrs;
            params.range = window(w.hours);
            params.site = scoped;
            session.user_stats(&params).await?
        }
        StatsCommand::Gateway { window: w, attrs } => {
            let mut params = GatewayStats::new(w.granularity);
            params.attrs = attrs;
            params.range = window(w.hours);
            params.site = scoped;
            session.gateway_stats(&params).await?
        }
        StatsCommand::Speedtest { hours } => {
            session.speedtest_results(&window(hours), &scoped).await?
        }
    };
    output::print_outcome("stats report", outcome)
}
