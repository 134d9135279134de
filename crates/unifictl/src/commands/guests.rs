//! Guest authorization and station commands.

use tracing::info;
use unifictl_api::{AuthorizeGuest, Session, SiteName};

use crate::cli::{GuestArgs, GuestCommand};
use crate::error::CliError;
use crate::output;

pub async fn handle(
    session: &mut Session,
    args: GuestArgs,
    site: Option<&SiteName>,
) -> Result<(), CliError> {
    let scoped = site.cloned().unwrap_or_default();
    let (operation, accepted) = match args.command {
        GuestCommand::Authorize(a) => {
            let mut params = AuthorizeGuest::new(a.mac, a.minutes);
            params.up_kbps = a.up;
            params.down_kbps = a.down;
            params.quota_mb = a.quota;
            // Without a site the AP decides where the guest lives.
            params.site = site.cloned();
            params.ap_mac = a.ap_mac;
            ("authorize-guest", session.authorize_guest(&params).await?)
        }
        GuestCommand::Unauthorize(a) => (
            "unauthorize-guest",
            session.unauthorize_guest(&a.mac, &scoped).await?,
        ),
        GuestCommand::Kick(a) => ("kick-sta", session.reconnect_client(&a.mac, &scoped).await?),
        GuestCommand::Block(a) => ("block-sta", session.block_client(&a.mac, &scoped).await?),
        GuestCommand::Unblock(a) => ("unblock-sta", session.unblock_client(&a.mac, &scoped).await?),
        GuestCommand::Forget(a) => ("forget-sta", session.forget_clients(&a.macs, &scoped).await?),
    };
    info!(operation, accepted, site = ?site, "station command finished");
    output::print_accepted(operation, accepted)
}
