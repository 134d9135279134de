//! Client listings and login sessions.

use unifictl_api::{ListSessions, Session, SiteName};

use crate::cli::{ClientsArgs, SessionsArgs};
use crate::error::CliError;
use crate::output;

use super::window;

pub async fn list(session: &mut Session, args: ClientsArgs, site: &SiteName) -> Result<(), CliError> {
    let outcome = if args.all {
        session.list_all_users(args.within, site).await?
    } else if args.guests {
        session.list_guests(args.within, site).await?
    } else {
        session.list_online_clients(args.mac.as_ref(), site).await?
    };
    output::print_outcome("client listing", outcome)
}

pub async fn sessions(
    session: &mut Session,
    args: SessionsArgs,
    site: &SiteName,
) -> Result<(), CliError> {
    let outcome = match (args.authorizations, args.latest, args.mac) {
        (true, _, _) => {
            session
                .list_authorizations(&window(args.hours), site)
                .await?
        }
        (false, Some(limit), Some(mac)) => session.latest_sessions(&mac, limit, site).await?,
        (false, _, client_mac) => {
            let params = ListSessions {
                client_mac,
                client_type: args.client_type,
                range: window(args.hours),
                site: site.clone(),
            };
            session.list_sessions(&params).await?
        }
    };
    output::print_outcome("session listing", outcome)
}
