//! Login check, sites, devices, and health.

use serde_json::json;
use unifictl_api::{MacAddress, Session, SiteName};

use crate::cli::{DevicesArgs, FindDeviceArgs};
use crate::error::CliError;
use crate::output;

pub async fn login(session: &mut Session) -> Result<(), CliError> {
    if !session.login(None, None).await? {
        return Err(CliError::AuthFailed {
            reason: "controller did not issue a session cookie".into(),
        });
    }
    output::print_json(&json!({
        "controller": session.base_url().as_str(),
        "username": session.username(),
        "authenticated": true,
    }))
}

pub async fn list(session: &mut Session) -> Result<(), CliError> {
    let outcome = session.list_sites().await?;
    output::print_outcome("site listing", outcome)
}

pub async fn devices(
    session: &mut Session,
    args: DevicesArgs,
    site: &SiteName,
) -> Result<(), CliError> {
    let outcome = if args.basic {
        session.list_devices_basic(site).await?
    } else {
        session.list_devices(site, args.mac.as_ref()).await?
    };
    output::print_outcome("device listing", outcome)
}

pub async fn find_device(session: &mut Session, args: FindDeviceArgs) -> Result<(), CliError> {
    match session.find_device_site(&args.mac).await? {
        Some(site) => output::print_json(&json!({
            "mac": args.mac.as_str(),
            "site": site.as_str(),
        })),
        None => Err(not_found(&args.mac)),
    }
}

pub async fn health(session: &mut Session, site: &SiteName) -> Result<(), CliError> {
    let outcome = session.widget_health(site).await?;
    output::print_outcome("health", outcome)
}

fn not_found(mac: &MacAddress) -> CliError {
    CliError::NotFound {
        resource_type: "device".into(),
        identifier: mac.to_string(),
        list_command: "devices".into(),
    }
}
