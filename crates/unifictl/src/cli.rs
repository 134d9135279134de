//! Clap derive structures for the `unifictl` CLI.

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

use unifictl_api::{ClientType, GatewayStatAttr, Granularity, MacAddress, UserStatAttr};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// unifictl -- query and control a UniFi network controller
#[derive(Debug, Parser)]
#[command(
    name = "unifictl",
    version,
    about = "Query and control UniFi network controllers from the command line",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Controller profile to use
    #[arg(long, short = 'p', env = "UNIFICTL_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Controller URL (overrides profile)
    #[arg(long, short = 'c', env = "UNIFICTL_CONTROLLER", global = true)]
    pub controller: Option<String>,

    /// Site short name [default: "default", or the AP's site for `guest authorize --ap-mac` and `stats ap --mac`]
    #[arg(long, short = 's', env = "UNIFICTL_SITE", global = true)]
    pub site: Option<String>,

    /// Login username (overrides profile)
    #[arg(long, short = 'u', env = "UNIFICTL_USERNAME", global = true)]
    pub username: Option<String>,

    /// Login password
    #[arg(long, env = "UNIFICTL_PASSWORD", global = true, hide_env_values = true)]
    pub password: Option<String>,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "UNIFICTL_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds
    #[arg(long, env = "UNIFICTL_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Log raw controller responses (with -vv)
    #[arg(long, global = true)]
    pub debug: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check that the configured credentials are accepted
    Login,

    /// List sites visible to the account
    Sites,

    /// List devices on the site
    #[command(alias = "dev")]
    Devices(DevicesArgs),

    /// Find the site a device belongs to (scans every site)
    FindDevice(FindDeviceArgs),

    /// List clients on the site
    #[command(alias = "cl")]
    Clients(ClientsArgs),

    /// Guest authorization and station control
    Guest(GuestArgs),

    /// Client login sessions
    Sessions(SessionsArgs),

    /// Historical statistics reports
    Stats(StatsArgs),

    /// Adopted/connected/pending counts per subsystem
    Health,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Devices ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct DevicesArgs {
    /// Only this device
    #[arg(long, conflicts_with = "basic")]
    pub mac: Option<MacAddress>,

    /// Basic info only (MAC, type, state)
    #[arg(long)]
    pub basic: bool,
}

#[derive(Debug, Args)]
pub struct FindDeviceArgs {
    /// Device MAC address
    pub mac: MacAddress,
}

// ── Clients ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ClientsArgs {
    /// Only this client
    #[arg(long, conflicts_with_all = ["all", "guests"])]
    pub mac: Option<MacAddress>,

    /// Every client ever seen, not just online ones
    #[arg(long, conflicts_with = "guests")]
    pub all: bool,

    /// Guests with a valid authorization
    #[arg(long)]
    pub guests: bool,

    /// Look-back window in hours for --all / --guests
    #[arg(long, default_value_t = unifictl_api::DEFAULT_WITHIN_HOURS)]
    pub within: u32,
}

// ── Guests ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GuestArgs {
    #[command(subcommand)]
    pub command: GuestCommand,
}

#[derive(Debug, Subcommand)]
pub enum GuestCommand {
    /// Authorize a guest on the hotspot portal
    Authorize(AuthorizeArgs),

    /// Revoke a guest authorization
    Unauthorize(MacArg),

    /// Disconnect a client so it reassociates
    Kick(MacArg),

    /// Block a client
    Block(MacArg),

    /// Unblock a client
    Unblock(MacArg),

    /// Forget clients and their history
    Forget(ForgetArgs),
}

#[derive(Debug, Args)]
pub struct MacArg {
    /// Client MAC address
    pub mac: MacAddress,
}

#[derive(Debug, Args)]
pub struct AuthorizeArgs {
    /// Client MAC address
    pub mac: MacAddress,

    /// Authorization length in minutes
    #[arg(long, short = 'm')]
    pub minutes: u32,

    /// Upload limit in kbps
    #[arg(long)]
    pub up: Option<u32>,

    /// Download limit in kbps
    #[arg(long)]
    pub down: Option<u32>,

    /// Data quota in MB
    #[arg(long)]
    pub quota: Option<u32>,

    /// Access point the client is connected to
    #[arg(long)]
    pub ap_mac: Option<MacAddress>,
}

#[derive(Debug, Args)]
pub struct ForgetArgs {
    /// Client MAC addresses
    #[arg(required = true)]
    pub macs: Vec<MacAddress>,
}

// ── Sessions ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SessionsArgs {
    /// Only this client
    #[arg(long)]
    pub mac: Option<MacAddress>,

    /// Client type: all, guest or user
    #[arg(long = "type", default_value = "all")]
    pub client_type: ClientType,

    /// Most recent N sessions of --mac instead of a time window
    #[arg(long, requires = "mac")]
    pub latest: Option<u32>,

    /// Look-back window in hours (default 7 days)
    #[arg(long)]
    pub hours: Option<u32>,

    /// Guest authorizations instead of sessions
    #[arg(long, conflicts_with_all = ["mac", "latest"])]
    pub authorizations: bool,
}

// ── Stats ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct StatsArgs {
    #[command(subcommand)]
    pub command: StatsCommand,
}

#[derive(Debug, Args)]
pub struct WindowArgs {
    /// 5minutes, hourly or daily
    #[arg(long, short = 'g', default_value = "daily")]
    pub granularity: Granularity,

    /// Look-back window in hours (defaults depend on granularity)
    #[arg(long)]
    pub hours: Option<u32>,
}

#[derive(Debug, Subcommand)]
pub enum StatsCommand {
    /// Site-wide traffic and client counts
    Site(WindowArgs),

    /// Per access point stats
    Ap {
        #[command(flatten)]
        window: WindowArgs,

        /// Only this access point
        #[arg(long)]
        mac: Option<MacAddress>,
    },

    /// Per-client stats
    User {
        #[command(flatten)]
        window: WindowArgs,

        /// Client MAC address
        mac: MacAddress,

        /// Attributes, comma separated (rx_bytes, tx_bytes, signal, ...)
        #[arg(long, value_delimiter = ',', default_value = "rx_bytes,tx_bytes")]
        attrs: Vec<UserStatAttr>,
    },

    /// Gateway stats
    Gateway {
        #[command(flatten)]
        window: WindowArgs,

        /// Attributes, comma separated (mem, cpu, loadavg_5, lan-rx_bytes, ...)
        #[arg(long, value_delimiter = ',', default_value = "mem,cpu,loadavg_5")]
        attrs: Vec<GatewayStatAttr>,
    },

    /// Gateway speed test results
    Speedtest {
        /// Look-back window in hours (default 24)
        #[arg(long)]
        hours: Option<u32>,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell
    pub shell: Shell,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use clap::CommandFactory;

    use super::*;

    #[test]
    fn command_tree_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_guest_authorize() {
        let cli = Cli::try_parse_from([
            "unifictl",
            "guest",
            "authorize",
            "aa-bb-cc-dd-ee-ff",
            "--minutes",
            "60",
            "--quota",
            "100",
        ])
        .unwrap();
        let Command::Guest(GuestArgs {
            command: GuestCommand::Authorize(args),
        }) = cli.command
        else {
            panic!("expected guest authorize");
        };
        assert_eq!(args.mac.as_str(), "AA:BB:CC:DD:EE:FF");
        assert_eq!(args.minutes, 60);
        assert_eq!(args.quota, Some(100));
    }

    #[test]
    fn parses_stats_attrs() {
        let cli = Cli::try_parse_from([
            "unifictl", "stats", "user", "aa:bb:cc:dd:ee:ff", "-g", "hourly", "--attrs",
            "signal,rx_rate",
        ])
        .unwrap();
        let Command::Stats(StatsArgs {
            command: StatsCommand::User { window, attrs, .. },
        }) = cli.command
        else {
            panic!("expected stats user");
        };
        assert_eq!(window.granularity, Granularity::Hourly);
        assert_eq!(attrs, vec![UserStatAttr::Signal, UserStatAttr::RxRate]);
    }

    #[test]
    fn rejects_bad_mac() {
        assert!(Cli::try_parse_from(["unifictl", "guest", "kick", "not-a-mac"]).is_err());
    }
}
