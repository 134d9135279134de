//! Profile + flag resolution into a ready-to-use session target.
//!
//! Precedence for every setting: CLI flag (or its `UNIFICTL_*` env var), then
//! the active profile, then `[defaults]`.

use secrecy::SecretString;
use tracing::debug;

use unifictl_api::{SessionConfig, SiteName};
use unifictl_config::{Config, Profile, config_path, load_config, profile_to_session_config};

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Everything a command needs to reach the controller.
#[derive(Debug)]
pub struct Target {
    pub session: SessionConfig,
    /// `None` when neither a flag nor the profile names a site.
    pub site: Option<SiteName>,
}

/// Load config and layer the global flags over the active profile.
pub fn resolve_target(global: &GlobalOpts) -> Result<Target, CliError> {
    let cfg = load_config()?;
    resolve_target_with(global, &cfg)
}

pub fn resolve_target_with(global: &GlobalOpts, cfg: &Config) -> Result<Target, CliError> {
    let profile_name = cfg.active_profile_name(global.profile.as_deref());

    let mut profile = match cfg.profiles.get(&profile_name) {
        Some(profile) => profile.clone(),
        // An explicitly requested profile must exist.
        None if global.profile.is_some() => cfg.profile(&profile_name)?.clone(),
        // No profile: flags alone must name a controller.
        None => {
            let controller = global.controller.clone().ok_or_else(|| CliError::NoConfig {
                path: config_path().display().to_string(),
            })?;
            Profile::new(controller)
        }
    };
    apply_overrides(&mut profile, global);
    debug!(profile = %profile_name, controller = %profile.controller, "resolved profile");

    let site: Option<SiteName> = profile.site.as_deref().map(str::parse::<SiteName>).transpose()?;

    let mut session = profile_to_session_config(&profile, &profile_name, &cfg.defaults)?;
    if let Some(ref password) = global.password {
        session = session.password(SecretString::from(password.clone()));
    }
    if global.debug {
        session = session.debug(true);
    }

    Ok(Target { session, site })
}

fn apply_overrides(profile: &mut Profile, global: &GlobalOpts) {
    if let Some(ref controller) = global.controller {
        profile.controller.clone_from(controller);
    }
    if global.site.is_some() {
        profile.site.clone_from(&global.site);
    }
    if let Some(ref username) = global.username {
        profile.username = Some(username.clone());
    }
    // A flag password must not trip "no credentials" before it is applied.
    if global.password.is_some() && profile.password.is_none() {
        profile.password.clone_from(&global.password);
    }
    if global.insecure {
        profile.insecure = Some(true);
    }
    if let Some(timeout) = global.timeout {
        profile.timeout = Some(timeout);
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use clap::Parser;
    use unifictl_api::TlsMode;

    use super::*;
    use crate::cli::Cli;

    fn global(args: &[&str]) -> GlobalOpts {
        let mut argv = vec!["unifictl"];
        argv.extend_from_slice(args);
        argv.push("sites");
        Cli::try_parse_from(argv).unwrap().global
    }

    fn lab_config() -> Config {
        let mut cfg = Config::default();
        cfg.default_profile = Some("lab".into());
        let mut lab = Profile::new("https://192.168.1.2:8443");
        lab.username = Some("admin".into());
        lab.password = Some("plaintext".into());
        lab.site = Some("branch".into());
        lab.insecure = Some(false);
        cfg.profiles.insert("lab".into(), lab);
        cfg
    }

    #[test]
    fn flags_override_profile() {
        let cfg = lab_config();
        let target = resolve_target_with(
            &global(&["--site", "hq", "--insecure", "--timeout", "5", "--password", "flag"]),
            &cfg,
        )
        .unwrap();

        assert_eq!(target.site.unwrap().as_str(), "hq");
        assert_eq!(target.session.transport.tls, TlsMode::DangerAcceptInvalid);
        assert_eq!(target.session.transport.timeouts.request.as_secs(), 5);
        assert_eq!(target.session.base_url, "https://192.168.1.2:8443/");
    }

    #[test]
    fn profile_values_apply_without_flags() {
        let cfg = lab_config();
        let target = resolve_target_with(&global(&["--password", "pw"]), &cfg).unwrap();

        assert_eq!(target.site.unwrap().as_str(), "branch");
        assert_eq!(target.session.transport.tls, TlsMode::System);
        assert_eq!(target.session.username.as_deref(), Some("admin"));
    }

    #[test]
    fn flags_alone_are_enough() {
        let target = resolve_target_with(
            &global(&[
                "--controller",
                "https://10.0.0.1:8443",
                "--username",
                "ops",
                "--password",
                "secret",
            ]),
            &Config::default(),
        )
        .unwrap();

        assert_eq!(target.site, None);
        assert_eq!(target.session.username.as_deref(), Some("ops"));
    }

    #[test]
    fn missing_controller_is_no_config() {
        let err = resolve_target_with(&global(&[]), &Config::default()).unwrap_err();
        assert!(matches!(err, CliError::NoConfig { .. }));
    }

    #[test]
    fn unknown_profile_is_reported() {
        let err = resolve_target_with(&global(&["--profile", "nope"]), &lab_config()).unwrap_err();
        assert!(matches!(err, CliError::ProfileNotFound { ref available, .. } if available == "lab"));
    }
}
