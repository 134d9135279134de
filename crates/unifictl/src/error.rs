//! CLI error types with miette diagnostics.
//!
//! Maps library and config errors into user-facing errors with actionable
//! help text and a distinct exit code per failure class.

use miette::Diagnostic;
use thiserror::Error;

use unifictl_api::Error as ApiError;
use unifictl_config::ConfigError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
    pub const REJECTED: i32 = 9;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to controller at {url}")]
    #[diagnostic(
        code(unifictl::connection_failed),
        help(
            "Check that the controller is running and accessible.\n\
             Self-signed certificate? Try --insecure (-k)."
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: ApiError,
    },

    #[error("Request to the controller timed out")]
    #[diagnostic(
        code(unifictl::timeout),
        help("Increase the timeout with --timeout or check controller responsiveness.")
    )]
    Timeout {
        #[source]
        source: ApiError,
    },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {reason}")]
    #[diagnostic(
        code(unifictl::auth_failed),
        help(
            "Verify the username and password for this controller.\n\
             The password is read from --password, UNIFICTL_PASSWORD, the system keyring, \
             or the profile, in that order."
        )
    )]
    AuthFailed { reason: String },

    #[error("The controller session kept expiring ({attempts} attempts)")]
    #[diagnostic(
        code(unifictl::session_expired),
        help("The controller rejected every re-login. Check that the account is still active.")
    )]
    SessionExpired { attempts: u8 },

    #[error("No credentials configured for profile '{profile}'")]
    #[diagnostic(
        code(unifictl::no_credentials),
        help("Set `username` in the profile, or pass --username and --password.")
    )]
    NoCredentials { profile: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(unifictl::not_found),
        help("Run: unifictl {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── Controller replies ───────────────────────────────────────────
    #[error("Controller rejected {operation}: {message}")]
    #[diagnostic(code(unifictl::rejected))]
    Rejected { operation: String, message: String },

    #[error(transparent)]
    #[diagnostic(code(unifictl::api))]
    Api(ApiError),

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(unifictl::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(unifictl::profile_not_found),
        help("Available profiles: {available}")
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No controller configured")]
    #[diagnostic(
        code(unifictl::no_config),
        help(
            "Pass --controller (or UNIFICTL_CONTROLLER), or create a profile.\n\
             Expected at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(unifictl::config))]
    Config(ConfigError),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render JSON: {0}")]
    #[diagnostic(code(unifictl::json))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::AuthFailed { .. } | Self::SessionExpired { .. } | Self::NoCredentials { .. } => {
                exit_code::AUTH
            }
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Rejected { .. } => exit_code::REJECTED,
            Self::Validation { .. } | Self::NoConfig { .. } | Self::ProfileNotFound { .. } => {
                exit_code::USAGE
            }
            Self::Api(_) | Self::Config(_) | Self::Io(_) | Self::Json(_) => exit_code::GENERAL,
        }
    }

    pub fn rejected(operation: &str, message: Option<String>) -> Self {
        Self::Rejected {
            operation: operation.into(),
            message: message.unwrap_or_else(|| "no reason given".into()),
        }
    }
}

// ── Library error → CliError mapping ─────────────────────────────────

impl From<ApiError> for CliError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Login(reason) => CliError::AuthFailed { reason },
            ApiError::Reconnection { attempts } => CliError::SessionExpired { attempts },
            ApiError::DeviceNotFound { mac } => CliError::NotFound {
                resource_type: "device".into(),
                identifier: mac,
                list_command: "devices".into(),
            },
            ApiError::Validation { field, reason } => CliError::Validation {
                field: field.into(),
                reason,
            },
            ApiError::Configuration(reason) => CliError::Validation {
                field: "configuration".into(),
                reason,
            },
            err if err.is_timeout() => CliError::Timeout { source: err },
            ApiError::Transport(source) => CliError::ConnectionFailed {
                url: source
                    .url()
                    .map_or_else(|| "(unknown)".into(), ToString::to_string),
                source: ApiError::Transport(source),
            },
            other => CliError::Api(other),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            ConfigError::ProfileNotFound { name, available } => {
                CliError::ProfileNotFound { name, available }
            }
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            other => CliError::Config(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_by_class() {
        let expired: CliError = ApiError::Reconnection { attempts: 3 }.into();
        assert_eq!(expired.exit_code(), exit_code::AUTH);

        let missing: CliError = ApiError::DeviceNotFound {
            mac: "AA:BB:CC:DD:EE:FF".into(),
        }
        .into();
        assert_eq!(missing.exit_code(), exit_code::NOT_FOUND);

        let format: CliError = ApiError::Format {
            status: 502,
            content_type: Some("text/html".into()),
        }
        .into();
        assert_eq!(format.exit_code(), exit_code::GENERAL);

        assert_eq!(
            CliError::rejected("guest authorize", None).exit_code(),
            exit_code::REJECTED
        );
    }

    #[test]
    fn config_errors_keep_their_class() {
        let err: CliError = ConfigError::NoCredentials {
            profile: "lab".into(),
        }
        .into();
        assert_eq!(err.exit_code(), exit_code::AUTH);
    }
}
