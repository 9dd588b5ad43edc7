//! CLI error types with miette diagnostics.
//!
//! Maps config and core errors into user-facing errors with actionable help
//! text.

use miette::Diagnostic;
use thiserror::Error;

use minerlog_config::ConfigError;
use minerlog_core::CoreError;

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const CONNECTION: i32 = 7;
    pub const CONFIG: i32 = 78;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Endpoint ─────────────────────────────────────────────────────

    #[error("Cannot stream logs from '{device}': {reason}")]
    #[diagnostic(
        code(minerlog::invalid_device),
        help(
            "Pass the appliance dashboard address, e.g. http://192.168.1.50\n\
             Only http(s) and ws(s) addresses are supported."
        )
    )]
    InvalidDevice { device: String, reason: String },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(minerlog::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(minerlog::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: minerlog config init --device <URL> --name {name}"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No appliance configured")]
    #[diagnostic(
        code(minerlog::no_config),
        help(
            "Pass --device <URL>, or create a profile with: minerlog config init --device <URL>\n\
             Expected config at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(minerlog::config))]
    Config(ConfigError),

    // ── Export ───────────────────────────────────────────────────────

    #[error("Could not write log export to {path}")]
    #[diagnostic(
        code(minerlog::export),
        help("Check that the export directory exists and is writable, or pass --export-dir.")
    )]
    Export {
        path: String,
        #[source]
        source: std::io::Error,
    },

    // ── IO ───────────────────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidDevice { .. } => exit_code::CONNECTION,
            Self::Validation { .. } => exit_code::USAGE,
            Self::ProfileNotFound { .. } | Self::NoConfig { .. } | Self::Config(_) => {
                exit_code::CONFIG
            }
            Self::Export { .. } | Self::Io(_) => exit_code::GENERAL,
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::InvalidDevice { device, reason } => {
                CliError::InvalidDevice { device, reason }
            }
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::Io(e) => CliError::Io(e),
            other => CliError::Config(other),
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidEndpoint { reason } => CliError::InvalidDevice {
                device: "endpoint".into(),
                reason,
            },
            CoreError::Export { path, source } => CliError::Export {
                path: path.display().to_string(),
                source,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_errors_map_to_config_exit_code() {
        let err: CliError = ConfigError::UnknownProfile {
            profile: "rig".into(),
        }
        .into();
        assert_eq!(err.exit_code(), exit_code::CONFIG);
    }

    #[test]
    fn bad_device_maps_to_connection_exit_code() {
        let err: CliError = ConfigError::InvalidDevice {
            device: "ftp://10.0.0.9".into(),
            reason: "unsupported URL scheme 'ftp'".into(),
        }
        .into();
        assert_eq!(err.exit_code(), exit_code::CONNECTION);
    }

    #[test]
    fn export_failure_keeps_the_path() {
        let err: CliError = CoreError::Export {
            path: "/nope/miner-logs.txt".into(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        }
        .into();
        assert!(err.to_string().contains("/nope/miner-logs.txt"));
        assert_eq!(err.exit_code(), exit_code::GENERAL);
    }
}
