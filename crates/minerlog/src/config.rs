//! Resolves the stream settings for a run from the config file, the active
//! profile and CLI overrides.

use std::path::PathBuf;

use minerlog_config::{Config, stream_config};
use minerlog_core::StreamConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Everything `tail` needs to run.
#[derive(Debug)]
pub struct Resolved {
    pub stream: StreamConfig,
    pub export_dir: PathBuf,
}

/// Resolve the stream settings: `--device` wins over the profile's device,
/// profile overrides win over `[defaults]`.
pub fn resolve(global: &GlobalOpts, cfg: &Config) -> Result<Resolved, CliError> {
    let profile_name = cfg.active_profile_name(global.profile.as_deref());
    let profile = cfg.profiles.get(&profile_name);

    let device = match (global.device.as_deref(), profile) {
        (Some(device), _) => device,
        (None, Some(profile)) => profile.device.as_str(),
        (None, None) if global.profile.is_some() => {
            return Err(CliError::ProfileNotFound {
                name: profile_name,
                available: available_profiles(cfg),
            });
        }
        (None, None) => {
            return Err(CliError::NoConfig {
                path: minerlog_config::config_path().display().to_string(),
            });
        }
    };

    tracing::debug!(profile = %profile_name, device, "resolved appliance");

    Ok(Resolved {
        stream: stream_config(device, profile, &cfg.defaults)?,
        export_dir: cfg.export_dir(profile),
    })
}

fn available_profiles(cfg: &Config) -> String {
    if cfg.profiles.is_empty() {
        return "(none)".into();
    }
    let mut names: Vec<&str> = cfg.profiles.keys().map(String::as_str).collect();
    names.sort_unstable();
    names.join(", ")
}

#[cfg(test)]
mod tests {
    use minerlog_config::Profile;

    use super::*;

    fn global(profile: Option<&str>, device: Option<&str>) -> GlobalOpts {
        GlobalOpts {
            profile: profile.map(Into::into),
            device: device.map(Into::into),
            color: crate::cli::ColorMode::Never,
            verbose: 0,
        }
    }

    fn config_with_rig() -> Config {
        let mut cfg = Config::default();
        let mut rig = Profile::new("http://10.0.0.7");
        rig.buffer_capacity = Some(100);
        cfg.profiles.insert("rig".into(), rig);
        cfg
    }

    #[test]
    fn device_flag_overrides_profile_device() {
        let cfg = config_with_rig();
        let resolved = resolve(&global(Some("rig"), Some("https://10.0.0.8")), &cfg).unwrap();
        assert_eq!(
            resolved.stream.endpoint.as_str(),
            "wss://10.0.0.8/api/miner/logs"
        );
        // profile overrides still apply
        assert_eq!(resolved.stream.buffer_capacity, 100);
    }

    #[test]
    fn unknown_profile_lists_available() {
        let cfg = config_with_rig();
        let err = resolve(&global(Some("shed"), None), &cfg).unwrap_err();
        match err {
            CliError::ProfileNotFound { name, available } => {
                assert_eq!(name, "shed");
                assert_eq!(available, "rig");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn nothing_configured_asks_for_device() {
        let err = resolve(&global(None, None), &Config::default()).unwrap_err();
        assert!(matches!(err, CliError::NoConfig { .. }));
    }

    #[test]
    fn bare_device_without_profile_uses_defaults() {
        let resolved = resolve(&global(None, Some("192.168.1.50")), &Config::default()).unwrap();
        assert_eq!(
            resolved.stream.endpoint.as_str(),
            "ws://192.168.1.50/api/miner/logs"
        );
        assert_eq!(resolved.stream.buffer_capacity, minerlog_core::DEFAULT_CAPACITY);
        assert_eq!(resolved.export_dir, PathBuf::from("."));
    }
}
