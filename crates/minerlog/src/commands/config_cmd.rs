//! Config subcommand handlers.

use minerlog_config::{self as config, Profile};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::error::CliError;

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            println!("{}", config::config_path().display());
            Ok(())
        }

        ConfigCommand::Show => {
            let cfg = config::load_config()?;
            let active = cfg.active_profile_name(global.profile.as_deref());
            eprintln!("# {}", config::config_path().display());
            eprintln!("# active profile: {active}");
            let rendered = toml::to_string_pretty(&cfg).map_err(config::ConfigError::from)?;
            print!("{rendered}");
            Ok(())
        }

        ConfigCommand::Init { device, name } => {
            // Reject devices the stream could never connect to before saving.
            let mut cfg = config::load_config()?;
            config::stream_config(&device, None, &cfg.defaults)?;

            let replaced = cfg
                .profiles
                .insert(name.clone(), Profile::new(device.trim()))
                .is_some();
            let default_missing = cfg
                .default_profile
                .as_ref()
                .is_none_or(|p| !cfg.profiles.contains_key(p));
            if default_missing {
                cfg.default_profile = Some(name.clone());
            }

            let path = config::save_config(&cfg)?;
            let verb = if replaced { "Updated" } else { "Saved" };
            eprintln!("{verb} profile '{name}' in {}", path.display());
            Ok(())
        }
    }
}
