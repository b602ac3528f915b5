//! Configuration subcommands. These never touch the backend.

use campusflow_config::{Config, config_path, load_config, save_config};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let out = match args.command {
        ConfigCommand::Show => {
            let config = load_config()?;
            match global.output {
                OutputFormat::Json => output::render_json_pretty(&config),
                OutputFormat::JsonCompact => output::render_json_compact(&config),
                OutputFormat::Yaml => output::render_yaml(&config),
                // TOML is the config's native format
                _ => toml::to_string_pretty(&config)
                    .map_err(campusflow_config::ConfigError::from)?,
            }
        }
        ConfigCommand::Path => config_path().display().to_string(),
        ConfigCommand::Init => {
            let path = config_path();
            if path.exists() {
                return Err(CliError::Validation {
                    field: "config".into(),
                    reason: format!("config file already exists at {}", path.display()),
                });
            }
            save_config(&Config::default())?;
            format!("Wrote default config to {}", path.display())
        }
    };

    output::print_output(&out, global.quiet);
    Ok(())
}
