mod cli;
mod commands;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use campusflow_core::Controller;

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Config commands don't need a backend connection
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),

        // All other commands talk to the backend
        cmd => {
            let config = build_controller_config(&cli.global)?;
            let controller = Controller::new(&config)?;

            tracing::debug!(command = ?cmd, "dispatching command");
            commands::dispatch(cmd, &controller, &cli.global).await
        }
    }
}

/// Build a `ControllerConfig` from the config file with CLI overrides.
fn build_controller_config(
    global: &cli::GlobalOpts,
) -> Result<campusflow_core::ControllerConfig, CliError> {
    let cfg = campusflow_config::load_config_or_default();
    let mut config = campusflow_config::to_controller_config(&cfg)?;

    if let Some(ref url) = global.api_url {
        let _: url::Url = url.parse().map_err(|_| CliError::Validation {
            field: "api-url".into(),
            reason: format!("invalid URL: {url}"),
        })?;
        config.api_url = url.clone();
    }
    if let Some(ref token) = global.token {
        config.api_token = Some(secrecy::SecretString::from(token.clone()));
    }
    Ok(config)
}
