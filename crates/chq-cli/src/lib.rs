#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! Chequeflow command-line driver.
//!
//! The binary is a thin shell over [`run`]; everything it does can be
//! exercised from tests through [`commands`] with a scripted transport.

pub mod cli;
pub mod commands;
pub mod config;
pub mod config_handlers;
pub mod error;

// Re-exports for convenience
pub use cli::{Cli, Command, ConfigAction};
pub use config::{ChqConfig, ConfigManager};
pub use error::{Error, Result};

use tracing_subscriber::EnvFilter;

/// Installs the global subscriber, writing to stderr.
///
/// `--verbose` forces `debug`; otherwise `RUST_LOG` wins over `filter`.
pub fn init_logging(verbose: bool, filter: &str) {
    let env_filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter))
    };
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Runs a parsed command line.
///
/// `config` subcommands run before the configuration is loaded, so a
/// broken config file can still be inspected and fixed.
pub async fn run(cli: Cli) -> Result<()> {
    if let Command::Config { action } = cli.command {
        init_logging(cli.verbose, "warn");
        return config_handlers::handle_config_command(cli.config.as_deref(), action);
    }

    let config = ChqConfig::load(cli.config.as_deref())?;
    init_logging(cli.verbose, &config.logging.filter);
    tracing::debug!(command = ?cli.command, "chq starting");

    let result = execute(cli.command, &config).await;
    if let Err(e) = &result {
        tracing::error!(error = %e, "chq failed");
    }
    result
}

/// Runs a wizard command and prints its JSON report.
pub async fn execute(command: Command, config: &ChqConfig) -> Result<()> {
    let report = match command {
        Command::Screens => commands::cmd_screens(),
        Command::Image {
            request_id,
            side,
            out,
        } => {
            let wizard = commands::build_wizard(config)?;
            commands::cmd_image(&wizard, &request_id, side.into(), &out).await?
        }
        Command::Start { external } => {
            let mut wizard = commands::build_wizard(config)?;
            commands::cmd_start(&mut wizard, external).await?
        }
        Command::Resume { request_id } => {
            let mut wizard = commands::build_wizard(config)?;
            commands::cmd_resume(&mut wizard, &request_id).await?
        }
        Command::Inquiry {
            sayad_id,
            national_id,
        } => {
            let mut wizard = commands::build_wizard(config)?;
            commands::cmd_inquiry(&mut wizard, &sayad_id, &national_id).await?
        }
        Command::Config { .. } => {
            return Err(Error::config(
                "config subcommands do not take a loaded configuration",
            ));
        }
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
