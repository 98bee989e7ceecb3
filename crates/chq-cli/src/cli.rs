//! Command-line arguments.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Drive the cheque issuance wizard against a gateway
#[derive(Parser, Debug)]
#[command(name = "chq", author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// What to do
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Mint a new request and report where it stands
    Start {
        /// Enter the other-bank path instead of the own-chequebook path
        #[arg(long)]
        external: bool,
    },
    /// Continue an existing request
    Resume {
        /// Request id returned by `start`
        request_id: String,
    },
    /// Look up another bank's cheque
    Inquiry {
        /// 16-digit Sayad id
        #[arg(long)]
        sayad_id: String,
        /// National id of the cheque owner
        #[arg(long)]
        national_id: String,
    },
    /// Save a stored cheque image to a file
    Image {
        /// Request the image belongs to
        request_id: String,
        /// Which side to fetch
        #[arg(long, value_enum, default_value_t = Side::Front)]
        side: Side,
        /// Where to write the image
        #[arg(long)]
        out: PathBuf,
    },
    /// Print screen order, branches and entry loads
    Screens,
    /// Inspect or edit the configuration
    Config {
        /// Config subcommand
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Side of the cheque.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// Front image
    Front,
    /// Back image
    Back,
}

impl From<Side> for chq_client::ImageSide {
    fn from(side: Side) -> Self {
        match side {
            Side::Front => chq_client::ImageSide::Front,
            Side::Back => chq_client::ImageSide::Back,
        }
    }
}

/// `chq config` subcommands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ConfigAction {
    /// Print the resolved config file path
    Path,
    /// Print a value by dotted key, e.g. `gateway.base_url`
    Get {
        /// Dotted key
        key: String,
    },
    /// Set a value by dotted key in the config file
    Set {
        /// Dotted key
        key: String,
        /// New value
        value: String,
    },
    /// Write a default config file
    Init {
        /// Where to write it instead of the default location
        #[arg(long)]
        file: Option<String>,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the configuration as environment variables
    Export {
        /// Format as `--env KEY=VALUE` for `docker run`
        #[arg(long)]
        docker_env: bool,
    },
}
