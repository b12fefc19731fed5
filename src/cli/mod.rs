//! CLI Module
//!
//! Command-line interface for Tenant Console using Clap v4.

mod commands;
mod form;
mod setup;

use crate::navigation::Section;
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Tenant Console - organization setup and dashboard entry for the admin console
#[derive(Parser, Debug)]
#[command(name = "tenant-console")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Open the dashboard (or the setup gate if setup is unfinished)
    Dashboard {
        /// Section to open; falls back to the first one you can see
        #[arg(short, long, value_enum)]
        section: Option<Section>,
    },

    /// Run a setup wizard
    Setup {
        #[command(subcommand)]
        flow: SetupCommands,
    },

    /// Show local console state
    Status {
        /// Drop the session store, including any parked payment setup
        #[arg(long)]
        clear_session: bool,
    },

    /// Forget the signed-in profile
    Logout,

    /// Initialize configuration
    Init {
        /// Force overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum SetupCommands {
    /// Organization setup (first-time onboarding)
    Organization {
        /// JSON file with the form fields
        #[arg(long)]
        data: PathBuf,
    },
    /// Create a campaign
    Campaign {
        /// JSON file with the form fields
        #[arg(long)]
        data: PathBuf,
    },
    /// Continue after the payment provider sent the browser back
    Resume {
        /// Full URL the browser landed on
        #[arg(long)]
        return_url: String,
    },
}

/// Main CLI entry point
pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    let config = commands::load_config(cli.config.as_deref())?;
    let _log_guard = crate::logging::init(&config.logging, cli.debug)?;
    if cli.debug {
        tracing::debug!("Debug mode enabled");
    }
    config.validate()?;

    match cli.command {
        Commands::Dashboard { section } => commands::cmd_dashboard(&config, section).await,
        Commands::Setup { flow } => match flow {
            SetupCommands::Organization { data } => {
                setup::cmd_setup_organization(&config, &data).await
            }
            SetupCommands::Campaign { data } => setup::cmd_setup_campaign(&config, &data).await,
            SetupCommands::Resume { return_url } => {
                setup::cmd_setup_resume(&config, &return_url).await
            }
        },
        Commands::Status { clear_session } => commands::cmd_status(&config, clear_session),
        Commands::Logout => commands::cmd_logout(&config),
        Commands::Init { force } => commands::cmd_init(&config, force),
    }
}
