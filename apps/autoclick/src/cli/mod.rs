//! # Autoclick CLI Module
//!
//! This module implements the CLI interface for autoclick.
//!
//! ## Available Commands
//!
//! - `check` - Import a local drawing file and report what would be dropped
//! - `normalize` - Rewrite a drawing file in canonical form
//! - `pull` - Download a drawing from the backend
//! - `push` - Upload a drawing file to the backend
//! - `watch` - Push a drawing file whenever it changes
//! - `run` - Start executing a drawing
//! - `stop` - Ask a running drawing to stop
//! - `status` - Show a drawing's execution status

mod commands;

use crate::client::DrawingClient;
use crate::config::Config;
use crate::error::CliError;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Autoclick - automation drawing client
///
/// Validates, converts and syncs node-graph drawings of mouse and keyboard
/// automation steps with the drawing service.
#[derive(Parser, Debug)]
#[command(name = "autoclick")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress informational output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to a TOML config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Backend base URL (overrides config and AUTOCLICK_URL)
    #[arg(short = 'B', long, global = true)]
    pub backend: Option<String>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Import a drawing file and report skipped nodes and dropped connections
    Check {
        /// Path to the drawing file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Import a drawing file and write it back out in canonical form
    Normalize {
        /// Input file path
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Write connections as bare target ids
        #[arg(long)]
        legacy_connections: bool,
    },

    /// Download a drawing's nodes to a file
    Pull {
        /// Drawing ID
        #[arg(short, long)]
        drawing: String,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Upload a drawing file to the backend
    Push {
        /// Drawing ID
        #[arg(short, long)]
        drawing: String,

        /// Path to the drawing file
        #[arg(short, long)]
        file: PathBuf,

        /// Send connections as bare target ids
        #[arg(long)]
        legacy_connections: bool,
    },

    /// Watch a drawing file and push it after each burst of edits
    Watch {
        /// Drawing ID
        #[arg(short, long)]
        drawing: String,

        /// Path to the drawing file
        #[arg(short, long)]
        file: PathBuf,

        /// Send connections as bare target ids
        #[arg(long)]
        legacy_connections: bool,
    },

    /// Start executing a drawing
    Run {
        /// Drawing ID
        #[arg(short, long)]
        drawing: String,

        /// Repeat until stopped
        #[arg(short, long = "loop")]
        repeat: bool,

        /// Delay multiplier
        #[arg(short, long, default_value = "1.0")]
        speed: f64,

        /// Poll the status until execution ends
        #[arg(short, long)]
        follow: bool,
    },

    /// Ask a running drawing to stop
    Stop {
        /// Drawing ID
        #[arg(short, long)]
        drawing: String,
    },

    /// Show a drawing's execution status
    Status {
        /// Drawing ID
        #[arg(short, long)]
        drawing: String,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), CliError> {
    let config = Config::load(cli.config.as_deref(), cli.backend.as_deref())?;
    let json_mode = cli.json_mode;
    let client = || DrawingClient::new(&config.backend_url, config.request_timeout());

    match cli.command {
        Commands::Check { file } => cmd_check(&file, json_mode),
        Commands::Normalize {
            input,
            output,
            legacy_connections,
        } => cmd_normalize(&input, &output, connection_format(legacy_connections)),
        Commands::Pull { drawing, output } => {
            cmd_pull(&client()?, &drawing, &output, json_mode).await
        }
        Commands::Push {
            drawing,
            file,
            legacy_connections,
        } => {
            cmd_push(
                &client()?,
                &drawing,
                &file,
                connection_format(legacy_connections),
                json_mode,
            )
            .await
        }
        Commands::Watch {
            drawing,
            file,
            legacy_connections,
        } => {
            cmd_watch(
                &client()?,
                &config,
                &drawing,
                &file,
                connection_format(legacy_connections),
            )
            .await
        }
        Commands::Run {
            drawing,
            repeat,
            speed,
            follow,
        } => cmd_run(&client()?, &config, &drawing, repeat, speed, follow, json_mode).await,
        Commands::Stop { drawing } => cmd_stop(&client()?, &drawing, json_mode).await,
        Commands::Status { drawing } => cmd_status(&client()?, &drawing, json_mode).await,
    }
}

fn connection_format(legacy: bool) -> autoclick_core::ConnectionFormat {
    if legacy {
        autoclick_core::ConnectionFormat::Legacy
    } else {
        autoclick_core::ConnectionFormat::Full
    }
}
