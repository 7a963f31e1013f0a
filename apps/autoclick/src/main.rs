//! # Autoclick - automation drawing client
//!
//! The command-line front end for automation drawings.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │               apps/autoclick (THE BINARY)            │
//! │                                                      │
//! │   ┌─────────────┐            ┌──────────────────┐    │
//! │   │    CLI      │───────────▶│  DrawingClient   │────┼──▶ drawing service
//! │   │   (clap)    │            │    (reqwest)     │    │    /api/drawings
//! │   └──────┬──────┘            └──────────────────┘    │
//! │          ▼                                           │
//! │   ┌────────────────┐                                 │
//! │   │ autoclick-core │                                 │
//! │   │  (THE LOGIC)   │                                 │
//! │   └────────────────┘                                 │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! autoclick check -f drawing.json
//! autoclick pull -d 3f2a -o drawing.json
//! autoclick watch -d 3f2a -f drawing.json
//! autoclick run -d 3f2a --loop --follow
//! ```

use autoclick::cli;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    let cli = cli::Cli::parse();

    // Initialize tracing: AUTOCLICK_LOG_FORMAT=json enables machine-parseable output.
    let log_format =
        std::env::var("AUTOCLICK_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let default_level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("autoclick={default_level},autoclick_core={default_level}").into()
    });

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    // Execute command
    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}
