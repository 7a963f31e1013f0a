//! # autoclick
//!
//! Library half of the autoclick binary: the backend client, configuration,
//! the auto-save debouncer and the CLI commands built on `autoclick-core`.

pub mod autosave;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod types;

pub use client::{ClientError, DrawingClient};
pub use config::Config;
pub use error::CliError;
