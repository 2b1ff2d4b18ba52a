//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// calfetch - read calendars and events from a CalDAV server
#[derive(Debug, Parser)]
#[command(name = "calfetch")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "CALFETCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v')]
    pub debug: bool,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,

    // --- Connection flags (override config.toml) ---
    /// Calendar or collection URL
    #[arg(long, env = "CALFETCH_URL")]
    pub url: Option<String>,

    /// Username for Basic authentication
    #[arg(long, short)]
    pub user: Option<String>,

    /// Password for Basic authentication (supports pass:: and env:: references)
    #[arg(long, env = "CALFETCH_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Accept invalid TLS certificates (self-signed servers)
    #[arg(long)]
    pub insecure: bool,

    /// Request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the collections under the URL
    List,

    /// Fetch events from the calendar at the URL
    Events {
        /// Only events starting at or after this instant
        /// (RFC 3339 or 20240101T000000Z; default: now)
        #[arg(long)]
        start: Option<String>,

        /// Only events starting before this instant
        #[arg(long)]
        end: Option<String>,
    },

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Dump current configuration
    Dump,

    /// Validate configuration
    Validate,

    /// Show configuration file path
    Path,
}
