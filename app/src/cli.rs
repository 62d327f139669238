//! Command-line interface of the `gurubell` binary.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Desktop job alerts for the Guru job board.
#[derive(Debug, Parser)]
#[command(name = "gurubell", version, about)]
pub struct Cli {
    /// Path to config.toml (defaults to the platform config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Keep settings in memory instead of the settings database
    #[arg(long, global = true)]
    pub ephemeral: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Poll for new jobs and print UI events as JSON lines until ctrl-c
    Watch(TokenArg),
    /// Fetch the current job list once
    Fetch(TokenArg),
    /// Manage the bearer token
    #[command(subcommand)]
    Token(TokenCommand),
    /// Manage notification preferences
    #[command(subcommand)]
    Settings(SettingsCommand),
}

/// Optional token override shared by several subcommands.
#[derive(Debug, Args)]
pub struct TokenArg {
    /// Bearer token to use instead of the stored one
    #[arg(long)]
    pub token: Option<String>,
}

/// `gurubell token ...`
#[derive(Debug, Subcommand)]
pub enum TokenCommand {
    /// Print the stored token
    Get,
    /// Store a new token; an empty string clears it
    Set {
        /// The bearer token
        token: String,
    },
    /// Check a token against the search endpoint
    Validate {
        /// Token to check instead of the stored one
        token: Option<String>,
    },
}

/// `gurubell settings ...`
#[derive(Debug, Subcommand)]
pub enum SettingsCommand {
    /// Print the notification preferences
    Get,
    /// Change one or more notification preferences
    Set {
        /// Show desktop alerts for new jobs
        #[arg(long)]
        system_notifications: Option<bool>,
        /// Play a sound with alerts
        #[arg(long)]
        sound: Option<bool>,
        /// Include job titles in alerts
        #[arg(long)]
        show_job_titles: Option<bool>,
    },
}
