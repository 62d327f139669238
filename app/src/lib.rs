//! Gurubell Application Shell
//!
//! Thin host over the library crates: builds the [`AppState`], exposes the
//! command handlers and runs the `gurubell` CLI. Core logic lives in the
//! `crates/` directory.

pub mod cli;
pub mod commands;
pub mod error;
pub mod feed;
pub mod state;

use crate::cli::{Cli, Command, SettingsCommand, TokenCommand};
use crate::commands::{scraping, settings, token};
use crate::state::{AppState, Services};
use anyhow::Context;
use gurubell_core::{AppConfig, NotificationPreferences, WatchEvent};
use gurubell_db::{Database, MemorySettingsStore, SettingsStore, SqliteSettingsStore};
use gurubell_notify::TracingSink;
use gurubell_source::GuruClient;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::info;

/// Initialize tracing subscriber for logging.
///
/// Logs go to stderr so `watch` can print events on stdout.
pub fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,gurubell=debug"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Load configuration from `path` or the platform config directory, with
/// environment overrides applied.
pub fn load_config(path: Option<&std::path::Path>) -> gurubell_core::Result<AppConfig> {
    let mut config = match path {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };
    config.apply_env_overrides();
    config.validate()?;
    Ok(config)
}

/// Open the settings store the config points at.
pub async fn open_settings(
    config: &AppConfig,
    ephemeral: bool,
) -> anyhow::Result<Arc<dyn SettingsStore>> {
    if ephemeral {
        info!("Using in-memory settings");
        return Ok(Arc::new(MemorySettingsStore::new()));
    }

    let path = config.database_path()?;
    let db = Database::open(&path)
        .await
        .with_context(|| format!("failed to open settings database {}", path.display()))?;
    Ok(Arc::new(SqliteSettingsStore::new(db)))
}

/// Run the CLI.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    info!("Starting Gurubell v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config(cli.config.as_deref())?;
    let services = Services {
        source: Arc::new(GuruClient::new(&config.source)?),
        settings: open_settings(&config, cli.ephemeral).await?,
        sink: Arc::new(TracingSink),
    };
    let (state, ui_events) = AppState::new(config, services).await?;

    let result = execute(&state, cli.command, ui_events).await;
    state.close().await;
    result
}

async fn execute(
    state: &AppState,
    command: Command,
    ui_events: UnboundedReceiver<WatchEvent>,
) -> anyhow::Result<()> {
    match command {
        Command::Watch(arg) => watch(state, ui_events, arg.token).await?,
        Command::Fetch(arg) => {
            let jobs = scraping::fetch_jobs_manual(state, arg.token).await?;
            print_json(&jobs)?;
        }
        Command::Token(TokenCommand::Get) => println!("{}", token::get_token(state).await?),
        Command::Token(TokenCommand::Set { token }) => token::save_token(state, token).await?,
        Command::Token(TokenCommand::Validate { token }) => {
            print_json(&token::validate_token(state, token).await?)?;
        }
        Command::Settings(SettingsCommand::Get) => {
            print_json(&settings::get_notification_settings(state).await?)?;
        }
        Command::Settings(SettingsCommand::Set {
            system_notifications,
            sound,
            show_job_titles,
        }) => {
            let current = settings::get_notification_settings(state).await?;
            let updated = NotificationPreferences {
                system_notifications_enabled: system_notifications
                    .unwrap_or(current.system_notifications_enabled),
                sound_enabled: sound.unwrap_or(current.sound_enabled),
                show_job_titles: show_job_titles.unwrap_or(current.show_job_titles),
            };
            settings::save_notification_settings(state, updated).await?;
            print_json(&updated)?;
        }
    }
    Ok(())
}

/// Poll until ctrl-c, printing every UI event as one JSON line.
async fn watch(
    state: &AppState,
    mut ui_events: UnboundedReceiver<WatchEvent>,
    token: Option<String>,
) -> anyhow::Result<()> {
    scraping::start_job_scraping(state, token).await?;

    loop {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                result.context("failed to listen for ctrl-c")?;
                info!("Interrupted");
                break;
            }
            event = ui_events.recv() => {
                let Some(event) = event else { break };
                print_json(&event)?;
            }
        }
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}
