use clap::Parser;
use owo_colors::{OwoColorize, Style};
use smartflow_core::controller::{CacheController, CacheStorage, HttpFetcher};
use smartflow_core::error::{CoreError, FetchError};
use smartflow_core::export::ExportError;
use smartflow_core::notification::NotificationScheduler;
use smartflow_core::repository::TaskRepository;
use smartflow_core::store::SqliteTaskStore;
use smartflow_core::sync::ChannelSyncTrigger;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use crate::permission::ConfiguredPermission;
use crate::timezone::normalize_timezone_input;
use crate::util::CliError;

mod cli;
mod commands;
mod config;
mod parser;
mod permission;
mod timezone;
mod util;
mod views;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("smartflow=warn,smartflow_core=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = cli::Cli::parse();

    let config = match config::Config::new() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} Invalid configuration: {}", "Error:".red().bold(), e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run(cli, config).await {
        handle_error(e);
        std::process::exit(1);
    }
}

async fn run(cli: cli::Cli, config: config::Config) -> anyhow::Result<()> {
    let tz = normalize_timezone_input(&config.display_timezone())?;

    let store = Arc::new(SqliteTaskStore::open_or_create(&config.database_path).await?);
    let controller = CacheController::new(
        config.controller_config(),
        store.clone(),
        CacheStorage::new(store.pool().clone()),
        Arc::new(HttpFetcher::new()),
    )?
    .spawn();

    let (scheduler, mut events) = NotificationScheduler::new(config.notification_config());
    let mut repository = TaskRepository::load(
        store,
        scheduler,
        Box::new(ChannelSyncTrigger::new(controller.clone())),
        config.repository_config(),
    )
    .await?;

    let summary = repository.summary();
    if summary.defaulted > 0 {
        eprintln!(
            "{} {} task(s) had unreadable dates and were set to the current time.",
            "Warning:".yellow().bold(),
            summary.defaulted
        );
    }

    let result = match cli.command {
        cli::Commands::Add(command) => commands::add::add_task(&mut repository, command, tz).await,
        cli::Commands::List(command) => commands::list::list_tasks(&repository, command, tz),
        cli::Commands::Edit(command) => {
            commands::edit::edit_task(&mut repository, command, tz).await
        }
        cli::Commands::Toggle(command) => {
            commands::toggle::toggle_task(&mut repository, command).await
        }
        cli::Commands::Delete(command) => {
            commands::delete::delete_task(&mut repository, command).await
        }
        cli::Commands::Clear(command) => {
            commands::delete::clear_tasks(&mut repository, command).await
        }
        cli::Commands::Export(command) => {
            commands::export::export_tasks(&repository, command, tz)
        }
        cli::Commands::Sync => commands::sync::sync_tasks(&mut repository, &controller).await,
        cli::Commands::Watch => {
            let gate = ConfiguredPermission::new(config.notifications.permission);
            commands::watch::watch_tasks(&mut repository, &mut events, &gate, tz).await
        }
        cli::Commands::Cache(command) => {
            commands::cache::cache_command(&controller, command).await
        }
    };

    // let queued sync jobs finish before the process exits
    controller.shutdown().await;
    result
}

fn handle_error(err: anyhow::Error) {
    let error_style = Style::new().red().bold();

    if let Some(core_error) = err.downcast_ref::<CoreError>() {
        match core_error {
            CoreError::Validation(s) => {
                eprintln!("{} Invalid task: {}", "Error:".style(error_style), s);
            }
            CoreError::Capacity(max) => {
                eprintln!(
                    "{} Task limit reached. Delete some tasks first (limit: {}).",
                    "Error:".style(error_style),
                    max.yellow()
                );
            }
            CoreError::NotFound(s) => {
                eprintln!("{} {}", "Error:".style(error_style), s);
            }
            CoreError::Persistence(cause) => {
                eprintln!("{} Could not save tasks.", "Error:".style(error_style));
                eprintln!("  {}", cause.bright_black());
            }
            CoreError::InvalidTimezone(s) => {
                eprintln!("{} {}", "Error:".style(error_style), s);
            }
        }
    } else if let Some(cli_error) = err.downcast_ref::<CliError>() {
        match cli_error {
            CliError::AmbiguousId(tasks) => {
                eprintln!("{}", "Error: Ambiguous ID.".style(error_style));
                eprintln!("Did you mean one of these?");
                for (id, text) in tasks {
                    eprintln!("  {} ({})", id.yellow(), text);
                }
            }
            CliError::InvalidInput(_) => {
                eprintln!("{} {}", "Error:".style(error_style), cli_error);
            }
        }
    } else if let Some(ExportError::NothingToExport) = err.downcast_ref::<ExportError>() {
        eprintln!("{} No tasks to export.", "Error:".style(error_style));
    } else if let Some(FetchError::Offline(url)) = err.downcast_ref::<FetchError>() {
        eprintln!(
            "{} Offline and {} is not cached.",
            "Error:".style(error_style),
            url.yellow()
        );
    } else {
        eprintln!("{} {:#}", "Error:".style(error_style), err);
    }
}
