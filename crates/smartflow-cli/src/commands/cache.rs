use anyhow::Result;
use owo_colors::OwoColorize;
use smartflow_core::controller::{ControllerHandle, FetchRequest};

use crate::cli::{CacheCommand, CacheSubcommand};

pub async fn cache_command(controller: &ControllerHandle, command: CacheCommand) -> Result<()> {
    match command.command {
        CacheSubcommand::Install => {
            let cached = controller.install().await?;
            println!("{} Cached {} asset(s).", "✓".green().bold(), cached);
        }
        CacheSubcommand::Activate => {
            let removed = controller.activate().await?;
            if removed.is_empty() {
                println!("No old caches to remove.");
            }
            for name in removed {
                println!("Deleted cache {}", name.yellow());
            }
        }
        CacheSubcommand::Fetch(fetch) => {
            let request = if fetch.navigate {
                FetchRequest::navigate(fetch.url)
            } else {
                FetchRequest::resource(fetch.url)
            };
            let response = controller.fetch(request).await?;
            println!(
                "{} {} ({} bytes, {})",
                response.status,
                response.url,
                response.body.len(),
                response.content_type.as_deref().unwrap_or("unknown type")
            );
        }
    }
    Ok(())
}
