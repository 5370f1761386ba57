use anyhow::{anyhow, Result};
use smartflow_core::controller::ControllerHandle;
use smartflow_core::repository::TaskRepository;
use std::time::Duration;

const SYNC_TIMEOUT: Duration = Duration::from_secs(10);

/// Requests a background sync and reconciles the list with what it posts back.
pub async fn sync_tasks(repo: &mut TaskRepository, controller: &ControllerHandle) -> Result<()> {
    let mut pages = controller.subscribe();
    repo.trigger_sync();

    let message = tokio::time::timeout(SYNC_TIMEOUT, pages.recv())
        .await
        .map_err(|_| anyhow!("Timed out waiting for the background sync"))??;

    let before = repo.len();
    repo.apply_page_message(message);
    println!(
        "Synchronised {} task(s) ({} before).",
        repo.len(),
        before
    );
    Ok(())
}
