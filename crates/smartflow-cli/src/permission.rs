use async_trait::async_trait;
use dialoguer::Confirm;
use smartflow_core::notification::{Permission, PermissionGate};
use tracing::warn;

use crate::config::PermissionSetting;

/// Answers permission requests from configuration, asking on the terminal
/// when configured to prompt.
pub struct ConfiguredPermission {
    setting: PermissionSetting,
}

impl ConfiguredPermission {
    pub fn new(setting: PermissionSetting) -> Self {
        Self { setting }
    }
}

#[async_trait]
impl PermissionGate for ConfiguredPermission {
    async fn request_permission(&self) -> Permission {
        match self.setting {
            PermissionSetting::Granted => Permission::Granted,
            PermissionSetting::Denied => Permission::Denied,
            PermissionSetting::Prompt => {
                let answer = tokio::task::spawn_blocking(|| {
                    Confirm::new()
                        .with_prompt("Show task reminders in this terminal?")
                        .default(true)
                        .interact()
                })
                .await;

                match answer {
                    Ok(Ok(true)) => Permission::Granted,
                    Ok(Ok(false)) => Permission::Denied,
                    Ok(Err(e)) => {
                        warn!("Could not ask for notification permission: {}", e);
                        Permission::Prompt
                    }
                    Err(e) => {
                        warn!("Permission prompt failed: {}", e);
                        Permission::Prompt
                    }
                }
            }
        }
    }
}
