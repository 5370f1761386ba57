use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::Deserialize;
use smartflow_core::controller::ControllerConfig;
use smartflow_core::models::RepositoryConfig;
use smartflow_core::notification::NotificationConfig;

use crate::timezone::detect_system_timezone;

#[derive(Deserialize, Debug)]
#[serde(default)]
pub struct Config {
    /// SQLite file holding tasks and cached assets
    pub database_path: String,
    pub max_tasks: usize,
    /// Zone that legacy display dates were written in
    pub legacy_timezone: String,
    /// Zone used to read and show due dates; the system zone when unset
    pub display_timezone: Option<String>,
    pub notifications: NotificationSettings,
    pub cache: CacheSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: "smartflow.db".to_string(),
            max_tasks: RepositoryConfig::default().max_tasks,
            legacy_timezone: detect_system_timezone(),
            display_timezone: None,
            notifications: NotificationSettings::default(),
            cache: CacheSettings::default(),
        }
    }
}

/// Answer given when the core asks for notification permission.
#[derive(Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PermissionSetting {
    Granted,
    Denied,
    /// Ask on the terminal
    #[default]
    Prompt,
}

#[derive(Deserialize, Debug)]
#[serde(default)]
pub struct NotificationSettings {
    /// Minutes before the due time a reminder fires
    pub lead_minutes: i64,
    pub permission: PermissionSetting,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            lead_minutes: NotificationConfig::default().lead.num_minutes(),
            permission: PermissionSetting::default(),
        }
    }
}

#[derive(Deserialize, Debug)]
#[serde(default)]
pub struct CacheSettings {
    pub name: String,
    pub origin: String,
    pub manifest: Vec<String>,
}

impl Default for CacheSettings {
    fn default() -> Self {
        let defaults = ControllerConfig::default();
        Self {
            name: defaults.cache_name,
            origin: defaults.origin,
            manifest: defaults.manifest,
        }
    }
}

impl Config {
    pub fn new() -> Result<Self, figment::Error> {
        Self::from_figment(Figment::new().merge(Toml::file("config.toml")))
    }

    /// Layers `SMARTFLOW_*` variables over `base`. Nested keys use `__`,
    /// e.g. `SMARTFLOW_NOTIFICATIONS__PERMISSION=granted`.
    pub fn from_figment(base: Figment) -> Result<Self, figment::Error> {
        base.merge(Env::prefixed("SMARTFLOW_").split("__")).extract()
    }

    pub fn display_timezone(&self) -> String {
        self.display_timezone
            .clone()
            .unwrap_or_else(detect_system_timezone)
    }

    pub fn repository_config(&self) -> RepositoryConfig {
        RepositoryConfig {
            max_tasks: self.max_tasks,
            legacy_timezone: self.legacy_timezone.clone(),
        }
    }

    pub fn notification_config(&self) -> NotificationConfig {
        NotificationConfig {
            lead: chrono::Duration::minutes(self.notifications.lead_minutes),
        }
    }

    pub fn controller_config(&self) -> ControllerConfig {
        let defaults = ControllerConfig::default();
        ControllerConfig {
            cache_name: self.cache.name.clone(),
            origin: self.cache.origin.clone(),
            manifest: self.cache.manifest.clone(),
            ..defaults
        }
    }
}
