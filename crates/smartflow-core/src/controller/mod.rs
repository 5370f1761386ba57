//! Cache/update controller.
//!
//! Runs as its own tokio task with its own state and lifecycle
//! (installing → installed → activated). Pages reach it only through a
//! [`ControllerHandle`]: commands go in over an mpsc channel, results come
//! back on oneshot replies, and sync results are broadcast as
//! [`PageMessage`]s to every subscribed page.

use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, error, info, warn};

use crate::error::{FetchError, PersistenceError};
use crate::models::Task;
use crate::store::TaskStore;

pub mod cache;
pub mod fetch;

pub use cache::CacheStorage;
pub use fetch::{CachedResponse, FetchRequest, Fetcher, HttpFetcher, RequestMode};

/// Tag of the deferred job that re-syncs the task collection.
pub const SYNC_TAG: &str = "sync-tasks";

/// Message posted from the controller to every connected page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PageMessage {
    TasksSynced { tasks: Vec<Task> },
}

#[derive(Debug, Clone)]
pub struct ControllerConfig {
    pub cache_name: String,
    /// Origin that counts as same-origin for caching decisions.
    pub origin: String,
    /// Assets that must be available offline once installed.
    pub manifest: Vec<String>,
    /// Page served to navigations that fail while offline.
    pub offline_shell: String,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            cache_name: "smartflow-cache-v2".to_string(),
            origin: "http://localhost:8080".to_string(),
            manifest: vec![
                "/".to_string(),
                "/index.html".to_string(),
                "/style.css".to_string(),
                "/script.js".to_string(),
                "/manifest.json".to_string(),
                "/icon.png".to_string(),
            ],
            offline_shell: "/index.html".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Installing,
    Installed,
    Activated,
}

pub(crate) enum ControllerCommand {
    Install {
        reply: oneshot::Sender<Result<usize, FetchError>>,
    },
    Activate {
        reply: oneshot::Sender<Result<Vec<String>, FetchError>>,
    },
    Fetch {
        request: FetchRequest,
        reply: oneshot::Sender<Result<CachedResponse, FetchError>>,
    },
    Sync {
        tag: String,
    },
    State {
        reply: oneshot::Sender<ControllerState>,
    },
    Shutdown {
        reply: oneshot::Sender<()>,
    },
}

/// Page-side handle to a running controller.
#[derive(Clone)]
pub struct ControllerHandle {
    commands: mpsc::Sender<ControllerCommand>,
    pages: broadcast::Sender<PageMessage>,
}

impl ControllerHandle {
    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> ControllerCommand,
    ) -> Result<T, FetchError> {
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(make(reply))
            .await
            .map_err(|_| FetchError::ControllerStopped)?;
        rx.await.map_err(|_| FetchError::ControllerStopped)
    }

    /// Pre-populates the cache with the manifest. Returns the number of
    /// cached assets.
    pub async fn install(&self) -> Result<usize, FetchError> {
        self.request(|reply| ControllerCommand::Install { reply }).await?
    }

    /// Deletes caches left behind by older versions. Returns their names.
    pub async fn activate(&self) -> Result<Vec<String>, FetchError> {
        self.request(|reply| ControllerCommand::Activate { reply }).await?
    }

    pub async fn fetch(&self, request: FetchRequest) -> Result<CachedResponse, FetchError> {
        self.request(|reply| ControllerCommand::Fetch { request, reply })
            .await?
    }

    pub async fn state(&self) -> Result<ControllerState, FetchError> {
        self.request(|reply| ControllerCommand::State { reply }).await
    }

    /// Queues a deferred job without waiting for it.
    pub fn request_sync(&self, tag: &str) -> Result<(), String> {
        self.commands
            .try_send(ControllerCommand::Sync {
                tag: tag.to_string(),
            })
            .map_err(|e| e.to_string())
    }

    /// Subscribes a page to controller messages.
    pub fn subscribe(&self) -> broadcast::Receiver<PageMessage> {
        self.pages.subscribe()
    }

    /// Stops the controller once every command queued before this one has
    /// been handled.
    pub async fn shutdown(&self) {
        let _ = self
            .request(|reply| ControllerCommand::Shutdown { reply })
            .await;
    }
}

pub struct CacheController {
    config: ControllerConfig,
    origin: Url,
    store: Arc<dyn TaskStore>,
    cache: CacheStorage,
    fetcher: Arc<dyn Fetcher>,
    state: ControllerState,
    pages: broadcast::Sender<PageMessage>,
}

impl CacheController {
    pub fn new(
        config: ControllerConfig,
        store: Arc<dyn TaskStore>,
        cache: CacheStorage,
        fetcher: Arc<dyn Fetcher>,
    ) -> Result<Self, FetchError> {
        let origin = Url::parse(&config.origin)
            .map_err(|e| FetchError::Network(format!("Invalid origin '{}': {}", config.origin, e)))?;
        let (pages, _) = broadcast::channel(16);
        Ok(Self {
            config,
            origin,
            store,
            cache,
            fetcher,
            state: ControllerState::Installing,
            pages,
        })
    }

    /// Moves the controller onto its own task and returns the handle pages
    /// use to reach it.
    pub fn spawn(self) -> ControllerHandle {
        let (commands, rx) = mpsc::channel(64);
        let handle = ControllerHandle {
            commands,
            pages: self.pages.clone(),
        };
        tokio::spawn(self.run(rx));
        handle
    }

    async fn run(mut self, mut rx: mpsc::Receiver<ControllerCommand>) {
        debug!("Controller started");
        while let Some(command) = rx.recv().await {
            match command {
                ControllerCommand::Install { reply } => {
                    let _ = reply.send(self.install().await);
                }
                ControllerCommand::Activate { reply } => {
                    let _ = reply.send(self.activate().await);
                }
                ControllerCommand::Fetch { request, reply } => {
                    let _ = reply.send(self.handle_fetch(&request).await);
                }
                ControllerCommand::Sync { tag } => self.handle_sync(&tag).await,
                ControllerCommand::State { reply } => {
                    let _ = reply.send(self.state);
                }
                ControllerCommand::Shutdown { reply } => {
                    let _ = reply.send(());
                    break;
                }
            }
        }
        debug!("Controller stopped");
    }

    fn resolve(&self, url: &str) -> Result<Url, FetchError> {
        self.origin
            .join(url)
            .map_err(|e| FetchError::Network(format!("Invalid URL '{}': {}", url, e)))
    }

    fn is_same_origin(&self, url: &Url) -> bool {
        url.origin() == self.origin.origin()
    }

    async fn install(&mut self) -> Result<usize, FetchError> {
        info!("Installing cache {}", self.config.cache_name);
        self.state = ControllerState::Installing;
        self.cache.open(&self.config.cache_name).await?;

        let mut responses = Vec::with_capacity(self.config.manifest.len());
        for entry in &self.config.manifest {
            let url = self.resolve(entry)?;
            let response = self.fetcher.fetch(&url).await?;
            if !response.is_ok() {
                return Err(FetchError::Network(format!(
                    "{} responded with status {}",
                    url, response.status
                )));
            }
            responses.push(response);
        }

        self.cache
            .put_all(&self.config.cache_name, &responses)
            .await?;
        self.state = ControllerState::Installed;
        info!("Cached {} asset(s)", responses.len());
        Ok(responses.len())
    }

    async fn activate(&mut self) -> Result<Vec<String>, FetchError> {
        let mut removed = Vec::new();
        for name in self.cache.keys().await? {
            if name != self.config.cache_name {
                info!("Deleting old cache {}", name);
                self.cache.delete(&name).await?;
                removed.push(name);
            }
        }
        self.state = ControllerState::Activated;
        Ok(removed)
    }

    async fn cached(&self, url: &Url) -> Result<Option<CachedResponse>, FetchError> {
        Ok(self
            .cache
            .match_url(&self.config.cache_name, url.as_str())
            .await?)
    }

    async fn store_if_cacheable(&self, url: &Url, response: &CachedResponse) {
        if !response.is_ok() || !self.is_same_origin(url) {
            return;
        }
        if let Err(e) = self.cache.put(&self.config.cache_name, response).await {
            warn!("Could not cache {}: {}", url, e);
        }
    }

    async fn handle_fetch(&self, request: &FetchRequest) -> Result<CachedResponse, FetchError> {
        let url = self.resolve(&request.url)?;

        match request.mode {
            RequestMode::Navigate => match self.fetcher.fetch(&url).await {
                Ok(response) => {
                    self.store_if_cacheable(&url, &response).await;
                    Ok(response)
                }
                Err(e) => {
                    debug!("Network failed for navigation to {}: {}", url, e);
                    if let Some(hit) = self.cached(&url).await? {
                        return Ok(hit);
                    }
                    let shell = self.resolve(&self.config.offline_shell)?;
                    self.cached(&shell)
                        .await?
                        .ok_or_else(|| FetchError::Offline(url.to_string()))
                }
            },
            RequestMode::Resource => {
                if let Some(hit) = self.cached(&url).await? {
                    debug!("Cache hit: {}", url);
                    return Ok(hit);
                }
                debug!("Cache miss, fetching: {}", url);
                match self.fetcher.fetch(&url).await {
                    Ok(response) => {
                        self.store_if_cacheable(&url, &response).await;
                        Ok(response)
                    }
                    Err(e) => {
                        debug!("Network failed for {}: {}", url, e);
                        Err(FetchError::Offline(url.to_string()))
                    }
                }
            }
        }
    }

    /// Identity sync: no remote endpoint exists, so the job re-persists the
    /// records unchanged and posts the collection to every page.
    async fn sync_tasks(&self) -> Result<Vec<Task>, PersistenceError> {
        let records = self.store.get_all().await?;
        self.store.put_all(&records).await?;

        let mut tasks = Vec::with_capacity(records.len());
        for record in &records {
            match record.to_task() {
                Ok(task) => tasks.push(task),
                Err(e) => warn!("Skipping task in sync broadcast: {}", e),
            }
        }
        Ok(tasks)
    }

    async fn handle_sync(&self, tag: &str) {
        if tag != SYNC_TAG {
            debug!("Ignoring sync request with unknown tag {}", tag);
            return;
        }

        match self.sync_tasks().await {
            Ok(tasks) => {
                info!("Synchronised {} task(s)", tasks.len());
                if self.pages.send(PageMessage::TasksSynced { tasks }).is_err() {
                    debug!("No page connected to receive sync results");
                }
            }
            Err(e) => error!("Background sync failed: {}", e),
        }
    }
}
