//! Best-effort background sync requests.
//!
//! Local persistence has already succeeded by the time a trigger fires, so
//! failures here are logged and dropped.

use tracing::{debug, warn};

use crate::controller::{ControllerHandle, SYNC_TAG};

pub trait SyncTrigger: Send + Sync {
    fn trigger(&self);
}

/// Registers deferred sync jobs with a running controller.
pub struct ChannelSyncTrigger {
    controller: ControllerHandle,
}

impl ChannelSyncTrigger {
    pub fn new(controller: ControllerHandle) -> Self {
        Self { controller }
    }
}

impl SyncTrigger for ChannelSyncTrigger {
    fn trigger(&self) {
        match self.controller.request_sync(SYNC_TAG) {
            Ok(()) => debug!("Background sync registered"),
            Err(e) => warn!("Background sync registration failed: {}", e),
        }
    }
}

/// Used when no controller is available.
pub struct NoopSyncTrigger;

impl SyncTrigger for NoopSyncTrigger {
    fn trigger(&self) {
        debug!("Background sync unavailable, skipping");
    }
}
