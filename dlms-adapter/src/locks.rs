//! Per-device locks
//!
//! A session to a device and the security keys of that device must not be
//! used by two exchanges at once. [`DeviceLocks`] hands out one async mutex
//! per device identity; the guard is held for the whole exchange.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Guard serializing work on one device
pub type DeviceGuard = OwnedMutexGuard<()>;

#[derive(Default)]
pub struct DeviceLocks {
    locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl DeviceLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait until no other exchange holds `device_identification`, then lock it
    pub async fn lock(&self, device_identification: &str) -> DeviceGuard {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            // Idle entries are only referenced by the map
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            locks
                .entry(device_identification.to_string())
                .or_default()
                .clone()
        };
        log::debug!("Waiting for lock on device {}", device_identification);
        lock.lock_owned().await
    }

    /// Number of devices currently locked or waited for
    pub fn active_devices(&self) -> usize {
        let locks = self.locks.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        locks.values().filter(|lock| Arc::strong_count(lock) > 1).count()
    }
}
