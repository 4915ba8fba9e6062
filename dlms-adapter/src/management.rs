//! Device management operations
//!
//! Changes to a device record take the same per-device lock as command and
//! bundle execution, so a management update never overwrites the record
//! saved by a running exchange (a key rotation in particular).

use crate::command::Command;
use crate::commands::{Event, FindEventsCommand, FindEventsQuery};
use crate::device::Device;
use crate::locks::DeviceLocks;
use crate::repository::DeviceRepository;
use dlms_client::DeviceSession;
use dlms_core::DlmsResult;
use std::sync::Arc;

pub struct ManagementService {
    repository: Arc<dyn DeviceRepository>,
    locks: Arc<DeviceLocks>,
}

impl ManagementService {
    /// `locks` must be the locks of the service executing commands for the same devices
    pub fn new(repository: Arc<dyn DeviceRepository>, locks: Arc<DeviceLocks>) -> Self {
        Self { repository, locks }
    }

    /// Switch logging of session traffic for a device on or off
    ///
    /// Waits for a running exchange with the device to finish, then loads,
    /// updates and saves the device under its lock.
    pub async fn set_device_debug_mode(&self, device_identification: &str, enabled: bool) -> DlmsResult<Device> {
        let _guard = self.locks.lock(device_identification).await;
        let mut device = self.repository.load_device(device_identification).await?;
        device.in_debug_mode = enabled;
        log::info!(
            "Debug mode of {} {}",
            device_identification,
            if enabled { "enabled" } else { "disabled" }
        );
        self.repository.save(&device).await
    }

    /// Events of every query, in query order
    ///
    /// Runs over a session the caller already holds, and with it the device lock.
    pub async fn find_events(
        &self,
        session: &mut DeviceSession,
        device: &mut Device,
        queries: &[FindEventsQuery],
    ) -> DlmsResult<Vec<Event>> {
        let mut events = Vec::new();
        for query in queries {
            log::debug!(
                "Finding {} events of {} from {} until {}",
                query.category,
                device.device_identification,
                query.from,
                query.until
            );
            events.extend(FindEventsCommand.execute(session, device, query.clone()).await?);
        }
        Ok(events)
    }
}
