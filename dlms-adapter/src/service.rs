//! Entry point for requests addressed to one device
//!
//! Every exchange locks the device, loads it, opens a session, runs a bundle
//! or a single command and closes the session. The lock is held throughout,
//! so key rotations and bundles for one device never interleave. The
//! [`ManagementService`] handed out by [`AdapterService::management`] shares
//! the same locks.

use crate::bundle::{Bundle, BundleService};
use crate::command::Command;
use crate::device::Device;
use crate::locks::DeviceLocks;
use crate::management::ManagementService;
use crate::repository::DeviceRepository;
use crate::session::SessionFactory;
use dlms_client::DeviceSession;
use dlms_core::DlmsResult;
use std::sync::Arc;

pub struct AdapterService {
    locks: Arc<DeviceLocks>,
    repository: Arc<dyn DeviceRepository>,
    sessions: SessionFactory,
    bundles: BundleService,
}

impl AdapterService {
    pub fn new(repository: Arc<dyn DeviceRepository>, sessions: SessionFactory, bundles: BundleService) -> Self {
        Self {
            locks: Arc::new(DeviceLocks::new()),
            repository,
            sessions,
            bundles,
        }
    }

    /// Run the pending actions of `bundle` against a device
    ///
    /// # Errors
    ///
    /// Errors loading the device or opening the session, and connection
    /// errors aborting the run. The bundle keeps the responses of the
    /// actions executed so far and can be handled again.
    pub async fn handle_bundle(&self, device_identification: &str, bundle: &mut Bundle) -> DlmsResult<()> {
        let _guard = self.locks.lock(device_identification).await;
        let mut device = self.repository.load_device(device_identification).await?;
        let mut session = self.sessions.open_session(&mut device).await?;
        log::info!(
            "Handling bundle of {} actions ({} pending) for {}",
            bundle.actions.len(),
            bundle.pending(),
            device_identification
        );
        let result = self.bundles.run(&mut session, &mut device, bundle).await;
        close(session, &device).await;
        result
    }

    /// Run a single command against a device
    pub async fn handle_command<C>(
        &self,
        device_identification: &str,
        command: &C,
        input: C::Input,
    ) -> DlmsResult<C::Output>
    where
        C: Command,
    {
        let _guard = self.locks.lock(device_identification).await;
        let mut device = self.repository.load_device(device_identification).await?;
        let mut session = self.sessions.open_session(&mut device).await?;
        log::info!("Handling {} for {}", command.name(), device_identification);
        let result = command.execute(&mut session, &mut device, input).await;
        close(session, &device).await;
        result
    }

    pub fn bundle_service(&self) -> &BundleService {
        &self.bundles
    }

    /// Management operations serialized with the exchanges of this service
    pub fn management(&self) -> ManagementService {
        ManagementService::new(self.repository.clone(), self.locks.clone())
    }
}

/// Close `session`, the outcome of the exchange stands regardless
async fn close(session: DeviceSession, device: &Device) {
    if let Err(error) = session.close().await {
        log::warn!(
            "Error closing session to {}: {}",
            device.device_identification,
            error
        );
    }
}
