//! Persistence contract for devices

use crate::device::Device;
use async_trait::async_trait;
use dlms_core::DlmsResult;

/// Storage of [`Device`] records
///
/// Saves are atomic at the record level.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DeviceRepository: Send + Sync {
    /// Load a device by identity
    ///
    /// # Errors
    /// Returns `DlmsError::Configuration` when the device is unknown
    async fn load_device(&self, device_identification: &str) -> DlmsResult<Device>;

    /// Save a device, returning the stored record
    async fn save(&self, device: &Device) -> DlmsResult<Device>;
}
