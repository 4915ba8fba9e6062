//! Bundle execution engine
//!
//! Runs the actions of a bundle one after the other over a single session:
//!
//! 1. actions that already have a response are skipped
//! 2. actions without a registered command get a fault with the default message
//! 3. a failing action gets a fault and the run continues with the next action
//! 4. a connection error leaves the action without response and aborts the run
//!
//! After an abort the caller opens a new session and runs the same bundle
//! again; step 1 makes that run continue at the interrupted action.

use crate::bundle::{ActionResponse, Bundle, FaultResponse};
use crate::command::CommandRegistry;
use crate::config::AdapterConfig;
use crate::device::Device;
use dlms_client::DeviceSession;
use dlms_core::DlmsResult;
use std::sync::Arc;

pub struct BundleService {
    registry: Arc<CommandRegistry>,
    config: AdapterConfig,
}

impl BundleService {
    pub fn new(registry: Arc<CommandRegistry>, config: AdapterConfig) -> Self {
        Self { registry, config }
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Execute every pending action of `bundle`
    ///
    /// # Errors
    ///
    /// Only connection errors are returned; the actions executed before the
    /// error keep their responses.
    pub async fn run(
        &self,
        session: &mut DeviceSession,
        device: &mut Device,
        bundle: &mut Bundle,
    ) -> DlmsResult<()> {
        for action in bundle.actions.iter_mut() {
            if action.response.is_some() {
                log::debug!(
                    "Skipping {} for device {}, it already has a response",
                    action.request.kind(),
                    device.device_identification
                );
                continue;
            }

            let kind = action.request.kind();
            let Some(command) = self.registry.get(kind) else {
                log::warn!(
                    "No command registered for {}, device {}",
                    kind,
                    device.device_identification
                );
                action.response = Some(ActionResponse::Fault(FaultResponse::new(
                    self.config.default_fault_message.as_str(),
                    self.config.component.as_str(),
                    &device.device_identification,
                )));
                continue;
            };

            log::debug!(
                "Executing {} with {} for device {}",
                kind,
                command.name(),
                device.device_identification
            );
            match command.execute_bundle_action(session, device, &action.request).await {
                Ok(response) => action.response = Some(response),
                Err(error) if error.is_connection_error() => {
                    log::error!(
                        "Connection lost executing {} for device {}, aborting bundle: {}",
                        command.name(),
                        device.device_identification,
                        error
                    );
                    return Err(error);
                }
                Err(error) => {
                    log::warn!(
                        "Error executing {} for device {}: {}",
                        command.name(),
                        device.device_identification,
                        error
                    );
                    action.response = Some(ActionResponse::Fault(FaultResponse::from_error(
                        &error,
                        format!("Error handling request with {}", command.name()),
                        self.config.component.as_str(),
                        &device.device_identification,
                    )));
                }
            }
        }
        Ok(())
    }
}
