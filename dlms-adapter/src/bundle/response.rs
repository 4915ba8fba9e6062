//! Bundle response envelope and fault shape

use crate::commands::administrative_status::AdministrativeStatus;
use crate::commands::association_objects::AssociationLnListElement;
use crate::commands::events::Event;
use crate::commands::firmware_versions::FirmwareVersion;
use crate::commands::periodic_meter_reads::PeriodicMeterReadsResponse;
use crate::commands::periodic_meter_reads_gas::PeriodicMeterReadsGasResponse;
use crate::commands::push_setup::PushSetup;
use dlms_core::DlmsError;
use serde::{Deserialize, Serialize};

/// Result of one bundle action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ActionResponse {
    /// Operation without output, with a confirmation message
    Ok { message: String },
    AdministrativeStatus(AdministrativeStatus),
    Events(Vec<Event>),
    PeriodicMeterReads(PeriodicMeterReadsResponse),
    PeriodicMeterReadsGas(PeriodicMeterReadsGasResponse),
    PushSetup(PushSetup),
    AssociationLnObjects(Vec<AssociationLnListElement>),
    FirmwareVersions(Vec<FirmwareVersion>),
    Fault(FaultResponse),
}

impl ActionResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        ActionResponse::Ok {
            message: message.into(),
        }
    }

    pub fn is_fault(&self) -> bool {
        matches!(self, ActionResponse::Fault(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaultParameter {
    pub key: String,
    pub value: String,
}

/// Failure of one bundle action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaultResponse {
    pub code: Option<i32>,
    pub message: String,
    pub component: String,
    pub inner_exception: Option<String>,
    pub inner_message: Option<String>,
    pub parameters: Vec<FaultParameter>,
}

impl FaultResponse {
    /// Fault without an underlying error, e.g. no handler for the request
    pub fn new(message: impl Into<String>, component: impl Into<String>, device_identification: &str) -> Self {
        Self {
            code: None,
            message: message.into(),
            component: component.into(),
            inner_exception: None,
            inner_message: None,
            parameters: vec![FaultParameter {
                key: "deviceIdentification".to_string(),
                value: device_identification.to_string(),
            }],
        }
    }

    /// Fault for `error`; `default_message` applies when the error has no message of its own
    pub fn from_error(
        error: &DlmsError,
        default_message: impl Into<String>,
        component: impl Into<String>,
        device_identification: &str,
    ) -> Self {
        let message = error.user_message().unwrap_or_else(|| default_message.into());
        let mut fault = Self::new(message, component, device_identification);
        fault.code = error.code();
        fault.inner_exception = Some(error.kind().to_string());
        fault.inner_message = Some(error.to_string());
        fault
    }

    pub fn parameter(&self, key: &str) -> Option<&str> {
        self.parameters
            .iter()
            .find(|parameter| parameter.key == key)
            .map(|parameter| parameter.value.as_str())
    }
}
