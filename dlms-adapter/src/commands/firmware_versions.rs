use crate::bundle::{ActionRequest, ActionRequestKind, ActionResponse};
use crate::codec::{describe_attributes, describe_value, read_string};
use crate::command::{get_and_check, unexpected_request, Command};
use crate::device::Device;
use async_trait::async_trait;
use dlms_client::{AttributeAddress, DeviceSession};
use dlms_core::{DlmsError, DlmsResult, ObisCode};
use serde::{Deserialize, Serialize};

const CLASS_ID: u16 = 1;
const ATTRIBUTE_ID: i8 = 2;

/// Firmware modules reporting their own version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FirmwareModuleType {
    ActiveFirmware,
    ModuleActiveFirmware,
    CommunicationModuleActiveFirmware,
}

impl FirmwareModuleType {
    const ALL: [FirmwareModuleType; 3] = [
        FirmwareModuleType::ActiveFirmware,
        FirmwareModuleType::ModuleActiveFirmware,
        FirmwareModuleType::CommunicationModuleActiveFirmware,
    ];

    /// Data object holding the version identifier
    pub fn logical_name(&self) -> ObisCode {
        match self {
            FirmwareModuleType::ActiveFirmware => ObisCode::new(1, 0, 0, 2, 0, 255),
            FirmwareModuleType::ModuleActiveFirmware => ObisCode::new(1, 1, 0, 2, 0, 255),
            FirmwareModuleType::CommunicationModuleActiveFirmware => ObisCode::new(1, 2, 0, 2, 0, 255),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirmwareVersion {
    pub module_type: FirmwareModuleType,
    pub version: String,
}

/// Read the version identifier of every firmware module
pub struct GetFirmwareVersionsCommand;

#[async_trait]
impl Command for GetFirmwareVersionsCommand {
    type Input = ();
    type Output = Vec<FirmwareVersion>;

    fn name(&self) -> &'static str {
        "GetFirmwareVersions"
    }

    fn request_kind(&self) -> Option<ActionRequestKind> {
        Some(ActionRequestKind::GetFirmwareVersions)
    }

    async fn execute(
        &self,
        session: &mut DeviceSession,
        device: &mut Device,
        _input: (),
    ) -> DlmsResult<Vec<FirmwareVersion>> {
        let addresses: Vec<AttributeAddress> = FirmwareModuleType::ALL
            .iter()
            .map(|module_type| AttributeAddress::new(CLASS_ID, module_type.logical_name(), ATTRIBUTE_ID))
            .collect();
        session.set_description(&format!(
            "GetFirmwareVersions, retrieve attributes: {}",
            describe_attributes(&addresses)
        ));

        let results = get_and_check(session, device, "firmware versions", &addresses).await?;
        let mut versions = Vec::with_capacity(results.len());
        for (module_type, result) in FirmwareModuleType::ALL.into_iter().zip(&results) {
            let context = format!("firmware version of {:?}", module_type);
            let version = read_string(&result.result_data, &context)?.ok_or_else(|| {
                DlmsError::decode(
                    context.as_str(),
                    format!("expected a version, got {}", describe_value(&result.result_data)),
                )
            })?;
            versions.push(FirmwareVersion { module_type, version });
        }
        log::info!(
            "Firmware versions of {}: {:?}",
            device.device_identification,
            versions
        );
        Ok(versions)
    }

    fn from_bundle_request(&self, request: &ActionRequest) -> DlmsResult<()> {
        match request {
            ActionRequest::GetFirmwareVersions => Ok(()),
            other => Err(unexpected_request(Command::name(self), other)),
        }
    }

    fn to_bundle_response(&self, output: Vec<FirmwareVersion>) -> DlmsResult<ActionResponse> {
        Ok(ActionResponse::FirmwareVersions(output))
    }
}
