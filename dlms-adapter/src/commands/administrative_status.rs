use crate::bundle::{ActionRequest, ActionRequestKind, ActionResponse};
use crate::codec::{describe_attributes, read_long};
use crate::command::{get_and_check, unexpected_request, Command};
use crate::device::Device;
use async_trait::async_trait;
use dlms_client::{AttributeAddress, DeviceSession};
use dlms_core::{DlmsError, DlmsResult, ObisCode};
use serde::{Deserialize, Serialize};

const CLASS_ID: u16 = 1;
const OBIS_CODE: ObisCode = ObisCode::new(0, 1, 94, 31, 0, 255);
const ATTRIBUTE_ID: i8 = 2;

/// Administrative status of the metering point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdministrativeStatus {
    Undefined,
    Off,
    On,
}

impl AdministrativeStatus {
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => AdministrativeStatus::Off,
            2 => AdministrativeStatus::On,
            _ => AdministrativeStatus::Undefined,
        }
    }
}

pub struct GetAdministrativeStatusCommand;

#[async_trait]
impl Command for GetAdministrativeStatusCommand {
    type Input = ();
    type Output = AdministrativeStatus;

    fn name(&self) -> &'static str {
        "GetAdministrativeStatus"
    }

    fn request_kind(&self) -> Option<ActionRequestKind> {
        Some(ActionRequestKind::GetAdministrativeStatus)
    }

    async fn execute(
        &self,
        session: &mut DeviceSession,
        device: &mut Device,
        _input: (),
    ) -> DlmsResult<AdministrativeStatus> {
        let address = AttributeAddress::new(CLASS_ID, OBIS_CODE, ATTRIBUTE_ID);
        session.set_description(&format!(
            "GetAdministrativeStatus, retrieve attribute: {}",
            describe_attributes(std::slice::from_ref(&address))
        ));
        log::debug!(
            "Retrieving administrative status of {} from {}",
            device.device_identification,
            address
        );

        let results = get_and_check(session, device, "administrative status", &[address]).await?;
        let code = read_long(&results[0].result_data, "administrative status")?
            .ok_or_else(|| DlmsError::Protocol("Received no administrative status".to_string()))?;
        Ok(AdministrativeStatus::from_code(code))
    }

    fn from_bundle_request(&self, request: &ActionRequest) -> DlmsResult<()> {
        match request {
            ActionRequest::GetAdministrativeStatus => Ok(()),
            other => Err(unexpected_request(Command::name(self), other)),
        }
    }

    fn to_bundle_response(&self, output: AdministrativeStatus) -> DlmsResult<ActionResponse> {
        Ok(ActionResponse::AdministrativeStatus(output))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::BundleCommand;
    use crate::test_support::FakeConnection;
    use dlms_core::{AccessResultCode, DataObject};

    fn address() -> AttributeAddress {
        AttributeAddress::new(CLASS_ID, OBIS_CODE, ATTRIBUTE_ID)
    }

    #[tokio::test]
    async fn test_status_codes() {
        for (code, expected) in [
            (0, AdministrativeStatus::Undefined),
            (1, AdministrativeStatus::Off),
            (2, AdministrativeStatus::On),
            (3, AdministrativeStatus::Undefined),
        ] {
            let connection = FakeConnection::new();
            connection.respond(&address(), DataObject::Enumerate(code));
            let mut device = Device::new("E0026000059790003");
            let status = GetAdministrativeStatusCommand
                .execute(&mut connection.session(), &mut device, ())
                .await
                .unwrap();
            assert_eq!(status, expected);
        }
    }

    #[tokio::test]
    async fn test_bundle_response() {
        let connection = FakeConnection::new();
        connection.respond(&address(), DataObject::Enumerate(2));
        let mut device = Device::new("E0026000059790003");
        let response = GetAdministrativeStatusCommand
            .execute_bundle_action(
                &mut connection.session(),
                &mut device,
                &ActionRequest::GetAdministrativeStatus,
            )
            .await
            .unwrap();
        assert_eq!(response, ActionResponse::AdministrativeStatus(AdministrativeStatus::On));
    }

    #[tokio::test]
    async fn test_denied_read_is_protocol_error() {
        let connection = FakeConnection::new();
        connection.respond_with_code(&address(), AccessResultCode::ReadWriteDenied);
        let mut device = Device::new("E0026000059790003");
        let error = GetAdministrativeStatusCommand
            .execute(&mut connection.session(), &mut device, ())
            .await
            .unwrap_err();
        assert!(error.is_protocol_error());
        assert!(!error.is_connection_error());
    }
}
