use crate::codec::describe_method;
use crate::command::{check_method_result, Command};
use crate::device::Device;
use async_trait::async_trait;
use dlms_client::{DeviceSession, MethodParameter};
use dlms_core::{DataObject, DlmsResult, ObisCode};

const CLASS_ID: u16 = 20;
const OBIS_CODE: ObisCode = ObisCode::new(0, 0, 13, 0, 0, 255);
/// `activate_passive_calendar`
const ACTIVATE_PASSIVE_CALENDAR: i8 = 1;

/// Make the passive activity calendar the active one
pub struct ActivateActivityCalendarCommand;

#[async_trait]
impl Command for ActivateActivityCalendarCommand {
    type Input = ();
    type Output = ();

    fn name(&self) -> &'static str {
        "ActivateActivityCalendar"
    }

    async fn execute(&self, session: &mut DeviceSession, device: &mut Device, _input: ()) -> DlmsResult<()> {
        let method = MethodParameter::new(
            CLASS_ID,
            OBIS_CODE,
            ACTIVATE_PASSIVE_CALENDAR,
            Some(DataObject::Integer8(0)),
        );
        session.set_description(&format!(
            "ActivateActivityCalendar, call method: {}",
            describe_method(&method)
        ));
        log::info!("Activating passive activity calendar of {}", device.device_identification);
        let result = session.action(&method).await?;
        check_method_result(&result, "activate passive activity calendar")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::ActionRequest;
    use crate::command::BundleCommand;
    use crate::test_support::FakeConnection;
    use dlms_core::MethodResultCode;

    #[tokio::test]
    async fn test_activation_calls_method() {
        let connection = FakeConnection::new();
        let mut device = Device::new("E0026000059790003");
        ActivateActivityCalendarCommand
            .execute(&mut connection.session(), &mut device, ())
            .await
            .unwrap();

        let actions = connection.actions();
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].class_id, 20);
        assert_eq!(actions[0].instance_id, OBIS_CODE);
        assert_eq!(actions[0].method_id, 1);
    }

    #[tokio::test]
    async fn test_reported_failure_is_an_error() {
        let connection = FakeConnection::new();
        connection.push_action_result(MethodResultCode::TemporaryFailure);
        let mut device = Device::new("E0026000059790003");
        let error = ActivateActivityCalendarCommand
            .execute(&mut connection.session(), &mut device, ())
            .await
            .unwrap_err();
        assert_eq!(error.kind(), "MethodResultError");
    }

    #[tokio::test]
    async fn test_not_available_in_bundles() {
        let connection = FakeConnection::new();
        let mut device = Device::new("E0026000059790003");
        assert!(BundleCommand::request_kind(&ActivateActivityCalendarCommand).is_none());
        let error = ActivateActivityCalendarCommand
            .execute_bundle_action(&mut connection.session(), &mut device, &ActionRequest::GetAdministrativeStatus)
            .await
            .unwrap_err();
        assert!(error.is_protocol_error());
        assert!(connection.actions().is_empty());
    }
}
