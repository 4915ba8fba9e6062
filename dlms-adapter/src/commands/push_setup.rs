//! Push setups for alarms and SMS wake-up (interface class 40)

use crate::bundle::{ActionRequest, ActionRequestKind, ActionResponse};
use crate::codec::{
    describe_attributes, narrow, read_list_of_object_definitions, read_list_of_window_elements, read_long,
    read_send_destination_and_method, CosemObjectDefinition, SendDestinationAndMethod, WindowElement,
};
use crate::command::{check_access_result, get_and_check, unexpected_request, Command};
use crate::device::Device;
use async_trait::async_trait;
use dlms_client::{AttributeAddress, DeviceSession, SetParameter};
use dlms_core::{AccessResultCode, DataObject, DlmsError, DlmsResult, ObisCode};
use serde::{Deserialize, Serialize};

const CLASS_ID: u16 = 40;
const PUSH_OBJECT_LIST: i8 = 2;
const SEND_DESTINATION_AND_METHOD: i8 = 3;
const COMMUNICATION_WINDOW: i8 = 4;
const RANDOMISATION_START_INTERVAL: i8 = 5;
const NUMBER_OF_RETRIES: i8 = 6;
const REPETITION_DELAY: i8 = 7;

/// Which of the two push setup objects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PushSetupKind {
    Alarm,
    Sms,
}

impl PushSetupKind {
    pub fn logical_name(&self) -> ObisCode {
        match self {
            PushSetupKind::Alarm => ObisCode::new(0, 1, 25, 9, 0, 255),
            PushSetupKind::Sms => ObisCode::new(0, 2, 25, 9, 0, 255),
        }
    }

    fn label(&self) -> &'static str {
        match self {
            PushSetupKind::Alarm => "alarm",
            PushSetupKind::Sms => "SMS",
        }
    }

    fn address(&self, attribute_id: i8) -> AttributeAddress {
        AttributeAddress::new(CLASS_ID, self.logical_name(), attribute_id)
    }
}

/// Attributes of a push setup; absent fields are not read or not written
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushSetup {
    pub push_object_list: Option<Vec<CosemObjectDefinition>>,
    pub send_destination_and_method: Option<SendDestinationAndMethod>,
    pub communication_windows: Option<Vec<WindowElement>>,
    pub randomisation_start_interval: Option<u16>,
    pub number_of_retries: Option<u8>,
    pub repetition_delay: Option<u16>,
}

fn read_optional<T: TryFrom<i64>>(value: &DataObject, context: &str) -> DlmsResult<Option<T>> {
    read_long(value, context)?
        .map(|value| narrow(value, context))
        .transpose()
}

/// Read all attributes of a push setup
pub struct GetPushSetupCommand {
    kind: PushSetupKind,
}

impl GetPushSetupCommand {
    pub fn new(kind: PushSetupKind) -> Self {
        Self { kind }
    }
}

#[async_trait]
impl Command for GetPushSetupCommand {
    type Input = ();
    type Output = PushSetup;

    fn name(&self) -> &'static str {
        match self.kind {
            PushSetupKind::Alarm => "GetPushSetupAlarm",
            PushSetupKind::Sms => "GetPushSetupSms",
        }
    }

    fn request_kind(&self) -> Option<ActionRequestKind> {
        Some(match self.kind {
            PushSetupKind::Alarm => ActionRequestKind::GetPushSetupAlarm,
            PushSetupKind::Sms => ActionRequestKind::GetPushSetupSms,
        })
    }

    async fn execute(&self, session: &mut DeviceSession, device: &mut Device, _input: ()) -> DlmsResult<PushSetup> {
        let addresses: Vec<AttributeAddress> = (PUSH_OBJECT_LIST..=REPETITION_DELAY)
            .map(|attribute_id| self.kind.address(attribute_id))
            .collect();
        session.set_description(&format!(
            "{}, retrieve attributes: {}",
            Command::name(self),
            describe_attributes(&addresses)
        ));
        log::debug!(
            "Retrieving push setup {} of {}",
            self.kind.label(),
            device.device_identification
        );

        let context = format!("push setup {}", self.kind.label());
        let results = get_and_check(session, device, &context, &addresses).await?;
        let data = |attribute_id: i8| &results[(attribute_id - PUSH_OBJECT_LIST) as usize].result_data;

        Ok(PushSetup {
            push_object_list: Some(read_list_of_object_definitions(
                data(PUSH_OBJECT_LIST),
                &format!("Push Object List of {}", context),
            )?),
            send_destination_and_method: Some(read_send_destination_and_method(
                data(SEND_DESTINATION_AND_METHOD),
                &format!("Send Destination And Method of {}", context),
            )?),
            communication_windows: Some(read_list_of_window_elements(
                data(COMMUNICATION_WINDOW),
                &format!("Communication Window of {}", context),
            )?),
            randomisation_start_interval: read_optional(
                data(RANDOMISATION_START_INTERVAL),
                &format!("Randomisation Start Interval of {}", context),
            )?,
            number_of_retries: read_optional(data(NUMBER_OF_RETRIES), &format!("Number of Retries of {}", context))?,
            repetition_delay: read_optional(data(REPETITION_DELAY), &format!("Repetition Delay of {}", context))?,
        })
    }

    fn from_bundle_request(&self, request: &ActionRequest) -> DlmsResult<()> {
        match (self.kind, request) {
            (PushSetupKind::Alarm, ActionRequest::GetPushSetupAlarm) => Ok(()),
            (PushSetupKind::Sms, ActionRequest::GetPushSetupSms) => Ok(()),
            (_, other) => Err(unexpected_request(Command::name(self), other)),
        }
    }

    fn to_bundle_response(&self, output: PushSetup) -> DlmsResult<ActionResponse> {
        Ok(ActionResponse::PushSetup(output))
    }
}

/// Write the send destination and method, and the communication windows when given
pub struct SetPushSetupCommand {
    kind: PushSetupKind,
}

impl SetPushSetupCommand {
    pub fn new(kind: PushSetupKind) -> Self {
        Self { kind }
    }

    async fn write(&self, session: &mut DeviceSession, attribute_id: i8, value: DataObject) -> DlmsResult<AccessResultCode> {
        let address = self.kind.address(attribute_id);
        session.set_description(&format!(
            "{}, set attribute: {}",
            Command::name(self),
            describe_attributes(std::slice::from_ref(&address))
        ));
        session.set(&SetParameter::new(address, value)).await
    }

    fn warn_not_set(&self, push_setup: &PushSetup) {
        let label = self.kind.label();
        if let Some(list) = &push_setup.push_object_list {
            log::warn!("Setting Push Object List of push setup {} not supported: {:?}", label, list);
        }
        if let Some(interval) = push_setup.randomisation_start_interval {
            log::warn!(
                "Setting Randomisation Start Interval of push setup {} not supported: {}",
                label,
                interval
            );
        }
        if let Some(retries) = push_setup.number_of_retries {
            log::warn!("Setting Number of Retries of push setup {} not supported: {}", label, retries);
        }
        if let Some(delay) = push_setup.repetition_delay {
            log::warn!("Setting Repetition Delay of push setup {} not supported: {}", label, delay);
        }
    }
}

#[async_trait]
impl Command for SetPushSetupCommand {
    type Input = PushSetup;
    type Output = AccessResultCode;

    fn name(&self) -> &'static str {
        match self.kind {
            PushSetupKind::Alarm => "SetPushSetupAlarm",
            PushSetupKind::Sms => "SetPushSetupSms",
        }
    }

    fn request_kind(&self) -> Option<ActionRequestKind> {
        Some(match self.kind {
            PushSetupKind::Alarm => ActionRequestKind::SetPushSetupAlarm,
            PushSetupKind::Sms => ActionRequestKind::SetPushSetupSms,
        })
    }

    async fn execute(
        &self,
        session: &mut DeviceSession,
        _device: &mut Device,
        push_setup: PushSetup,
    ) -> DlmsResult<AccessResultCode> {
        let destination = push_setup.send_destination_and_method.as_ref().ok_or_else(|| {
            DlmsError::Protocol(format!(
                "Error setting {} push setup data. No destination and method data",
                self.kind.label()
            ))
        })?;
        self.warn_not_set(&push_setup);

        let code = self
            .write(session, SEND_DESTINATION_AND_METHOD, destination.to_data_object())
            .await?;
        if !code.is_success() {
            return Ok(code);
        }

        match &push_setup.communication_windows {
            Some(windows) => {
                let windows = windows.iter().map(WindowElement::to_data_object).collect();
                self.write(session, COMMUNICATION_WINDOW, DataObject::Array(windows)).await
            }
            None => Ok(code),
        }
    }

    fn from_bundle_request(&self, request: &ActionRequest) -> DlmsResult<PushSetup> {
        match (self.kind, request) {
            (PushSetupKind::Alarm, ActionRequest::SetPushSetupAlarm(push_setup))
            | (PushSetupKind::Sms, ActionRequest::SetPushSetupSms(push_setup)) => Ok(push_setup.clone()),
            (_, other) => Err(unexpected_request(Command::name(self), other)),
        }
    }

    fn to_bundle_response(&self, output: AccessResultCode) -> DlmsResult<ActionResponse> {
        check_access_result(output, &format!("set push setup {}", self.kind.label()))?;
        Ok(ActionResponse::ok(format!(
            "Setting push setup {} was successful",
            self.kind.label()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{MessageType, TransportServiceType};
    use crate::command::BundleCommand;
    use crate::test_support::FakeConnection;
    use dlms_core::CosemDateTime;

    fn destination() -> SendDestinationAndMethod {
        SendDestinationAndMethod {
            transport_service: TransportServiceType::Sms,
            destination: "+31612345678".to_string(),
            message: MessageType::ManufacturerSpecific(128),
        }
    }

    fn window() -> WindowElement {
        WindowElement {
            start: CosemDateTime::new(0xffff, 0xff, 0xff, 0xff, 8, 0, 0, 0, i16::MIN, &[]).unwrap(),
            end: CosemDateTime::new(0xffff, 0xff, 0xff, 0xff, 17, 0, 0, 0, i16::MIN, &[]).unwrap(),
        }
    }

    fn respond_push_setup(connection: &FakeConnection, kind: PushSetupKind) {
        let clock = DataObject::Structure(vec![
            DataObject::Unsigned16(8),
            DataObject::OctetString(vec![0, 0, 1, 0, 0, 255]),
            DataObject::Integer8(2),
            DataObject::Unsigned16(0),
        ]);
        connection.respond(&kind.address(PUSH_OBJECT_LIST), DataObject::Array(vec![clock]));
        connection.respond(&kind.address(SEND_DESTINATION_AND_METHOD), destination().to_data_object());
        connection.respond(
            &kind.address(COMMUNICATION_WINDOW),
            DataObject::Array(vec![window().to_data_object()]),
        );
        connection.respond(&kind.address(RANDOMISATION_START_INTERVAL), DataObject::Unsigned16(30));
        connection.respond(&kind.address(NUMBER_OF_RETRIES), DataObject::Unsigned8(3));
        connection.respond(&kind.address(REPETITION_DELAY), DataObject::Unsigned16(60));
    }

    #[tokio::test]
    async fn test_get_push_setup_sms() {
        let connection = FakeConnection::new();
        respond_push_setup(&connection, PushSetupKind::Sms);
        let mut device = Device::new("E0026000059790003");
        device.supports_batched_read = true;

        let response = GetPushSetupCommand::new(PushSetupKind::Sms)
            .execute_bundle_action(&mut connection.session(), &mut device, &ActionRequest::GetPushSetupSms)
            .await
            .unwrap();
        let ActionResponse::PushSetup(push_setup) = response else {
            panic!("unexpected response {:?}", response);
        };
        assert_eq!(push_setup.send_destination_and_method, Some(destination()));
        assert_eq!(push_setup.communication_windows, Some(vec![window()]));
        assert_eq!(push_setup.randomisation_start_interval, Some(30));
        assert_eq!(push_setup.number_of_retries, Some(3));
        assert_eq!(push_setup.repetition_delay, Some(60));
        let objects = push_setup.push_object_list.unwrap();
        assert_eq!(objects[0].class_id, 8);
        assert_eq!(objects[0].logical_name, ObisCode::new(0, 0, 1, 0, 0, 255));
        assert_eq!(connection.batched_reads(), 1);
        assert!(connection
            .reads()
            .iter()
            .all(|address| address.instance_id == ObisCode::new(0, 2, 25, 9, 0, 255)));
    }

    #[tokio::test]
    async fn test_get_push_setup_rejects_other_request() {
        let connection = FakeConnection::new();
        let mut device = Device::new("E0026000059790003");
        let error = GetPushSetupCommand::new(PushSetupKind::Alarm)
            .execute_bundle_action(&mut connection.session(), &mut device, &ActionRequest::GetPushSetupSms)
            .await
            .unwrap_err();
        assert!(error.is_protocol_error());
        assert!(connection.reads().is_empty());
    }

    #[tokio::test]
    async fn test_set_push_setup_alarm() {
        let connection = FakeConnection::new();
        let mut device = Device::new("E0026000059790003");
        let push_setup = PushSetup {
            send_destination_and_method: Some(destination()),
            communication_windows: Some(vec![window()]),
            number_of_retries: Some(5),
            ..PushSetup::default()
        };
        let response = SetPushSetupCommand::new(PushSetupKind::Alarm)
            .execute_bundle_action(
                &mut connection.session(),
                &mut device,
                &ActionRequest::SetPushSetupAlarm(push_setup),
            )
            .await
            .unwrap();
        assert_eq!(response, ActionResponse::ok("Setting push setup alarm was successful"));

        let writes = connection.writes();
        assert_eq!(writes.len(), 2);
        assert_eq!(writes[0].attribute_address, PushSetupKind::Alarm.address(3));
        assert_eq!(writes[0].data, destination().to_data_object());
        assert_eq!(writes[1].attribute_address, PushSetupKind::Alarm.address(4));
    }

    #[tokio::test]
    async fn test_set_push_setup_requires_destination() {
        let connection = FakeConnection::new();
        let mut device = Device::new("E0026000059790003");
        let error = SetPushSetupCommand::new(PushSetupKind::Sms)
            .execute(&mut connection.session(), &mut device, PushSetup::default())
            .await
            .unwrap_err();
        assert!(error.to_string().contains("No destination and method data"));
        assert!(connection.writes().is_empty());
    }
}
