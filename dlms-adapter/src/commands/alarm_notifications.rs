//! Alarm filter: which alarms the device pushes
//!
//! The filter is a 32-bit register with one bit per alarm type. Requested
//! notifications override the device setting of their type, other types keep
//! the value read from the device.

use crate::bundle::{ActionRequest, ActionRequestKind, ActionResponse};
use crate::codec::{describe_attributes, narrow, read_long_not_null};
use crate::command::{check_access_result, get_and_check, unexpected_request, Command};
use crate::device::Device;
use async_trait::async_trait;
use dlms_client::{AttributeAddress, DeviceSession, SetParameter};
use dlms_core::{AccessResultCode, DataObject, DlmsResult, ObisCode};
use serde::{Deserialize, Serialize};

const CLASS_ID: u16 = 1;
const OBIS_CODE: ObisCode = ObisCode::new(0, 0, 97, 98, 10, 255);
const ATTRIBUTE_ID: i8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlarmType {
    ClockInvalid,
    ReplaceBattery,
    PowerUp,
    ProgramMemoryError,
    RamError,
    NvMemoryError,
    MeasurementSystemError,
    WatchdogError,
    FraudAttempt,
    CommunicationErrorMBusChannel1,
    CommunicationErrorMBusChannel2,
    CommunicationErrorMBusChannel3,
    CommunicationErrorMBusChannel4,
    FraudAttemptMBusChannel1,
    FraudAttemptMBusChannel2,
    FraudAttemptMBusChannel3,
    FraudAttemptMBusChannel4,
    NewMBusDeviceDiscoveredChannel1,
    NewMBusDeviceDiscoveredChannel2,
    NewMBusDeviceDiscoveredChannel3,
    NewMBusDeviceDiscoveredChannel4,
}

/// Bit of each alarm type in the filter, 0 being the least significant bit
const ALARM_BITS: &[(AlarmType, u32)] = &[
    (AlarmType::ClockInvalid, 0),
    (AlarmType::ReplaceBattery, 1),
    (AlarmType::PowerUp, 2),
    (AlarmType::ProgramMemoryError, 8),
    (AlarmType::RamError, 9),
    (AlarmType::NvMemoryError, 10),
    (AlarmType::MeasurementSystemError, 11),
    (AlarmType::WatchdogError, 12),
    (AlarmType::FraudAttempt, 13),
    (AlarmType::CommunicationErrorMBusChannel1, 16),
    (AlarmType::CommunicationErrorMBusChannel2, 17),
    (AlarmType::CommunicationErrorMBusChannel3, 18),
    (AlarmType::CommunicationErrorMBusChannel4, 19),
    (AlarmType::FraudAttemptMBusChannel1, 20),
    (AlarmType::FraudAttemptMBusChannel2, 21),
    (AlarmType::FraudAttemptMBusChannel3, 22),
    (AlarmType::FraudAttemptMBusChannel4, 23),
    (AlarmType::NewMBusDeviceDiscoveredChannel1, 24),
    (AlarmType::NewMBusDeviceDiscoveredChannel2, 25),
    (AlarmType::NewMBusDeviceDiscoveredChannel3, 26),
    (AlarmType::NewMBusDeviceDiscoveredChannel4, 27),
];

impl AlarmType {
    pub fn bit(&self) -> u32 {
        ALARM_BITS
            .iter()
            .find(|(alarm_type, _)| alarm_type == self)
            .map(|(_, bit)| *bit)
            .unwrap_or(0)
    }

    fn mask(&self) -> u32 {
        1 << self.bit()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlarmNotification {
    pub alarm_type: AlarmType,
    pub enabled: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlarmNotifications {
    pub notifications: Vec<AlarmNotification>,
}

impl AlarmNotifications {
    /// Every alarm type with its state in `filter`
    pub fn from_filter(filter: u32) -> Self {
        Self {
            notifications: ALARM_BITS
                .iter()
                .map(|(alarm_type, _)| AlarmNotification {
                    alarm_type: *alarm_type,
                    enabled: filter & alarm_type.mask() != 0,
                })
                .collect(),
        }
    }

    /// `filter` with the bits of these notifications set or cleared
    pub fn apply_to(&self, filter: u32) -> u32 {
        self.notifications.iter().fold(filter, |filter, notification| {
            if notification.enabled {
                filter | notification.alarm_type.mask()
            } else {
                filter & !notification.alarm_type.mask()
            }
        })
    }

    pub fn is_enabled(&self, alarm_type: AlarmType) -> Option<bool> {
        self.notifications
            .iter()
            .find(|notification| notification.alarm_type == alarm_type)
            .map(|notification| notification.enabled)
    }
}

pub struct SetAlarmNotificationsCommand;

#[async_trait]
impl Command for SetAlarmNotificationsCommand {
    type Input = AlarmNotifications;
    type Output = AccessResultCode;

    fn name(&self) -> &'static str {
        "SetAlarmNotifications"
    }

    fn request_kind(&self) -> Option<ActionRequestKind> {
        Some(ActionRequestKind::SetAlarmNotifications)
    }

    async fn execute(
        &self,
        session: &mut DeviceSession,
        device: &mut Device,
        input: AlarmNotifications,
    ) -> DlmsResult<AccessResultCode> {
        let address = AttributeAddress::new(CLASS_ID, OBIS_CODE, ATTRIBUTE_ID);
        session.set_description(&format!(
            "SetAlarmNotifications, retrieve attribute: {}",
            describe_attributes(std::slice::from_ref(&address))
        ));
        let results = get_and_check(session, device, "alarm filter", std::slice::from_ref(&address)).await?;
        let current: u32 = narrow(
            read_long_not_null(&results[0].result_data, "alarm filter")?,
            "alarm filter",
        )?;
        log::info!(
            "Alarm filter of {} before setting notifications: {:#010x}",
            device.device_identification,
            current
        );

        let updated = input.apply_to(current);
        if updated == current {
            log::info!(
                "Alarm filter of {} already matches the requested notifications",
                device.device_identification
            );
            return Ok(AccessResultCode::Success);
        }

        log::info!(
            "Modified alarm filter for {}: {:#010x}",
            device.device_identification,
            updated
        );
        session.set_description(&format!(
            "SetAlarmNotifications, set attribute: {}",
            describe_attributes(std::slice::from_ref(&address))
        ));
        session
            .set(&SetParameter::new(address, DataObject::Unsigned32(updated)))
            .await
    }

    fn from_bundle_request(&self, request: &ActionRequest) -> DlmsResult<AlarmNotifications> {
        match request {
            ActionRequest::SetAlarmNotifications(notifications) => Ok(notifications.clone()),
            other => Err(unexpected_request(Command::name(self), other)),
        }
    }

    fn to_bundle_response(&self, output: AccessResultCode) -> DlmsResult<ActionResponse> {
        check_access_result(output, "set alarm notifications")?;
        Ok(ActionResponse::ok("Set alarm notifications was successful"))
    }
}
