//! Bundle request envelope
//!
//! Requests are adjacently tagged, e.g.
//! `{"type": "FindEvents", "payload": {...}}`; requests without input carry
//! only the tag. [`ActionRequestKind`] names the variant without its payload
//! and selects the command in the registry.

use crate::commands::alarm_notifications::AlarmNotifications;
use crate::commands::clock_configuration::ClockConfiguration;
use crate::commands::configuration_object::ConfigurationObject;
use crate::commands::events::FindEventsQuery;
use crate::commands::periodic_meter_reads::PeriodicMeterReadsQuery;
use crate::commands::periodic_meter_reads_gas::PeriodicMeterReadsGasQuery;
use crate::commands::push_setup::PushSetup;
use crate::commands::replace_key::SetKeysRequest;
use crate::commands::special_days::SpecialDaysRequest;
use crate::commands::synchronize_time::SynchronizeTimeRequest;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One operation requested as part of a bundle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ActionRequest {
    GetAdministrativeStatus,
    SynchronizeTime(SynchronizeTimeRequest),
    SetClockConfiguration(ClockConfiguration),
    SetSpecialDays(SpecialDaysRequest),
    SetAlarmNotifications(AlarmNotifications),
    GetPushSetupAlarm,
    GetPushSetupSms,
    SetPushSetupAlarm(PushSetup),
    SetPushSetupSms(PushSetup),
    FindEvents(FindEventsQuery),
    GetPeriodicMeterReads(PeriodicMeterReadsQuery),
    GetPeriodicMeterReadsGas(PeriodicMeterReadsGasQuery),
    GetAssociationLnObjects,
    SetKeys(SetKeysRequest),
    SetConfigurationObject(ConfigurationObject),
    GetFirmwareVersions,
}

/// Discriminant of [`ActionRequest`], the key of the command registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionRequestKind {
    GetAdministrativeStatus,
    SynchronizeTime,
    SetClockConfiguration,
    SetSpecialDays,
    SetAlarmNotifications,
    GetPushSetupAlarm,
    GetPushSetupSms,
    SetPushSetupAlarm,
    SetPushSetupSms,
    FindEvents,
    GetPeriodicMeterReads,
    GetPeriodicMeterReadsGas,
    GetAssociationLnObjects,
    SetKeys,
    SetConfigurationObject,
    GetFirmwareVersions,
}

impl ActionRequest {
    pub fn kind(&self) -> ActionRequestKind {
        match self {
            ActionRequest::GetAdministrativeStatus => ActionRequestKind::GetAdministrativeStatus,
            ActionRequest::SynchronizeTime(_) => ActionRequestKind::SynchronizeTime,
            ActionRequest::SetClockConfiguration(_) => ActionRequestKind::SetClockConfiguration,
            ActionRequest::SetSpecialDays(_) => ActionRequestKind::SetSpecialDays,
            ActionRequest::SetAlarmNotifications(_) => ActionRequestKind::SetAlarmNotifications,
            ActionRequest::GetPushSetupAlarm => ActionRequestKind::GetPushSetupAlarm,
            ActionRequest::GetPushSetupSms => ActionRequestKind::GetPushSetupSms,
            ActionRequest::SetPushSetupAlarm(_) => ActionRequestKind::SetPushSetupAlarm,
            ActionRequest::SetPushSetupSms(_) => ActionRequestKind::SetPushSetupSms,
            ActionRequest::FindEvents(_) => ActionRequestKind::FindEvents,
            ActionRequest::GetPeriodicMeterReads(_) => ActionRequestKind::GetPeriodicMeterReads,
            ActionRequest::GetAssociationLnObjects => ActionRequestKind::GetAssociationLnObjects,
            ActionRequest::GetPeriodicMeterReadsGas(_) => ActionRequestKind::GetPeriodicMeterReadsGas,
            ActionRequest::SetKeys(_) => ActionRequestKind::SetKeys,
            ActionRequest::SetConfigurationObject(_) => ActionRequestKind::SetConfigurationObject,
            ActionRequest::GetFirmwareVersions => ActionRequestKind::GetFirmwareVersions,
        }
    }
}

impl fmt::Display for ActionRequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ActionRequestKind::GetAdministrativeStatus => "GetAdministrativeStatus",
            ActionRequestKind::SynchronizeTime => "SynchronizeTime",
            ActionRequestKind::SetClockConfiguration => "SetClockConfiguration",
            ActionRequestKind::SetSpecialDays => "SetSpecialDays",
            ActionRequestKind::SetAlarmNotifications => "SetAlarmNotifications",
            ActionRequestKind::GetPushSetupAlarm => "GetPushSetupAlarm",
            ActionRequestKind::GetPushSetupSms => "GetPushSetupSms",
            ActionRequestKind::SetPushSetupAlarm => "SetPushSetupAlarm",
            ActionRequestKind::SetPushSetupSms => "SetPushSetupSms",
            ActionRequestKind::FindEvents => "FindEvents",
            ActionRequestKind::GetPeriodicMeterReads => "GetPeriodicMeterReads",
            ActionRequestKind::GetAssociationLnObjects => "GetAssociationLnObjects",
            ActionRequestKind::GetPeriodicMeterReadsGas => "GetPeriodicMeterReadsGas",
            ActionRequestKind::SetKeys => "SetKeys",
            ActionRequestKind::SetConfigurationObject => "SetConfigurationObject",
            ActionRequestKind::GetFirmwareVersions => "GetFirmwareVersions",
        };
        f.write_str(name)
    }
}
