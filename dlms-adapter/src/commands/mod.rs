//! Commands executed against a device
//!
//! One module per operation. Each module holds the command, its input and
//! output types and the COSEM objects it addresses.

pub mod activity_calendar;
pub mod administrative_status;
pub mod alarm_notifications;
pub mod association_objects;
pub mod clock_configuration;
pub mod configuration_object;
pub mod configuration_objects;
pub mod events;
pub mod firmware_versions;
pub mod periodic_meter_reads;
pub mod periodic_meter_reads_gas;
pub mod push_setup;
pub mod replace_key;
pub mod special_days;
pub mod synchronize_time;

pub use activity_calendar::ActivateActivityCalendarCommand;
pub use administrative_status::{AdministrativeStatus, GetAdministrativeStatusCommand};
pub use alarm_notifications::{AlarmNotification, AlarmNotifications, AlarmType, SetAlarmNotificationsCommand};
pub use association_objects::{
    AccessRight, AssociationLnListElement, AttributeAccessItem, AttributeAccessMode,
    GetAssociationLnObjectsCommand, MethodAccessItem, MethodAccessMode,
};
pub use clock_configuration::{ClockConfiguration, SetClockConfigurationCommand};
pub use configuration_object::{
    ConfigurationFlag, ConfigurationFlagType, ConfigurationObject, GprsOperationMode, SetConfigurationObjectCommand,
};
pub use configuration_objects::RetrieveConfigurationObjectsCommand;
pub use events::{Event, EventLogCategory, FindEventsCommand, FindEventsQuery};
pub use firmware_versions::{FirmwareModuleType, FirmwareVersion, GetFirmwareVersionsCommand};
pub use periodic_meter_reads::{
    AmrProfileStatus, GetPeriodicMeterReadsCommand, PeriodType, PeriodicMeterReads,
    PeriodicMeterReadsQuery, PeriodicMeterReadsResponse,
};
pub use periodic_meter_reads_gas::{
    GetPeriodicMeterReadsGasCommand, PeriodicMeterReadsGas, PeriodicMeterReadsGasQuery,
    PeriodicMeterReadsGasResponse,
};
pub use push_setup::{GetPushSetupCommand, PushSetup, PushSetupKind, SetPushSetupCommand};
pub use replace_key::{KeyChange, ReplaceKeyCommand, SetKeysCommand, SetKeysRequest};
pub use special_days::{SetSpecialDaysCommand, SpecialDay, SpecialDaysRequest};
pub use synchronize_time::{SynchronizeTimeCommand, SynchronizeTimeRequest};

use dlms_core::{DataObject, ObisCode};

/// Clock object `{8, 0-0:1.0.0.255}`
pub(crate) const CLOCK_CLASS_ID: u16 = 8;
pub(crate) const CLOCK_LOGICAL_NAME: ObisCode = ObisCode::new(0, 0, 1, 0, 0, 255);
pub(crate) const CLOCK_TIME_ATTRIBUTE: i8 = 2;

/// Capture object definition of the clock time, the restricting object of range selections
pub(crate) fn clock_capture_definition() -> DataObject {
    DataObject::Structure(vec![
        DataObject::Unsigned16(CLOCK_CLASS_ID),
        DataObject::OctetString(CLOCK_LOGICAL_NAME.as_bytes().to_vec()),
        DataObject::Integer8(CLOCK_TIME_ATTRIBUTE),
        DataObject::Unsigned16(0),
    ])
}
