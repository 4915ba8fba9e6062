//! Time zone and daylight saving settings of the clock object
//!
//! Attributes are written one at a time so a refused attribute names itself
//! in the error. The daylight saving deviation is read first and written only
//! when it differs.

use crate::bundle::{ActionRequest, ActionRequestKind, ActionResponse};
use crate::codec::{describe_attributes, narrow, read_long_not_null};
use crate::command::{check_access_result, get_and_check, unexpected_request, Command};
use crate::commands::{CLOCK_CLASS_ID, CLOCK_LOGICAL_NAME};
use crate::device::Device;
use async_trait::async_trait;
use dlms_client::{AttributeAddress, DeviceSession, SetParameter};
use dlms_core::{CosemDateTime, DataObject, DlmsError, DlmsResult};
use serde::{Deserialize, Serialize};

const TIME_ZONE: i8 = 3;
const DAYLIGHT_SAVINGS_BEGIN: i8 = 5;
const DAYLIGHT_SAVINGS_END: i8 = 6;
const DAYLIGHT_SAVINGS_DEVIATION: i8 = 7;
const DAYLIGHT_SAVINGS_ENABLED: i8 = 8;

/// Time zone and daylight saving settings of the device clock
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockConfiguration {
    /// Offset of local standard time from UTC in minutes, e.g. 60 for CET
    pub time_zone_offset: i16,
    pub daylight_savings_begin: CosemDateTime,
    pub daylight_savings_end: CosemDateTime,
    /// Minutes added to local time while daylight saving is active
    pub daylight_savings_deviation: i8,
    pub daylight_savings_enabled: bool,
}

/// Write attributes 3 and 5 to 8 of the clock
pub struct SetClockConfigurationCommand;

fn clock_attribute(attribute_id: i8) -> AttributeAddress {
    AttributeAddress::new(CLOCK_CLASS_ID, CLOCK_LOGICAL_NAME, attribute_id)
}

async fn write_attribute(
    session: &mut DeviceSession,
    attribute_id: i8,
    value: DataObject,
    attribute_name: &str,
) -> DlmsResult<()> {
    let address = clock_attribute(attribute_id);
    session.set_description(&format!(
        "SetClockConfiguration, preparing to write attribute: {}",
        describe_attributes(std::slice::from_ref(&address))
    ));
    let code = session.set(&SetParameter::new(address, value)).await?;
    check_access_result(code, &format!("clock configuration attribute '{}'", attribute_name))
}

#[async_trait]
impl Command for SetClockConfigurationCommand {
    type Input = ClockConfiguration;
    type Output = ();

    fn name(&self) -> &'static str {
        "SetClockConfiguration"
    }

    fn request_kind(&self) -> Option<ActionRequestKind> {
        Some(ActionRequestKind::SetClockConfiguration)
    }

    async fn execute(
        &self,
        session: &mut DeviceSession,
        device: &mut Device,
        input: ClockConfiguration,
    ) -> DlmsResult<()> {
        // The clock stores the deviation of local time to UTC, the opposite sign of the offset
        let time_zone = input.time_zone_offset.checked_neg().ok_or_else(|| {
            DlmsError::Configuration(format!("Time zone offset {} out of range", input.time_zone_offset))
        })?;
        write_attribute(session, TIME_ZONE, DataObject::Integer16(time_zone), "Timezone").await?;
        write_attribute(
            session,
            DAYLIGHT_SAVINGS_BEGIN,
            DataObject::OctetString(input.daylight_savings_begin.encode()),
            "Daylight savings begin",
        )
        .await?;
        write_attribute(
            session,
            DAYLIGHT_SAVINGS_END,
            DataObject::OctetString(input.daylight_savings_end.encode()),
            "Daylight savings end",
        )
        .await?;

        // Read-only on some devices: only written when it differs
        let results = get_and_check(
            session,
            device,
            "daylight savings deviation",
            &[clock_attribute(DAYLIGHT_SAVINGS_DEVIATION)],
        )
        .await?;
        let current: i8 = narrow(
            read_long_not_null(&results[0].result_data, "daylight savings deviation")?,
            "daylight savings deviation",
        )?;
        if current == input.daylight_savings_deviation {
            log::debug!(
                "Daylight savings deviation of {} already is {}",
                device.device_identification,
                current
            );
        } else {
            write_attribute(
                session,
                DAYLIGHT_SAVINGS_DEVIATION,
                DataObject::Integer8(input.daylight_savings_deviation),
                "Daylight savings deviation",
            )
            .await?;
        }

        write_attribute(
            session,
            DAYLIGHT_SAVINGS_ENABLED,
            DataObject::Boolean(input.daylight_savings_enabled),
            "Daylight savings enabled",
        )
        .await
    }

    fn from_bundle_request(&self, request: &ActionRequest) -> DlmsResult<ClockConfiguration> {
        match request {
            ActionRequest::SetClockConfiguration(configuration) => Ok(configuration.clone()),
            other => Err(unexpected_request(Command::name(self), other)),
        }
    }

    fn to_bundle_response(&self, _output: ()) -> DlmsResult<ActionResponse> {
        Ok(ActionResponse::ok("Set clock configuration was successful"))
    }
}
