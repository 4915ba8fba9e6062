//! Periodic gas reads of an M-Bus channel
//!
//! Each gas value comes with the time the M-Bus device captured it, which
//! trails the time the entry was logged. Where the value sits in a buffer
//! entry depends on the profile and on whether the device honoured the
//! selected values of the range selection:
//!
//! | profile  | AMR status | value (selected) | value (whole entry) |
//! |----------|------------|------------------|---------------------|
//! | interval | 1          | 2                | 2                   |
//! | daily    | 1          | 2                | 6 + 2 (channel - 1) |
//! | monthly  | -          | 1                | 5 + 2 (channel - 1) |
//!
//! The capture time directly follows the value.

use crate::bundle::{ActionRequest, ActionRequestKind, ActionResponse};
use crate::codec::{
    as_data_object, describe_attributes, describe_value, read_date_time, read_list, read_scaled_value,
    DlmsMeterValue,
};
use crate::command::{get_and_check, unexpected_request, Command};
use crate::commands::clock_capture_definition;
use crate::commands::periodic_meter_reads::{
    capture_object, read_amr_status, AmrProfileStatus, PeriodType, AMR_PROFILE_STATUS, BUFFER_ATTRIBUTE,
    EXTENDED_REGISTER_CLASS_ID, PROFILE_CLASS_ID, RANGE_DESCRIPTOR, SCALER_UNIT_ATTRIBUTE,
};
use crate::device::Device;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use dlms_client::{AttributeAddress, DeviceSession, SelectiveAccessDescription};
use dlms_core::{DataObject, DlmsError, DlmsResult, ObisCode};
use serde::{Deserialize, Serialize};

const VALUE_ATTRIBUTE: i8 = 2;
const CAPTURE_TIME_ATTRIBUTE: i8 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodicMeterReadsGasQuery {
    pub period_type: PeriodType,
    pub begin_date: DateTime<FixedOffset>,
    pub end_date: DateTime<FixedOffset>,
    /// M-Bus channel 1 to 4
    pub channel: u8,
}

/// One profile entry of a gas meter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodicMeterReadsGas {
    pub log_time: DateTime<FixedOffset>,
    pub consumption: Option<DlmsMeterValue>,
    pub capture_time: DateTime<FixedOffset>,
    /// Absent for the monthly profile
    pub amr_profile_status: Option<Vec<AmrProfileStatus>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodicMeterReadsGasResponse {
    pub period_type: PeriodType,
    pub reads: Vec<PeriodicMeterReadsGas>,
}

pub struct GetPeriodicMeterReadsGasCommand;

fn check_channel(channel: u8) -> DlmsResult<u8> {
    match channel {
        1..=4 => Ok(channel),
        other => Err(DlmsError::Configuration(format!(
            "Channel {} not supported, expected 1 to 4",
            other
        ))),
    }
}

fn mbus_value(channel: u8) -> ObisCode {
    ObisCode::new(0, channel, 24, 2, 1, 255)
}

fn profile(period_type: PeriodType, channel: u8) -> ObisCode {
    match period_type {
        PeriodType::Interval => ObisCode::new(0, channel, 24, 3, 0, 255),
        other => other.logical_name(),
    }
}

fn selected_values(period_type: PeriodType, channel: u8) -> Vec<DataObject> {
    let value = capture_object(EXTENDED_REGISTER_CLASS_ID, mbus_value(channel), VALUE_ATTRIBUTE);
    let capture_time = capture_object(EXTENDED_REGISTER_CLASS_ID, mbus_value(channel), CAPTURE_TIME_ATTRIBUTE);
    match period_type {
        PeriodType::Interval => Vec::new(),
        PeriodType::Daily => vec![
            clock_capture_definition(),
            capture_object(1, AMR_PROFILE_STATUS, 2),
            value,
            capture_time,
        ],
        PeriodType::Monthly => vec![clock_capture_definition(), value, capture_time],
    }
}

/// Index of the gas value in a buffer entry; the capture time follows it
fn value_index(period_type: PeriodType, channel: u8, selective_access: bool) -> usize {
    let offset = 2 * usize::from(channel - 1);
    match (period_type, selective_access) {
        (PeriodType::Interval, _) => 2,
        (PeriodType::Daily, true) => 2,
        (PeriodType::Daily, false) => 6 + offset,
        (PeriodType::Monthly, true) => 1,
        (PeriodType::Monthly, false) => 5 + offset,
    }
}

fn buffer_address(query: &PeriodicMeterReadsGasQuery, selective_access: bool) -> DlmsResult<AttributeAddress> {
    let address = AttributeAddress::new(
        PROFILE_CLASS_ID,
        profile(query.period_type, query.channel),
        BUFFER_ATTRIBUTE,
    );
    if !selective_access {
        return Ok(address);
    }
    let parameter = DataObject::Structure(vec![
        clock_capture_definition(),
        as_data_object(&query.begin_date)?,
        as_data_object(&query.end_date)?,
        DataObject::Array(selected_values(query.period_type, query.channel)),
    ]);
    Ok(address.with_selective_access(SelectiveAccessDescription::new(RANGE_DESCRIPTOR, parameter)))
}

fn read_buffer(
    query: &PeriodicMeterReadsGasQuery,
    selective_access: bool,
    buffer: &DataObject,
    scaler_unit: &DataObject,
) -> DlmsResult<Vec<PeriodicMeterReadsGas>> {
    let context = format!("{} gas profile buffer", query.period_type);
    let value_index = value_index(query.period_type, query.channel, selective_access);
    let mut reads = Vec::new();
    for entry in read_list(buffer, &context)? {
        let elements = match entry {
            DataObject::Structure(elements) if elements.len() > value_index + 1 => elements,
            other => {
                return Err(DlmsError::decode(
                    context.as_str(),
                    format!(
                        "expected a structure of at least {} elements, got {}",
                        value_index + 2,
                        describe_value(other)
                    ),
                ));
            }
        };
        let Some(log_time) = read_date_time(&elements[0], "clock from gas profile entry")? else {
            log::warn!(
                "Skipping {} gas entry without usable clock: {}",
                query.period_type,
                describe_value(&elements[0])
            );
            continue;
        };
        if log_time < query.begin_date || log_time > query.end_date {
            log::warn!(
                "Skipping {} gas entry at {}, outside {} - {}",
                query.period_type,
                log_time.to_rfc3339(),
                query.begin_date.to_rfc3339(),
                query.end_date.to_rfc3339()
            );
            continue;
        }

        let consumption = read_scaled_value(&elements[value_index], scaler_unit, "gas value")?;
        let capture_time = read_date_time(&elements[value_index + 1], "gas capture time")?.ok_or_else(|| {
            DlmsError::decode(
                "gas capture time",
                format!("not a specified date-time: {}", describe_value(&elements[value_index + 1])),
            )
        })?;
        let amr_profile_status = match query.period_type {
            PeriodType::Monthly => None,
            PeriodType::Interval | PeriodType::Daily => Some(read_amr_status(&elements[1])?),
        };
        reads.push(PeriodicMeterReadsGas {
            log_time,
            consumption,
            capture_time,
            amr_profile_status,
        });
    }
    Ok(reads)
}

#[async_trait]
impl Command for GetPeriodicMeterReadsGasCommand {
    type Input = PeriodicMeterReadsGasQuery;
    type Output = PeriodicMeterReadsGasResponse;

    fn name(&self) -> &'static str {
        "GetPeriodicMeterReadsGas"
    }

    fn request_kind(&self) -> Option<ActionRequestKind> {
        Some(ActionRequestKind::GetPeriodicMeterReadsGas)
    }

    async fn execute(
        &self,
        session: &mut DeviceSession,
        device: &mut Device,
        query: PeriodicMeterReadsGasQuery,
    ) -> DlmsResult<PeriodicMeterReadsGasResponse> {
        let channel = check_channel(query.channel)?;
        let selective_access = device.supports_selective_access;
        let buffer = buffer_address(&query, selective_access)?;
        let scaler_unit = AttributeAddress::new(EXTENDED_REGISTER_CLASS_ID, mbus_value(channel), SCALER_UNIT_ATTRIBUTE);

        // Profile buffers are not combined with other attributes in one request
        session.set_description(&format!(
            "GetPeriodicMeterReadsGas for channel {}, {} from {} until {}, retrieve attribute: {}",
            channel,
            query.period_type,
            query.begin_date.to_rfc3339(),
            query.end_date.to_rfc3339(),
            describe_attributes(std::slice::from_ref(&buffer))
        ));
        let buffer_results =
            get_and_check(session, device, "periodic gas meter reads", std::slice::from_ref(&buffer)).await?;

        session.set_description(&format!(
            "GetPeriodicMeterReadsGas scaler and unit, retrieve attribute: {}",
            describe_attributes(std::slice::from_ref(&scaler_unit))
        ));
        let scaler_unit_results = get_and_check(
            session,
            device,
            "scaler and unit of periodic gas meter reads",
            std::slice::from_ref(&scaler_unit),
        )
        .await?;

        let reads = read_buffer(
            &query,
            selective_access,
            &buffer_results[0].result_data,
            &scaler_unit_results[0].result_data,
        )?;
        log::debug!(
            "Read {} {} gas entries for channel {} from {}",
            reads.len(),
            query.period_type,
            channel,
            device.device_identification
        );
        Ok(PeriodicMeterReadsGasResponse {
            period_type: query.period_type,
            reads,
        })
    }

    fn from_bundle_request(&self, request: &ActionRequest) -> DlmsResult<PeriodicMeterReadsGasQuery> {
        match request {
            ActionRequest::GetPeriodicMeterReadsGas(query) => Ok(query.clone()),
            other => Err(unexpected_request(Command::name(self), other)),
        }
    }

    fn to_bundle_response(&self, output: PeriodicMeterReadsGasResponse) -> DlmsResult<ActionResponse> {
        Ok(ActionResponse::PeriodicMeterReadsGas(output))
    }
}
