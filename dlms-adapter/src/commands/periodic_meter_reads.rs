//! Periodic meter reads from the interval, daily and monthly profiles
//!
//! Each profile buffer entry starts with the capture time. The entry layout
//! depends on the profile:
//!
//! | profile  | clock | AMR status | import              | export              |
//! |----------|-------|------------|---------------------|---------------------|
//! | interval | 0     | 1          | 2                   | 3                   |
//! | daily    | 0     | 1          | 2 (rate 1), 3 (rate 2) | 4 (rate 1), 5 (rate 2) |
//! | monthly  | 0     | -          | 1 (rate 1), 2 (rate 2) | 3 (rate 1), 4 (rate 2) |
//!
//! Devices supporting selective access only return the requested range;
//! for other devices the whole buffer is read and filtered here.

use crate::bundle::{ActionRequest, ActionRequestKind, ActionResponse};
use crate::codec::{
    as_data_object, describe_attributes, describe_value, narrow, read_date_time, read_list, read_long_not_null,
    read_scaled_value, DlmsMeterValue,
};
use crate::command::{check_access_result, get_and_check, unexpected_request, Command};
use crate::commands::clock_capture_definition;
use crate::device::Device;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use dlms_client::{AttributeAddress, DeviceSession, SelectiveAccessDescription};
use dlms_core::{DataObject, DlmsError, DlmsResult, ObisCode};
use serde::{Deserialize, Serialize};
use std::fmt;

pub(crate) const PROFILE_CLASS_ID: u16 = 7;
pub(crate) const BUFFER_ATTRIBUTE: i8 = 2;
pub(crate) const RANGE_DESCRIPTOR: u8 = 1;

const REGISTER_CLASS_ID: u16 = 3;
pub(crate) const EXTENDED_REGISTER_CLASS_ID: u16 = 4;
pub(crate) const SCALER_UNIT_ATTRIBUTE: i8 = 3;
const ACTIVE_ENERGY_IMPORT: ObisCode = ObisCode::new(1, 0, 1, 8, 0, 255);

pub(crate) const AMR_PROFILE_STATUS: ObisCode = ObisCode::new(0, 0, 96, 10, 2, 255);
const IMPORT_RATE_1: ObisCode = ObisCode::new(1, 0, 1, 8, 1, 255);
const IMPORT_RATE_2: ObisCode = ObisCode::new(1, 0, 1, 8, 2, 255);
const EXPORT_RATE_1: ObisCode = ObisCode::new(1, 0, 2, 8, 1, 255);
const EXPORT_RATE_2: ObisCode = ObisCode::new(1, 0, 2, 8, 2, 255);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PeriodType {
    Interval,
    Daily,
    Monthly,
}

impl PeriodType {
    pub fn logical_name(&self) -> ObisCode {
        match self {
            PeriodType::Interval => ObisCode::new(1, 0, 99, 1, 0, 255),
            PeriodType::Daily => ObisCode::new(1, 0, 99, 2, 0, 255),
            PeriodType::Monthly => ObisCode::new(0, 0, 98, 1, 0, 255),
        }
    }

    /// Capture objects requested with a range selection; empty means all
    fn selected_values(&self) -> Vec<DataObject> {
        let register = |obis: ObisCode| capture_object(REGISTER_CLASS_ID, obis, 2);
        let rates = [IMPORT_RATE_1, IMPORT_RATE_2, EXPORT_RATE_1, EXPORT_RATE_2].map(register);
        match self {
            PeriodType::Interval => Vec::new(),
            PeriodType::Daily => {
                let mut values = vec![clock_capture_definition(), capture_object(1, AMR_PROFILE_STATUS, 2)];
                values.extend(rates);
                values
            }
            PeriodType::Monthly => {
                let mut values = vec![clock_capture_definition()];
                values.extend(rates);
                values
            }
        }
    }
}

impl fmt::Display for PeriodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeriodType::Interval => write!(f, "INTERVAL"),
            PeriodType::Daily => write!(f, "DAILY"),
            PeriodType::Monthly => write!(f, "MONTHLY"),
        }
    }
}

pub(crate) fn capture_object(class_id: u16, logical_name: ObisCode, attribute_id: i8) -> DataObject {
    DataObject::Structure(vec![
        DataObject::Unsigned16(class_id),
        DataObject::OctetString(logical_name.as_bytes().to_vec()),
        DataObject::Integer8(attribute_id),
        DataObject::Unsigned16(0),
    ])
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodicMeterReadsQuery {
    pub period_type: PeriodType,
    pub begin_date: DateTime<FixedOffset>,
    pub end_date: DateTime<FixedOffset>,
    /// M-Bus channel 1 to 4 whose scaler/unit applies, `None` for the electricity meter
    pub channel: Option<u8>,
}

/// Status flags of a profile entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AmrProfileStatus {
    CriticalError,
    ClockInvalid,
    DataNotValid,
    DaylightSaving,
    ClockAdjusted,
    PowerDown,
}

const AMR_STATUS_BITS: &[(AmrProfileStatus, u8)] = &[
    (AmrProfileStatus::CriticalError, 0),
    (AmrProfileStatus::ClockInvalid, 1),
    (AmrProfileStatus::DataNotValid, 2),
    (AmrProfileStatus::DaylightSaving, 3),
    (AmrProfileStatus::ClockAdjusted, 5),
    (AmrProfileStatus::PowerDown, 7),
];

impl AmrProfileStatus {
    /// Flags set in `status`, bit 0 being the least significant bit
    pub fn from_status(status: u8) -> Vec<AmrProfileStatus> {
        AMR_STATUS_BITS
            .iter()
            .filter(|(_, bit)| status & (1 << bit) != 0)
            .map(|(flag, _)| *flag)
            .collect()
    }
}

/// One profile entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodicMeterReads {
    pub log_time: DateTime<FixedOffset>,
    /// Interval profile only
    pub active_energy_import: Option<DlmsMeterValue>,
    /// Interval profile only
    pub active_energy_export: Option<DlmsMeterValue>,
    pub active_energy_import_tariff_one: Option<DlmsMeterValue>,
    pub active_energy_import_tariff_two: Option<DlmsMeterValue>,
    pub active_energy_export_tariff_one: Option<DlmsMeterValue>,
    pub active_energy_export_tariff_two: Option<DlmsMeterValue>,
    /// Absent for the monthly profile
    pub amr_profile_status: Option<Vec<AmrProfileStatus>>,
}

impl PeriodicMeterReads {
    fn at(log_time: DateTime<FixedOffset>) -> Self {
        Self {
            log_time,
            active_energy_import: None,
            active_energy_export: None,
            active_energy_import_tariff_one: None,
            active_energy_import_tariff_two: None,
            active_energy_export_tariff_one: None,
            active_energy_export_tariff_two: None,
            amr_profile_status: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodicMeterReadsResponse {
    pub period_type: PeriodType,
    pub reads: Vec<PeriodicMeterReads>,
}

pub struct GetPeriodicMeterReadsCommand;

fn scaler_unit_address(channel: Option<u8>) -> DlmsResult<AttributeAddress> {
    match channel {
        None => Ok(AttributeAddress::new(REGISTER_CLASS_ID, ACTIVE_ENERGY_IMPORT, SCALER_UNIT_ATTRIBUTE)),
        Some(channel @ 1..=4) => Ok(AttributeAddress::new(
            EXTENDED_REGISTER_CLASS_ID,
            ObisCode::new(0, channel, 24, 2, 1, 255),
            SCALER_UNIT_ATTRIBUTE,
        )),
        Some(channel) => Err(DlmsError::Configuration(format!(
            "Channel {} not supported, expected 1 to 4",
            channel
        ))),
    }
}

fn buffer_address(query: &PeriodicMeterReadsQuery, selective_access: bool) -> DlmsResult<AttributeAddress> {
    let address = AttributeAddress::new(PROFILE_CLASS_ID, query.period_type.logical_name(), BUFFER_ATTRIBUTE);
    if !selective_access {
        return Ok(address);
    }
    let parameter = DataObject::Structure(vec![
        clock_capture_definition(),
        as_data_object(&query.begin_date)?,
        as_data_object(&query.end_date)?,
        DataObject::Array(query.period_type.selected_values()),
    ]);
    Ok(address.with_selective_access(SelectiveAccessDescription::new(RANGE_DESCRIPTOR, parameter)))
}

pub(crate) fn read_amr_status(value: &DataObject) -> DlmsResult<Vec<AmrProfileStatus>> {
    let status: u8 = narrow(read_long_not_null(value, "AMR profile status")?, "AMR profile status")?;
    Ok(AmrProfileStatus::from_status(status))
}

fn read_entry(
    period_type: PeriodType,
    log_time: DateTime<FixedOffset>,
    elements: &[DataObject],
    scaler_unit: &DataObject,
) -> DlmsResult<PeriodicMeterReads> {
    let value = |index: usize, context: &str| read_scaled_value(&elements[index], scaler_unit, context);
    let mut reads = PeriodicMeterReads::at(log_time);
    match period_type {
        PeriodType::Interval => {
            reads.amr_profile_status = Some(read_amr_status(&elements[1])?);
            reads.active_energy_import = value(2, "positive active energy")?;
            reads.active_energy_export = value(3, "negative active energy")?;
        }
        PeriodType::Daily => {
            reads.amr_profile_status = Some(read_amr_status(&elements[1])?);
            reads.active_energy_import_tariff_one = value(2, "positive active energy (tariff 1)")?;
            reads.active_energy_import_tariff_two = value(3, "positive active energy (tariff 2)")?;
            reads.active_energy_export_tariff_one = value(4, "negative active energy (tariff 1)")?;
            reads.active_energy_export_tariff_two = value(5, "negative active energy (tariff 2)")?;
        }
        PeriodType::Monthly => {
            reads.active_energy_import_tariff_one = value(1, "positive active energy (tariff 1)")?;
            reads.active_energy_import_tariff_two = value(2, "positive active energy (tariff 2)")?;
            reads.active_energy_export_tariff_one = value(3, "negative active energy (tariff 1)")?;
            reads.active_energy_export_tariff_two = value(4, "negative active energy (tariff 2)")?;
        }
    }
    Ok(reads)
}

fn entry_len(period_type: PeriodType) -> usize {
    match period_type {
        PeriodType::Interval => 4,
        PeriodType::Daily => 6,
        PeriodType::Monthly => 5,
    }
}

fn read_buffer(
    query: &PeriodicMeterReadsQuery,
    buffer: &DataObject,
    scaler_unit: &DataObject,
) -> DlmsResult<Vec<PeriodicMeterReads>> {
    let context = format!("{} profile buffer", query.period_type);
    let mut reads = Vec::new();
    for entry in read_list(buffer, &context)? {
        let elements = match entry {
            DataObject::Structure(elements) if elements.len() >= entry_len(query.period_type) => elements,
            other => {
                return Err(DlmsError::decode(
                    context.as_str(),
                    format!(
                        "expected a structure of at least {} elements, got {}",
                        entry_len(query.period_type),
                        describe_value(other)
                    ),
                ));
            }
        };
        let Some(log_time) = read_date_time(&elements[0], "clock from profile entry")? else {
            log::warn!(
                "Skipping {} entry without usable clock: {}",
                query.period_type,
                describe_value(&elements[0])
            );
            continue;
        };
        if log_time < query.begin_date || log_time > query.end_date {
            log::warn!(
                "Skipping {} entry at {}, outside {} - {}",
                query.period_type,
                log_time.to_rfc3339(),
                query.begin_date.to_rfc3339(),
                query.end_date.to_rfc3339()
            );
            continue;
        }
        reads.push(read_entry(query.period_type, log_time, elements, scaler_unit)?);
    }
    Ok(reads)
}

#[async_trait]
impl Command for GetPeriodicMeterReadsCommand {
    type Input = PeriodicMeterReadsQuery;
    type Output = PeriodicMeterReadsResponse;

    fn name(&self) -> &'static str {
        "GetPeriodicMeterReads"
    }

    fn request_kind(&self) -> Option<ActionRequestKind> {
        Some(ActionRequestKind::GetPeriodicMeterReads)
    }

    async fn execute(
        &self,
        session: &mut DeviceSession,
        device: &mut Device,
        query: PeriodicMeterReadsQuery,
    ) -> DlmsResult<PeriodicMeterReadsResponse> {
        let scaler_unit = scaler_unit_address(query.channel)?;
        let buffer = buffer_address(&query, device.supports_selective_access)?;

        session.set_description(&format!(
            "GetPeriodicMeterReads {} from {} until {}, retrieve attribute: {}",
            query.period_type,
            query.begin_date.to_rfc3339(),
            query.end_date.to_rfc3339(),
            describe_attributes(std::slice::from_ref(&buffer))
        ));
        let results = get_and_check(session, device, "periodic meter reads", std::slice::from_ref(&buffer)).await?;

        session.set_description(&format!(
            "GetPeriodicMeterReads scaler and unit, retrieve attribute: {}",
            describe_attributes(std::slice::from_ref(&scaler_unit))
        ));
        let scaler_unit_result = session.get(&scaler_unit).await?;
        check_access_result(scaler_unit_result.result_code, "scaler and unit of periodic meter reads")?;

        let reads = read_buffer(&query, &results[0].result_data, &scaler_unit_result.result_data)?;
        log::debug!(
            "Read {} {} entries from {}",
            reads.len(),
            query.period_type,
            device.device_identification
        );
        Ok(PeriodicMeterReadsResponse {
            period_type: query.period_type,
            reads,
        })
    }

    fn from_bundle_request(&self, request: &ActionRequest) -> DlmsResult<PeriodicMeterReadsQuery> {
        match request {
            ActionRequest::GetPeriodicMeterReads(query) => Ok(query.clone()),
            other => Err(unexpected_request(Command::name(self), other)),
        }
    }

    fn to_bundle_response(&self, output: PeriodicMeterReadsResponse) -> DlmsResult<ActionResponse> {
        Ok(ActionResponse::PeriodicMeterReads(output))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::DlmsUnit;
    use crate::test_support::FakeConnection;
    use chrono::TimeZone;

    fn cet(day: u32, hour: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(3600)
            .unwrap()
            .with_ymd_and_hms(2024, 1, day, hour, 0, 0)
            .unwrap()
    }

    fn query(period_type: PeriodType, channel: Option<u8>) -> PeriodicMeterReadsQuery {
        PeriodicMeterReadsQuery {
            period_type,
            begin_date: cet(1, 0),
            end_date: cet(3, 0),
            channel,
        }
    }

    fn profile(period_type: PeriodType) -> AttributeAddress {
        AttributeAddress::new(PROFILE_CLASS_ID, period_type.logical_name(), BUFFER_ATTRIBUTE)
    }

    fn watt_hours(scaler: i8) -> DataObject {
        DataObject::Structure(vec![DataObject::Integer8(scaler), DataObject::Enumerate(30)])
    }

    fn interval_entry(time: DateTime<FixedOffset>, status: u8, import: u32, export: u32) -> DataObject {
        DataObject::Structure(vec![
            as_data_object(&time).unwrap(),
            DataObject::Unsigned8(status),
            DataObject::Unsigned32(import),
            DataObject::Unsigned32(export),
        ])
    }

    #[tokio::test]
    async fn test_interval_reads_are_scaled_and_filtered() {
        let connection = FakeConnection::new();
        connection.respond(
            &profile(PeriodType::Interval),
            DataObject::Array(vec![
                interval_entry(cet(1, 0), 0b1000_1000, 1234, 10),
                interval_entry(cet(5, 0), 0, 1300, 11),
                DataObject::Structure(vec![
                    DataObject::Null,
                    DataObject::Unsigned8(0),
                    DataObject::Unsigned32(1),
                    DataObject::Unsigned32(1),
                ]),
                interval_entry(cet(3, 0), 0b0000_0001, 1400, 12),
            ]),
        );
        connection.respond(&scaler_unit_address(None).unwrap(), watt_hours(-2));
        let mut device = Device::new("E0026000059790003");

        let response = GetPeriodicMeterReadsCommand
            .execute(&mut connection.session(), &mut device, query(PeriodType::Interval, None))
            .await
            .unwrap();

        assert_eq!(response.period_type, PeriodType::Interval);
        assert_eq!(response.reads.len(), 2);
        let first = &response.reads[0];
        assert_eq!(first.log_time, cet(1, 0));
        let import = first.active_energy_import.unwrap();
        assert_eq!(import.value.to_string(), "12.34");
        assert_eq!(import.unit, DlmsUnit::WattHour);
        assert_eq!(
            first.amr_profile_status,
            Some(vec![AmrProfileStatus::DaylightSaving, AmrProfileStatus::PowerDown])
        );
        assert_eq!(response.reads[1].amr_profile_status, Some(vec![AmrProfileStatus::CriticalError]));
        assert!(connection.reads()[0].access_selection.is_none());
    }

    #[tokio::test]
    async fn test_daily_selection_lists_captured_objects() {
        let connection = FakeConnection::new();
        connection.respond(&profile(PeriodType::Daily), DataObject::Array(Vec::new()));
        connection.respond(&scaler_unit_address(None).unwrap(), watt_hours(0));
        let mut device = Device::new("E0026000059790003");
        device.supports_selective_access = true;

        GetPeriodicMeterReadsCommand
            .execute(&mut connection.session(), &mut device, query(PeriodType::Daily, None))
            .await
            .unwrap();

        let reads = connection.reads();
        let selection = reads[0].access_selection.as_ref().unwrap();
        assert_eq!(selection.access_selector, 1);
        let parameter = selection.access_parameter.as_list().unwrap();
        assert_eq!(parameter[0], clock_capture_definition());
        assert_eq!(parameter[2], as_data_object(&cet(3, 0)).unwrap());
        let selected = parameter[3].as_list().unwrap();
        assert_eq!(selected.len(), 6);
        assert_eq!(selected[1], capture_object(1, AMR_PROFILE_STATUS, 2));
        assert_eq!(selected[5], capture_object(REGISTER_CLASS_ID, EXPORT_RATE_2, 2));
    }

    #[tokio::test]
    async fn test_monthly_reads_with_mbus_scaler() {
        let connection = FakeConnection::new();
        connection.respond(
            &profile(PeriodType::Monthly),
            DataObject::Array(vec![DataObject::Structure(vec![
                as_data_object(&cet(2, 0)).unwrap(),
                DataObject::Unsigned32(1),
                DataObject::Unsigned32(2),
                DataObject::Unsigned32(3),
                DataObject::Null,
            ])]),
        );
        connection.respond(&scaler_unit_address(Some(2)).unwrap(), watt_hours(3));
        let mut device = Device::new("E0026000059790003");

        let response = GetPeriodicMeterReadsCommand
            .execute(&mut connection.session(), &mut device, query(PeriodType::Monthly, Some(2)))
            .await
            .unwrap();

        let read = &response.reads[0];
        assert_eq!(read.amr_profile_status, None);
        assert_eq!(read.active_energy_import_tariff_two.unwrap().value.to_string(), "2000");
        assert_eq!(read.active_energy_export_tariff_two, None);
        assert_eq!(connection.reads()[1].instance_id, ObisCode::new(0, 2, 24, 2, 1, 255));
    }

    #[tokio::test]
    async fn test_unknown_channel_is_rejected() {
        let connection = FakeConnection::new();
        let mut device = Device::new("E0026000059790003");
        let error = GetPeriodicMeterReadsCommand
            .execute(&mut connection.session(), &mut device, query(PeriodType::Daily, Some(5)))
            .await
            .unwrap_err();
        assert_eq!(error.kind(), "ConfigurationError");
        assert!(connection.reads().is_empty());
    }
}
