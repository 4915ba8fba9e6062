//! Conversion between COSEM date-times and `chrono` values
//!
//! A COSEM date-time carries local field values plus a deviation in minutes
//! from local time to UTC (UTC = local + deviation). It denotes a single
//! instant only when it is fully specified, see
//! [`CosemDateTime::is_fully_specified`]; all readers here go through
//! [`to_date_time`], so that rule is applied uniformly.

use crate::codec::unexpected;
use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, Offset, TimeDelta, TimeZone, Timelike};
use dlms_core::{ClockStatus, CosemDate, CosemDateTime, DataObject, DlmsError, DlmsResult};

/// Read the raw date-time layout, wildcards included
///
/// Accepts a 12-byte octet string or a date-time value. Null data reads as `None`.
pub fn read_cosem_date_time(value: &DataObject, context: &str) -> DlmsResult<Option<CosemDateTime>> {
    match value {
        DataObject::Null => Ok(None),
        DataObject::DateTime(date_time) => Ok(Some(*date_time)),
        DataObject::OctetString(bytes) if bytes.len() == CosemDateTime::LENGTH => CosemDateTime::decode(bytes)
            .map(Some)
            .map_err(|e| DlmsError::decode(context, e.to_string())),
        other => Err(unexpected(context, "a 12-byte date-time", other)),
    }
}

/// Read a date-time as an instant
///
/// Returns `None` for null data and for date-times that do not denote a
/// single instant.
pub fn read_date_time(value: &DataObject, context: &str) -> DlmsResult<Option<DateTime<FixedOffset>>> {
    Ok(read_cosem_date_time(value, context)?
        .as_ref()
        .and_then(to_date_time))
}

/// The instant denoted by `value`, in the time zone given by its deviation
pub fn to_date_time(value: &CosemDateTime) -> Option<DateTime<FixedOffset>> {
    if !value.is_fully_specified() {
        return None;
    }
    let deviation = value.deviation()?;
    let offset = FixedOffset::east_opt(-i32::from(deviation) * 60)?;
    let local = NaiveDate::from_ymd_opt(
        i32::from(value.year()),
        u32::from(value.month()),
        u32::from(value.day_of_month()),
    )?
    .and_hms_milli_opt(
        u32::from(value.hour()),
        u32::from(value.minute()),
        u32::from(value.second()),
        u32::from(value.hundredths()) * 10,
    )?;
    offset.from_local_datetime(&local).single()
}

fn encode_local(local: NaiveDateTime, deviation: i16, dst: bool) -> DlmsResult<CosemDateTime> {
    let year = u16::try_from(local.year())
        .map_err(|_| DlmsError::InvalidData(format!("Year {} cannot be encoded", local.year())))?;
    let status: &[ClockStatus] = if dst {
        &[ClockStatus::DaylightSavingActive]
    } else {
        &[]
    };
    // Leap seconds report nanoseconds above one second
    let hundredths = (local.nanosecond() / 10_000_000).min(99);
    CosemDateTime::new(
        year,
        local.month() as u8,
        local.day() as u8,
        local.weekday().number_from_monday() as u8,
        local.hour() as u8,
        local.minute() as u8,
        local.second() as u8,
        hundredths as u8,
        deviation,
        status,
    )
}

/// Encode `date_time` with the deviation of its own offset
///
/// An offset carries no daylight saving rule, so the DST flag is left clear;
/// use [`as_data_object_at`] when it is known.
pub fn as_data_object<Tz: TimeZone>(date_time: &DateTime<Tz>) -> DlmsResult<DataObject> {
    let offset_minutes = date_time.offset().fix().local_minus_utc() / 60;
    let deviation = i16::try_from(-offset_minutes)
        .map_err(|_| DlmsError::InvalidData(format!("Offset of {} minutes cannot be encoded", offset_minutes)))?;
    let encoded = encode_local(date_time.naive_local(), deviation, false)?;
    Ok(DataObject::DateTime(encoded))
}

/// Encode the instant `date_time` as seen at `deviation`
///
/// The time zone of `date_time` is ignored, the local fields are recomputed
/// from the instant and the given deviation.
pub fn as_data_object_at<Tz: TimeZone>(date_time: &DateTime<Tz>, deviation: i16, dst: bool) -> DlmsResult<DataObject> {
    let local = date_time
        .naive_utc()
        .checked_sub_signed(TimeDelta::minutes(i64::from(deviation)))
        .ok_or_else(|| DlmsError::InvalidData(format!("Deviation {} out of range", deviation)))?;
    let encoded = encode_local(local, deviation, dst)?;
    Ok(DataObject::DateTime(encoded))
}

/// Encode a calendar date as a COSEM date
pub fn as_data_object_date(date: NaiveDate) -> DlmsResult<DataObject> {
    let year = u16::try_from(date.year())
        .map_err(|_| DlmsError::InvalidData(format!("Year {} cannot be encoded", date.year())))?;
    let date = CosemDate::new(
        year,
        date.month() as u8,
        date.day() as u8,
        date.weekday().number_from_monday() as u8,
    )?;
    Ok(DataObject::Date(date))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn cosem(value: &DataObject) -> CosemDateTime {
        match value {
            DataObject::DateTime(date_time) => *date_time,
            other => panic!("not a date-time: {}", other),
        }
    }

    #[test]
    fn test_round_trip_with_explicit_deviation() {
        let instant = Utc.with_ymd_and_hms(2016, 3, 17, 11, 32, 18).unwrap() + TimeDelta::milliseconds(123);
        for deviation in [-120i16, -60, 0, 60, 330, -720, 720] {
            for dst in [false, true] {
                let encoded = as_data_object_at(&instant, deviation, dst).unwrap();
                let raw = read_cosem_date_time(&encoded, "clock").unwrap().unwrap();
                assert_eq!(raw.deviation(), Some(deviation));
                assert_eq!(raw.is_daylight_saving_active(), dst);

                let decoded = read_date_time(&encoded, "clock").unwrap().unwrap();
                let truncated = Utc.with_ymd_and_hms(2016, 3, 17, 11, 32, 18).unwrap() + TimeDelta::milliseconds(120);
                assert_eq!(decoded, truncated);
            }
        }
    }

    #[test]
    fn test_local_fields_follow_deviation() {
        let instant = Utc.with_ymd_and_hms(2016, 12, 31, 23, 30, 0).unwrap();
        let raw = cosem(&as_data_object_at(&instant, -60, false).unwrap());
        assert_eq!(raw.year(), 2017);
        assert_eq!(raw.month(), 1);
        assert_eq!(raw.day_of_month(), 1);
        assert_eq!(raw.day_of_week(), 7);
        assert_eq!(raw.hour(), 0);
        assert_eq!(raw.minute(), 30);
    }

    #[test]
    fn test_deviation_derived_from_offset() {
        let offset = FixedOffset::east_opt(2 * 3600).unwrap();
        let date_time = offset.with_ymd_and_hms(2020, 7, 1, 14, 0, 0).unwrap();
        let raw = cosem(&as_data_object(&date_time).unwrap());
        assert_eq!(raw.deviation(), Some(-120));
        assert_eq!(raw.hour(), 14);
        assert!(!raw.is_daylight_saving_active());
        assert_eq!(to_date_time(&raw).unwrap(), date_time);
    }

    #[test]
    fn test_octet_string_is_accepted() {
        let bytes = vec![0x07, 0xE0, 3, 17, 4, 11, 32, 18, 0xFF, 0xFF, 0xC4, 0x80];
        let decoded = read_date_time(&DataObject::OctetString(bytes), "buffer clock")
            .unwrap()
            .unwrap();
        assert_eq!(decoded.with_timezone(&Utc), Utc.with_ymd_and_hms(2016, 3, 17, 10, 32, 18).unwrap());
    }

    #[test]
    fn test_unspecified_values_have_no_instant() {
        let unspecified_deviation = vec![0x07, 0xE0, 3, 17, 4, 11, 32, 18, 0, 0x80, 0x00, 0];
        assert!(read_date_time(&DataObject::OctetString(unspecified_deviation), "clock")
            .unwrap()
            .is_none());

        let unspecified_hour = vec![0x07, 0xE0, 3, 17, 4, 0xFF, 32, 18, 0, 0, 0, 0];
        assert!(read_date_time(&DataObject::OctetString(unspecified_hour), "clock")
            .unwrap()
            .is_none());

        assert!(read_date_time(&DataObject::Null, "clock").unwrap().is_none());
    }

    #[test]
    fn test_wrong_shape_fails() {
        assert!(read_date_time(&DataObject::OctetString(vec![0; 5]), "clock").is_err());
        assert!(read_date_time(&DataObject::Unsigned32(1), "clock").is_err());
    }

    #[test]
    fn test_date() {
        let date = NaiveDate::from_ymd_opt(2024, 12, 25).unwrap();
        match as_data_object_date(date).unwrap() {
            DataObject::Date(date) => {
                assert_eq!(date.encode(), vec![0x07, 0xE8, 12, 25, 3]);
            }
            other => panic!("not a date: {}", other),
        }
    }
}
