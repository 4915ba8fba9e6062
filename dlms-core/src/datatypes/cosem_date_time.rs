//! COSEM date-time: the 12-byte octet-string layout used by clock attributes and profile buffers

use crate::error::{DlmsError, DlmsResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Value of a one-byte field that is not specified
pub const NOT_SPECIFIED: u8 = 0xff;
/// Value of the year field when it is not specified
pub const YEAR_NOT_SPECIFIED: u16 = 0xffff;
/// Value of the deviation field when it is not specified (0x8000)
pub const DEVIATION_NOT_SPECIFIED: i16 = i16::MIN;

/// Clock status flags for COSEM DateTime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClockStatus {
    InvalidValue = 0x01,
    DoubtfulValue = 0x02,
    DifferentClockBase = 0x04,
    InvalidClockStatus = 0x08,
    DaylightSavingActive = 0x80,
}

impl ClockStatus {
    const ALL: [ClockStatus; 5] = [
        ClockStatus::InvalidValue,
        ClockStatus::DoubtfulValue,
        ClockStatus::DifferentClockBase,
        ClockStatus::InvalidClockStatus,
        ClockStatus::DaylightSavingActive,
    ];

    /// Convert clock status flags to a byte
    pub fn to_byte(statuses: &[ClockStatus]) -> u8 {
        statuses.iter().fold(0u8, |byte, status| byte | *status as u8)
    }

    /// Parse clock status from a byte
    pub fn from_byte(byte: u8) -> Vec<ClockStatus> {
        Self::ALL
            .iter()
            .copied()
            .filter(|status| byte & *status as u8 != 0)
            .collect()
    }
}

/// A COSEM date-time as found on the wire
///
/// Layout: `year(u16 BE) month day weekday hour minute second hundredths
/// deviation(i16 BE) clock_status`. Any field may hold its "not specified"
/// sentinel, so this type keeps the raw field values. Whether the value
/// denotes a single instant is answered by [`CosemDateTime::is_fully_specified`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CosemDateTime {
    year: u16,
    month: u8,
    day_of_month: u8,
    day_of_week: u8,
    hour: u8,
    minute: u8,
    second: u8,
    hundredths: u8,
    deviation: i16,
    clock_status: u8,
}

impl CosemDateTime {
    pub const LENGTH: usize = 12;

    /// Constructs a COSEM DateTime with all details
    ///
    /// # Arguments
    ///
    /// * `year` - The year, or 0xffff if not specified
    /// * `month` - The month from 1 to 12, 0xfd/0xfe for DST end/begin, or 0xff
    /// * `day_of_month` - The day from 1 to 31, 0xfd/0xfe for second-last/last day, or 0xff
    /// * `day_of_week` - 1 (Monday) to 7 (Sunday), or 0xff
    /// * `hour`, `minute`, `second`, `hundredths` - time fields, or 0xff each
    /// * `deviation` - Minutes from local time to UTC (-720 to 720), or 0x8000 if not specified
    /// * `clock_status` - Clock status flags
    ///
    /// # Errors
    ///
    /// Returns `DlmsError::InvalidData` when a field is outside its range.
    pub fn new(
        year: u16,
        month: u8,
        day_of_month: u8,
        day_of_week: u8,
        hour: u8,
        minute: u8,
        second: u8,
        hundredths: u8,
        deviation: i16,
        clock_status: &[ClockStatus],
    ) -> DlmsResult<Self> {
        let date_time = Self {
            year,
            month,
            day_of_month,
            day_of_week,
            hour,
            minute,
            second,
            hundredths,
            deviation,
            clock_status: ClockStatus::to_byte(clock_status),
        };
        date_time.validate()?;
        Ok(date_time)
    }

    /// Decode the 12-byte representation
    pub fn decode(bytes: &[u8]) -> DlmsResult<Self> {
        if bytes.len() != Self::LENGTH {
            return Err(DlmsError::InvalidData(format!(
                "COSEM date-time must be {} bytes, got {}",
                Self::LENGTH,
                bytes.len()
            )));
        }

        let date_time = Self {
            year: u16::from_be_bytes([bytes[0], bytes[1]]),
            month: bytes[2],
            day_of_month: bytes[3],
            day_of_week: bytes[4],
            hour: bytes[5],
            minute: bytes[6],
            second: bytes[7],
            hundredths: bytes[8],
            deviation: i16::from_be_bytes([bytes[9], bytes[10]]),
            clock_status: bytes[11],
        };
        date_time.validate()?;
        Ok(date_time)
    }

    /// Encode to the 12-byte representation
    pub fn encode(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(Self::LENGTH);
        bytes.extend_from_slice(&self.year.to_be_bytes());
        bytes.extend_from_slice(&[
            self.month,
            self.day_of_month,
            self.day_of_week,
            self.hour,
            self.minute,
            self.second,
            self.hundredths,
        ]);
        bytes.extend_from_slice(&self.deviation.to_be_bytes());
        bytes.push(self.clock_status);
        bytes
    }

    fn validate(&self) -> DlmsResult<()> {
        let month_ok = matches!(self.month, 1..=12 | 0xfd | 0xfe | NOT_SPECIFIED);
        let day_ok = matches!(self.day_of_month, 1..=31 | 0xfd | 0xfe | NOT_SPECIFIED);
        let week_ok = matches!(self.day_of_week, 1..=7 | NOT_SPECIFIED);
        let hour_ok = self.hour < 24 || self.hour == NOT_SPECIFIED;
        let minute_ok = self.minute < 60 || self.minute == NOT_SPECIFIED;
        let second_ok = self.second < 60 || self.second == NOT_SPECIFIED;
        let hundredths_ok = self.hundredths < 100 || self.hundredths == NOT_SPECIFIED;

        if !(month_ok && day_ok && week_ok && hour_ok && minute_ok && second_ok && hundredths_ok) {
            return Err(DlmsError::InvalidData(format!(
                "COSEM date-time field out of range: {}",
                self
            )));
        }
        Self::validate_deviation(self.deviation)
    }

    fn validate_deviation(deviation: i16) -> DlmsResult<()> {
        if deviation != DEVIATION_NOT_SPECIFIED && !(-720..=720).contains(&deviation) {
            return Err(DlmsError::InvalidData(format!(
                "Deviation must be within -720..=720 minutes, got {}",
                deviation
            )));
        }
        Ok(())
    }

    /// Whether the value identifies exactly one instant
    ///
    /// Year, month, day, hour, minute, second and deviation must all be
    /// specified; hundredths may be absent and then count as zero. This is
    /// the single rule for every decode path.
    pub fn is_fully_specified(&self) -> bool {
        self.year != YEAR_NOT_SPECIFIED
            && (1..=12).contains(&self.month)
            && (1..=31).contains(&self.day_of_month)
            && self.hour != NOT_SPECIFIED
            && self.minute != NOT_SPECIFIED
            && self.second != NOT_SPECIFIED
            && self.deviation != DEVIATION_NOT_SPECIFIED
    }

    pub fn year(&self) -> u16 {
        self.year
    }

    pub fn month(&self) -> u8 {
        self.month
    }

    pub fn day_of_month(&self) -> u8 {
        self.day_of_month
    }

    pub fn day_of_week(&self) -> u8 {
        self.day_of_week
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    pub fn second(&self) -> u8 {
        self.second
    }

    /// Hundredths of a second, zero when not specified
    pub fn hundredths(&self) -> u8 {
        if self.hundredths == NOT_SPECIFIED {
            0
        } else {
            self.hundredths
        }
    }

    /// Deviation in minutes from local time to UTC, `None` when not specified
    pub fn deviation(&self) -> Option<i16> {
        (self.deviation != DEVIATION_NOT_SPECIFIED).then_some(self.deviation)
    }

    pub fn clock_status(&self) -> Vec<ClockStatus> {
        ClockStatus::from_byte(self.clock_status)
    }

    pub fn is_daylight_saving_active(&self) -> bool {
        self.clock_status & ClockStatus::DaylightSavingActive as u8 != 0
    }
}

impl fmt::Display for CosemDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}.{:02}",
            self.year, self.month, self.day_of_month, self.hour, self.minute, self.second,
            self.hundredths
        )?;
        match self.deviation() {
            Some(deviation) => write!(f, ", deviation={}", deviation)?,
            None => write!(f, ", deviation=unspecified")?,
        }
        write!(f, ", clock_status=0x{:02X}", self.clock_status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_and_encode() {
        let bytes = [0x07, 0xE0, 3, 17, 4, 11, 32, 18, 0xFF, 0xFF, 0xC4, 0x80];
        let date_time = CosemDateTime::decode(&bytes).unwrap();
        assert_eq!(date_time.year(), 2016);
        assert_eq!(date_time.month(), 3);
        assert_eq!(date_time.hour(), 11);
        assert_eq!(date_time.hundredths(), 0);
        assert_eq!(date_time.deviation(), Some(-60));
        assert!(date_time.is_daylight_saving_active());
        assert!(date_time.is_fully_specified());
        assert_eq!(date_time.encode(), bytes.to_vec());
    }

    #[test]
    fn test_unspecified_deviation() {
        let bytes = [0x07, 0xE0, 3, 17, 0xFF, 11, 32, 18, 0, 0x80, 0x00, 0x00];
        let date_time = CosemDateTime::decode(&bytes).unwrap();
        assert_eq!(date_time.deviation(), None);
        assert!(!date_time.is_fully_specified());
    }

    #[test]
    fn test_wildcard_date_is_not_fully_specified() {
        let date_time = CosemDateTime::new(
            YEAR_NOT_SPECIFIED, 0xfe, 0xfe, 7, 2, 0, 0, 0, 0, &[],
        )
        .unwrap();
        assert!(!date_time.is_fully_specified());
    }

    #[test]
    fn test_rejects_out_of_range_fields() {
        assert!(CosemDateTime::new(2016, 13, 1, 0xff, 0, 0, 0, 0, 0, &[]).is_err());
        assert!(CosemDateTime::new(2016, 1, 1, 0xff, 0, 0, 0, 0, 721, &[]).is_err());
        assert!(CosemDateTime::decode(&[0u8; 11]).is_err());
    }

    #[test]
    fn test_clock_status_flags() {
        let byte = ClockStatus::to_byte(&[ClockStatus::InvalidValue, ClockStatus::DaylightSavingActive]);
        assert_eq!(byte, 0x81);
        assert_eq!(
            ClockStatus::from_byte(byte),
            vec![ClockStatus::InvalidValue, ClockStatus::DaylightSavingActive]
        );
    }
}
