//! COSEM date: the 5-byte octet-string layout used by special days and calendars

use crate::datatypes::cosem_date_time::{NOT_SPECIFIED, YEAR_NOT_SPECIFIED};
use crate::error::{DlmsError, DlmsResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Month value meaning "end of daylight saving time"
pub const DAYLIGHT_SAVINGS_END: u8 = 0xfd;
/// Month value meaning "begin of daylight saving time"
pub const DAYLIGHT_SAVINGS_BEGIN: u8 = 0xfe;
/// Day value meaning "last day of the month"
pub const LAST_DAY_OF_MONTH: u8 = 0xfe;
/// Day value meaning "second last day of the month"
pub const SECOND_LAST_DAY_OF_MONTH: u8 = 0xfd;

/// A COSEM date: `year(u16 BE) month day_of_month day_of_week`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CosemDate {
    year: u16,
    month: u8,
    day_of_month: u8,
    day_of_week: u8,
}

impl CosemDate {
    pub const LENGTH: usize = 5;

    /// Constructs a COSEM date
    ///
    /// # Errors
    ///
    /// Returns `DlmsError::InvalidData` if month, day or day of week are out of range
    pub fn new(year: u16, month: u8, day_of_month: u8, day_of_week: u8) -> DlmsResult<Self> {
        let month_ok = matches!(
            month,
            1..=12 | DAYLIGHT_SAVINGS_END | DAYLIGHT_SAVINGS_BEGIN | NOT_SPECIFIED
        );
        let day_ok = matches!(
            day_of_month,
            1..=31 | SECOND_LAST_DAY_OF_MONTH | LAST_DAY_OF_MONTH | NOT_SPECIFIED
        );
        let week_ok = matches!(day_of_week, 1..=7 | NOT_SPECIFIED);
        if !(month_ok && day_ok && week_ok) {
            return Err(DlmsError::InvalidData(format!(
                "COSEM date out of range: year={} month={} day={} weekday={}",
                year, month, day_of_month, day_of_week
            )));
        }
        Ok(Self {
            year,
            month,
            day_of_month,
            day_of_week,
        })
    }

    pub fn decode(bytes: &[u8]) -> DlmsResult<Self> {
        if bytes.len() != Self::LENGTH {
            return Err(DlmsError::InvalidData(format!(
                "COSEM date must be {} bytes, got {}",
                Self::LENGTH,
                bytes.len()
            )));
        }
        Self::new(u16::from_be_bytes([bytes[0], bytes[1]]), bytes[2], bytes[3], bytes[4])
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut bytes = self.year.to_be_bytes().to_vec();
        bytes.extend_from_slice(&[self.month, self.day_of_month, self.day_of_week]);
        bytes
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
}

impl fmt::Display for CosemDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.year == YEAR_NOT_SPECIFIED {
            write!(f, "*")?;
        } else {
            write!(f, "{:04}", self.year)?;
        }
        write!(f, "-{:02}-{:02}", self.month, self.day_of_month)
    }
}
