//! Scaler/unit handling for register values
//!
//! Registers report a raw integer plus a `{scaler, unit}` structure; the
//! value is `raw × 10^scaler`. [`ScaledValue`] keeps raw and scaler, so the
//! decimal stays exact until it is converted.

use crate::codec::unit::DlmsUnit;
use crate::codec::{describe_value, narrow, read_long, read_long_not_null};
use dlms_core::{DataObject, DlmsError, DlmsResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Decimal number `raw × 10^scaler`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScaledValue {
    raw: i64,
    scaler: i8,
}

impl ScaledValue {
    pub fn new(raw: i64, scaler: i8) -> Self {
        Self { raw, scaler }
    }

    pub fn raw(&self) -> i64 {
        self.raw
    }

    pub fn scaler(&self) -> i8 {
        self.scaler
    }

    /// Nearest `f64`; negative scalers divide, so 1234 × 10^-2 gives exactly `12.34`
    pub fn to_f64(&self) -> f64 {
        let factor = 10f64.powi(i32::from(self.scaler).abs());
        if self.scaler < 0 {
            self.raw as f64 / factor
        } else {
            self.raw as f64 * factor
        }
    }
}

impl fmt::Display for ScaledValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.raw < 0 { "-" } else { "" };
        let digits = self.raw.unsigned_abs().to_string();
        if self.scaler >= 0 {
            return write!(f, "{}{}{}", sign, digits, "0".repeat(self.scaler as usize));
        }
        let decimals = usize::from(self.scaler.unsigned_abs());
        let padded = format!("{:0>width$}", digits, width = decimals + 1);
        let (integer, fraction) = padded.split_at(padded.len() - decimals);
        write!(f, "{}{}.{}", sign, integer, fraction)
    }
}

/// The `{scaler, unit}` structure of a register
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScalerUnit {
    pub scaler: i8,
    pub unit: DlmsUnit,
}

/// A scaled value with its unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DlmsMeterValue {
    pub value: ScaledValue,
    pub unit: DlmsUnit,
}

impl fmt::Display for DlmsMeterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.unit)
    }
}

/// Read a `{scaler: integer, unit: enum}` structure
pub fn read_scaler_unit(value: &DataObject, context: &str) -> DlmsResult<ScalerUnit> {
    let elements = match value {
        DataObject::Structure(elements) if elements.len() == 2 => elements,
        other => {
            return Err(DlmsError::decode(
                context,
                format!(
                    "expected a structure of scaler and unit, got {}",
                    describe_value(other)
                ),
            ));
        }
    };
    let scaler = narrow(read_long_not_null(&elements[0], context)?, context)?;
    let unit = DlmsUnit::from_code(read_long_not_null(&elements[1], context)?);
    Ok(ScalerUnit { scaler, unit })
}

/// Apply a scaler/unit structure to a raw register value
///
/// Returns `None` when the raw value is null data.
pub fn read_scaled_value(
    raw_value: &DataObject,
    scaler_unit: &DataObject,
    context: &str,
) -> DlmsResult<Option<DlmsMeterValue>> {
    log::debug!("{}: raw value {}", context, describe_value(raw_value));
    let Some(raw) = read_long(raw_value, context)? else {
        return Ok(None);
    };
    let scaler_unit = read_scaler_unit(scaler_unit, context)?;
    Ok(Some(DlmsMeterValue {
        value: ScaledValue::new(raw, scaler_unit.scaler),
        unit: scaler_unit.unit,
    }))
}
