//! DLMS physical units (unit enumeration of the scaler/unit structure)

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unit of a register value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DlmsUnit {
    Year,
    Month,
    Week,
    Day,
    Hour,
    Minute,
    Second,
    Degree,
    DegreeCelsius,
    Currency,
    Metre,
    MetrePerSecond,
    CubicMetre,
    CubicMetreCorrected,
    CubicMetrePerHour,
    CubicMetreCorrectedPerHour,
    CubicMetrePerDay,
    CubicMetreCorrectedPerDay,
    Litre,
    Kilogram,
    Newton,
    NewtonMetre,
    Pascal,
    Bar,
    Joule,
    JoulePerHour,
    Watt,
    VoltAmpere,
    Var,
    WattHour,
    VoltAmpereHour,
    VarHour,
    Ampere,
    Coulomb,
    Volt,
    VoltPerMetre,
    Farad,
    Ohm,
    OhmSquareMetrePerMetre,
    Weber,
    Tesla,
    AmperePerMetre,
    Henry,
    Hertz,
    ActiveEnergyMeterConstant,
    ReactiveEnergyMeterConstant,
    ApparentEnergyMeterConstant,
    VoltSquaredHour,
    AmpereSquaredHour,
    KilogramPerSecond,
    Siemens,
    Kelvin,
    VoltSquaredHourMeterConstant,
    AmpereSquaredHourMeterConstant,
    VolumeMeterConstant,
    Percentage,
    AmpereHour,
    EnergyPerVolume,
    CalorificValue,
    MolePercent,
    Reserved,
    Other,
    Count,
    /// Code not in the table
    Undefined,
}

const UNITS: &[(u8, DlmsUnit, &str)] = &[
    (1, DlmsUnit::Year, "a"),
    (2, DlmsUnit::Month, "mo"),
    (3, DlmsUnit::Week, "wk"),
    (4, DlmsUnit::Day, "d"),
    (5, DlmsUnit::Hour, "h"),
    (6, DlmsUnit::Minute, "min"),
    (7, DlmsUnit::Second, "s"),
    (8, DlmsUnit::Degree, "°"),
    (9, DlmsUnit::DegreeCelsius, "°C"),
    (10, DlmsUnit::Currency, "currency"),
    (11, DlmsUnit::Metre, "m"),
    (12, DlmsUnit::MetrePerSecond, "m/s"),
    (13, DlmsUnit::CubicMetre, "m³"),
    (14, DlmsUnit::CubicMetreCorrected, "m³ corr"),
    (15, DlmsUnit::CubicMetrePerHour, "m³/h"),
    (16, DlmsUnit::CubicMetreCorrectedPerHour, "m³/h corr"),
    (17, DlmsUnit::CubicMetrePerDay, "m³/d"),
    (18, DlmsUnit::CubicMetreCorrectedPerDay, "m³/d corr"),
    (19, DlmsUnit::Litre, "l"),
    (20, DlmsUnit::Kilogram, "kg"),
    (21, DlmsUnit::Newton, "N"),
    (22, DlmsUnit::NewtonMetre, "Nm"),
    (23, DlmsUnit::Pascal, "Pa"),
    (24, DlmsUnit::Bar, "bar"),
    (25, DlmsUnit::Joule, "J"),
    (26, DlmsUnit::JoulePerHour, "J/h"),
    (27, DlmsUnit::Watt, "W"),
    (28, DlmsUnit::VoltAmpere, "VA"),
    (29, DlmsUnit::Var, "var"),
    (30, DlmsUnit::WattHour, "Wh"),
    (31, DlmsUnit::VoltAmpereHour, "VAh"),
    (32, DlmsUnit::VarHour, "varh"),
    (33, DlmsUnit::Ampere, "A"),
    (34, DlmsUnit::Coulomb, "C"),
    (35, DlmsUnit::Volt, "V"),
    (36, DlmsUnit::VoltPerMetre, "V/m"),
    (37, DlmsUnit::Farad, "F"),
    (38, DlmsUnit::Ohm, "Ω"),
    (39, DlmsUnit::OhmSquareMetrePerMetre, "Ωm²/m"),
    (40, DlmsUnit::Weber, "Wb"),
    (41, DlmsUnit::Tesla, "T"),
    (42, DlmsUnit::AmperePerMetre, "A/m"),
    (43, DlmsUnit::Henry, "H"),
    (44, DlmsUnit::Hertz, "Hz"),
    (45, DlmsUnit::ActiveEnergyMeterConstant, "1/(Wh)"),
    (46, DlmsUnit::ReactiveEnergyMeterConstant, "1/(varh)"),
    (47, DlmsUnit::ApparentEnergyMeterConstant, "1/(VAh)"),
    (48, DlmsUnit::VoltSquaredHour, "V²h"),
    (49, DlmsUnit::AmpereSquaredHour, "A²h"),
    (50, DlmsUnit::KilogramPerSecond, "kg/s"),
    (51, DlmsUnit::Siemens, "S"),
    (52, DlmsUnit::Kelvin, "K"),
    (53, DlmsUnit::VoltSquaredHourMeterConstant, "1/(V²h)"),
    (54, DlmsUnit::AmpereSquaredHourMeterConstant, "1/(A²h)"),
    (55, DlmsUnit::VolumeMeterConstant, "1/m³"),
    (56, DlmsUnit::Percentage, "%"),
    (57, DlmsUnit::AmpereHour, "Ah"),
    (60, DlmsUnit::EnergyPerVolume, "Wh/m³"),
    (61, DlmsUnit::CalorificValue, "J/m³"),
    (62, DlmsUnit::MolePercent, "mol%"),
    (253, DlmsUnit::Reserved, "reserved"),
    (254, DlmsUnit::Other, "other"),
    (255, DlmsUnit::Count, "count"),
];

impl DlmsUnit {
    pub fn from_code(code: i64) -> Self {
        UNITS
            .iter()
            .find(|(unit_code, _, _)| i64::from(*unit_code) == code)
            .map(|(_, unit, _)| *unit)
            .unwrap_or(DlmsUnit::Undefined)
    }

    /// Unit code, `None` for [`DlmsUnit::Undefined`]
    pub fn code(&self) -> Option<u8> {
        UNITS
            .iter()
            .find(|(_, unit, _)| unit == self)
            .map(|(code, _, _)| *code)
    }

    pub fn symbol(&self) -> &'static str {
        UNITS
            .iter()
            .find(|(_, unit, _)| unit == self)
            .map(|(_, _, symbol)| *symbol)
            .unwrap_or("undefined")
    }
}

impl fmt::Display for DlmsUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_units() {
        assert_eq!(DlmsUnit::from_code(30), DlmsUnit::WattHour);
        assert_eq!(DlmsUnit::from_code(13), DlmsUnit::CubicMetre);
        assert_eq!(DlmsUnit::from_code(255), DlmsUnit::Count);
        assert_eq!(DlmsUnit::WattHour.symbol(), "Wh");
        assert_eq!(DlmsUnit::WattHour.code(), Some(30));
    }

    #[test]
    fn test_unknown_codes_are_undefined() {
        for code in [0, 58, 59, 63, 252, 256, -1] {
            assert_eq!(DlmsUnit::from_code(code), DlmsUnit::Undefined);
        }
        assert_eq!(DlmsUnit::Undefined.code(), None);
    }

    #[test]
    fn test_codes_are_unique() {
        for (code, unit, _) in UNITS {
            assert_eq!(DlmsUnit::from_code(i64::from(*code)), *unit);
        }
    }
}
