use crate::error::{DlmsError, DlmsResult};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

const EXTENDED_FORMAT: &str =
    r"^(\d{1,3})-(\d{1,3}):(\d{1,3})\.(\d{1,3})\.(\d{1,3})(?:[.*](\d{1,3}))?$";

/// OBIS (Object Identification System) code, the logical name of a COSEM object
///
/// OBIS codes are 6-byte identifiers used in DLMS/COSEM to uniquely identify
/// objects in a logical device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObisCode {
    bytes: [u8; 6],
}

impl ObisCode {
    /// Length of a logical name in bytes
    pub const LENGTH: usize = 6;

    /// Create a new OBIS code from individual value groups
    ///
    /// # Arguments
    ///
    /// * `a` - Value group A (media)
    /// * `b` - Value group B (channel)
    /// * `c` - Value group C (physical quantity)
    /// * `d` - Value group D (processing)
    /// * `e` - Value group E (classification)
    /// * `f` - Value group F (historical)
    pub const fn new(a: u8, b: u8, c: u8, d: u8, e: u8, f: u8) -> Self {
        Self {
            bytes: [a, b, c, d, e, f],
        }
    }

    /// Parse an OBIS code from string format
    ///
    /// Supports formats like:
    /// - "1.0.1.8.0.255"
    /// - "1-0:1.8.0.255"
    /// - "1-0:1.8.0*255"
    /// - "1-0:1.8.0" (F defaults to 255)
    ///
    /// # Errors
    ///
    /// Returns `DlmsError::InvalidData` if the text matches neither format
    pub fn from_string(s: &str) -> DlmsResult<Self> {
        let s = s.trim();
        if let Ok(code) = Self::parse_dot_format(s) {
            return Ok(code);
        }
        if let Ok(code) = Self::parse_extended_format(s) {
            return Ok(code);
        }
        Err(DlmsError::InvalidData(format!("Invalid OBIS code format: {}", s)))
    }

    fn parse_dot_format(s: &str) -> DlmsResult<Self> {
        let parts: Vec<&str> = s.split('.').collect();
        if parts.len() != 6 {
            return Err(DlmsError::InvalidData(
                "Expected 6 dot-separated values".to_string(),
            ));
        }

        let mut bytes = [0u8; 6];
        for (i, part) in parts.iter().enumerate() {
            bytes[i] = parse_group(part)?;
        }
        Ok(Self { bytes })
    }

    fn parse_extended_format(s: &str) -> DlmsResult<Self> {
        let pattern = Regex::new(EXTENDED_FORMAT)
            .map_err(|e| DlmsError::InvalidData(format!("Invalid OBIS pattern: {}", e)))?;
        let captures = pattern
            .captures(s)
            .ok_or_else(|| DlmsError::InvalidData(format!("Not an extended OBIS code: {}", s)))?;

        let mut bytes = [255u8; 6];
        for (i, byte) in bytes.iter_mut().enumerate() {
            if let Some(group) = captures.get(i + 1) {
                *byte = parse_group(group.as_str())?;
            }
        }
        Ok(Self { bytes })
    }

    /// Get the OBIS code as a byte array
    pub fn as_bytes(&self) -> &[u8; 6] {
        &self.bytes
    }

    /// Get the OBIS code as a copied byte array
    pub fn to_bytes(&self) -> [u8; 6] {
        self.bytes
    }

    /// Render as "A-B:C.D.E.F"
    pub fn to_extended_string(&self) -> String {
        let [a, b, c, d, e, f] = self.bytes;
        format!("{}-{}:{}.{}.{}.{}", a, b, c, d, e, f)
    }

    pub fn a(&self) -> u8 {
        self.bytes[0]
    }

    pub fn b(&self) -> u8 {
        self.bytes[1]
    }

    pub fn c(&self) -> u8 {
        self.bytes[2]
    }

    pub fn d(&self) -> u8 {
        self.bytes[3]
    }

    pub fn e(&self) -> u8 {
        self.bytes[4]
    }

    pub fn f(&self) -> u8 {
        self.bytes[5]
    }
}

fn parse_group(part: &str) -> DlmsResult<u8> {
    part.parse::<u8>()
        .map_err(|_| DlmsError::InvalidData(format!("Invalid byte value: {}", part)))
}

impl TryFrom<&[u8]> for ObisCode {
    type Error = DlmsError;

    fn try_from(bytes: &[u8]) -> DlmsResult<Self> {
        let bytes: [u8; 6] = bytes.try_into().map_err(|_| {
            DlmsError::InvalidData(format!(
                "Logical name must be {} bytes, got {}",
                Self::LENGTH,
                bytes.len()
            ))
        })?;
        Ok(Self { bytes })
    }
}

impl fmt::Display for ObisCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}.{}.{}",
            self.bytes[0], self.bytes[1], self.bytes[2],
            self.bytes[3], self.bytes[4], self.bytes[5]
        )
    }
}
