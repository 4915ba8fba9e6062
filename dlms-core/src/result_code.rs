//! Result codes returned by a device for GET/SET and ACTION requests

use serde::{Deserialize, Serialize};
use std::fmt;

/// Data-access-result of a GET or SET request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccessResultCode {
    Success,
    HardwareFault,
    TemporaryFailure,
    ReadWriteDenied,
    ObjectUndefined,
    ObjectClassInconsistent,
    ObjectUnavailable,
    TypeUnmatched,
    ScopeOfAccessViolated,
    DataBlockUnavailable,
    LongGetAborted,
    NoLongGetInProgress,
    LongSetAborted,
    NoLongSetInProgress,
    DataBlockNumberInvalid,
    OtherReason,
    /// Code not defined by the standard
    Unknown(u8),
}

impl AccessResultCode {
    pub fn from_u8(code: u8) -> Self {
        match code {
            0 => Self::Success,
            1 => Self::HardwareFault,
            2 => Self::TemporaryFailure,
            3 => Self::ReadWriteDenied,
            4 => Self::ObjectUndefined,
            9 => Self::ObjectClassInconsistent,
            11 => Self::ObjectUnavailable,
            12 => Self::TypeUnmatched,
            13 => Self::ScopeOfAccessViolated,
            14 => Self::DataBlockUnavailable,
            15 => Self::LongGetAborted,
            16 => Self::NoLongGetInProgress,
            17 => Self::LongSetAborted,
            18 => Self::NoLongSetInProgress,
            19 => Self::DataBlockNumberInvalid,
            250 => Self::OtherReason,
            other => Self::Unknown(other),
        }
    }

    pub fn to_u8(&self) -> u8 {
        match self {
            Self::Success => 0,
            Self::HardwareFault => 1,
            Self::TemporaryFailure => 2,
            Self::ReadWriteDenied => 3,
            Self::ObjectUndefined => 4,
            Self::ObjectClassInconsistent => 9,
            Self::ObjectUnavailable => 11,
            Self::TypeUnmatched => 12,
            Self::ScopeOfAccessViolated => 13,
            Self::DataBlockUnavailable => 14,
            Self::LongGetAborted => 15,
            Self::NoLongGetInProgress => 16,
            Self::LongSetAborted => 17,
            Self::NoLongSetInProgress => 18,
            Self::DataBlockNumberInvalid => 19,
            Self::OtherReason => 250,
            Self::Unknown(code) => *code,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

impl fmt::Display for AccessResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Success => "SUCCESS",
            Self::HardwareFault => "HARDWARE_FAULT",
            Self::TemporaryFailure => "TEMPORARY_FAILURE",
            Self::ReadWriteDenied => "READ_WRITE_DENIED",
            Self::ObjectUndefined => "OBJECT_UNDEFINED",
            Self::ObjectClassInconsistent => "OBJECT_CLASS_INCONSISTENT",
            Self::ObjectUnavailable => "OBJECT_UNAVAILABLE",
            Self::TypeUnmatched => "TYPE_UNMATCHED",
            Self::ScopeOfAccessViolated => "SCOPE_OF_ACCESS_VIOLATED",
            Self::DataBlockUnavailable => "DATA_BLOCK_UNAVAILABLE",
            Self::LongGetAborted => "LONG_GET_ABORTED",
            Self::NoLongGetInProgress => "NO_LONG_GET_IN_PROGRESS",
            Self::LongSetAborted => "LONG_SET_ABORTED",
            Self::NoLongSetInProgress => "NO_LONG_SET_IN_PROGRESS",
            Self::DataBlockNumberInvalid => "DATA_BLOCK_NUMBER_INVALID",
            Self::OtherReason => "OTHER_REASON",
            Self::Unknown(code) => return write!(f, "UNKNOWN({})", code),
        };
        f.write_str(name)
    }
}

/// Action-result of an ACTION request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MethodResultCode {
    Success,
    HardwareFault,
    TemporaryFailure,
    ReadWriteDenied,
    ObjectUndefined,
    ObjectClassInconsistent,
    ObjectUnavailable,
    TypeUnmatched,
    ScopeOfAccessViolated,
    DataBlockUnavailable,
    LongActionAborted,
    NoLongActionInProgress,
    OtherReason,
    /// Code not defined by the standard
    Unknown(u8),
}

impl MethodResultCode {
    pub fn from_u8(code: u8) -> Self {
        match code {
            0 => Self::Success,
            1 => Self::HardwareFault,
            2 => Self::TemporaryFailure,
            3 => Self::ReadWriteDenied,
            4 => Self::ObjectUndefined,
            9 => Self::ObjectClassInconsistent,
            11 => Self::ObjectUnavailable,
            12 => Self::TypeUnmatched,
            13 => Self::ScopeOfAccessViolated,
            14 => Self::DataBlockUnavailable,
            15 => Self::LongActionAborted,
            16 => Self::NoLongActionInProgress,
            250 => Self::OtherReason,
            other => Self::Unknown(other),
        }
    }

    pub fn to_u8(&self) -> u8 {
        match self {
            Self::Success => 0,
            Self::HardwareFault => 1,
            Self::TemporaryFailure => 2,
            Self::ReadWriteDenied => 3,
            Self::ObjectUndefined => 4,
            Self::ObjectClassInconsistent => 9,
            Self::ObjectUnavailable => 11,
            Self::TypeUnmatched => 12,
            Self::ScopeOfAccessViolated => 13,
            Self::DataBlockUnavailable => 14,
            Self::LongActionAborted => 15,
            Self::NoLongActionInProgress => 16,
            Self::OtherReason => 250,
            Self::Unknown(code) => *code,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

impl fmt::Display for MethodResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Success => "SUCCESS",
            Self::HardwareFault => "HARDWARE_FAULT",
            Self::TemporaryFailure => "TEMPORARY_FAILURE",
            Self::ReadWriteDenied => "READ_WRITE_DENIED",
            Self::ObjectUndefined => "OBJECT_UNDEFINED",
            Self::ObjectClassInconsistent => "OBJECT_CLASS_INCONSISTENT",
            Self::ObjectUnavailable => "OBJECT_UNAVAILABLE",
            Self::TypeUnmatched => "TYPE_UNMATCHED",
            Self::ScopeOfAccessViolated => "SCOPE_OF_ACCESS_VIOLATED",
            Self::DataBlockUnavailable => "DATA_BLOCK_UNAVAILABLE",
            Self::LongActionAborted => "LONG_ACTION_ABORTED",
            Self::NoLongActionInProgress => "NO_LONG_ACTION_IN_PROGRESS",
            Self::OtherReason => "OTHER_REASON",
            Self::Unknown(code) => return write!(f, "UNKNOWN({})", code),
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_result_code_mapping() {
        for code in [0u8, 1, 2, 3, 4, 9, 11, 12, 13, 14, 15, 16, 17, 18, 19, 250, 77] {
            assert_eq!(AccessResultCode::from_u8(code).to_u8(), code);
        }
        assert!(AccessResultCode::from_u8(0).is_success());
        assert_eq!(AccessResultCode::from_u8(77), AccessResultCode::Unknown(77));
    }

    #[test]
    fn test_method_result_code_display() {
        assert_eq!(MethodResultCode::from_u8(2).to_string(), "TEMPORARY_FAILURE");
        assert_eq!(MethodResultCode::from_u8(99).to_string(), "UNKNOWN(99)");
        assert!(!MethodResultCode::OtherReason.is_success());
    }
}
