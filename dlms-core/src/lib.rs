//! Core types for the DLMS/COSEM protocol adapter
//!
//! This crate provides the value model exchanged with devices, the error
//! taxonomy shared by every other crate, OBIS codes and device result codes.

pub mod datatypes;
pub mod error;
pub mod obis_code;
pub mod result_code;

pub use datatypes::{BitString, ClockStatus, CosemDate, CosemDateTime, DataObject, DataObjectType};
pub use error::{DlmsError, DlmsResult};
pub use obis_code::ObisCode;
pub use result_code::{AccessResultCode, MethodResultCode};
