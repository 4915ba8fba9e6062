//! COSEM value codec
//!
//! Converts [`DataObject`] values read from a device into domain types and
//! back. Every `read_*` function takes a context string naming what is read;
//! when the value does not have the expected shape the function fails with
//! `DlmsError::Decode` carrying that context and a rendering of the value.
//!
//! # Submodules
//!
//! - `date_time`: COSEM date-time and date conversion
//! - `describe`: diagnostic rendering of values and addresses
//! - `push`: push setup structures (send destination, windows, object definitions)
//! - `read`: batched read with emulation for devices without GET with list
//! - `scaled`: scaler/unit handling
//! - `unit`: DLMS unit table

pub mod date_time;
pub mod describe;
pub mod push;
pub mod read;
pub mod scaled;
pub mod unit;

pub use date_time::{
    as_data_object, as_data_object_at, as_data_object_date, read_cosem_date_time, read_date_time,
    to_date_time,
};
pub use describe::{describe_attributes, describe_method, describe_value};
pub use push::{
    read_list_of_object_definitions, read_list_of_window_elements, read_object_definition,
    read_send_destination_and_method, read_window_element, CosemObjectDefinition, MessageType,
    SendDestinationAndMethod, TransportServiceType, WindowElement,
};
pub use read::get_with_list;
pub use scaled::{read_scaled_value, read_scaler_unit, DlmsMeterValue, ScaledValue, ScalerUnit};
pub use unit::DlmsUnit;

use dlms_core::{BitString, DataObject, DlmsError, DlmsResult, ObisCode};

pub(crate) fn unexpected(context: &str, expected: &str, value: &DataObject) -> DlmsError {
    DlmsError::decode(
        context,
        format!("expected {}, got {}", expected, describe_value(value)),
    )
}

/// Read an integer, `None` for null data
pub fn read_long(value: &DataObject, context: &str) -> DlmsResult<Option<i64>> {
    if value.is_null() {
        return Ok(None);
    }
    value
        .as_i64()
        .map(Some)
        .ok_or_else(|| unexpected(context, "an integer", value))
}

/// Read an integer that must be present
pub fn read_long_not_null(value: &DataObject, context: &str) -> DlmsResult<i64> {
    read_long(value, context)?.ok_or_else(|| unexpected(context, "an integer", value))
}

/// Read any number, integers and floats alike
pub fn read_number(value: &DataObject, context: &str) -> DlmsResult<Option<f64>> {
    match value {
        DataObject::Null => Ok(None),
        DataObject::Float32(v) => Ok(Some(f64::from(*v))),
        DataObject::Float64(v) => Ok(Some(*v)),
        other => other
            .as_i64()
            .map(|v| Some(v as f64))
            .ok_or_else(|| unexpected(context, "a number", other)),
    }
}

/// Read a byte array (octet, visible or UTF-8 string), `None` for null data
pub fn read_byte_array(value: &DataObject, context: &str) -> DlmsResult<Option<Vec<u8>>> {
    if value.is_null() {
        return Ok(None);
    }
    value
        .as_bytes()
        .map(|bytes| Some(bytes.to_vec()))
        .ok_or_else(|| unexpected(context, "a byte array", value))
}

/// Read a text value, `None` for null data
pub fn read_string(value: &DataObject, context: &str) -> DlmsResult<Option<String>> {
    match read_byte_array(value, context)? {
        Some(bytes) => String::from_utf8(bytes)
            .map(Some)
            .map_err(|e| DlmsError::decode(context, format!("invalid text: {}", e))),
        None => Ok(None),
    }
}

/// Read the elements of an array or structure; null data reads as an empty list
pub fn read_list<'a>(value: &'a DataObject, context: &str) -> DlmsResult<&'a [DataObject]> {
    if value.is_null() {
        return Ok(&[]);
    }
    value
        .as_list()
        .ok_or_else(|| unexpected(context, "a list", value))
}

/// Read a structure with exactly `len` elements
pub fn read_structure<'a>(value: &'a DataObject, context: &str, len: usize) -> DlmsResult<&'a [DataObject]> {
    match value {
        DataObject::Structure(elements) if elements.len() == len => Ok(elements),
        other => Err(unexpected(
            context,
            &format!("a structure with {} elements", len),
            other,
        )),
    }
}

pub fn read_boolean(value: &DataObject, context: &str) -> DlmsResult<bool> {
    match value {
        DataObject::Boolean(b) => Ok(*b),
        other => Err(unexpected(context, "a boolean", other)),
    }
}

pub fn read_bit_string(value: &DataObject, context: &str) -> DlmsResult<BitString> {
    match value {
        DataObject::BitString(bits) => Ok(bits.clone()),
        other => Err(unexpected(context, "a bit string", other)),
    }
}

/// Read a 6-byte logical name
pub fn read_logical_name(value: &DataObject, context: &str) -> DlmsResult<ObisCode> {
    match value {
        DataObject::OctetString(bytes) if bytes.len() == ObisCode::LENGTH => {
            ObisCode::try_from(bytes.as_slice()).map_err(|e| DlmsError::decode(context, e.to_string()))
        }
        other => Err(unexpected(context, "a 6-byte logical name", other)),
    }
}

/// Narrow an integer to a smaller type, failing with a decode error
pub(crate) fn narrow<T: TryFrom<i64>>(value: i64, context: &str) -> DlmsResult<T> {
    T::try_from(value).map_err(|_| DlmsError::decode(context, format!("value {} out of range", value)))
}
