//! Diagnostic rendering of values and addresses
//!
//! Byte arrays of 6 bytes are shown as logical names and byte arrays of 12
//! bytes as date-times. That guess is for readability only; nothing decides
//! behaviour on it.

use dlms_client::{AttributeAddress, MethodParameter};
use dlms_core::{BitString, CosemDateTime, DataObject};
use std::fmt::Write;

/// Render a value for error messages and session traces
pub fn describe_value(value: &DataObject) -> String {
    let mut out = String::new();
    write_value(&mut out, value, 0);
    out
}

fn write_value(out: &mut String, value: &DataObject, depth: usize) {
    let type_name = value.get_type().name();
    match value {
        DataObject::Null => out.push_str(type_name),
        DataObject::Array(elements) | DataObject::Structure(elements) => {
            let _ = write!(out, "{} ({} elements) [", type_name, elements.len());
            for element in elements {
                out.push('\n');
                out.push_str(&"  ".repeat(depth + 1));
                write_value(out, element, depth + 1);
            }
            if !elements.is_empty() {
                out.push('\n');
                out.push_str(&"  ".repeat(depth));
            }
            out.push(']');
        }
        DataObject::OctetString(bytes) | DataObject::VisibleString(bytes) | DataObject::Utf8String(bytes) => {
            let _ = write!(out, "{}: {}", type_name, describe_bytes(bytes));
        }
        DataObject::BitString(bits) => {
            let _ = write!(out, "{}: {}", type_name, describe_bit_string(bits));
        }
        DataObject::DateTime(date_time) => {
            let _ = write!(out, "{}: {}", type_name, describe_date_time(date_time));
        }
        DataObject::Date(date) => {
            let _ = write!(out, "{}: {}", type_name, date);
        }
        DataObject::Boolean(b) => {
            let _ = write!(out, "{}: {}", type_name, b);
        }
        DataObject::Float32(v) => {
            let _ = write!(out, "{}: {}", type_name, v);
        }
        DataObject::Float64(v) => {
            let _ = write!(out, "{}: {}", type_name, v);
        }
        DataObject::Unsigned64(v) => {
            let _ = write!(out, "{}: {}", type_name, v);
        }
        number => {
            let _ = write!(out, "{}: {}", type_name, number.as_i64().unwrap_or_default());
        }
    }
}

fn describe_bytes(bytes: &[u8]) -> String {
    match bytes.len() {
        6 => format!(
            "logical name: {}-{}:{}.{}.{}.{}",
            bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5]
        ),
        CosemDateTime::LENGTH => match CosemDateTime::decode(bytes) {
            Ok(date_time) => describe_date_time(&date_time),
            Err(_) => format!("bytes{:?}", bytes),
        },
        _ => format!("bytes{:?}", bytes),
    }
}

fn describe_date_time(date_time: &CosemDateTime) -> String {
    let deviation = date_time
        .deviation()
        .map(|deviation| deviation.to_string())
        .unwrap_or_else(|| "unspecified".to_string());
    format!(
        "year={}, month={}, day={}, weekday={}, hour={}, minute={}, second={}, hundredths={}, deviation={}, dst={}",
        date_time.year(),
        date_time.month(),
        date_time.day_of_month(),
        date_time.day_of_week(),
        date_time.hour(),
        date_time.minute(),
        date_time.second(),
        date_time.hundredths(),
        deviation,
        date_time.is_daylight_saving_active()
    )
}

fn describe_bit_string(bits: &BitString) -> String {
    let value = bits
        .as_bytes()
        .iter()
        .fold(0u128, |value, byte| (value << 8) | u128::from(*byte));
    format!(
        "number of bytes={}, value={}, bits={}",
        bits.as_bytes().len(),
        value,
        bits.to_binary_string()
    )
}

/// Render the addresses of a read or write, e.g. `{8,0-0:1.0.0.255,2}`
pub fn describe_attributes(addresses: &[AttributeAddress]) -> String {
    addresses
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Render the address of a method invocation, without its parameter
pub fn describe_method(method: &MethodParameter) -> String {
    method.to_string()
}
