//! Data object types for DLMS/COSEM protocol

use crate::datatypes::bit_string::BitString;
use crate::datatypes::cosem_date::CosemDate;
use crate::datatypes::cosem_date_time::CosemDateTime;
use crate::error::{DlmsError, DlmsResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Value read from or written to a COSEM attribute, or passed to a method
///
/// Stores numbers, byte arrays, bit strings, lists or date/time formats.
/// Values are produced and consumed by the adapter codec only; they are never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DataObject {
    /// Null data
    Null,
    Boolean(bool),
    Integer8(i8),
    Integer16(i16),
    Integer32(i32),
    Integer64(i64),
    Unsigned8(u8),
    Unsigned16(u16),
    Unsigned32(u32),
    Unsigned64(u64),
    Float32(f32),
    Float64(f64),
    /// Enumeration (8-bit)
    Enumerate(u8),
    /// BCD (Binary Coded Decimal)
    Bcd(u8),
    OctetString(Vec<u8>),
    VisibleString(Vec<u8>),
    Utf8String(Vec<u8>),
    BitString(BitString),
    /// Array of DataObjects of the same type
    Array(Vec<DataObject>),
    /// Structure (ordered list of DataObjects)
    Structure(Vec<DataObject>),
    Date(CosemDate),
    DateTime(CosemDateTime),
}

/// Type enumeration for DataObject
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataObjectType {
    NullData,
    Array,
    Structure,
    Boolean,
    BitString,
    /// Integer 32-bit
    DoubleLong,
    /// Unsigned integer 32-bit
    DoubleLongUnsigned,
    OctetString,
    Utf8String,
    VisibleString,
    Bcd,
    /// Integer 8-bit
    Integer,
    /// Integer 16-bit
    LongInteger,
    /// Unsigned integer 8-bit
    Unsigned,
    /// Unsigned integer 16-bit
    LongUnsigned,
    /// Integer 64-bit
    Long64,
    /// Unsigned integer 64-bit
    Long64Unsigned,
    Enumerate,
    Float32,
    Float64,
    DateTime,
    Date,
}

impl DataObjectType {
    /// Protocol name of the type, e.g. `DOUBLE_LONG_UNSIGNED`
    pub fn name(&self) -> &'static str {
        match self {
            DataObjectType::NullData => "NULL_DATA",
            DataObjectType::Array => "ARRAY",
            DataObjectType::Structure => "STRUCTURE",
            DataObjectType::Boolean => "BOOLEAN",
            DataObjectType::BitString => "BIT_STRING",
            DataObjectType::DoubleLong => "DOUBLE_LONG",
            DataObjectType::DoubleLongUnsigned => "DOUBLE_LONG_UNSIGNED",
            DataObjectType::OctetString => "OCTET_STRING",
            DataObjectType::Utf8String => "UTF8_STRING",
            DataObjectType::VisibleString => "VISIBLE_STRING",
            DataObjectType::Bcd => "BCD",
            DataObjectType::Integer => "INTEGER",
            DataObjectType::LongInteger => "LONG_INTEGER",
            DataObjectType::Unsigned => "UNSIGNED",
            DataObjectType::LongUnsigned => "LONG_UNSIGNED",
            DataObjectType::Long64 => "LONG64",
            DataObjectType::Long64Unsigned => "LONG64_UNSIGNED",
            DataObjectType::Enumerate => "ENUMERATE",
            DataObjectType::Float32 => "FLOAT32",
            DataObjectType::Float64 => "FLOAT64",
            DataObjectType::DateTime => "DATE_TIME",
            DataObjectType::Date => "DATE",
        }
    }
}

impl fmt::Display for DataObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl DataObject {
    /// Get the type of this DataObject
    pub fn get_type(&self) -> DataObjectType {
        match self {
            DataObject::Null => DataObjectType::NullData,
            DataObject::Boolean(_) => DataObjectType::Boolean,
            DataObject::Integer8(_) => DataObjectType::Integer,
            DataObject::Integer16(_) => DataObjectType::LongInteger,
            DataObject::Integer32(_) => DataObjectType::DoubleLong,
            DataObject::Integer64(_) => DataObjectType::Long64,
            DataObject::Unsigned8(_) => DataObjectType::Unsigned,
            DataObject::Unsigned16(_) => DataObjectType::LongUnsigned,
            DataObject::Unsigned32(_) => DataObjectType::DoubleLongUnsigned,
            DataObject::Unsigned64(_) => DataObjectType::Long64Unsigned,
            DataObject::Float32(_) => DataObjectType::Float32,
            DataObject::Float64(_) => DataObjectType::Float64,
            DataObject::Enumerate(_) => DataObjectType::Enumerate,
            DataObject::Bcd(_) => DataObjectType::Bcd,
            DataObject::OctetString(_) => DataObjectType::OctetString,
            DataObject::VisibleString(_) => DataObjectType::VisibleString,
            DataObject::Utf8String(_) => DataObjectType::Utf8String,
            DataObject::BitString(_) => DataObjectType::BitString,
            DataObject::Array(_) => DataObjectType::Array,
            DataObject::Structure(_) => DataObjectType::Structure,
            DataObject::Date(_) => DataObjectType::Date,
            DataObject::DateTime(_) => DataObjectType::DateTime,
        }
    }

    /// Constructs an array data
    ///
    /// # Errors
    ///
    /// Returns an error if array elements have different types
    pub fn new_array(array: Vec<DataObject>) -> DlmsResult<Self> {
        if let Some(first) = array.first() {
            let array_type = first.get_type();
            for (index, sub) in array.iter().enumerate() {
                if sub.get_type() != array_type {
                    return Err(DlmsError::InvalidData(format!(
                        "Array is of type {}, but element at {} is of type {}",
                        array_type,
                        index,
                        sub.get_type()
                    )));
                }
            }
        }
        Ok(DataObject::Array(array))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, DataObject::Null)
    }

    /// Integer value of a number, `None` for floats and non-numbers
    ///
    /// Unsigned 64-bit values above `i64::MAX` also yield `None`.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            DataObject::Integer8(v) => Some(i64::from(*v)),
            DataObject::Integer16(v) => Some(i64::from(*v)),
            DataObject::Integer32(v) => Some(i64::from(*v)),
            DataObject::Integer64(v) => Some(*v),
            DataObject::Unsigned8(v) | DataObject::Enumerate(v) | DataObject::Bcd(v) => {
                Some(i64::from(*v))
            }
            DataObject::Unsigned16(v) => Some(i64::from(*v)),
            DataObject::Unsigned32(v) => Some(i64::from(*v)),
            DataObject::Unsigned64(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }

    /// Bytes of an octet, visible or UTF-8 string
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            DataObject::OctetString(s) | DataObject::VisibleString(s) | DataObject::Utf8String(s) => {
                Some(s)
            }
            _ => None,
        }
    }

    /// Elements of an array or structure
    pub fn as_list(&self) -> Option<&[DataObject]> {
        match self {
            DataObject::Array(list) | DataObject::Structure(list) => Some(list),
            _ => None,
        }
    }
}

/// One-line rendering: type name, then the value or the element count
impl fmt::Display for DataObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.get_type())?;
        if let Some(value) = self.as_i64() {
            return write!(f, " {}", value);
        }
        match self {
            DataObject::Null => Ok(()),
            DataObject::Boolean(b) => write!(f, " {}", b),
            DataObject::Unsigned64(u) => write!(f, " {}", u),
            DataObject::Float32(v) => write!(f, " {}", v),
            DataObject::Float64(v) => write!(f, " {}", v),
            DataObject::OctetString(bytes) => {
                let hex: Vec<String> = bytes.iter().map(|byte| format!("{:02X}", byte)).collect();
                write!(f, " [{}]", hex.join(" "))
            }
            DataObject::VisibleString(s) | DataObject::Utf8String(s) => {
                write!(f, " \"{}\"", String::from_utf8_lossy(s))
            }
            DataObject::BitString(bits) => write!(f, " {}", bits),
            DataObject::Array(list) | DataObject::Structure(list) => write!(f, " of {} element(s)", list.len()),
            DataObject::Date(date) => write!(f, " {}", date),
            DataObject::DateTime(date_time) => write!(f, " {}", date_time),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_object_null() {
        let obj = DataObject::Null;
        assert!(obj.is_null());
        assert_eq!(obj.get_type(), DataObjectType::NullData);
    }

    #[test]
    fn test_data_object_numbers() {
        assert_eq!(DataObject::Integer8(-3).as_i64(), Some(-3));
        assert_eq!(DataObject::Unsigned32(4_000_000_000).as_i64(), Some(4_000_000_000));
        assert_eq!(DataObject::Enumerate(2).as_i64(), Some(2));
        assert_eq!(DataObject::Unsigned64(u64::MAX).as_i64(), None);
        assert_eq!(DataObject::Float32(1.5).as_i64(), None);
    }

    #[test]
    fn test_data_object_array() {
        let arr = vec![
            DataObject::Integer32(1),
            DataObject::Integer32(2),
            DataObject::Integer32(3),
        ];
        let obj = DataObject::new_array(arr).unwrap();
        assert_eq!(obj.as_list().map(|list| list.len()), Some(3));
    }

    #[test]
    fn test_data_object_array_mixed_types() {
        let arr = vec![DataObject::Integer32(1), DataObject::Boolean(true)];
        assert!(DataObject::new_array(arr).is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(DataObject::Unsigned16(8).to_string(), "LONG_UNSIGNED 8");
        assert_eq!(DataObject::OctetString(vec![0, 0, 1, 0, 0, 255]).to_string(), "OCTET_STRING [00 00 01 00 00 FF]");
        assert_eq!(
            DataObject::Structure(vec![DataObject::Null, DataObject::Boolean(true)]).to_string(),
            "STRUCTURE of 2 element(s)"
        );
    }

    #[test]
    fn test_data_object_bytes() {
        let obj = DataObject::VisibleString(b"0612345678".to_vec());
        assert_eq!(obj.as_bytes(), Some(&b"0612345678"[..]));
        assert_eq!(DataObject::Boolean(true).as_bytes(), None);
    }
}
