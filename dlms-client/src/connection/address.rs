//! Addressing primitives for requests sent over a device session
//!
//! COSEM objects are addressed by class id and logical name; an attribute or
//! method of that object is selected by its index. Reads of array-valued
//! attributes may carry a selective access description.

use dlms_core::{AccessResultCode, DataObject, MethodResultCode, ObisCode};
use std::fmt;

/// Selective access: restricts which entries of an array attribute are returned
#[derive(Debug, Clone, PartialEq)]
pub struct SelectiveAccessDescription {
    /// Access selector (1 = range descriptor, 2 = entry descriptor)
    pub access_selector: u8,
    /// Selector-specific parameter
    pub access_parameter: DataObject,
}

impl SelectiveAccessDescription {
    pub fn new(access_selector: u8, access_parameter: DataObject) -> Self {
        Self {
            access_selector,
            access_parameter,
        }
    }
}

/// Address of one attribute of a COSEM object
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeAddress {
    pub class_id: u16,
    pub instance_id: ObisCode,
    pub attribute_id: i8,
    pub access_selection: Option<SelectiveAccessDescription>,
}

impl AttributeAddress {
    pub fn new(class_id: u16, instance_id: ObisCode, attribute_id: i8) -> Self {
        Self {
            class_id,
            instance_id,
            attribute_id,
            access_selection: None,
        }
    }

    /// This address restricted by `access_selection`
    pub fn with_selective_access(mut self, access_selection: SelectiveAccessDescription) -> Self {
        self.access_selection = Some(access_selection);
        self
    }
}

impl fmt::Display for AttributeAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{{},{},{}",
            self.class_id,
            self.instance_id.to_extended_string(),
            self.attribute_id
        )?;
        if let Some(selection) = &self.access_selection {
            write!(f, ", selector {}", selection.access_selector)?;
        }
        write!(f, "}}")
    }
}

/// Attribute address plus the value to write
#[derive(Debug, Clone, PartialEq)]
pub struct SetParameter {
    pub attribute_address: AttributeAddress,
    pub data: DataObject,
}

impl SetParameter {
    pub fn new(attribute_address: AttributeAddress, data: DataObject) -> Self {
        Self {
            attribute_address,
            data,
        }
    }
}

impl fmt::Display for SetParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.attribute_address, self.data)
    }
}

/// Address of a COSEM method plus its optional parameter
#[derive(Debug, Clone, PartialEq)]
pub struct MethodParameter {
    pub class_id: u16,
    pub instance_id: ObisCode,
    pub method_id: i8,
    pub parameter: Option<DataObject>,
}

impl MethodParameter {
    pub fn new(class_id: u16, instance_id: ObisCode, method_id: i8, parameter: Option<DataObject>) -> Self {
        Self {
            class_id,
            instance_id,
            method_id,
            parameter,
        }
    }
}

impl fmt::Display for MethodParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{{},{},{}}}",
            self.class_id,
            self.instance_id.to_extended_string(),
            self.method_id
        )
    }
}

/// Outcome of reading one attribute
#[derive(Debug, Clone, PartialEq)]
pub struct GetResult {
    pub result_code: AccessResultCode,
    /// Value read, `DataObject::Null` when the read failed
    pub result_data: DataObject,
}

impl GetResult {
    pub fn new(result_code: AccessResultCode, result_data: DataObject) -> Self {
        Self {
            result_code,
            result_data,
        }
    }

    pub fn success(result_data: DataObject) -> Self {
        Self::new(AccessResultCode::Success, result_data)
    }

    pub fn failure(result_code: AccessResultCode) -> Self {
        Self::new(result_code, DataObject::Null)
    }
}

/// Outcome of invoking a method
#[derive(Debug, Clone, PartialEq)]
pub struct MethodResult {
    pub result_code: MethodResultCode,
    pub return_data: Option<DataObject>,
}

impl MethodResult {
    pub fn new(result_code: MethodResultCode, return_data: Option<DataObject>) -> Self {
        Self {
            result_code,
            return_data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_address_display() {
        let address = AttributeAddress::new(8, ObisCode::new(0, 0, 1, 0, 0, 255), 2);
        assert_eq!(address.to_string(), "{8,0-0:1.0.0.255,2}");

        let selective = AttributeAddress::new(7, ObisCode::new(0, 0, 99, 98, 0, 255), 2)
            .with_selective_access(SelectiveAccessDescription::new(1, DataObject::Null));
        assert_eq!(selective.to_string(), "{7,0-0:99.98.0.255,2, selector 1}");
    }

    #[test]
    fn test_method_parameter_display() {
        let method = MethodParameter::new(20, ObisCode::new(0, 0, 13, 0, 0, 255), 1, None);
        assert_eq!(method.to_string(), "{20,0-0:13.0.0.255,1}");
    }

    #[test]
    fn test_get_result_failure_has_no_data() {
        let result = GetResult::failure(AccessResultCode::ObjectUndefined);
        assert!(result.result_data.is_null());
        assert!(!result.result_code.is_success());
    }
}
