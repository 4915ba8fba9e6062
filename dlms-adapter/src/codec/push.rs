//! Structures of the push setup interface class (class id 40)

use crate::codec::date_time::read_cosem_date_time;
use crate::codec::{narrow, read_list, read_logical_name, read_long_not_null, read_string, read_structure, unexpected};
use dlms_core::{CosemDateTime, DataObject, DlmsError, DlmsResult, ObisCode};
use serde::{Deserialize, Serialize};

/// Transport service of a push destination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransportServiceType {
    Tcp,
    Udp,
    Ftp,
    Smtp,
    Sms,
    Hdlc,
    MBus,
    ZigBee,
    /// Codes 200 to 255
    ManufacturerSpecific(u8),
}

impl TransportServiceType {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Tcp),
            1 => Some(Self::Udp),
            2 => Some(Self::Ftp),
            3 => Some(Self::Smtp),
            4 => Some(Self::Sms),
            5 => Some(Self::Hdlc),
            6 => Some(Self::MBus),
            7 => Some(Self::ZigBee),
            200..=255 => Some(Self::ManufacturerSpecific(code as u8)),
            _ => None,
        }
    }

    pub fn code(&self) -> u8 {
        match self {
            Self::Tcp => 0,
            Self::Udp => 1,
            Self::Ftp => 2,
            Self::Smtp => 3,
            Self::Sms => 4,
            Self::Hdlc => 5,
            Self::MBus => 6,
            Self::ZigBee => 7,
            Self::ManufacturerSpecific(code) => *code,
        }
    }
}

/// Encoding of pushed messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageType {
    AXdrEncodedXDlmsApdu,
    XmlEncodedXDlmsApdu,
    /// Codes 128 to 255
    ManufacturerSpecific(u8),
}

impl MessageType {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::AXdrEncodedXDlmsApdu),
            1 => Some(Self::XmlEncodedXDlmsApdu),
            128..=255 => Some(Self::ManufacturerSpecific(code as u8)),
            _ => None,
        }
    }

    pub fn code(&self) -> u8 {
        match self {
            Self::AXdrEncodedXDlmsApdu => 0,
            Self::XmlEncodedXDlmsApdu => 1,
            Self::ManufacturerSpecific(code) => *code,
        }
    }
}

/// Attribute 3 of a push setup: where and how to push
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendDestinationAndMethod {
    pub transport_service: TransportServiceType,
    pub destination: String,
    pub message: MessageType,
}

impl SendDestinationAndMethod {
    pub fn to_data_object(&self) -> DataObject {
        DataObject::Structure(vec![
            DataObject::Enumerate(self.transport_service.code()),
            DataObject::OctetString(self.destination.as_bytes().to_vec()),
            DataObject::Enumerate(self.message.code()),
        ])
    }
}

/// Communication window: start and end, usually with wildcard fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowElement {
    pub start: CosemDateTime,
    pub end: CosemDateTime,
}

impl WindowElement {
    pub fn to_data_object(&self) -> DataObject {
        DataObject::Structure(vec![
            DataObject::OctetString(self.start.encode()),
            DataObject::OctetString(self.end.encode()),
        ])
    }
}

/// Reference to one attribute of one object, as in a push object list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CosemObjectDefinition {
    pub class_id: u16,
    pub logical_name: ObisCode,
    pub attribute_index: i8,
    /// 0 for the whole attribute, otherwise the element of an array or structure
    pub data_index: u16,
}

pub fn read_send_destination_and_method(value: &DataObject, context: &str) -> DlmsResult<SendDestinationAndMethod> {
    let elements = read_structure(value, context, 3)?;

    let transport_context = format!("Transport Service from {}", context);
    let transport_code = read_long_not_null(&elements[0], &transport_context)?;
    let transport_service = TransportServiceType::from_code(transport_code).ok_or_else(|| {
        DlmsError::decode(
            transport_context.as_str(),
            format!("unknown transport service type {}", transport_code),
        )
    })?;

    let destination_context = format!("Destination from {}", context);
    let destination = read_string(&elements[1], &destination_context)?
        .ok_or_else(|| unexpected(&destination_context, "a destination", &elements[1]))?;

    let message_context = format!("Message from {}", context);
    let message_code = read_long_not_null(&elements[2], &message_context)?;
    let message = MessageType::from_code(message_code).ok_or_else(|| {
        DlmsError::decode(message_context.as_str(), format!("unknown message type {}", message_code))
    })?;

    Ok(SendDestinationAndMethod {
        transport_service,
        destination,
        message,
    })
}

pub fn read_window_element(value: &DataObject, context: &str) -> DlmsResult<WindowElement> {
    let elements = read_structure(value, context, 2)?;
    let start_context = format!("Start Time from {}", context);
    let end_context = format!("End Time from {}", context);
    let start = read_cosem_date_time(&elements[0], &start_context)?
        .ok_or_else(|| unexpected(&start_context, "a date-time", &elements[0]))?;
    let end = read_cosem_date_time(&elements[1], &end_context)?
        .ok_or_else(|| unexpected(&end_context, "a date-time", &elements[1]))?;
    Ok(WindowElement { start, end })
}

pub fn read_list_of_window_elements(value: &DataObject, context: &str) -> DlmsResult<Vec<WindowElement>> {
    let element_context = format!("Window Element from {}", context);
    read_list(value, context)?
        .iter()
        .map(|element| read_window_element(element, &element_context))
        .collect()
}

/// Read `{class_id, logical_name, attribute_index, data_index}`
pub fn read_object_definition(value: &DataObject, context: &str) -> DlmsResult<CosemObjectDefinition> {
    let elements = read_structure(value, context, 4)?;

    let class_context = format!("Class ID from {}", context);
    let attribute_context = format!("Attribute Index from {}", context);
    let data_context = format!("Data Index from {}", context);

    Ok(CosemObjectDefinition {
        class_id: narrow(read_long_not_null(&elements[0], &class_context)?, &class_context)?,
        logical_name: read_logical_name(&elements[1], &format!("Logical Name from {}", context))?,
        attribute_index: narrow(read_long_not_null(&elements[2], &attribute_context)?, &attribute_context)?,
        data_index: narrow(read_long_not_null(&elements[3], &data_context)?, &data_context)?,
    })
}

pub fn read_list_of_object_definitions(value: &DataObject, context: &str) -> DlmsResult<Vec<CosemObjectDefinition>> {
    let element_context = format!("Object Definition from {}", context);
    read_list(value, context)?
        .iter()
        .map(|element| read_object_definition(element, &element_context))
        .collect()
}
