//! Object list of the current association (Association LN, interface class 15)
//!
//! Every element names an object by class, version and logical name, with the
//! access the association has to each attribute and method of it.

use crate::bundle::{ActionRequest, ActionRequestKind, ActionResponse};
use crate::codec::{describe_attributes, narrow, read_list, read_logical_name, read_long_not_null, read_structure};
use crate::command::{get_and_check, unexpected_request, Command};
use crate::device::Device;
use async_trait::async_trait;
use dlms_client::{AttributeAddress, DeviceSession};
use dlms_core::{DataObject, DlmsError, DlmsResult, ObisCode};
use serde::{Deserialize, Serialize};

pub(crate) const CLASS_ID: u16 = 15;
pub(crate) const OBIS_CODE: ObisCode = ObisCode::new(0, 0, 40, 0, 0, 255);
pub(crate) const OBJECT_LIST_ATTRIBUTE: i8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttributeAccessMode {
    NoAccess,
    ReadOnly,
    WriteOnly,
    ReadAndWrite,
    AuthenticatedReadOnly,
    AuthenticatedWriteOnly,
    AuthenticatedReadAndWrite,
}

impl AttributeAccessMode {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(AttributeAccessMode::NoAccess),
            1 => Some(AttributeAccessMode::ReadOnly),
            2 => Some(AttributeAccessMode::WriteOnly),
            3 => Some(AttributeAccessMode::ReadAndWrite),
            4 => Some(AttributeAccessMode::AuthenticatedReadOnly),
            5 => Some(AttributeAccessMode::AuthenticatedWriteOnly),
            6 => Some(AttributeAccessMode::AuthenticatedReadAndWrite),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MethodAccessMode {
    NoAccess,
    Access,
    AuthenticatedAccess,
}

impl MethodAccessMode {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(MethodAccessMode::NoAccess),
            1 => Some(MethodAccessMode::Access),
            2 => Some(MethodAccessMode::AuthenticatedAccess),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeAccessItem {
    pub attribute_id: i8,
    pub access_mode: AttributeAccessMode,
    /// Selective access selectors supported on the attribute
    pub access_selectors: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodAccessItem {
    pub method_id: i8,
    pub access_mode: MethodAccessMode,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessRight {
    pub attribute_access: Vec<AttributeAccessItem>,
    pub method_access: Vec<MethodAccessItem>,
}

/// One object visible in the current association
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssociationLnListElement {
    pub class_id: u16,
    pub version: u8,
    pub logical_name: ObisCode,
    pub access_rights: Option<AccessRight>,
}

fn read_attribute_access_item(value: &DataObject) -> DlmsResult<AttributeAccessItem> {
    let elements = read_structure(value, "attribute access item", 3)?;
    let attribute_id = narrow(read_long_not_null(&elements[0], "attribute id")?, "attribute id")?;
    let code = read_long_not_null(&elements[1], "attribute access mode")?;
    let access_mode = AttributeAccessMode::from_code(code)
        .ok_or_else(|| DlmsError::decode("attribute access mode", format!("unknown access mode {}", code)))?;
    let access_selectors = read_list(&elements[2], "access selectors")?
        .iter()
        .map(|selector| narrow(read_long_not_null(selector, "access selector")?, "access selector"))
        .collect::<DlmsResult<Vec<u8>>>()?;
    Ok(AttributeAccessItem {
        attribute_id,
        access_mode,
        access_selectors,
    })
}

fn read_method_access_item(value: &DataObject) -> DlmsResult<MethodAccessItem> {
    let elements = read_structure(value, "method access item", 2)?;
    let method_id = narrow(read_long_not_null(&elements[0], "method id")?, "method id")?;
    // Older devices report a boolean instead of the access mode
    let access_mode = match &elements[1] {
        DataObject::Boolean(true) => MethodAccessMode::Access,
        DataObject::Boolean(false) => MethodAccessMode::NoAccess,
        other => {
            let code = read_long_not_null(other, "method access mode")?;
            MethodAccessMode::from_code(code)
                .ok_or_else(|| DlmsError::decode("method access mode", format!("unknown access mode {}", code)))?
        }
    };
    Ok(MethodAccessItem { method_id, access_mode })
}

fn read_access_right(value: &DataObject) -> DlmsResult<Option<AccessRight>> {
    if value.is_null() {
        return Ok(None);
    }
    let elements = read_structure(value, "access rights", 2)?;
    let attribute_access = read_list(&elements[0], "attribute access")?
        .iter()
        .map(read_attribute_access_item)
        .collect::<DlmsResult<Vec<_>>>()?;
    let method_access = read_list(&elements[1], "method access")?
        .iter()
        .map(read_method_access_item)
        .collect::<DlmsResult<Vec<_>>>()?;
    Ok(Some(AccessRight {
        attribute_access,
        method_access,
    }))
}

pub(crate) fn read_object_list_element(value: &DataObject) -> DlmsResult<AssociationLnListElement> {
    let elements = read_structure(value, "object list element", 4)?;
    Ok(AssociationLnListElement {
        class_id: narrow(read_long_not_null(&elements[0], "class id")?, "class id")?,
        version: narrow(read_long_not_null(&elements[1], "version")?, "version")?,
        logical_name: read_logical_name(&elements[2], "logical name")?,
        access_rights: read_access_right(&elements[3])?,
    })
}

/// Read the objects of the current association with their access rights
pub struct GetAssociationLnObjectsCommand;

#[async_trait]
impl Command for GetAssociationLnObjectsCommand {
    type Input = ();
    type Output = Vec<AssociationLnListElement>;

    fn name(&self) -> &'static str {
        "GetAssociationLnObjects"
    }

    fn request_kind(&self) -> Option<ActionRequestKind> {
        Some(ActionRequestKind::GetAssociationLnObjects)
    }

    async fn execute(
        &self,
        session: &mut DeviceSession,
        device: &mut Device,
        _input: (),
    ) -> DlmsResult<Vec<AssociationLnListElement>> {
        let address = AttributeAddress::new(CLASS_ID, OBIS_CODE, OBJECT_LIST_ATTRIBUTE);
        session.set_description(&format!(
            "RetrieveAssociationLnObjects, retrieve attribute: {}",
            describe_attributes(std::slice::from_ref(&address))
        ));
        let results = get_and_check(session, device, "association LN objects", &[address]).await?;
        let objects = read_list(&results[0].result_data, "association LN object list")?
            .iter()
            .map(read_object_list_element)
            .collect::<DlmsResult<Vec<_>>>()?;
        log::debug!(
            "Association of {} lists {} objects",
            device.device_identification,
            objects.len()
        );
        Ok(objects)
    }

    fn from_bundle_request(&self, request: &ActionRequest) -> DlmsResult<()> {
        match request {
            ActionRequest::GetAssociationLnObjects => Ok(()),
            other => Err(unexpected_request(Command::name(self), other)),
        }
    }

    fn to_bundle_response(&self, output: Vec<AssociationLnListElement>) -> DlmsResult<ActionResponse> {
        Ok(ActionResponse::AssociationLnObjects(output))
    }
}
