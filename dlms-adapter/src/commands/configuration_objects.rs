use crate::codec::{describe_attributes, describe_value, get_with_list, read_list};
use crate::command::{get_and_check, Command};
use crate::commands::association_objects::{
    read_object_list_element, AssociationLnListElement, CLASS_ID, OBIS_CODE, OBJECT_LIST_ATTRIBUTE,
};
use crate::device::Device;
use async_trait::async_trait;
use dlms_client::{AttributeAddress, DeviceSession};
use dlms_core::{AccessResultCode, DlmsResult};

/// Dump every readable attribute of every object in the current association
///
/// Meant for diagnosing a device. Attributes the device refuses to return
/// are listed with their result code rather than failing the dump.
pub struct RetrieveConfigurationObjectsCommand;

fn attribute_addresses(object: &AssociationLnListElement) -> Vec<AttributeAddress> {
    object
        .access_rights
        .iter()
        .flat_map(|rights| &rights.attribute_access)
        .map(|item| AttributeAddress::new(object.class_id, object.logical_name, item.attribute_id))
        .collect()
}

#[async_trait]
impl Command for RetrieveConfigurationObjectsCommand {
    type Input = ();
    type Output = String;

    fn name(&self) -> &'static str {
        "RetrieveConfigurationObjects"
    }

    async fn execute(&self, session: &mut DeviceSession, device: &mut Device, _input: ()) -> DlmsResult<String> {
        let object_list = AttributeAddress::new(CLASS_ID, OBIS_CODE, OBJECT_LIST_ATTRIBUTE);
        session.set_description(&format!(
            "RetrieveConfigurationObjects, retrieve attribute: {}",
            describe_attributes(std::slice::from_ref(&object_list))
        ));
        let results = get_and_check(session, device, "association object list", &[object_list]).await?;
        let objects = read_list(&results[0].result_data, "association object list")?
            .iter()
            .map(read_object_list_element)
            .collect::<DlmsResult<Vec<_>>>()?;

        let mut output = String::new();
        for object in &objects {
            let addresses = attribute_addresses(object);
            if addresses.is_empty() {
                continue;
            }
            session.set_description(&format!(
                "RetrieveConfigurationObjects, retrieve attributes: {}",
                describe_attributes(&addresses)
            ));
            let results = get_with_list(session, device, &addresses).await?;
            for (address, result) in addresses.iter().zip(&results) {
                if result.result_code == AccessResultCode::Success {
                    output.push_str(&format!("{} = {}\n", address, describe_value(&result.result_data)));
                } else {
                    log::debug!("Reading {} from {}: {}", address, device.device_identification, result.result_code);
                    output.push_str(&format!("{} : {}\n", address, result.result_code));
                }
            }
        }
        log::info!(
            "Retrieved {} configuration objects from {}",
            objects.len(),
            device.device_identification
        );
        Ok(output)
    }
}
