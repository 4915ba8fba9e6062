//! Batched attribute reads
//!
//! Devices that support GET with list receive one request for all
//! addresses. For other devices the same addresses are read one by one.
//! Both paths return one [`GetResult`] per address, in request order.

use crate::device::Device;
use dlms_client::{AttributeAddress, DeviceSession, GetResult};
use dlms_core::{DlmsError, DlmsResult};

/// Read `addresses` in one request when `device` supports it, else one by one
///
/// # Errors
///
/// Connection errors are returned unchanged. A device answering with a
/// different number of results than requested is a protocol error.
pub async fn get_with_list(
    session: &mut DeviceSession,
    device: &Device,
    addresses: &[AttributeAddress],
) -> DlmsResult<Vec<GetResult>> {
    let results = if device.supports_batched_read {
        session.get_with_list(addresses).await?
    } else {
        log::debug!(
            "Device {} does not support GET with list, reading {} attributes one by one",
            device.device_identification,
            addresses.len()
        );
        let mut results = Vec::with_capacity(addresses.len());
        for address in addresses {
            results.push(session.get(address).await?);
        }
        results
    };

    if results.len() != addresses.len() {
        return Err(DlmsError::Protocol(format!(
            "Expected {} results reading with list, got {}",
            addresses.len(),
            results.len()
        )));
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeConnection;
    use dlms_core::{DataObject, ObisCode};

    fn addresses() -> Vec<AttributeAddress> {
        (2..=4)
            .map(|attribute_id| AttributeAddress::new(40, ObisCode::new(0, 1, 25, 9, 0, 255), attribute_id))
            .collect()
    }

    fn answer(connection: &FakeConnection) {
        for (index, address) in addresses().iter().enumerate() {
            connection.respond(address, DataObject::Unsigned8(index as u8));
        }
    }

    #[tokio::test]
    async fn test_emulated_read_matches_batched_read() {
        let batched_connection = FakeConnection::new();
        answer(&batched_connection);
        let mut batched_device = Device::new("E0026000059790003");
        batched_device.supports_batched_read = true;
        let mut session = batched_connection.session();
        let batched = get_with_list(&mut session, &batched_device, &addresses())
            .await
            .unwrap();

        let single_connection = FakeConnection::new();
        answer(&single_connection);
        let single_device = Device::new("E0026000059790003");
        let mut session = single_connection.session();
        let emulated = get_with_list(&mut session, &single_device, &addresses())
            .await
            .unwrap();

        assert_eq!(emulated.len(), 3);
        assert_eq!(batched, emulated);
        assert_eq!(
            emulated
                .iter()
                .map(|result| result.result_data.clone())
                .collect::<Vec<_>>(),
            vec![
                DataObject::Unsigned8(0),
                DataObject::Unsigned8(1),
                DataObject::Unsigned8(2)
            ]
        );
        assert_eq!(batched_connection.batched_reads(), 1);
        assert_eq!(single_connection.batched_reads(), 0);
        assert_eq!(single_connection.reads().len(), 3);
    }

    #[tokio::test]
    async fn test_wrong_result_count_is_protocol_error() {
        let connection = FakeConnection::new();
        connection.truncate_batched_results(2);
        let mut device = Device::new("E0026000059790003");
        device.supports_batched_read = true;
        let mut session = connection.session();
        let error = get_with_list(&mut session, &device, &addresses())
            .await
            .unwrap_err();
        assert!(error.is_protocol_error());
    }
}
