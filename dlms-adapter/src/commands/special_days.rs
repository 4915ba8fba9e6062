use crate::bundle::{ActionRequest, ActionRequestKind, ActionResponse};
use crate::codec::describe_attributes;
use crate::command::{check_access_result, unexpected_request, Command};
use crate::device::Device;
use async_trait::async_trait;
use dlms_client::{AttributeAddress, DeviceSession, SetParameter};
use dlms_core::{AccessResultCode, CosemDate, DataObject, DlmsError, DlmsResult, ObisCode};
use serde::{Deserialize, Serialize};

const CLASS_ID: u16 = 11;
const OBIS_CODE: ObisCode = ObisCode::new(0, 0, 11, 0, 0, 255);
const ATTRIBUTE_ID: i8 = 2;

/// A date with the day profile to use on it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialDay {
    /// May carry wildcards, e.g. a year of 0xffff for every year
    pub date: CosemDate,
    pub day_id: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialDaysRequest {
    pub special_days: Vec<SpecialDay>,
}

/// Replace the special days table
pub struct SetSpecialDaysCommand;

fn special_days_table(special_days: &[SpecialDay]) -> DlmsResult<DataObject> {
    let entries = special_days
        .iter()
        .enumerate()
        .map(|(index, special_day)| {
            let index = u16::try_from(index)
                .map_err(|_| DlmsError::Configuration(format!("Too many special days: {}", special_days.len())))?;
            Ok(DataObject::Structure(vec![
                DataObject::Unsigned16(index),
                DataObject::Date(special_day.date),
                DataObject::Unsigned8(special_day.day_id),
            ]))
        })
        .collect::<DlmsResult<Vec<_>>>()?;
    DataObject::new_array(entries)
}

#[async_trait]
impl Command for SetSpecialDaysCommand {
    type Input = Vec<SpecialDay>;
    type Output = AccessResultCode;

    fn name(&self) -> &'static str {
        "SetSpecialDays"
    }

    fn request_kind(&self) -> Option<ActionRequestKind> {
        Some(ActionRequestKind::SetSpecialDays)
    }

    async fn execute(
        &self,
        session: &mut DeviceSession,
        _device: &mut Device,
        special_days: Vec<SpecialDay>,
    ) -> DlmsResult<AccessResultCode> {
        let address = AttributeAddress::new(CLASS_ID, OBIS_CODE, ATTRIBUTE_ID);
        let entries = special_days_table(&special_days)?;

        let values = if special_days.is_empty() {
            String::new()
        } else {
            let values: Vec<String> = special_days
                .iter()
                .map(|special_day| format!("{} => {}", special_day.day_id, special_day.date))
                .collect();
            format!(", values [{}]", values.join(", "))
        };
        session.set_description(&format!(
            "SetSpecialDays{}, set attribute: {}",
            values,
            describe_attributes(std::slice::from_ref(&address))
        ));

        session.set(&SetParameter::new(address, entries)).await
    }

    fn from_bundle_request(&self, request: &ActionRequest) -> DlmsResult<Vec<SpecialDay>> {
        match request {
            ActionRequest::SetSpecialDays(request) => Ok(request.special_days.clone()),
            other => Err(unexpected_request(Command::name(self), other)),
        }
    }

    fn to_bundle_response(&self, output: AccessResultCode) -> DlmsResult<ActionResponse> {
        check_access_result(output, "set special days")?;
        Ok(ActionResponse::ok("Set special days was successful"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::BundleCommand;
    use crate::test_support::FakeConnection;

    #[tokio::test]
    async fn test_entries_are_numbered_in_order() {
        let christmas = CosemDate::new(0xffff, 12, 25, 0xff).unwrap();
        let kings_day = CosemDate::new(2024, 4, 27, 6).unwrap();
        let request = ActionRequest::SetSpecialDays(SpecialDaysRequest {
            special_days: vec![
                SpecialDay { date: christmas, day_id: 2 },
                SpecialDay { date: kings_day, day_id: 3 },
            ],
        });
        let connection = FakeConnection::new();
        let mut device = Device::new("E0026000059790003");
        let response = SetSpecialDaysCommand
            .execute_bundle_action(&mut connection.session(), &mut device, &request)
            .await
            .unwrap();
        assert_eq!(response, ActionResponse::ok("Set special days was successful"));

        let writes = connection.writes();
        assert_eq!(writes.len(), 1);
        assert_eq!(
            writes[0].data,
            DataObject::Array(vec![
                DataObject::Structure(vec![
                    DataObject::Unsigned16(0),
                    DataObject::Date(christmas),
                    DataObject::Unsigned8(2),
                ]),
                DataObject::Structure(vec![
                    DataObject::Unsigned16(1),
                    DataObject::Date(kings_day),
                    DataObject::Unsigned8(3),
                ]),
            ])
        );
    }

    #[tokio::test]
    async fn test_empty_table_clears_special_days() {
        let connection = FakeConnection::new();
        let mut device = Device::new("E0026000059790003");
        let code = SetSpecialDaysCommand
            .execute(&mut connection.session(), &mut device, Vec::new())
            .await
            .unwrap();
        assert_eq!(code, AccessResultCode::Success);
        assert_eq!(connection.writes()[0].data, DataObject::Array(Vec::new()));
    }
}
