use crate::bundle::{ActionRequest, ActionRequestKind, ActionResponse};
use crate::codec::{as_data_object_at, describe_attributes};
use crate::command::{check_access_result, unexpected_request, Command};
use crate::commands::{CLOCK_CLASS_ID, CLOCK_LOGICAL_NAME, CLOCK_TIME_ATTRIBUTE};
use crate::device::Device;
use async_trait::async_trait;
use chrono::Utc;
use dlms_client::{AttributeAddress, DeviceSession, SetParameter};
use dlms_core::{AccessResultCode, DlmsResult};
use serde::{Deserialize, Serialize};

/// Deviation (minutes from local time to UTC) and DST state to set the clock with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynchronizeTimeRequest {
    pub deviation: i16,
    pub dst: bool,
}

/// Set the device clock to the current time
pub struct SynchronizeTimeCommand;

#[async_trait]
impl Command for SynchronizeTimeCommand {
    type Input = SynchronizeTimeRequest;
    type Output = AccessResultCode;

    fn name(&self) -> &'static str {
        "SynchronizeTime"
    }

    fn request_kind(&self) -> Option<ActionRequestKind> {
        Some(ActionRequestKind::SynchronizeTime)
    }

    async fn execute(
        &self,
        session: &mut DeviceSession,
        _device: &mut Device,
        input: SynchronizeTimeRequest,
    ) -> DlmsResult<AccessResultCode> {
        let address = AttributeAddress::new(CLOCK_CLASS_ID, CLOCK_LOGICAL_NAME, CLOCK_TIME_ATTRIBUTE);
        let now = Utc::now();
        let time = as_data_object_at(&now, input.deviation, input.dst)?;

        session.set_description(&format!(
            "SynchronizeTime to {}, set attribute: {}",
            now.to_rfc3339(),
            describe_attributes(std::slice::from_ref(&address))
        ));
        session.set(&SetParameter::new(address, time)).await
    }

    fn from_bundle_request(&self, request: &ActionRequest) -> DlmsResult<SynchronizeTimeRequest> {
        match request {
            ActionRequest::SynchronizeTime(request) => Ok(*request),
            other => Err(unexpected_request(Command::name(self), other)),
        }
    }

    fn to_bundle_response(&self, output: AccessResultCode) -> DlmsResult<ActionResponse> {
        check_access_result(output, "synchronize time")?;
        Ok(ActionResponse::ok("Synchronizing time was successful"))
    }
}
