//! Command execution abstraction
//!
//! Every operation against a device is a [`Command`]: a value with a typed
//! input and output, executed over an open [`DeviceSession`]. Commands that
//! can run inside a bundle also translate between the bundle envelopes
//! ([`ActionRequest`], [`ActionResponse`]) and their typed input and output;
//! the defaults reject that translation, so standalone-only commands only
//! implement `execute`.
//!
//! [`BundleCommand`] is the object-safe view of a command used by the
//! registry and the bundle engine. Every `Command` is a `BundleCommand`.

pub mod registry;

pub use registry::CommandRegistry;

use crate::bundle::{ActionRequest, ActionRequestKind, ActionResponse};
use crate::codec::get_with_list;
use crate::device::Device;
use async_trait::async_trait;
use dlms_client::{AttributeAddress, DeviceSession, GetResult, MethodResult};
use dlms_core::{AccessResultCode, DlmsError, DlmsResult};

/// One operation against a device
#[async_trait]
pub trait Command: Send + Sync {
    /// Typed input, `()` for commands without input
    type Input: Send + 'static;
    type Output: Send + 'static;

    /// Name used in logs and fault messages
    fn name(&self) -> &'static str;

    /// Bundle request variant handled by this command, `None` when standalone only
    fn request_kind(&self) -> Option<ActionRequestKind> {
        None
    }

    /// Run the command
    ///
    /// # Errors
    ///
    /// Connection errors (`DlmsError::is_connection_error`) mean the session
    /// is lost. Any other error is a failure of this command only.
    async fn execute(
        &self,
        session: &mut DeviceSession,
        device: &mut Device,
        input: Self::Input,
    ) -> DlmsResult<Self::Output>;

    /// Extract the typed input from a bundle request
    fn from_bundle_request(&self, request: &ActionRequest) -> DlmsResult<Self::Input> {
        Err(DlmsError::Protocol(format!(
            "{} cannot handle bundle request {}",
            self.name(),
            request.kind()
        )))
    }

    /// Wrap the typed output in a bundle response
    fn to_bundle_response(&self, _output: Self::Output) -> DlmsResult<ActionResponse> {
        Err(DlmsError::Protocol(format!(
            "{} cannot create a bundle response",
            self.name()
        )))
    }
}

/// Object-safe form of a command, as stored in the registry
#[async_trait]
pub trait BundleCommand: Send + Sync {
    fn name(&self) -> &'static str;

    fn request_kind(&self) -> Option<ActionRequestKind>;

    /// Translate `request`, execute and translate the result
    async fn execute_bundle_action(
        &self,
        session: &mut DeviceSession,
        device: &mut Device,
        request: &ActionRequest,
    ) -> DlmsResult<ActionResponse>;
}

#[async_trait]
impl<C> BundleCommand for C
where
    C: Command,
{
    fn name(&self) -> &'static str {
        Command::name(self)
    }

    fn request_kind(&self) -> Option<ActionRequestKind> {
        Command::request_kind(self)
    }

    async fn execute_bundle_action(
        &self,
        session: &mut DeviceSession,
        device: &mut Device,
        request: &ActionRequest,
    ) -> DlmsResult<ActionResponse> {
        let input = self.from_bundle_request(request)?;
        let output = self.execute(session, device, input).await?;
        self.to_bundle_response(output)
    }
}

/// Reject a request of the wrong variant
pub(crate) fn unexpected_request(name: &str, request: &ActionRequest) -> DlmsError {
    DlmsError::Protocol(format!("{} cannot handle bundle request {}", name, request.kind()))
}

/// Fail unless the device reported success for `context`
pub fn check_access_result(code: AccessResultCode, context: &str) -> DlmsResult<()> {
    log::debug!("{} - AccessResultCode: {}", context, code);
    if code.is_success() {
        Ok(())
    } else {
        Err(DlmsError::AccessResult {
            context: context.to_string(),
            code,
        })
    }
}

/// Fail unless the device reported success invoking `context`
pub fn check_method_result(result: &MethodResult, context: &str) -> DlmsResult<()> {
    log::debug!("{} - MethodResultCode: {}", context, result.result_code);
    if result.result_code.is_success() {
        Ok(())
    } else {
        Err(DlmsError::MethodResult {
            context: context.to_string(),
            code: result.result_code,
        })
    }
}

/// Read `addresses` and check the access result of every one
pub async fn get_and_check(
    session: &mut DeviceSession,
    device: &Device,
    description: &str,
    addresses: &[AttributeAddress],
) -> DlmsResult<Vec<GetResult>> {
    let results = get_with_list(session, device, addresses).await?;
    for result in &results {
        check_access_result(result.result_code, description)?;
    }
    Ok(results)
}
