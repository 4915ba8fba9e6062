//! Device session: an open connection plus an optional diagnostic observer

use crate::connection::address::{AttributeAddress, GetResult, MethodParameter, MethodResult, SetParameter};
use crate::connection::connection::Connection;
use crate::connection::observer::SessionObserver;
use dlms_core::{AccessResultCode, DlmsResult};
use std::fmt;
use std::sync::Arc;

/// One open, authenticated session to a device
///
/// Owned exclusively for the duration of one command or one bundle.
pub struct DeviceSession {
    connection: Box<dyn Connection>,
    observer: Option<Arc<dyn SessionObserver>>,
}

impl DeviceSession {
    pub fn new(connection: Box<dyn Connection>) -> Self {
        Self {
            connection,
            observer: None,
        }
    }

    pub fn with_observer(connection: Box<dyn Connection>, observer: Arc<dyn SessionObserver>) -> Self {
        Self {
            connection,
            observer: Some(observer),
        }
    }

    pub fn connection(&mut self) -> &mut dyn Connection {
        self.connection.as_mut()
    }

    pub fn observer(&self) -> Option<&Arc<dyn SessionObserver>> {
        self.observer.as_ref()
    }

    /// Describe the operation about to run, for session traces
    ///
    /// Does nothing when no observer is attached.
    pub fn set_description(&self, description: &str) {
        if let Some(observer) = &self.observer {
            observer.set_description(description);
        }
    }

    pub async fn get(&mut self, address: &AttributeAddress) -> DlmsResult<GetResult> {
        self.connection.get(address).await
    }

    pub async fn get_with_list(&mut self, addresses: &[AttributeAddress]) -> DlmsResult<Vec<GetResult>> {
        self.connection.get_with_list(addresses).await
    }

    pub async fn set(&mut self, parameter: &SetParameter) -> DlmsResult<AccessResultCode> {
        self.connection.set(parameter).await
    }

    pub async fn action(&mut self, parameter: &MethodParameter) -> DlmsResult<MethodResult> {
        self.connection.action(parameter).await
    }

    /// Close the underlying connection
    pub async fn close(mut self) -> DlmsResult<()> {
        self.connection.close().await
    }
}

impl fmt::Debug for DeviceSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceSession")
            .field("observed", &self.observer.is_some())
            .finish_non_exhaustive()
    }
}
