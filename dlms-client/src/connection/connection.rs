//! Connection trait for an open, authenticated device session
//!
//! Establishing the session (transport, association, authentication) happens
//! outside this crate. What the adapter needs from an established session is
//! captured by [`Connection`]:
//!
//! - **GET** of one attribute, or of a list of attributes in one request
//! - **SET** of one attribute
//! - **ACTION** on one method
//! - replacing the working keys of the session after a key change
//!
//! # Error Handling
//!
//! Operations distinguish two kinds of failure:
//! - the device answered with a non-success result code: returned as data
//!   (`GetResult::result_code`, `MethodResult::result_code`, ...), the session stays usable
//! - the session was lost: returned as `DlmsError::Connection` or
//!   `DlmsError::Timeout`, after which no further request can be sent
//!
//! # Usage Example
//!
//! ```rust,no_run
//! use dlms_client::{AttributeAddress, Connection};
//! use dlms_core::{DlmsResult, ObisCode};
//!
//! async fn read_clock(conn: &mut dyn Connection) -> DlmsResult<()> {
//!     let clock = AttributeAddress::new(8, ObisCode::new(0, 0, 1, 0, 0, 255), 2);
//!     let result = conn.get(&clock).await?;
//!     println!("{}: {}", result.result_code, result.result_data);
//!     Ok(())
//! }
//! ```

use crate::connection::address::{AttributeAddress, GetResult, MethodParameter, MethodResult, SetParameter};
use dlms_core::{AccessResultCode, DlmsResult};

/// Connection trait for DLMS/COSEM client operations
///
/// Implementations wrap one open session to one device. A connection is
/// exclusively owned by whoever runs commands against it and is never used
/// concurrently.
#[async_trait::async_trait]
pub trait Connection: Send + Sync {
    /// Get an attribute value
    ///
    /// # Errors
    /// Returns a connection error if the session is lost
    async fn get(&mut self, address: &AttributeAddress) -> DlmsResult<GetResult>;

    /// Get several attribute values in one request
    ///
    /// Only devices that support GET with list accept this request. The
    /// result contains one entry per address, in request order.
    ///
    /// # Errors
    /// Returns a connection error if the session is lost
    async fn get_with_list(&mut self, addresses: &[AttributeAddress]) -> DlmsResult<Vec<GetResult>>;

    /// Set an attribute value
    ///
    /// # Returns
    /// The access result code reported by the device
    ///
    /// # Errors
    /// Returns a connection error if the session is lost
    async fn set(&mut self, parameter: &SetParameter) -> DlmsResult<AccessResultCode>;

    /// Invoke a method
    ///
    /// # Returns
    /// The method result code and optional return data
    ///
    /// # Errors
    /// Returns a connection error if the session is lost
    async fn action(&mut self, parameter: &MethodParameter) -> DlmsResult<MethodResult>;

    /// Replace the global authentication key used by this session
    fn change_client_global_authentication_key(&mut self, key: &[u8]) -> DlmsResult<()>;

    /// Replace the global unicast encryption key used by this session
    fn change_client_global_encryption_key(&mut self, key: &[u8]) -> DlmsResult<()>;

    /// Close the connection
    ///
    /// # Errors
    /// Returns error if closing fails at any layer
    async fn close(&mut self) -> DlmsResult<()>;
}
