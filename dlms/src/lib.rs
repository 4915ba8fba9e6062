//! DLMS/COSEM protocol adapter
//!
//! Executes operations against smart meters: clock and calendar settings,
//! push setups, alarm filters, the configuration object, event logs,
//! electricity and gas periodic reads, firmware versions and key rotation,
//! one at a time or as resumable bundles.
//!
//! # Architecture
//!
//! This library is organized as a workspace with multiple crates:
//!
//! - `dlms-core`: value model, error handling, OBIS codes and result codes
//! - `dlms-client`: the device session handle
//! - `dlms-security`: encryption service and AES key wrap
//! - `dlms-adapter`: codec, commands, bundles, key rotation and session recovery
//!
//! # Usage
//!
//! ```no_run
//! use dlms::adapter::{ActionRequest, Bundle};
//!
//! let bundle = Bundle::new([ActionRequest::GetAdministrativeStatus, ActionRequest::GetPushSetupSms]);
//! assert_eq!(bundle.pending(), 2);
//! ```

// Re-export core types
pub use dlms_core::{DlmsError, DlmsResult, ObisCode};
pub use dlms_core::datatypes::*;

// Re-export the session handle
pub mod client {
    pub use dlms_client::*;
}

// Re-export key handling
pub mod security {
    pub use dlms_security::*;
}

// Re-export the adapter
pub mod adapter {
    pub use dlms_adapter::*;
}
