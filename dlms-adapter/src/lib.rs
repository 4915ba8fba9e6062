//! DLMS/COSEM protocol adapter
//!
//! Executes typed operations against smart meters over an open
//! [`DeviceSession`](dlms_client::DeviceSession):
//!
//! - [`codec`]: conversion between device values and domain types
//! - [`command`]: the command abstraction and the registry of bundle commands
//! - [`commands`]: the operations themselves (clock, push setup, events, profiles, keys, ...)
//! - [`bundle`]: resumable execution of ordered operation lists with per-action faults
//! - [`session`]: session establishment with recovery of unconfirmed keys
//! - [`service`]: per-device serialized entry point tying the above together
//!
//! Transport, association setup, persistence and key decryption are
//! provided by the host through [`session::Connector`],
//! [`repository::DeviceRepository`] and [`dlms_security::EncryptionService`].

pub mod bundle;
pub mod codec;
pub mod command;
pub mod commands;
pub mod config;
pub mod device;
pub mod locks;
pub mod management;
pub mod repository;
pub mod service;
pub mod session;

#[cfg(test)]
mod test_support;

pub use bundle::{ActionRequest, ActionRequestKind, ActionResponse, Bundle, BundleAction, BundleService, FaultResponse};
pub use command::{BundleCommand, Command, CommandRegistry};
pub use config::AdapterConfig;
pub use device::{Device, SecurityKey, SecurityKeyState, SecurityKeyType};
pub use locks::DeviceLocks;
pub use management::ManagementService;
pub use repository::DeviceRepository;
pub use service::AdapterService;
pub use session::{Connector, SessionCredentials, SessionFactory};
