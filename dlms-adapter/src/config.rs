//! Adapter configuration

use serde::{Deserialize, Serialize};

const DEFAULT_COMPONENT: &str = "PROTOCOL_DLMS";
const DEFAULT_FAULT_MESSAGE: &str = "Unable to handle request";

/// Settings of the protocol adapter
///
/// Deserializable from a host configuration file; every field has a default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdapterConfig {
    /// Component name reported in every fault response
    pub component: String,
    /// Fault message used when no command handles a bundle request
    pub default_fault_message: String,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            component: DEFAULT_COMPONENT.to_string(),
            default_fault_message: DEFAULT_FAULT_MESSAGE.to_string(),
        }
    }
}
