//! Diagnostic observer attached to a device session

use std::fmt;
use std::sync::Mutex;

/// Direction of a captured message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageDirection {
    Sent,
    Received,
}

impl fmt::Display for MessageDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageDirection::Sent => write!(f, "sent"),
            MessageDirection::Received => write!(f, "received"),
        }
    }
}

/// One APDU exchanged with the device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedMessage {
    pub direction: MessageDirection,
    pub apdu: Vec<u8>,
}

/// Receives diagnostics about a session
///
/// Commands describe what they are about to do with `set_description`; the
/// transport reports every exchanged APDU with `message_captured`, so each
/// message can be tied to the operation that caused it.
pub trait SessionObserver: Send + Sync {
    fn set_description(&self, description: &str);

    fn message_captured(&self, message: &CapturedMessage);
}

/// Observer writing session traces through the `log` facade
pub struct LoggingObserver {
    device_identification: String,
    description: Mutex<String>,
}

impl LoggingObserver {
    pub fn new(device_identification: impl Into<String>) -> Self {
        Self {
            device_identification: device_identification.into(),
            description: Mutex::new(String::new()),
        }
    }

    /// Description set by the most recent operation
    pub fn description(&self) -> String {
        self.description
            .lock()
            .map(|description| description.clone())
            .unwrap_or_default()
    }
}

impl SessionObserver for LoggingObserver {
    fn set_description(&self, description: &str) {
        log::debug!("[{}] {}", self.device_identification, description);
        if let Ok(mut current) = self.description.lock() {
            *current = description.to_string();
        }
    }

    fn message_captured(&self, message: &CapturedMessage) {
        let apdu: String = message.apdu.iter().map(|byte| format!("{:02X}", byte)).collect();
        log::debug!(
            "[{}] {} ({}): {}",
            self.device_identification,
            message.direction,
            self.description(),
            apdu
        );
    }
}
