use crate::result_code::{AccessResultCode, MethodResultCode};
use thiserror::Error;

/// Main error type for the DLMS protocol adapter
///
/// The variants fall into three families the callers care about:
///
/// - connection errors (`Connection`, `Timeout`): the session to the device is lost
/// - protocol errors (`Protocol`, `Decode`, `AccessResult`, `MethodResult`): the device
///   answered, but not with what was expected
/// - configuration errors (`Configuration`): the caller asked for an unsupported combination
///
/// `Encryption` and `Security` cover failures around key material.
#[derive(Error, Debug)]
pub enum DlmsError {
    #[error("Connection error: {0}")]
    Connection(#[from] std::io::Error),

    #[error("Timeout")]
    Timeout,

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Decode error in {context}: {message}")]
    Decode { context: String, message: String },

    #[error("No success retrieving {context}: AccessResultCode = {code}")]
    AccessResult {
        context: String,
        code: AccessResultCode,
    },

    #[error("No success invoking {context}: MethodResultCode = {code}")]
    MethodResult {
        context: String,
        code: MethodResultCode,
    },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Encryption error: {0}")]
    Encryption(String),

    #[error("Security error: {0}")]
    Security(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl DlmsError {
    /// Build a decode error for `context`
    pub fn decode(context: impl Into<String>, message: impl Into<String>) -> Self {
        DlmsError::Decode {
            context: context.into(),
            message: message.into(),
        }
    }

    /// Whether the session to the device has been lost
    ///
    /// Callers executing several operations over one session must stop at the
    /// first error for which this returns `true`.
    pub fn is_connection_error(&self) -> bool {
        matches!(self, DlmsError::Connection(_) | DlmsError::Timeout)
    }

    /// Whether the device answered with something unexpected
    pub fn is_protocol_error(&self) -> bool {
        matches!(
            self,
            DlmsError::Protocol(_)
                | DlmsError::Decode { .. }
                | DlmsError::AccessResult { .. }
                | DlmsError::MethodResult { .. }
        )
    }

    /// Numeric result code carried by the error, if any
    pub fn code(&self) -> Option<i32> {
        match self {
            DlmsError::AccessResult { code, .. } => Some(code.to_u8() as i32),
            DlmsError::MethodResult { code, .. } => Some(code.to_u8() as i32),
            _ => None,
        }
    }

    /// Stable name of the error family, used when reporting faults upstream
    pub fn kind(&self) -> &'static str {
        match self {
            DlmsError::Connection(_) => "ConnectionError",
            DlmsError::Timeout => "TimeoutError",
            DlmsError::Protocol(_) => "ProtocolError",
            DlmsError::Decode { .. } => "DecodeError",
            DlmsError::AccessResult { .. } => "AccessResultError",
            DlmsError::MethodResult { .. } => "MethodResultError",
            DlmsError::Configuration(_) => "ConfigurationError",
            DlmsError::Encryption(_) => "EncryptionError",
            DlmsError::Security(_) => "SecurityError",
            DlmsError::InvalidData(_) => "InvalidDataError",
        }
    }

    /// Operator-facing message carried by the error itself
    ///
    /// Returns `None` for errors that only make sense together with their
    /// surrounding context, in which case a caller-supplied default applies.
    pub fn user_message(&self) -> Option<String> {
        match self {
            DlmsError::Protocol(message) | DlmsError::Configuration(message) => {
                Some(message.clone())
            }
            DlmsError::AccessResult { .. } | DlmsError::MethodResult { .. } => {
                Some(self.to_string())
            }
            _ => None,
        }
    }
}

/// Result type alias for DLMS operations
pub type DlmsResult<T> = Result<T, DlmsError>;
