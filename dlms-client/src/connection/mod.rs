//! Connection management module

pub mod address;
pub mod connection;
pub mod observer;
pub mod session;

pub use address::{AttributeAddress, GetResult, MethodParameter, MethodResult, SelectiveAccessDescription, SetParameter};
pub use connection::Connection;
pub use observer::{CapturedMessage, LoggingObserver, MessageDirection, SessionObserver};
pub use session::DeviceSession;
