//! Device session handle for the DLMS/COSEM protocol adapter
//!
//! Establishing and authenticating a session is done elsewhere; this crate
//! defines what an open session offers (GET, GET with list, SET, ACTION and
//! key changes) and wraps it together with an optional diagnostic observer.

pub mod connection;

pub use connection::{
    AttributeAddress, CapturedMessage, Connection, DeviceSession, GetResult, LoggingObserver,
    MessageDirection, MethodParameter, MethodResult, SelectiveAccessDescription, SessionObserver,
    SetParameter,
};
