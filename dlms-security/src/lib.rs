//! Security module for the DLMS/COSEM protocol adapter
//!
//! Key material is stored encrypted. This crate provides the contract of the
//! service that decrypts it, an AES-GCM implementation of that service, and
//! the RFC 3394 key wrap used when transferring a new key to a device.

pub mod encryption;
pub mod key_wrap;

pub use encryption::{AesGcmEncryptionService, EncryptionService};
pub use key_wrap::{KeyId, unwrap_aes_rfc3394_key, wrap_aes_rfc3394_key};
