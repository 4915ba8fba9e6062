//! Device model: capability flags and the security keys of one device
//!
//! A device owns a plain list of [`SecurityKey`] records. The state of a key
//! is derived from its validity window:
//!
//! - **Valid**: `valid_from` set and not in the future, `valid_to` absent or in the future
//! - **Expired**: `valid_to` set and not in the future
//! - **New**: `valid_from` absent, the key has been stored but not yet confirmed by the device
//!
//! For every key type at most one key is Valid and at most one key is New at
//! any instant. The mutating operations on [`Device`] keep that invariant.

use chrono::{DateTime, Utc};
use dlms_core::{DlmsError, DlmsResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Type of a security key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SecurityKeyType {
    /// Master key (key encryption key), authenticates key changes
    Master,
    /// Global authentication key
    Authentication,
    /// Global unicast encryption key
    Encryption,
}

impl fmt::Display for SecurityKeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SecurityKeyType::Master => write!(f, "E_METER_MASTER"),
            SecurityKeyType::Authentication => write!(f, "E_METER_AUTHENTICATION"),
            SecurityKeyType::Encryption => write!(f, "E_METER_ENCRYPTION"),
        }
    }
}

/// Derived state of a security key at a given instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecurityKeyState {
    Valid,
    Expired,
    New,
    /// `valid_from` lies in the future
    NotYetValid,
}

/// One security key of a device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityKey {
    pub key_type: SecurityKeyType,
    /// Hex rendering of the encrypted key material
    pub key: String,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_to: Option<DateTime<Utc>>,
}

impl SecurityKey {
    /// A key valid from `valid_from` on
    pub fn new(key_type: SecurityKeyType, key: impl Into<String>, valid_from: DateTime<Utc>) -> Self {
        Self {
            key_type,
            key: key.into(),
            valid_from: Some(valid_from),
            valid_to: None,
        }
    }

    /// A key that has not been confirmed by the device yet
    pub fn unconfirmed(key_type: SecurityKeyType, key: impl Into<String>) -> Self {
        Self {
            key_type,
            key: key.into(),
            valid_from: None,
            valid_to: None,
        }
    }

    pub fn state(&self, now: DateTime<Utc>) -> SecurityKeyState {
        match (self.valid_from, self.valid_to) {
            (_, Some(valid_to)) if valid_to <= now => SecurityKeyState::Expired,
            (None, _) => SecurityKeyState::New,
            (Some(valid_from), _) if valid_from <= now => SecurityKeyState::Valid,
            (Some(_), _) => SecurityKeyState::NotYetValid,
        }
    }

    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        self.state(now) == SecurityKeyState::Valid
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.state(now) == SecurityKeyState::Expired
    }

    pub fn is_new(&self, now: DateTime<Utc>) -> bool {
        self.state(now) == SecurityKeyState::New
    }
}

/// A metering device as known to the adapter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub device_identification: String,
    pub hls3_active: bool,
    pub hls4_active: bool,
    pub hls5_active: bool,
    /// Device accepts GET requests with a list of attributes
    pub supports_batched_read: bool,
    /// Device accepts selective access on profile buffers
    pub supports_selective_access: bool,
    /// Session traffic of this device is logged
    pub in_debug_mode: bool,
    security_keys: Vec<SecurityKey>,
}

impl Device {
    pub fn new(device_identification: impl Into<String>) -> Self {
        Self {
            device_identification: device_identification.into(),
            hls3_active: false,
            hls4_active: false,
            hls5_active: true,
            supports_batched_read: false,
            supports_selective_access: false,
            in_debug_mode: false,
            security_keys: Vec::new(),
        }
    }

    /// Add a key as loaded from storage
    pub fn with_security_key(mut self, key: SecurityKey) -> Self {
        self.security_keys.push(key);
        self
    }

    pub fn security_keys(&self) -> &[SecurityKey] {
        &self.security_keys
    }

    /// The Valid key of `key_type` at `now`
    pub fn valid_security_key(&self, key_type: SecurityKeyType, now: DateTime<Utc>) -> Option<&SecurityKey> {
        self.security_keys
            .iter()
            .find(|key| key.key_type == key_type && key.is_valid(now))
    }

    /// The New (unconfirmed) key of `key_type`
    pub fn new_security_key(&self, key_type: SecurityKeyType) -> Option<&SecurityKey> {
        self.security_keys
            .iter()
            .find(|key| key.key_type == key_type && key.is_new(Utc::now()))
    }

    pub fn has_new_security_keys(&self) -> bool {
        let now = Utc::now();
        self.security_keys.iter().any(|key| key.is_new(now))
    }

    /// Store `key` as the New key of `key_type`, replacing an older New key
    pub fn add_new_security_key(&mut self, key_type: SecurityKeyType, key: impl Into<String>) {
        self.discard_new_security_keys(key_type);
        self.security_keys.push(SecurityKey::unconfirmed(key_type, key));
    }

    /// Remove the New keys of `key_type`, returning how many were removed
    pub fn discard_new_security_keys(&mut self, key_type: SecurityKeyType) -> usize {
        let now = Utc::now();
        let before = self.security_keys.len();
        self.security_keys
            .retain(|key| !(key.key_type == key_type && key.is_new(now)));
        before - self.security_keys.len()
    }

    /// Make the New key of `key_type` the Valid one
    ///
    /// The current Valid key expires at `now` and the New key becomes valid
    /// from `now`, so exactly one key of the type is Valid afterwards.
    ///
    /// # Errors
    ///
    /// Returns `DlmsError::Protocol` when there is no New key of `key_type`.
    pub fn promote_new_security_key(&mut self, key_type: SecurityKeyType, now: DateTime<Utc>) -> DlmsResult<()> {
        let new_index = self
            .security_keys
            .iter()
            .position(|key| key.key_type == key_type && key.is_new(now))
            .ok_or_else(|| {
                DlmsError::Protocol(format!(
                    "No new {} key to promote for device {}",
                    key_type, self.device_identification
                ))
            })?;

        for key in self
            .security_keys
            .iter_mut()
            .filter(|key| key.key_type == key_type && key.is_valid(now))
        {
            key.valid_to = Some(now);
        }
        self.security_keys[new_index].valid_from = Some(now);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn instant() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn device() -> Device {
        let since = instant() - Duration::days(30);
        Device::new("E0026000059790003")
            .with_security_key(SecurityKey::new(SecurityKeyType::Master, "aa", since))
            .with_security_key(SecurityKey::new(SecurityKeyType::Authentication, "bb", since))
    }

    #[test]
    fn test_key_states() {
        let now = instant();
        let valid = SecurityKey::new(SecurityKeyType::Encryption, "00", now);
        assert_eq!(valid.state(now), SecurityKeyState::Valid);

        let mut expired = valid.clone();
        expired.valid_to = Some(now);
        assert_eq!(expired.state(now), SecurityKeyState::Expired);

        let new = SecurityKey::unconfirmed(SecurityKeyType::Encryption, "01");
        assert_eq!(new.state(now), SecurityKeyState::New);

        let future = SecurityKey::new(SecurityKeyType::Encryption, "02", now + Duration::seconds(1));
        assert_eq!(future.state(now), SecurityKeyState::NotYetValid);
    }

    #[test]
    fn test_new_key_with_end_date_is_new_until_then() {
        let now = instant();
        let mut key = SecurityKey::unconfirmed(SecurityKeyType::Authentication, "03");
        key.valid_to = Some(now + Duration::days(1));
        assert_eq!(key.state(now), SecurityKeyState::New);
        assert!(key.is_new(now));
        assert!(!key.is_new(now + Duration::days(1)));
        assert!(key.is_expired(now + Duration::days(1)));
    }

    #[test]
    fn test_add_new_key_replaces_older_new_key() {
        let mut device = device();
        device.add_new_security_key(SecurityKeyType::Authentication, "cc");
        device.add_new_security_key(SecurityKeyType::Authentication, "dd");

        let new_keys: Vec<_> = device
            .security_keys()
            .iter()
            .filter(|key| key.is_new(instant()))
            .collect();
        assert_eq!(new_keys.len(), 1);
        assert_eq!(new_keys[0].key, "dd");
    }

    #[test]
    fn test_promote_new_key() {
        let now = instant();
        let mut device = device();
        device.add_new_security_key(SecurityKeyType::Authentication, "cc");
        device
            .promote_new_security_key(SecurityKeyType::Authentication, now)
            .unwrap();

        let valid: Vec<_> = device
            .security_keys()
            .iter()
            .filter(|key| key.key_type == SecurityKeyType::Authentication && key.is_valid(now))
            .collect();
        assert_eq!(valid.len(), 1);
        assert_eq!(valid[0].key, "cc");
        assert!(device.new_security_key(SecurityKeyType::Authentication).is_none());
        assert!(device
            .security_keys()
            .iter()
            .any(|key| key.key == "bb" && key.is_expired(now)));
    }

    #[test]
    fn test_promote_without_new_key_fails() {
        let mut device = device();
        let result = device.promote_new_security_key(SecurityKeyType::Encryption, instant());
        assert!(result.unwrap_err().is_protocol_error());
    }

    #[test]
    fn test_discard_new_keys_only_touches_type() {
        let mut device = device();
        device.add_new_security_key(SecurityKeyType::Authentication, "cc");
        device.add_new_security_key(SecurityKeyType::Encryption, "ee");
        assert_eq!(device.discard_new_security_keys(SecurityKeyType::Authentication), 1);
        assert!(device.new_security_key(SecurityKeyType::Encryption).is_some());
        assert!(device.has_new_security_keys());
    }
}
