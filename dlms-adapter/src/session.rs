//! Session establishment with key recovery
//!
//! Sessions are opened with the Valid authentication and encryption keys of
//! the device. When that fails while New keys are stored, the device may
//! have applied a key change it reported as failed; the session is retried
//! with the New key material and, on success, the New keys are promoted.

use crate::device::{Device, SecurityKey, SecurityKeyType};
use crate::repository::DeviceRepository;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dlms_client::{Connection, DeviceSession, LoggingObserver};
use dlms_core::{DlmsError, DlmsResult};
use std::sync::Arc;

/// Key material used to authenticate a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCredentials {
    pub authentication_key: SecurityKey,
    pub encryption_key: SecurityKey,
}

impl SessionCredentials {
    fn valid_keys(device: &Device) -> DlmsResult<Self> {
        let now = Utc::now();
        let key = |key_type: SecurityKeyType| {
            device.valid_security_key(key_type, now).cloned().ok_or_else(|| {
                DlmsError::Protocol(format!(
                    "No valid {} key for device {}",
                    key_type, device.device_identification
                ))
            })
        };
        Ok(Self {
            authentication_key: key(SecurityKeyType::Authentication)?,
            encryption_key: key(SecurityKeyType::Encryption)?,
        })
    }

    /// These credentials with every New key of `device` in place of the Valid one
    fn with_new_keys(&self, device: &Device) -> Option<Self> {
        let authentication_key = device.new_security_key(SecurityKeyType::Authentication);
        let encryption_key = device.new_security_key(SecurityKeyType::Encryption);
        if authentication_key.is_none() && encryption_key.is_none() {
            return None;
        }
        Some(Self {
            authentication_key: authentication_key.unwrap_or(&self.authentication_key).clone(),
            encryption_key: encryption_key.unwrap_or(&self.encryption_key).clone(),
        })
    }

    fn new_key_types(&self, now: DateTime<Utc>) -> Vec<SecurityKeyType> {
        [&self.authentication_key, &self.encryption_key]
            .into_iter()
            .filter(|key| key.is_new(now))
            .map(|key| key.key_type)
            .collect()
    }
}

/// Transport and association setup, provided by the host
#[async_trait]
pub trait Connector: Send + Sync {
    /// Connect to `device` and authenticate with `credentials`
    ///
    /// # Errors
    /// A rejected association is reported as a connection error.
    async fn connect(&self, device: &Device, credentials: &SessionCredentials) -> DlmsResult<Box<dyn Connection>>;
}

/// Opens device sessions, falling back to unconfirmed keys
pub struct SessionFactory {
    connector: Arc<dyn Connector>,
    repository: Arc<dyn DeviceRepository>,
}

impl SessionFactory {
    pub fn new(connector: Arc<dyn Connector>, repository: Arc<dyn DeviceRepository>) -> Self {
        Self { connector, repository }
    }

    /// Open an authenticated session to `device`
    ///
    /// Saves `device` when its keys change: leftover New keys are discarded
    /// after the Valid keys worked, and promoted when only they worked.
    ///
    /// # Errors
    ///
    /// Returns `DlmsError::Protocol` when a Valid key is missing, and the error
    /// of the first attempt when neither the Valid nor the New keys work.
    pub async fn open_session(&self, device: &mut Device) -> DlmsResult<DeviceSession> {
        let credentials = SessionCredentials::valid_keys(device)?;
        let error = match self.connector.connect(device, &credentials).await {
            Ok(connection) => {
                if device.has_new_security_keys() {
                    let discarded = device.discard_new_security_keys(SecurityKeyType::Authentication)
                        + device.discard_new_security_keys(SecurityKeyType::Encryption);
                    if discarded > 0 {
                        log::info!(
                            "Discarded {} unconfirmed keys of {}, the valid keys are in use",
                            discarded,
                            device.device_identification
                        );
                        *device = self.repository.save(device).await?;
                    }
                }
                return Ok(self.session(device, connection));
            }
            Err(error) => error,
        };

        let Some(recovery) = credentials.with_new_keys(device).filter(|_| error.is_connection_error()) else {
            return Err(error);
        };
        log::warn!(
            "Connecting to {} with valid keys failed ({}), retrying with new keys",
            device.device_identification,
            error
        );
        match self.connector.connect(device, &recovery).await {
            Ok(connection) => {
                let now = Utc::now();
                for key_type in recovery.new_key_types(now) {
                    device.promote_new_security_key(key_type, now)?;
                    log::info!(
                        "Device {} accepted the new {} key, promoted it to valid",
                        device.device_identification,
                        key_type
                    );
                }
                *device = self.repository.save(device).await?;
                Ok(self.session(device, connection))
            }
            Err(retry_error) => {
                log::warn!(
                    "Connecting to {} with new keys failed as well: {}",
                    device.device_identification,
                    retry_error
                );
                Err(error)
            }
        }
    }

    fn session(&self, device: &Device, connection: Box<dyn Connection>) -> DeviceSession {
        if device.in_debug_mode {
            DeviceSession::with_observer(
                connection,
                Arc::new(LoggingObserver::new(device.device_identification.clone())),
            )
        } else {
            DeviceSession::new(connection)
        }
    }
}
