//! Key rotation
//!
//! A new key is stored as New and saved before the device is asked to
//! change it, so the material survives a crash mid-rotation. The device
//! receives the plain key wrapped with the master key. When the device
//! reports failure the New key is kept: devices have been seen applying the
//! key anyway, and session establishment falls back to it.

use crate::bundle::{ActionRequest, ActionRequestKind, ActionResponse};
use crate::codec::describe_method;
use crate::command::{check_method_result, unexpected_request, Command};
use crate::device::{Device, SecurityKeyType};
use crate::repository::DeviceRepository;
use async_trait::async_trait;
use chrono::Utc;
use dlms_client::{DeviceSession, MethodParameter};
use dlms_core::{DataObject, DlmsError, DlmsResult, ObisCode};
use dlms_security::{wrap_aes_rfc3394_key, EncryptionService, KeyId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const CLASS_ID: u16 = 64;
const OBIS_CODE: ObisCode = ObisCode::new(0, 0, 43, 0, 0, 255);
/// `global_key_transfer`
const GLOBAL_KEY_TRANSFER: i8 = 2;

/// New material for one key type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyChange {
    pub key_type: SecurityKeyType,
    /// Encrypted key material, as the encryption service opens it
    #[serde(with = "serde_bytes")]
    pub key: Vec<u8>,
}

/// New authentication and encryption keys, both encrypted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetKeysRequest {
    #[serde(with = "serde_bytes")]
    pub authentication_key: Vec<u8>,
    #[serde(with = "serde_bytes")]
    pub encryption_key: Vec<u8>,
}

fn key_id(key_type: SecurityKeyType) -> DlmsResult<KeyId> {
    match key_type {
        SecurityKeyType::Authentication => Ok(KeyId::AuthenticationKey),
        SecurityKeyType::Encryption => Ok(KeyId::GlobalUnicastEncryptionKey),
        SecurityKeyType::Master => Err(DlmsError::Configuration(format!(
            "Replacing the {} key is not supported",
            key_type
        ))),
    }
}

/// Replace one key on the device and in the device record
pub struct ReplaceKeyCommand {
    encryption: Arc<dyn EncryptionService>,
    repository: Arc<dyn DeviceRepository>,
}

impl ReplaceKeyCommand {
    pub fn new(encryption: Arc<dyn EncryptionService>, repository: Arc<dyn DeviceRepository>) -> Self {
        Self { encryption, repository }
    }

    fn decrypt_stored(&self, hex_key: &str, key_type: SecurityKeyType) -> DlmsResult<Vec<u8>> {
        let encrypted = hex::decode(hex_key)
            .map_err(|e| DlmsError::Security(format!("Stored {} key is not valid hex: {}", key_type, e)))?;
        self.encryption.decrypt(&encrypted)
    }
}

#[async_trait]
impl Command for ReplaceKeyCommand {
    type Input = KeyChange;
    type Output = ();

    fn name(&self) -> &'static str {
        "ReplaceKey"
    }

    async fn execute(&self, session: &mut DeviceSession, device: &mut Device, change: KeyChange) -> DlmsResult<()> {
        let key_id = key_id(change.key_type)?;
        let now = Utc::now();
        let master_key = device
            .valid_security_key(SecurityKeyType::Master, now)
            .map(|key| key.key.clone())
            .ok_or_else(|| {
                DlmsError::Protocol(format!(
                    "No valid {} key for device {}",
                    SecurityKeyType::Master,
                    device.device_identification
                ))
            })?;
        if device.valid_security_key(change.key_type, now).is_none() {
            return Err(DlmsError::Protocol(format!(
                "No valid {} key for device {}",
                change.key_type, device.device_identification
            )));
        }

        device.add_new_security_key(change.key_type, hex::encode(&change.key));
        *device = self.repository.save(device).await?;

        let master_key = self.decrypt_stored(&master_key, SecurityKeyType::Master)?;
        let new_key = self.encryption.decrypt(&change.key)?;
        let wrapped = wrap_aes_rfc3394_key(&master_key, &new_key)?;
        let method = MethodParameter::new(
            CLASS_ID,
            OBIS_CODE,
            GLOBAL_KEY_TRANSFER,
            Some(DataObject::Array(vec![DataObject::Structure(vec![
                DataObject::Enumerate(key_id.id()),
                DataObject::OctetString(wrapped),
            ])])),
        );
        session.set_description(&format!(
            "ReplaceKey for {} {:?}, call method: {}",
            change.key_type,
            key_id,
            describe_method(&method)
        ));

        let result = session.action(&method).await?;
        if let Err(error) = check_method_result(&result, &format!("replace {} key", change.key_type)) {
            log::warn!(
                "Device {} reported failure replacing the {} key, keeping it as new key",
                device.device_identification,
                change.key_type
            );
            return Err(error);
        }

        match change.key_type {
            SecurityKeyType::Authentication => session
                .connection()
                .change_client_global_authentication_key(&new_key)?,
            _ => session.connection().change_client_global_encryption_key(&new_key)?,
        }
        device.promote_new_security_key(change.key_type, Utc::now())?;
        *device = self.repository.save(device).await?;
        log::info!(
            "Replaced {} key of {}",
            change.key_type,
            device.device_identification
        );
        Ok(())
    }
}

/// Replace the authentication key, then the encryption key
pub struct SetKeysCommand {
    replace_key: ReplaceKeyCommand,
}

impl SetKeysCommand {
    pub fn new(replace_key: ReplaceKeyCommand) -> Self {
        Self { replace_key }
    }
}

#[async_trait]
impl Command for SetKeysCommand {
    type Input = SetKeysRequest;
    /// Identification of the device whose keys were replaced
    type Output = String;

    fn name(&self) -> &'static str {
        "SetKeys"
    }

    fn request_kind(&self) -> Option<ActionRequestKind> {
        Some(ActionRequestKind::SetKeys)
    }

    async fn execute(&self, session: &mut DeviceSession, device: &mut Device, keys: SetKeysRequest) -> DlmsResult<String> {
        self.replace_key
            .execute(
                session,
                device,
                KeyChange {
                    key_type: SecurityKeyType::Authentication,
                    key: keys.authentication_key,
                },
            )
            .await?;
        self.replace_key
            .execute(
                session,
                device,
                KeyChange {
                    key_type: SecurityKeyType::Encryption,
                    key: keys.encryption_key,
                },
            )
            .await?;
        Ok(device.device_identification.clone())
    }

    fn from_bundle_request(&self, request: &ActionRequest) -> DlmsResult<SetKeysRequest> {
        match request {
            ActionRequest::SetKeys(keys) => Ok(keys.clone()),
            other => Err(unexpected_request(Command::name(self), other)),
        }
    }

    fn to_bundle_response(&self, device_identification: String) -> DlmsResult<ActionResponse> {
        Ok(ActionResponse::ok(format!(
            "Replace keys for device: {} was successful",
            device_identification
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::BundleCommand;
    use crate::device::{SecurityKey, SecurityKeyState};
    use crate::repository::MockDeviceRepository;
    use crate::test_support::{FakeConnection, InMemoryDeviceRepository};
    use chrono::Duration;
    use dlms_core::MethodResultCode;
    use dlms_security::{unwrap_aes_rfc3394_key, AesGcmEncryptionService};

    const MASTER_KEY: [u8; 16] = [0x0f; 16];
    const AUTHENTICATION_KEY: [u8; 16] = [0xa1; 16];
    const NEW_AUTHENTICATION_KEY: [u8; 16] = [0xa2; 16];
    const ENCRYPTION_KEY: [u8; 16] = [0xe1; 16];
    const NEW_ENCRYPTION_KEY: [u8; 16] = [0xe2; 16];

    fn storage() -> Arc<AesGcmEncryptionService> {
        Arc::new(AesGcmEncryptionService::new(&[0x5a; 16]).unwrap())
    }

    fn stored(storage: &AesGcmEncryptionService, key: &[u8]) -> String {
        hex::encode(storage.encrypt(key).unwrap())
    }

    fn device(storage: &AesGcmEncryptionService) -> Device {
        let since = Utc::now() - Duration::days(1);
        Device::new("E0026000059790003")
            .with_security_key(SecurityKey::new(SecurityKeyType::Master, stored(storage, &MASTER_KEY), since))
            .with_security_key(SecurityKey::new(
                SecurityKeyType::Authentication,
                stored(storage, &AUTHENTICATION_KEY),
                since,
            ))
            .with_security_key(SecurityKey::new(
                SecurityKeyType::Encryption,
                stored(storage, &ENCRYPTION_KEY),
                since,
            ))
    }

    fn keys_of(device: &Device, key_type: SecurityKeyType) -> Vec<SecurityKeyState> {
        let now = Utc::now();
        device
            .security_keys()
            .iter()
            .filter(|key| key.key_type == key_type)
            .map(|key| key.state(now))
            .collect()
    }

    #[tokio::test]
    async fn test_replace_authentication_key() {
        let storage = storage();
        let mut device = device(&storage);
        let repository = Arc::new(InMemoryDeviceRepository::with_device(device.clone()));
        let command = ReplaceKeyCommand::new(storage.clone(), repository.clone());
        let connection = FakeConnection::new();
        let change = KeyChange {
            key_type: SecurityKeyType::Authentication,
            key: storage.encrypt(&NEW_AUTHENTICATION_KEY).unwrap(),
        };

        command
            .execute(&mut connection.session(), &mut device, change)
            .await
            .unwrap();

        let states = keys_of(&device, SecurityKeyType::Authentication);
        assert_eq!(states, vec![SecurityKeyState::Expired, SecurityKeyState::Valid]);
        assert!(!device.has_new_security_keys());
        assert_eq!(repository.saves(), 2);
        assert_eq!(repository.device(&device.device_identification), Some(device.clone()));
        assert_eq!(connection.authentication_keys(), vec![NEW_AUTHENTICATION_KEY.to_vec()]);

        let actions = connection.actions();
        assert_eq!(actions[0].class_id, 64);
        assert_eq!(actions[0].method_id, 2);
        let transfer = actions[0].parameter.as_ref().unwrap().as_list().unwrap()[0]
            .as_list()
            .unwrap()
            .to_vec();
        assert_eq!(transfer[0], DataObject::Enumerate(2));
        let wrapped = transfer[1].as_bytes().unwrap();
        assert_eq!(unwrap_aes_rfc3394_key(&MASTER_KEY, wrapped).unwrap(), NEW_AUTHENTICATION_KEY.to_vec());
    }

    #[tokio::test]
    async fn test_reported_failure_keeps_new_key() {
        let storage = storage();
        let mut device = device(&storage);
        let mut repository = MockDeviceRepository::new();
        repository
            .expect_save()
            .times(1)
            .returning(|device: &Device| Ok(device.clone()));
        let command = ReplaceKeyCommand::new(storage.clone(), Arc::new(repository));
        let connection = FakeConnection::new();
        connection.push_action_result(MethodResultCode::OtherReason);
        let new_key = storage.encrypt(&NEW_ENCRYPTION_KEY).unwrap();

        let error = command
            .execute(
                &mut connection.session(),
                &mut device,
                KeyChange {
                    key_type: SecurityKeyType::Encryption,
                    key: new_key.clone(),
                },
            )
            .await
            .unwrap_err();

        assert_eq!(error.kind(), "MethodResultError");
        let pending = device.new_security_key(SecurityKeyType::Encryption).unwrap();
        assert_eq!(pending.key, hex::encode(&new_key));
        assert_eq!(
            keys_of(&device, SecurityKeyType::Encryption),
            vec![SecurityKeyState::Valid, SecurityKeyState::New]
        );
        assert!(connection.encryption_keys().is_empty());
    }

    #[tokio::test]
    async fn test_missing_master_key_fails_before_saving() {
        let storage = storage();
        let since = Utc::now() - Duration::days(1);
        let mut device = Device::new("E0026000059790003").with_security_key(SecurityKey::new(
            SecurityKeyType::Authentication,
            stored(&storage, &AUTHENTICATION_KEY),
            since,
        ));
        let mut repository = MockDeviceRepository::new();
        repository.expect_save().never();
        let command = ReplaceKeyCommand::new(storage.clone(), Arc::new(repository));
        let connection = FakeConnection::new();

        let error = command
            .execute(
                &mut connection.session(),
                &mut device,
                KeyChange {
                    key_type: SecurityKeyType::Authentication,
                    key: storage.encrypt(&NEW_AUTHENTICATION_KEY).unwrap(),
                },
            )
            .await
            .unwrap_err();

        assert!(error.is_protocol_error());
        assert!(!device.has_new_security_keys());
        assert!(connection.actions().is_empty());
    }

    #[tokio::test]
    async fn test_set_keys_replaces_both_keys() {
        let storage = storage();
        let mut device = device(&storage);
        let repository = Arc::new(InMemoryDeviceRepository::with_device(device.clone()));
        let command = SetKeysCommand::new(ReplaceKeyCommand::new(storage.clone(), repository.clone()));
        let connection = FakeConnection::new();
        let request = ActionRequest::SetKeys(SetKeysRequest {
            authentication_key: storage.encrypt(&NEW_AUTHENTICATION_KEY).unwrap(),
            encryption_key: storage.encrypt(&NEW_ENCRYPTION_KEY).unwrap(),
        });

        let response = command
            .execute_bundle_action(&mut connection.session(), &mut device, &request)
            .await
            .unwrap();

        assert_eq!(
            response,
            ActionResponse::ok("Replace keys for device: E0026000059790003 was successful")
        );
        let key_ids: Vec<DataObject> = connection
            .actions()
            .iter()
            .map(|action| action.parameter.as_ref().unwrap().as_list().unwrap()[0].as_list().unwrap()[0].clone())
            .collect();
        assert_eq!(key_ids, vec![DataObject::Enumerate(2), DataObject::Enumerate(0)]);
        assert_eq!(connection.encryption_keys(), vec![NEW_ENCRYPTION_KEY.to_vec()]);
        assert_eq!(repository.saves(), 4);
    }

    #[test]
    fn test_master_key_cannot_be_replaced() {
        assert_eq!(key_id(SecurityKeyType::Master).unwrap_err().kind(), "ConfigurationError");
    }
}
