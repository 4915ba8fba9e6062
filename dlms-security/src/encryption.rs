//! Encryption service used to open stored key material

use aes_gcm::{
    Aes128Gcm, Key, Nonce,
    aead::{Aead, AeadCore, KeyInit, OsRng},
};
use dlms_core::{DlmsError, DlmsResult};

const NONCE_LENGTH: usize = 12;

/// Decrypts key material that is stored encrypted
///
/// Failures are reported as `DlmsError::Encryption` so callers can tell them
/// apart from device and connection errors.
pub trait EncryptionService: Send + Sync {
    /// Decrypt `data` and return the plain key bytes
    fn decrypt(&self, data: &[u8]) -> DlmsResult<Vec<u8>>;
}

/// AES-128-GCM encryption service
///
/// Encrypted material is laid out as `nonce (12 bytes) || ciphertext || tag`.
pub struct AesGcmEncryptionService {
    cipher: Aes128Gcm,
}

impl AesGcmEncryptionService {
    /// Create a new service from a 16-byte storage key
    pub fn new(key: &[u8]) -> DlmsResult<Self> {
        if key.len() != 16 {
            return Err(DlmsError::Security(format!(
                "Invalid AES-128 key length: expected 16 bytes, got {}",
                key.len()
            )));
        }

        let key = Key::<Aes128Gcm>::from_slice(key);
        Ok(Self {
            cipher: Aes128Gcm::new(key),
        })
    }

    /// Encrypt data for storage
    pub fn encrypt(&self, plaintext: &[u8]) -> DlmsResult<Vec<u8>> {
        let nonce = Aes128Gcm::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher
            .encrypt(&nonce, plaintext)
            .map_err(|e| DlmsError::Encryption(format!("Encryption failed: {}", e)))?;

        let mut encrypted = nonce.to_vec();
        encrypted.extend_from_slice(&ciphertext);
        Ok(encrypted)
    }
}

impl EncryptionService for AesGcmEncryptionService {
    fn decrypt(&self, data: &[u8]) -> DlmsResult<Vec<u8>> {
        if data.len() <= NONCE_LENGTH {
            return Err(DlmsError::Encryption(format!(
                "Encrypted data too short: {} bytes",
                data.len()
            )));
        }

        let (nonce, ciphertext) = data.split_at(NONCE_LENGTH);
        self.cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|e| DlmsError::Encryption(format!("Decryption failed: {}", e)))
    }
}
