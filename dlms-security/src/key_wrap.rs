//! AES key wrap (RFC 3394) and key identifiers of the security setup key transfer

use aes::Aes128;
use cipher::generic_array::GenericArray;
use cipher::{BlockDecrypt, BlockEncrypt, KeyInit};
use dlms_core::{DlmsError, DlmsResult};

const DEFAULT_IV: [u8; 8] = [0xA6; 8];

/// Key ID used in the `global_key_transfer` method of the security setup object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyId {
    /// Global unicast encryption key
    GlobalUnicastEncryptionKey = 0,
    /// Global broadcast encryption key
    GlobalBroadcastEncryptionKey = 1,
    /// Authentication key
    AuthenticationKey = 2,
    /// Master key (key encryption key)
    MasterKey = 3,
}

impl KeyId {
    /// Get key ID value
    pub fn id(&self) -> u8 {
        *self as u8
    }

    /// Get key ID from value
    pub fn from_id(id: u8) -> DlmsResult<Self> {
        match id {
            0 => Ok(KeyId::GlobalUnicastEncryptionKey),
            1 => Ok(KeyId::GlobalBroadcastEncryptionKey),
            2 => Ok(KeyId::AuthenticationKey),
            3 => Ok(KeyId::MasterKey),
            _ => Err(DlmsError::Security(format!("Invalid key ID: {}", id))),
        }
    }
}

fn key_encryption_cipher(kek: &[u8]) -> DlmsResult<Aes128> {
    Aes128::new_from_slice(kek)
        .map_err(|_| DlmsError::Security(format!("KEK must be 16 bytes, got {}", kek.len())))
}

fn check_key_data(data: &[u8], minimum: usize, what: &str) -> DlmsResult<()> {
    if data.len() < minimum || data.len() % 8 != 0 {
        return Err(DlmsError::Security(format!(
            "{} must be a multiple of 8 bytes and at least {} bytes, got {}",
            what,
            minimum,
            data.len()
        )));
    }
    Ok(())
}

/// Wrap `key` with the key encryption key `kek` (RFC 3394, default IV)
pub fn wrap_aes_rfc3394_key(kek: &[u8], key: &[u8]) -> DlmsResult<Vec<u8>> {
    let cipher = key_encryption_cipher(kek)?;
    check_key_data(key, 16, "Key to wrap")?;

    let n = key.len() / 8;
    let mut a = DEFAULT_IV;
    let mut r: Vec<[u8; 8]> = key
        .chunks_exact(8)
        .map(|chunk| {
            let mut block = [0u8; 8];
            block.copy_from_slice(chunk);
            block
        })
        .collect();

    for j in 0..6 {
        for (i, register) in r.iter_mut().enumerate() {
            let mut block = GenericArray::clone_from_slice(&[a, *register].concat());
            cipher.encrypt_block(&mut block);

            let t = (n * j + i + 1) as u64;
            a.copy_from_slice(&block[..8]);
            for (byte, t_byte) in a.iter_mut().zip(t.to_be_bytes()) {
                *byte ^= t_byte;
            }
            register.copy_from_slice(&block[8..]);
        }
    }

    let mut wrapped = a.to_vec();
    for register in &r {
        wrapped.extend_from_slice(register);
    }
    Ok(wrapped)
}

/// Unwrap a key wrapped with [`wrap_aes_rfc3394_key`]
///
/// # Errors
///
/// Returns `DlmsError::Security` when the integrity check value does not match.
pub fn unwrap_aes_rfc3394_key(kek: &[u8], wrapped_key: &[u8]) -> DlmsResult<Vec<u8>> {
    let cipher = key_encryption_cipher(kek)?;
    check_key_data(wrapped_key, 24, "Wrapped key")?;

    let n = wrapped_key.len() / 8 - 1;
    let mut a = [0u8; 8];
    a.copy_from_slice(&wrapped_key[..8]);
    let mut r: Vec<[u8; 8]> = wrapped_key[8..]
        .chunks_exact(8)
        .map(|chunk| {
            let mut block = [0u8; 8];
            block.copy_from_slice(chunk);
            block
        })
        .collect();

    for j in (0..6).rev() {
        for i in (0..n).rev() {
            let t = (n * j + i + 1) as u64;
            for (byte, t_byte) in a.iter_mut().zip(t.to_be_bytes()) {
                *byte ^= t_byte;
            }
            let mut block = GenericArray::clone_from_slice(&[a, r[i]].concat());
            cipher.decrypt_block(&mut block);

            a.copy_from_slice(&block[..8]);
            r[i].copy_from_slice(&block[8..]);
        }
    }

    if a != DEFAULT_IV {
        return Err(DlmsError::Security(
            "Key unwrapping failed: integrity check mismatch".to_string(),
        ));
    }
    Ok(r.concat())
}
