//! PBKDF2-HMAC-SHA256 key derivation
//!
//! The derived key is bound to AES-256-GCM and to one direction at creation
//! time. Raw key bytes exist only inside the derivation call and are wiped
//! as soon as the cipher is keyed; nothing hands them back out.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use zeroize::Zeroizing;

use super::{CryptoProvider, KeyMaterial, IV_LEN, KEY_LEN};
use crate::container::{FormatVersion, CHUNKED_SALT_LEN};
use crate::error::{AegisError, Result};

/// Default PBKDF2 iteration count
pub const PBKDF2_ITERATIONS: u32 = 100_000;

/// Which way a key may be used. A key never serves both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyUsage {
    Encrypt,
    Decrypt,
}

impl KeyUsage {
    fn as_str(self) -> &'static str {
        match self {
            KeyUsage::Encrypt => "encryption",
            KeyUsage::Decrypt => "decryption",
        }
    }
}

/// Non-extractable AES-256-GCM key for a single stream operation
pub struct DerivedKey {
    cipher: Aes256Gcm,
    usage: KeyUsage,
}

impl DerivedKey {
    /// Key the cipher from `raw`, which is wiped when dropped here
    pub fn from_raw(raw: Zeroizing<[u8; KEY_LEN]>, usage: KeyUsage) -> Result<Self> {
        let cipher = Aes256Gcm::new_from_slice(&raw[..])
            .map_err(|e| AegisError::Derivation(format!("cannot key AES-256-GCM: {}", e)))?;
        Ok(Self { cipher, usage })
    }

    pub fn usage(&self) -> KeyUsage {
        self.usage
    }

    fn require(&self, requested: KeyUsage) -> Result<&Aes256Gcm> {
        if self.usage != requested {
            return Err(AegisError::KeyUsage {
                actual: self.usage.as_str(),
                requested: match requested {
                    KeyUsage::Encrypt => "encrypt",
                    KeyUsage::Decrypt => "decrypt",
                },
            });
        }
        Ok(&self.cipher)
    }

    pub(crate) fn seal(&self, iv: &[u8; IV_LEN], plaintext: &[u8]) -> Result<Vec<u8>> {
        self.require(KeyUsage::Encrypt)?
            .encrypt(Nonce::from_slice(iv), plaintext)
            .map_err(|e| AegisError::Encryption(e.to_string()))
    }

    pub(crate) fn open(&self, iv: &[u8; IV_LEN], ciphertext: &[u8]) -> Result<Vec<u8>> {
        self.require(KeyUsage::Decrypt)?
            .decrypt(Nonce::from_slice(iv), ciphertext)
            .map_err(|_| AegisError::Authentication)
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DerivedKey")
            .field("usage", &self.usage)
            .field("key", &"[REDACTED]")
            .finish()
    }
}

/// Fresh salt for a new chunked container
pub fn generate_salt(provider: &dyn CryptoProvider) -> Result<[u8; CHUNKED_SALT_LEN]> {
    let mut salt = [0u8; CHUNKED_SALT_LEN];
    provider.fill_random(&mut salt)?;
    Ok(salt)
}

/// Derive the key for one stream operation.
///
/// The salt must have exactly the length `version` defines.
pub async fn derive_key(
    provider: &dyn CryptoProvider,
    material: &KeyMaterial,
    salt: &[u8],
    version: FormatVersion,
    iterations: u32,
    usage: KeyUsage,
) -> Result<DerivedKey> {
    if salt.len() != version.salt_len() {
        return Err(AegisError::Derivation(format!(
            "salt for format version {} must be {} bytes, got {}",
            version.as_byte(),
            version.salt_len(),
            salt.len()
        )));
    }
    if iterations == 0 {
        return Err(AegisError::Derivation(
            "iteration count must be positive".into(),
        ));
    }

    let key = provider
        .pbkdf2_sha256(material, salt, iterations, usage)
        .await?;

    tracing::debug!(
        version = version.as_byte(),
        iterations,
        usage = ?usage,
        "derived stream key"
    );
    Ok(key)
}
