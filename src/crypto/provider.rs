//! Host cryptographic provider
//!
//! Everything that touches randomness or a primitive goes through
//! [`CryptoProvider`], so the engine never reaches for process-wide state and
//! tests can substitute a deterministic implementation.

use async_trait::async_trait;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use super::{DerivedKey, KeyMaterial, KeyUsage, DIGEST_LEN, IV_LEN, KEY_LEN};
use crate::error::{AegisError, Result};

#[async_trait]
pub trait CryptoProvider: Send + Sync {
    /// Fill `buf` from a cryptographically secure generator
    fn fill_random(&self, buf: &mut [u8]) -> Result<()>;

    fn sha256(&self, data: &[u8]) -> Result<[u8; DIGEST_LEN]>;

    /// PBKDF2-HMAC-SHA256 into a key usable only for `usage`
    async fn pbkdf2_sha256(
        &self,
        material: &KeyMaterial,
        salt: &[u8],
        iterations: u32,
        usage: KeyUsage,
    ) -> Result<DerivedKey>;

    /// AES-256-GCM encrypt; the tag is appended to the returned ciphertext
    async fn seal(&self, key: &DerivedKey, iv: &[u8; IV_LEN], plaintext: &[u8]) -> Result<Vec<u8>>;

    /// AES-256-GCM decrypt; any tag failure is [`AegisError::Authentication`]
    async fn open(&self, key: &DerivedKey, iv: &[u8; IV_LEN], ciphertext: &[u8])
        -> Result<Vec<u8>>;
}

/// Provider backed by the OS RNG and the RustCrypto primitives
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemProvider;

#[async_trait]
impl CryptoProvider for SystemProvider {
    fn fill_random(&self, buf: &mut [u8]) -> Result<()> {
        OsRng
            .try_fill_bytes(buf)
            .map_err(|e| AegisError::Random(e.to_string()))
    }

    fn sha256(&self, data: &[u8]) -> Result<[u8; DIGEST_LEN]> {
        Ok(Sha256::digest(data).into())
    }

    async fn pbkdf2_sha256(
        &self,
        material: &KeyMaterial,
        salt: &[u8],
        iterations: u32,
        usage: KeyUsage,
    ) -> Result<DerivedKey> {
        let material = material.clone();
        let salt = salt.to_vec();

        // 100k HMAC rounds would stall the runtime thread
        tokio::task::spawn_blocking(move || {
            let mut raw = Zeroizing::new([0u8; KEY_LEN]);
            pbkdf2::pbkdf2_hmac::<Sha256>(material.as_bytes(), &salt, iterations, &mut raw[..]);
            DerivedKey::from_raw(raw, usage)
        })
        .await
        .map_err(|e| AegisError::Derivation(format!("derivation task failed: {}", e)))?
    }

    async fn seal(&self, key: &DerivedKey, iv: &[u8; IV_LEN], plaintext: &[u8]) -> Result<Vec<u8>> {
        key.seal(iv, plaintext)
    }

    async fn open(
        &self,
        key: &DerivedKey,
        iv: &[u8; IV_LEN],
        ciphertext: &[u8],
    ) -> Result<Vec<u8>> {
        key.open(iv, ciphertext)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_known_vector() {
        let digest = SystemProvider.sha256(b"abc").unwrap();
        assert_eq!(
            hex::encode(digest),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_random_fills_differ() {
        let mut a = [0u8; 32];
        let mut b = [0u8; 32];
        SystemProvider.fill_random(&mut a).unwrap();
        SystemProvider.fill_random(&mut b).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_counting_provider_is_distinct_per_call() {
        let provider = testing::CountingProvider::default();
        let mut a = [0u8; IV_LEN];
        let mut b = [0u8; IV_LEN];
        provider.fill_random(&mut a).unwrap();
        provider.fill_random(&mut b).unwrap();
        assert_ne!(a, b);
    }
}
