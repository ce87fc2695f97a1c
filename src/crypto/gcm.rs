//! AES-256-GCM per-chunk encryption
//!
//! Every `encrypt` call draws a new 96-bit IV from the provider's CSPRNG.
//! Chunk counts per container stay far below the birthday bound for random
//! 96-bit nonces, so no counter state is kept.

use super::{CryptoProvider, DerivedKey, IV_LEN, TAG_LEN};
use crate::error::{AegisError, Result};

/// Chunk-level AEAD bound to one stream's key
pub struct ChunkCipher<'a> {
    provider: &'a dyn CryptoProvider,
    key: &'a DerivedKey,
}

impl<'a> ChunkCipher<'a> {
    pub fn new(provider: &'a dyn CryptoProvider, key: &'a DerivedKey) -> Self {
        Self { provider, key }
    }

    /// Encrypt one chunk under a fresh IV.
    ///
    /// Returns `(iv, ciphertext‖tag)`; the ciphertext is `plaintext.len() + 16` bytes.
    pub async fn encrypt(&self, plaintext: &[u8]) -> Result<([u8; IV_LEN], Vec<u8>)> {
        let mut iv = [0u8; IV_LEN];
        self.provider.fill_random(&mut iv)?;

        let ciphertext = self.provider.seal(self.key, &iv, plaintext).await?;
        debug_assert_eq!(ciphertext.len(), plaintext.len() + TAG_LEN);

        Ok((iv, ciphertext))
    }

    /// Decrypt one chunk.
    ///
    /// # Errors
    /// [`AegisError::Authentication`] when the tag does not verify, whatever
    /// the reason (wrong password, wrong keyfile, modified bytes).
    pub async fn decrypt(&self, iv: &[u8; IV_LEN], ciphertext: &[u8]) -> Result<Vec<u8>> {
        if ciphertext.len() < TAG_LEN {
            return Err(AegisError::Authentication);
        }
        self.provider.open(self.key, iv, ciphertext).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{KeyUsage, SystemProvider, KEY_LEN};
    use zeroize::Zeroizing;

    fn keys(byte: u8) -> (DerivedKey, DerivedKey) {
        (
            DerivedKey::from_raw(Zeroizing::new([byte; KEY_LEN]), KeyUsage::Encrypt).unwrap(),
            DerivedKey::from_raw(Zeroizing::new([byte; KEY_LEN]), KeyUsage::Decrypt).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_encrypt_decrypt_roundtrip() {
        let (enc, dec) = keys(0x42);
        let plaintext = b"Hello, World! This is secret data.";

        let (iv, ciphertext) = ChunkCipher::new(&SystemProvider, &enc)
            .encrypt(plaintext)
            .await
            .unwrap();
        assert_eq!(ciphertext.len(), plaintext.len() + TAG_LEN);

        let decrypted = ChunkCipher::new(&SystemProvider, &dec)
            .decrypt(&iv, &ciphertext)
            .await
            .unwrap();
        assert_eq!(decrypted, plaintext);
    }

    #[tokio::test]
    async fn test_wrong_key_fails() {
        let (enc, _) = keys(0x42);
        let (_, other) = keys(0x43);

        let (iv, ciphertext) = ChunkCipher::new(&SystemProvider, &enc)
            .encrypt(b"Secret")
            .await
            .unwrap();
        let result = ChunkCipher::new(&SystemProvider, &other)
            .decrypt(&iv, &ciphertext)
            .await;
        assert!(matches!(result, Err(AegisError::Authentication)));
    }

    #[tokio::test]
    async fn test_tampered_tag_fails() {
        let (enc, dec) = keys(0x42);
        let (iv, mut ciphertext) = ChunkCipher::new(&SystemProvider, &enc)
            .encrypt(b"Secret")
            .await
            .unwrap();
        let last = ciphertext.len() - 1;
        ciphertext[last] ^= 0x01;

        let result = ChunkCipher::new(&SystemProvider, &dec)
            .decrypt(&iv, &ciphertext)
            .await;
        assert!(matches!(result, Err(AegisError::Authentication)));
    }

    #[tokio::test]
    async fn test_fresh_iv_per_call() {
        let (enc, _) = keys(0x42);
        let cipher = ChunkCipher::new(&SystemProvider, &enc);

        let (iv1, ct1) = cipher.encrypt(b"Same message").await.unwrap();
        let (iv2, ct2) = cipher.encrypt(b"Same message").await.unwrap();
        assert_ne!(iv1, iv2);
        assert_ne!(ct1, ct2);
    }

    #[tokio::test]
    async fn test_short_ciphertext_is_authentication_failure() {
        let (_, dec) = keys(0x42);
        let result = ChunkCipher::new(&SystemProvider, &dec)
            .decrypt(&[0u8; IV_LEN], &[1, 2, 3])
            .await;
        assert!(matches!(result, Err(AegisError::Authentication)));
    }
}
