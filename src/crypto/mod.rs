//! Cryptographic primitives for aegis containers
//!
//! This module provides:
//! - Key material assembly from a password and optional keyfile
//! - PBKDF2-HMAC-SHA256 key derivation into direction-bound AES-256-GCM keys
//! - Per-chunk AES-256-GCM with a fresh random IV per call
//! - The injectable provider that owns randomness, digests, KDF and AEAD
//! - Secure memory handling with automatic zeroing

mod gcm;
mod material;
mod pbkdf;
mod provider;
mod secure_bytes;

pub use gcm::ChunkCipher;
pub use material::{build_key_material, Credential, KeyMaterial};
pub use pbkdf::{derive_key, generate_salt, DerivedKey, KeyUsage, PBKDF2_ITERATIONS};
pub use provider::{CryptoProvider, SystemProvider};
pub use secure_bytes::SecureBytes;

#[cfg(test)]
pub(crate) use provider::testing;

/// AES-256 key length (256 bits)
pub const KEY_LEN: usize = 32;

/// GCM nonce length (96 bits)
pub const IV_LEN: usize = 12;

/// GCM authentication tag length (128 bits)
pub const TAG_LEN: usize = 16;

/// SHA-256 output length
pub const DIGEST_LEN: usize = 32;
