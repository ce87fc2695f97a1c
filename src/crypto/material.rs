//! Credentials and the key material derived from them
//!
//! KeyMaterial = password bytes, or password bytes ‖ SHA-256(keyfile).
//! Hashing the keyfile pins its contribution to 32 bytes whatever its size.

use secrecy::{ExposeSecret, SecretString};

use super::{CryptoProvider, SecureBytes, DIGEST_LEN};
use crate::error::Result;

/// Password plus optional keyfile for one operation
pub struct Credential {
    password: SecretString,
    keyfile: Option<SecureBytes>,
}

impl Credential {
    pub fn new(password: impl Into<String>) -> Self {
        Self {
            password: SecretString::new(password.into()),
            keyfile: None,
        }
    }

    /// Add a keyfile as the second factor
    pub fn with_keyfile(mut self, keyfile: impl Into<SecureBytes>) -> Self {
        self.keyfile = Some(keyfile.into());
        self
    }

    pub fn has_keyfile(&self) -> bool {
        self.keyfile.is_some()
    }

    pub(crate) fn password_bytes(&self) -> &[u8] {
        self.password.expose_secret().as_bytes()
    }

    pub(crate) fn keyfile(&self) -> Option<&[u8]> {
        self.keyfile.as_deref()
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("password", &"[REDACTED]")
            .field("keyfile", &self.keyfile.as_ref().map(|k| k.len()))
            .finish()
    }
}

/// Raw KDF input
#[derive(Clone, Debug)]
pub struct KeyMaterial(SecureBytes);

impl KeyMaterial {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Assemble the KDF input for `credential`
pub fn build_key_material(
    provider: &dyn CryptoProvider,
    credential: &Credential,
) -> Result<KeyMaterial> {
    let password = credential.password_bytes();

    let Some(keyfile) = credential.keyfile() else {
        return Ok(KeyMaterial(SecureBytes::from(password)));
    };

    let mut digest = provider.sha256(keyfile)?;
    let mut material = SecureBytes::with_capacity(password.len() + DIGEST_LEN);
    material.extend_from_slice(password);
    material.extend_from_slice(&digest);
    zeroize::Zeroize::zeroize(&mut digest);

    Ok(KeyMaterial(material))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::provider::testing::NoDigestProvider;
    use crate::crypto::SystemProvider;
    use crate::error::AegisError;

    #[test]
    fn test_password_only() {
        let m = build_key_material(&SystemProvider, &Credential::new("strongPassword123")).unwrap();
        assert_eq!(m.as_bytes(), b"strongPassword123");
    }

    #[test]
    fn test_keyfile_contributes_its_digest() {
        let keyfile = vec![0xABu8; 10_000];
        let credential = Credential::new("pw").with_keyfile(keyfile.clone());
        let m = build_key_material(&SystemProvider, &credential).unwrap();

        assert_eq!(m.len(), 2 + DIGEST_LEN);
        assert_eq!(&m.as_bytes()[..2], b"pw");
        assert_eq!(&m.as_bytes()[2..], &SystemProvider.sha256(&keyfile).unwrap());
    }

    #[test]
    fn test_deterministic_and_keyfile_sensitive() {
        let with_keyfile = |keyfile: &[u8]| {
            let credential = Credential::new("pw").with_keyfile(keyfile);
            build_key_material(&SystemProvider, &credential).unwrap()
        };
        let a1 = with_keyfile(b"A");
        let a2 = with_keyfile(b"A");
        let b = with_keyfile(b"B");
        assert_eq!(a1.as_bytes(), a2.as_bytes());
        assert_ne!(a1.as_bytes(), b.as_bytes());
    }

    #[test]
    fn test_digest_failure_is_derivation_error() {
        let credential = Credential::new("pw").with_keyfile(&b"A"[..]);
        let result = build_key_material(&NoDigestProvider, &credential);
        assert!(matches!(result, Err(AegisError::Derivation(_))));
    }

    #[test]
    fn test_debug_hides_password() {
        let printed = format!("{:?}", Credential::new("hunter2hunter2"));
        assert!(!printed.contains("hunter2"));
    }
}
