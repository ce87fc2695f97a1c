//! Zeroizing byte buffer for passwords, keyfiles and key material
//!
//! Buffers are wiped on drop, never printed by `Debug`, and pinned in RAM
//! (best effort) so they do not end up in swap.

use std::ops::Deref;
use zeroize::Zeroize;

/// Sensitive bytes that are zeroed when dropped
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct SecureBytes(Vec<u8>);

impl SecureBytes {
    /// Take ownership of `data`; the caller's copy is gone after this
    pub fn new(data: Vec<u8>) -> Self {
        let secure = Self(data);
        secure.lock_memory();
        secure
    }

    /// Empty buffer with room for `capacity` bytes, so appends never reallocate
    /// (a reallocation would leave an unzeroed copy behind)
    pub fn with_capacity(capacity: usize) -> Self {
        Self::new(Vec::with_capacity(capacity))
    }

    /// Append bytes. Callers size the buffer up front with `with_capacity`.
    pub fn extend_from_slice(&mut self, bytes: &[u8]) {
        debug_assert!(
            self.0.capacity() - self.0.len() >= bytes.len(),
            "SecureBytes grew past its reserved capacity"
        );
        self.0.extend_from_slice(bytes);
    }

    #[cfg(unix)]
    fn lock_memory(&self) {
        if self.0.capacity() == 0 {
            return;
        }
        // mlock may fail without CAP_IPC_LOCK or over RLIMIT_MEMLOCK; ignored
        unsafe {
            libc::mlock(self.0.as_ptr() as *const libc::c_void, self.0.capacity());
        }
    }

    #[cfg(not(unix))]
    fn lock_memory(&self) {}

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Deref for SecureBytes {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Clone for SecureBytes {
    fn clone(&self) -> Self {
        let mut copy = Self::with_capacity(self.0.len());
        copy.extend_from_slice(&self.0);
        copy
    }
}

impl From<Vec<u8>> for SecureBytes {
    fn from(data: Vec<u8>) -> Self {
        Self::new(data)
    }
}

impl From<&[u8]> for SecureBytes {
    fn from(data: &[u8]) -> Self {
        Self::new(data.to_vec())
    }
}

impl Default for SecureBytes {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl std::fmt::Debug for SecureBytes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecureBytes")
            .field("len", &self.0.len())
            .field("data", &"[REDACTED]")
            .finish()
    }
}
