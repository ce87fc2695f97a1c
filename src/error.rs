use thiserror::Error;

pub type Result<T> = std::result::Result<T, AegisError>;

/// Structural problems with a container, reported before any key is derived
/// (header) or before any decrypt call (frames).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("not an AEGIS container: expected magic {expected:02x?}, found {found:02x?}")]
    UnrecognizedMagic { expected: [u8; 5], found: Vec<u8> },

    #[error("unsupported container version {0} (supported: {1})")]
    UnsupportedVersion(u8, String),

    #[error("container is truncated or corrupt: {0}")]
    TruncatedOrCorrupt(String),
}

#[derive(Debug, Error)]
pub enum AegisError {
    #[error("{0}")]
    Format(#[from] FormatError),

    /// Deliberately generic: wrong password, wrong keyfile and tampering look the same.
    #[error("decryption failed: wrong password or keyfile, or the file is damaged")]
    Authentication,

    #[error("key derivation failed: {0}")]
    Derivation(String),

    #[error("operation cancelled")]
    Cancelled,

    #[error("key was derived for {actual} and cannot be used to {requested}")]
    KeyUsage {
        actual: &'static str,
        requested: &'static str,
    },

    #[error("secure random source unavailable: {0}")]
    Random(String),

    #[error("encryption failed: {0}")]
    Encryption(String),

    #[error("password is too short (minimum {0} characters)")]
    PasswordTooShort(usize),

    #[error("passwords do not match")]
    PasswordMismatch,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AegisError {
    /// True for the one error that must stop a whole batch.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, AegisError::Cancelled)
    }
}
