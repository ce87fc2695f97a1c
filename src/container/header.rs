//! Container header: `Magic ‖ Version ‖ Salt`
//!
//! Layout:
//! [5 bytes: "AEGIS"]
//! [1 byte: version]
//! [16 bytes (v1) or 32 bytes (v2): salt]

use crate::error::{FormatError, Result};

/// `0x41 0x45 0x47 0x49 0x53`
pub const MAGIC: [u8; 5] = *b"AEGIS";

/// Magic plus version byte
pub const PREAMBLE_LEN: usize = MAGIC.len() + 1;

/// Salt length of the legacy whole-file format
pub const LEGACY_SALT_LEN: usize = 16;

/// Salt length of the chunked format
pub const CHUNKED_SALT_LEN: usize = 32;

/// Container format versions, dispatched on the version byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatVersion {
    /// Single IV over the whole payload: `Salt(16) ‖ IV ‖ Ciphertext‖Tag`.
    /// Decode only.
    Legacy = 0x01,
    /// Repeated chunk frames after a 32-byte salt
    Chunked = 0x02,
}

impl FormatVersion {
    /// Version written by the encoder
    pub const CURRENT: FormatVersion = FormatVersion::Chunked;

    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x01 => Some(Self::Legacy),
            0x02 => Some(Self::Chunked),
            _ => None,
        }
    }

    pub fn as_byte(self) -> u8 {
        self as u8
    }

    pub fn salt_len(self) -> usize {
        match self {
            Self::Legacy => LEGACY_SALT_LEN,
            Self::Chunked => CHUNKED_SALT_LEN,
        }
    }

    pub fn header_len(self) -> usize {
        PREAMBLE_LEN + self.salt_len()
    }
}

impl std::fmt::Display for FormatVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Legacy => write!(f, "1 (legacy, whole-file)"),
            Self::Chunked => write!(f, "2 (chunked)"),
        }
    }
}

/// Parsed header, borrowing from the container buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header<'a> {
    pub version: FormatVersion,
    pub salt: &'a [u8],
}

impl<'a> Header<'a> {
    pub fn len(&self) -> usize {
        self.version.header_len()
    }
}

/// Serialize a chunked-format header for `salt`
pub fn build_header(salt: &[u8; CHUNKED_SALT_LEN]) -> Vec<u8> {
    let mut out = Vec::with_capacity(FormatVersion::CURRENT.header_len());
    out.extend_from_slice(&MAGIC);
    out.push(FormatVersion::CURRENT.as_byte());
    out.extend_from_slice(salt);
    out
}

/// Parse and validate the header at the start of `data`.
///
/// Checks run in wire order: magic, then version, then salt length, so an
/// unknown version is reported even when the rest of the input is garbage.
/// Returns the header and the bytes that follow it.
pub fn parse_header(data: &[u8], accept_legacy: bool) -> Result<(Header<'_>, &[u8])> {
    if data.len() < MAGIC.len() || data[..MAGIC.len()] != MAGIC {
        let found = data[..data.len().min(MAGIC.len())].to_vec();
        return Err(FormatError::UnrecognizedMagic {
            expected: MAGIC,
            found,
        }
        .into());
    }

    let byte = *data.get(MAGIC.len()).ok_or_else(|| {
        FormatError::TruncatedOrCorrupt("version byte missing after magic".into())
    })?;

    let version = match FormatVersion::from_byte(byte) {
        Some(FormatVersion::Legacy) if !accept_legacy => None,
        other => other,
    }
    .ok_or_else(|| FormatError::UnsupportedVersion(byte, supported_versions(accept_legacy)))?;

    let header_len = version.header_len();
    if data.len() < header_len {
        return Err(FormatError::TruncatedOrCorrupt(format!(
            "header needs {} bytes for version {}, found {}",
            header_len,
            version.as_byte(),
            data.len()
        ))
        .into());
    }

    let header = Header {
        version,
        salt: &data[PREAMBLE_LEN..header_len],
    };
    Ok((header, &data[header_len..]))
}

fn supported_versions(accept_legacy: bool) -> String {
    if accept_legacy {
        format!(
            "{}, {}",
            FormatVersion::Legacy.as_byte(),
            FormatVersion::Chunked.as_byte()
        )
    } else {
        FormatVersion::Chunked.as_byte().to_string()
    }
}
