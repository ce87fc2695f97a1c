//! Binary container format
//!
//! Chunked container (version 2):
//! [5 bytes: "AEGIS"][1 byte: 0x02][32 bytes: salt]
//! then per chunk: [4 bytes: length LE][12 bytes: IV][ciphertext + 16 byte tag]
//!
//! Legacy container (version 1, decode only):
//! [5 bytes: "AEGIS"][1 byte: 0x01][16 bytes: salt][12 bytes: IV][ciphertext + tag]

mod frame;
mod header;
mod inspect;

pub use frame::{
    append_frame, frame_chunk, parse_next_frame, Frame, Frames, LENGTH_PREFIX_LEN, MIN_FRAME_LEN,
};
pub use header::{
    build_header, parse_header, FormatVersion, Header, CHUNKED_SALT_LEN, LEGACY_SALT_LEN, MAGIC,
    PREAMBLE_LEN,
};
pub use inspect::{inspect, ContainerSummary};

use crate::crypto::{IV_LEN, TAG_LEN};
use crate::error::{FormatError, Result};

/// Split the body of a legacy container into its single IV and ciphertext
pub(crate) fn legacy_body(rest: &[u8]) -> Result<(&[u8; IV_LEN], &[u8])> {
    if rest.len() < IV_LEN + TAG_LEN {
        return Err(FormatError::TruncatedOrCorrupt(format!(
            "legacy payload needs at least {} bytes, found {}",
            IV_LEN + TAG_LEN,
            rest.len()
        ))
        .into());
    }
    let (iv, ciphertext) = rest.split_at(IV_LEN);
    let iv = iv
        .try_into()
        .map_err(|_| FormatError::TruncatedOrCorrupt("legacy IV is malformed".into()))?;
    Ok((iv, ciphertext))
}
