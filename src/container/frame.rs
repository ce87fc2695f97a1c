//! Chunk frames: `Length(4, LE) ‖ IV(12) ‖ Ciphertext‖Tag`
//!
//! `Length` counts the IV and the ciphertext with its tag, not itself.

use crate::crypto::{IV_LEN, TAG_LEN};
use crate::error::{FormatError, Result};

/// Size of the little-endian length prefix
pub const LENGTH_PREFIX_LEN: usize = 4;

/// Smallest legal declared length: IV plus the tag of an empty chunk
pub const MIN_FRAME_LEN: usize = IV_LEN + TAG_LEN;

/// One frame, borrowed from the container buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame<'a> {
    pub iv: &'a [u8; IV_LEN],
    pub ciphertext: &'a [u8],
}

impl<'a> Frame<'a> {
    /// Bytes this frame occupies on the wire, prefix included
    pub fn wire_len(&self) -> usize {
        LENGTH_PREFIX_LEN + IV_LEN + self.ciphertext.len()
    }

    /// Plaintext length implied by the ciphertext
    pub fn plaintext_len(&self) -> usize {
        self.ciphertext.len() - TAG_LEN
    }
}

/// Serialize one frame
pub fn frame_chunk(iv: &[u8; IV_LEN], ciphertext: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(LENGTH_PREFIX_LEN + IV_LEN + ciphertext.len());
    append_frame(&mut out, iv, ciphertext)?;
    Ok(out)
}

/// Serialize one frame straight onto the end of `out`
pub fn append_frame(out: &mut Vec<u8>, iv: &[u8; IV_LEN], ciphertext: &[u8]) -> Result<()> {
    let declared = u32::try_from(IV_LEN + ciphertext.len()).map_err(|_| {
        FormatError::TruncatedOrCorrupt(format!(
            "chunk of {} bytes does not fit a 32-bit frame length",
            ciphertext.len()
        ))
    })?;

    out.reserve(LENGTH_PREFIX_LEN + declared as usize);
    out.extend_from_slice(&declared.to_le_bytes());
    out.extend_from_slice(iv);
    out.extend_from_slice(ciphertext);
    Ok(())
}

/// Parse the frame starting at `offset`.
///
/// The declared length is checked against the bytes actually left in
/// `buffer` before anything is sliced, so a hostile length can neither read
/// out of bounds nor trigger a large allocation.
pub fn parse_next_frame(buffer: &[u8], offset: usize) -> Result<(Frame<'_>, usize)> {
    let remaining = buffer.len().checked_sub(offset).ok_or_else(|| {
        FormatError::TruncatedOrCorrupt(format!(
            "frame offset {} is past the end of a {}-byte buffer",
            offset,
            buffer.len()
        ))
    })?;

    if remaining < LENGTH_PREFIX_LEN {
        return Err(FormatError::TruncatedOrCorrupt(format!(
            "{} trailing bytes at offset {} are too short for a frame length",
            remaining, offset
        ))
        .into());
    }

    let mut prefix = [0u8; LENGTH_PREFIX_LEN];
    prefix.copy_from_slice(&buffer[offset..offset + LENGTH_PREFIX_LEN]);
    let declared = u32::from_le_bytes(prefix) as usize;

    if declared < MIN_FRAME_LEN {
        return Err(FormatError::TruncatedOrCorrupt(format!(
            "frame at offset {} declares {} bytes, minimum is {}",
            offset, declared, MIN_FRAME_LEN
        ))
        .into());
    }

    let available = remaining - LENGTH_PREFIX_LEN;
    if declared > available {
        return Err(FormatError::TruncatedOrCorrupt(format!(
            "frame at offset {} declares {} bytes but only {} remain",
            offset, declared, available
        ))
        .into());
    }

    let body_start = offset + LENGTH_PREFIX_LEN;
    let body = &buffer[body_start..body_start + declared];
    let (iv, ciphertext) = body.split_at(IV_LEN);
    let iv: &[u8; IV_LEN] = iv
        .try_into()
        .map_err(|_| FormatError::TruncatedOrCorrupt("frame IV is malformed".into()))?;

    Ok((Frame { iv, ciphertext }, body_start + declared))
}

/// Iterator over the frames of a chunked payload.
///
/// Stops after the first error.
pub struct Frames<'a> {
    buffer: &'a [u8],
    offset: usize,
    failed: bool,
}

impl<'a> Frames<'a> {
    pub fn new(buffer: &'a [u8], offset: usize) -> Self {
        Self {
            buffer,
            offset,
            failed: false,
        }
    }

    /// Offset of the next unread byte
    pub fn offset(&self) -> usize {
        self.offset
    }
}

impl<'a> Iterator for Frames<'a> {
    type Item = Result<Frame<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.offset >= self.buffer.len() {
            return None;
        }

        match parse_next_frame(self.buffer, self.offset) {
            Ok((frame, next)) => {
                self.offset = next;
                Some(Ok(frame))
            }
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AegisError;

    fn is_truncated<T: std::fmt::Debug>(result: Result<T>) -> bool {
        matches!(result, Err(AegisError::Format(FormatError::TruncatedOrCorrupt(_))))
    }

    #[test]
    fn test_frame_layout() {
        let iv = [9u8; IV_LEN];
        let ciphertext = [0xCCu8; 20];
        let wire = frame_chunk(&iv, &ciphertext).unwrap();

        assert_eq!(&wire[..4], &32u32.to_le_bytes());
        assert_eq!(&wire[4..16], &iv);
        assert_eq!(&wire[16..], &ciphertext);
    }

    #[test]
    fn test_iterate_frames_in_order() {
        let mut buffer = b"HEAD".to_vec();
        for i in 0..3u8 {
            append_frame(&mut buffer, &[i; IV_LEN], &vec![i; TAG_LEN + i as usize]).unwrap();
        }

        let frames: Vec<_> = Frames::new(&buffer, 4).collect::<Result<_>>().unwrap();
        assert_eq!(frames.len(), 3);
        for (i, frame) in frames.iter().enumerate() {
            assert_eq!(frame.iv, &[i as u8; IV_LEN]);
            assert_eq!(frame.plaintext_len(), i);
        }
    }

    #[test]
    fn test_declared_length_past_end() {
        let mut buffer = frame_chunk(&[1u8; IV_LEN], &[2u8; 40]).unwrap();
        buffer.truncate(buffer.len() - 1);
        assert!(is_truncated(parse_next_frame(&buffer, 0)));
    }

    #[test]
    fn test_huge_declared_length_is_rejected() {
        let mut buffer = u32::MAX.to_le_bytes().to_vec();
        buffer.extend_from_slice(&[0u8; 64]);
        assert!(is_truncated(parse_next_frame(&buffer, 0)));
    }

    #[test]
    fn test_length_shorter_than_iv_and_tag() {
        let mut buffer = 11u32.to_le_bytes().to_vec();
        buffer.extend_from_slice(&[0u8; 64]);
        assert!(is_truncated(parse_next_frame(&buffer, 0)));
    }

    #[test]
    fn test_dangling_length_bytes() {
        let mut buffer = frame_chunk(&[1u8; IV_LEN], &[2u8; TAG_LEN]).unwrap();
        buffer.extend_from_slice(&[0x10, 0x00]);

        let mut frames = Frames::new(&buffer, 0);
        assert!(frames.next().unwrap().is_ok());
        assert!(is_truncated(frames.next().unwrap()));
        assert!(frames.next().is_none());
    }

    #[test]
    fn test_offset_past_end() {
        assert!(is_truncated(parse_next_frame(b"abc", 10)));
    }
}
