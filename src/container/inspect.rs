//! Credential-free structural summary of a container

use super::frame::Frames;
use super::header::{parse_header, FormatVersion};
use crate::crypto::TAG_LEN;
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerSummary {
    pub version: FormatVersion,
    pub salt: Vec<u8>,
    pub header_len: usize,
    pub frame_count: usize,
    /// Sum of ciphertext+tag bytes across all frames
    pub ciphertext_len: u64,
    /// Plaintext length the container decrypts to if authentic
    pub plaintext_len: u64,
    pub largest_chunk: usize,
}

/// Walk the header and every frame, validating structure only.
pub fn inspect(container: &[u8], accept_legacy: bool) -> Result<ContainerSummary> {
    let (header, rest) = parse_header(container, accept_legacy)?;

    let mut summary = ContainerSummary {
        version: header.version,
        salt: header.salt.to_vec(),
        header_len: header.len(),
        frame_count: 0,
        ciphertext_len: 0,
        plaintext_len: 0,
        largest_chunk: 0,
    };

    match header.version {
        FormatVersion::Legacy => {
            let (_, ciphertext) = super::legacy_body(rest)?;
            summary.frame_count = 1;
            summary.ciphertext_len = ciphertext.len() as u64;
            summary.plaintext_len = (ciphertext.len() - TAG_LEN) as u64;
            summary.largest_chunk = ciphertext.len() - TAG_LEN;
        }
        FormatVersion::Chunked => {
            for frame in Frames::new(rest, 0) {
                let frame = frame?;
                summary.frame_count += 1;
                summary.ciphertext_len += frame.ciphertext.len() as u64;
                summary.plaintext_len += frame.plaintext_len() as u64;
                summary.largest_chunk = summary.largest_chunk.max(frame.plaintext_len());
            }
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::{append_frame, build_header, CHUNKED_SALT_LEN};
    use crate::crypto::IV_LEN;
    use crate::error::{AegisError, FormatError};

    #[test]
    fn test_summary_of_chunked_container() {
        let salt = [3u8; CHUNKED_SALT_LEN];
        let mut data = build_header(&salt);
        append_frame(&mut data, &[1u8; IV_LEN], &[0u8; 100 + TAG_LEN]).unwrap();
        append_frame(&mut data, &[2u8; IV_LEN], &[0u8; 40 + TAG_LEN]).unwrap();

        let summary = inspect(&data, true).unwrap();
        assert_eq!(summary.version, FormatVersion::Chunked);
        assert_eq!(summary.salt, salt.to_vec());
        assert_eq!(summary.frame_count, 2);
        assert_eq!(summary.plaintext_len, 140);
        assert_eq!(summary.ciphertext_len, 140 + 2 * TAG_LEN as u64);
        assert_eq!(summary.largest_chunk, 100);
    }

    #[test]
    fn test_header_only_container() {
        let data = build_header(&[1u8; CHUNKED_SALT_LEN]);
        let summary = inspect(&data, true).unwrap();
        assert_eq!(summary.frame_count, 0);
        assert_eq!(summary.plaintext_len, 0);
    }

    #[test]
    fn test_corrupt_frame_surfaces() {
        let mut data = build_header(&[1u8; CHUNKED_SALT_LEN]);
        data.extend_from_slice(&1000u32.to_le_bytes());
        data.extend_from_slice(&[0u8; 50]);
        assert!(matches!(
            inspect(&data, true),
            Err(AegisError::Format(FormatError::TruncatedOrCorrupt(_)))
        ));
    }
}
