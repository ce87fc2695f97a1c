//! Output file names
//!
//! Encryption appends `.aegis`; decryption strips it. Names without the
//! extension get `.decrypted` so the input is never overwritten.

/// Extension marking an encrypted container
pub const EXTENSION: &str = ".aegis";

const DECRYPTED_SUFFIX: &str = ".decrypted";

pub fn encrypted_name(original: &str) -> String {
    format!("{}{}", original, EXTENSION)
}

pub fn decrypted_name(container: &str) -> String {
    match container.strip_suffix(EXTENSION) {
        Some(stem) if !stem.is_empty() => stem.to_string(),
        _ => format!("{}{}", container, DECRYPTED_SUFFIX),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_and_strip() {
        assert_eq!(encrypted_name("report.pdf"), "report.pdf.aegis");
        assert_eq!(decrypted_name("report.pdf.aegis"), "report.pdf");
        assert_eq!(decrypted_name(&encrypted_name("a")), "a");
    }

    #[test]
    fn test_without_extension() {
        assert_eq!(decrypted_name("report.bin"), "report.bin.decrypted");
        assert_eq!(decrypted_name(".aegis"), ".aegis.decrypted");
    }
}
