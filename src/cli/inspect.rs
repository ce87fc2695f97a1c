//! `aegis inspect`: container structure without credentials

use std::path::Path;

use colored::Colorize;

use crate::container::{ContainerSummary, FormatVersion};
use crate::error::Result;
use crate::stream::Engine;

pub fn run(engine: &Engine, path: &Path) -> Result<()> {
    let data = std::fs::read(path)?;
    let summary = engine.inspect(&data)?;
    print!("{}", render(path, &summary));
    Ok(())
}

fn render(path: &Path, summary: &ContainerSummary) -> String {
    let layout = match summary.version {
        FormatVersion::Legacy => "legacy, whole file",
        FormatVersion::Chunked => "chunked",
    };
    let mut out = format!("{}\n", path.display().to_string().bold());
    out.push_str(&format!("  version:     {} ({})\n", summary.version.as_byte(), layout));
    out.push_str(&format!("  salt:        {}\n", hex::encode(&summary.salt)));
    out.push_str(&format!("  header:      {} bytes\n", summary.header_len));
    out.push_str(&format!("  frames:      {}\n", summary.frame_count));
    out.push_str(&format!("  ciphertext:  {} bytes\n", summary.ciphertext_len));
    out.push_str(&format!("  plaintext:   {} bytes\n", summary.plaintext_len));
    out.push_str(&format!("  largest:     {} bytes\n", summary.largest_chunk));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::build_header;

    #[test]
    fn test_render_header_only() {
        colored::control::set_override(false);
        let container = build_header(&[0xAB; 32]);
        let summary = crate::container::inspect(&container, true).unwrap();
        let text = render(Path::new("x.aegis"), &summary);

        assert!(text.contains("version:     2 (chunked)"));
        assert!(text.contains(&"ab".repeat(32)));
        assert!(text.contains("frames:      0"));
    }
}
