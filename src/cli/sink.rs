//! Output files for the CLI

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::error::Result;
use crate::stream::BatchSink;

/// Writes each output next to its input, or into `out_dir`.
///
/// Existing files are never overwritten.
#[derive(Debug, Default)]
pub struct FileSink {
    out_dir: Option<PathBuf>,
    written: Vec<PathBuf>,
}

impl FileSink {
    pub fn new(out_dir: Option<PathBuf>) -> Self {
        Self {
            out_dir,
            written: Vec::new(),
        }
    }

    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    fn target(&self, input: &Path, name: &str) -> PathBuf {
        match &self.out_dir {
            Some(dir) => dir.join(name),
            None => input
                .parent()
                .map(|dir| dir.join(name))
                .unwrap_or_else(|| PathBuf::from(name)),
        }
    }
}

#[async_trait]
impl BatchSink for FileSink {
    async fn deliver(&mut self, input: &Path, name: &str, data: Vec<u8>) -> Result<()> {
        let path = self.target(input, name);

        let mut options = tokio::fs::OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        options.mode(0o600);

        let file = options.open(&path).await?;
        write_or_remove(&path, file, &data).await?;

        tracing::debug!(path = %path.display(), bytes = data.len(), "output written");
        self.written.push(path);
        Ok(())
    }
}

/// Write `data` to a freshly created `path`; on failure the file is removed
async fn write_or_remove<W>(path: &Path, mut writer: W, data: &[u8]) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let written = async {
        writer.write_all(data).await?;
        writer.flush().await
    }
    .await;
    drop(writer);

    if let Err(e) = written {
        if let Err(cleanup) = tokio::fs::remove_file(path).await {
            tracing::warn!(path = %path.display(), error = %cleanup, "partial output left behind");
        }
        return Err(e.into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::pin::Pin;
    use std::task::{Context, Poll};

    use super::*;

    /// Accepts nothing; every write fails
    struct FullDisk;

    impl AsyncWrite for FullDisk {
        fn poll_write(
            self: Pin<&mut Self>,
            _: &mut Context<'_>,
            _: &[u8],
        ) -> Poll<io::Result<usize>> {
            Poll::Ready(Err(io::Error::new(io::ErrorKind::Other, "no space left on device")))
        }

        fn poll_flush(self: Pin<&mut Self>, _: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(self: Pin<&mut Self>, _: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    #[tokio::test]
    async fn test_writes_next_to_input() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("a.txt");
        let mut sink = FileSink::new(None);

        sink.deliver(&input, "a.txt.aegis", b"data".to_vec()).await.unwrap();
        assert_eq!(std::fs::read(dir.path().join("a.txt.aegis")).unwrap(), b"data");
        assert_eq!(sink.written().len(), 1);

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let metadata = std::fs::metadata(dir.path().join("a.txt.aegis")).unwrap();
            let mode = metadata.permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }

    #[tokio::test]
    async fn test_out_dir_and_no_overwrite() {
        let src = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let mut sink = FileSink::new(Some(out.path().to_path_buf()));
        let input = src.path().join("b");

        sink.deliver(&input, "b.aegis", b"one".to_vec()).await.unwrap();
        assert!(out.path().join("b.aegis").exists());
        assert!(sink.deliver(&input, "b.aegis", b"two".to_vec()).await.is_err());
        assert_eq!(std::fs::read(out.path().join("b.aegis")).unwrap(), b"one");
    }

    #[tokio::test]
    async fn test_failed_write_removes_partial_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("c.aegis");
        std::fs::write(&path, b"").unwrap();

        let result = write_or_remove(&path, FullDisk, b"ciphertext").await;
        assert!(matches!(result, Err(crate::AegisError::Io(_))));
        assert!(!path.exists());
    }
}
