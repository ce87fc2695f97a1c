//! Sequential input with a known length and an original name

use std::io::Cursor;
use std::path::Path;

use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::error::Result;

pub struct Source<R> {
    name: String,
    total_len: u64,
    reader: R,
}

impl<R: AsyncRead + Unpin + Send> Source<R> {
    pub fn new(name: impl Into<String>, total_len: u64, reader: R) -> Self {
        Self {
            name: name.into(),
            total_len,
            reader,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn total_len(&self) -> u64 {
        self.total_len
    }

    /// Fill `buf` as far as the input allows; a short count means end of input
    pub(crate) async fn read_chunk(&mut self, buf: &mut [u8]) -> Result<usize> {
        let mut filled = 0;
        while filled < buf.len() {
            let n = self.reader.read(&mut buf[filled..]).await?;
            if n == 0 {
                break;
            }
            filled += n;
        }
        Ok(filled)
    }

    /// Read the remaining input into memory
    pub async fn into_bytes(mut self) -> Result<Vec<u8>> {
        let mut data = Vec::with_capacity(usize::try_from(self.total_len).unwrap_or(0));
        self.reader.read_to_end(&mut data).await?;
        Ok(data)
    }
}

impl Source<Cursor<Vec<u8>>> {
    /// In-memory source
    pub fn from_bytes(name: impl Into<String>, data: Vec<u8>) -> Self {
        let total_len = data.len() as u64;
        Self::new(name, total_len, Cursor::new(data))
    }
}

impl Source<File> {
    /// Open a file; the name is its final path component
    pub async fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).await?;
        let total_len = file.metadata().await?.len();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        Ok(Self::new(name, total_len, file))
    }
}

impl<R> std::fmt::Debug for Source<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Source")
            .field("name", &self.name)
            .field("total_len", &self.total_len)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_read_chunk_fills_until_eof() {
        let mut source = Source::from_bytes("a.txt", (0u8..10).collect());
        let mut buf = [0u8; 4];
        assert_eq!(source.read_chunk(&mut buf).await.unwrap(), 4);
        assert_eq!(buf, [0, 1, 2, 3]);
        assert_eq!(source.read_chunk(&mut buf).await.unwrap(), 4);
        assert_eq!(source.read_chunk(&mut buf).await.unwrap(), 2);
        assert_eq!(&buf[..2], &[8, 9]);
        assert_eq!(source.read_chunk(&mut buf).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_open_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, b"hello file").unwrap();

        let source = Source::open(&path).await.unwrap();
        assert_eq!(source.name(), "notes.txt");
        assert_eq!(source.total_len(), 10);
        assert_eq!(source.into_bytes().await.unwrap(), b"hello file");
    }

    #[tokio::test]
    async fn test_open_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Source::open(&dir.path().join("missing")).await.is_err());
    }
}
