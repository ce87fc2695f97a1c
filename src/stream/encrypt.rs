use tokio::io::AsyncRead;

use super::{finish, transition, CancelToken, Engine, ProgressSink, Source, StreamState};
use crate::container::{append_frame, build_header, FormatVersion, LENGTH_PREFIX_LEN};
use crate::crypto::{
    build_key_material, derive_key, generate_salt, ChunkCipher, Credential, KeyUsage, IV_LEN,
    TAG_LEN,
};
use crate::error::Result;

impl Engine {
    /// Encrypt `source` into a chunked container.
    ///
    /// Progress reports cumulative plaintext bytes. Nothing is returned
    /// unless every chunk was sealed.
    pub async fn encrypt_stream<R: AsyncRead + Unpin + Send>(
        &self,
        source: Source<R>,
        credential: &Credential,
        cancel: &CancelToken,
        progress: &dyn ProgressSink,
    ) -> Result<Vec<u8>> {
        tracing::info!(name = source.name(), size = source.total_len(), "encrypting");
        transition(progress, StreamState::Idle);
        let result = self.encrypt_inner(source, credential, cancel, progress).await;
        finish("encrypt", result, progress)
    }

    async fn encrypt_inner<R: AsyncRead + Unpin + Send>(
        &self,
        mut source: Source<R>,
        credential: &Credential,
        cancel: &CancelToken,
        progress: &dyn ProgressSink,
    ) -> Result<Vec<u8>> {
        let provider = self.provider();
        let chunk_size = self.config.chunk_size;

        transition(progress, StreamState::DerivingKey);
        let salt = generate_salt(provider)?;
        let material = build_key_material(provider, credential)?;
        let key = derive_key(
            provider,
            &material,
            &salt,
            FormatVersion::CURRENT,
            self.config.kdf_iterations,
            KeyUsage::Encrypt,
        )
        .await?;
        drop(material);
        let cipher = ChunkCipher::new(provider, &key);

        let mut output = build_header(&salt);
        output.reserve(estimated_body_len(source.total_len(), chunk_size));

        let mut buffer = vec![0u8; chunk_size];
        let mut processed: u64 = 0;
        let mut frame = 0usize;

        loop {
            cancel.check()?;

            let n = source.read_chunk(&mut buffer).await?;
            if n == 0 {
                break;
            }
            transition(progress, StreamState::Processing { frame });

            cancel.check()?;
            let (iv, ciphertext) = cipher.encrypt(&buffer[..n]).await?;
            append_frame(&mut output, &iv, &ciphertext)?;

            processed += n as u64;
            tracing::debug!(frame, plaintext = n, "sealed chunk");
            progress.on_progress(processed);
            frame += 1;

            if n < chunk_size {
                break;
            }
            tokio::task::yield_now().await;
        }

        zeroize::Zeroize::zeroize(&mut buffer);
        tracing::debug!(frames = frame, bytes = output.len(), "container assembled");
        Ok(output)
    }
}

/// Frames reserved up front; the declared length is only a hint
const PREALLOC_FRAMES: usize = 16;

fn estimated_body_len(total: u64, chunk_size: usize) -> usize {
    let cap = chunk_size.saturating_mul(PREALLOC_FRAMES);
    let total = usize::try_from(total).unwrap_or(usize::MAX).min(cap);
    let frames = total.div_ceil(chunk_size);
    total.saturating_add(frames.saturating_mul(LENGTH_PREFIX_LEN + IV_LEN + TAG_LEN))
}
