use super::{finish, transition, CancelToken, Engine, ProgressSink, StreamState};
use crate::container::{legacy_body, parse_header, FormatVersion, Frames, Header};
use crate::crypto::{build_key_material, derive_key, ChunkCipher, Credential, DerivedKey, KeyUsage};
use crate::error::Result;
use zeroize::Zeroizing;

impl Engine {
    /// Decrypt a container back to its plaintext.
    ///
    /// The header is validated before any key is derived. Progress reports
    /// cumulative container bytes consumed. The first frame that fails to
    /// authenticate ends the operation.
    pub async fn decrypt_stream(
        &self,
        container: &[u8],
        credential: &Credential,
        cancel: &CancelToken,
        progress: &dyn ProgressSink,
    ) -> Result<Vec<u8>> {
        tracing::info!(size = container.len(), "decrypting");
        transition(progress, StreamState::Idle);
        let result = self.decrypt_inner(container, credential, cancel, progress).await;
        finish("decrypt", result, progress)
    }

    async fn decrypt_inner(
        &self,
        container: &[u8],
        credential: &Credential,
        cancel: &CancelToken,
        progress: &dyn ProgressSink,
    ) -> Result<Vec<u8>> {
        let (header, _) = parse_header(container, self.config.accept_legacy)?;
        cancel.check()?;

        transition(progress, StreamState::DerivingKey);
        let key = self.decryption_key(&header, credential).await?;

        match header.version {
            FormatVersion::Legacy => {
                self.decrypt_legacy(container, &header, &key, cancel, progress)
                    .await
            }
            FormatVersion::Chunked => {
                self.decrypt_chunked(container, &header, &key, cancel, progress)
                    .await
            }
        }
    }

    async fn decryption_key(
        &self,
        header: &Header<'_>,
        credential: &Credential,
    ) -> Result<DerivedKey> {
        let provider = self.provider();
        let material = build_key_material(provider, credential)?;
        derive_key(
            provider,
            &material,
            header.salt,
            header.version,
            self.config.kdf_iterations,
            KeyUsage::Decrypt,
        )
        .await
    }

    async fn decrypt_chunked(
        &self,
        container: &[u8],
        header: &Header<'_>,
        key: &DerivedKey,
        cancel: &CancelToken,
        progress: &dyn ProgressSink,
    ) -> Result<Vec<u8>> {
        let cipher = ChunkCipher::new(self.provider(), key);
        let mut frames = Frames::new(container, header.len());
        // the container bounds the plaintext, so the accumulator never reallocates
        let mut plaintext = Zeroizing::new(Vec::with_capacity(container.len()));
        let mut index = 0usize;

        loop {
            cancel.check()?;
            let Some(frame) = frames.next() else {
                break;
            };
            let frame = frame?;
            transition(progress, StreamState::Processing { frame: index });

            cancel.check()?;
            let chunk = Zeroizing::new(cipher.decrypt(frame.iv, frame.ciphertext).await?);
            plaintext.extend_from_slice(&chunk);

            tracing::debug!(frame = index, plaintext = chunk.len(), "opened chunk");
            progress.on_progress(frames.offset() as u64);
            index += 1;
            tokio::task::yield_now().await;
        }

        tracing::debug!(frames = index, bytes = plaintext.len(), "plaintext recovered");
        Ok(std::mem::take(&mut *plaintext))
    }

    async fn decrypt_legacy(
        &self,
        container: &[u8],
        header: &Header<'_>,
        key: &DerivedKey,
        cancel: &CancelToken,
        progress: &dyn ProgressSink,
    ) -> Result<Vec<u8>> {
        let (iv, ciphertext) = legacy_body(&container[header.len()..])?;
        transition(progress, StreamState::Processing { frame: 0 });

        cancel.check()?;
        let plaintext = ChunkCipher::new(self.provider(), key)
            .decrypt(iv, ciphertext)
            .await?;

        tracing::debug!(bytes = plaintext.len(), "legacy container opened");
        progress.on_progress(container.len() as u64);
        Ok(plaintext)
    }
}
