//! Streaming encryption and decryption
//!
//! One [`Engine`] holds the crypto provider and the engine parameters. Each
//! operation takes an explicit [`CancelToken`] and [`ProgressSink`]; it
//! derives one key, walks the data chunk by chunk and yields to the runtime
//! between chunks. Partial output is dropped on any error.

mod batch;
mod decrypt;
mod encrypt;
mod source;

pub use batch::{run_batch, BatchReport, BatchSink, Direction, FileOutcome};
pub use source::Source;

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::config::EngineConfig;
use crate::container::{inspect, ContainerSummary};
use crate::crypto::{CryptoProvider, SystemProvider};
use crate::error::{AegisError, Result};

/// Shared cancellation flag, checked at chunk boundaries
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    pub(crate) fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            return Err(AegisError::Cancelled);
        }
        Ok(())
    }
}

/// Lifecycle of a single stream operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    Idle,
    DerivingKey,
    Processing { frame: usize },
    Completed,
    Cancelled,
    Failed,
}

impl fmt::Display for StreamState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamState::Idle => write!(f, "idle"),
            StreamState::DerivingKey => write!(f, "deriving key"),
            StreamState::Processing { frame } => write!(f, "processing frame {}", frame),
            StreamState::Completed => write!(f, "completed"),
            StreamState::Cancelled => write!(f, "cancelled"),
            StreamState::Failed => write!(f, "failed"),
        }
    }
}

/// Receiver for progress of stream operations and batches
pub trait ProgressSink: Send + Sync {
    /// Cumulative bytes processed in the current operation
    fn on_progress(&self, processed: u64);

    fn on_state(&self, _state: StreamState) {}

    /// A batch is starting on `name`, `total` bytes long
    fn on_file(&self, _name: &str, _total: u64) {}
}

/// Sink that ignores everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn on_progress(&self, _processed: u64) {}
}

/// The container engine
#[derive(Clone)]
pub struct Engine {
    provider: Arc<dyn CryptoProvider>,
    config: EngineConfig,
}

impl Engine {
    /// Engine on the system provider
    pub fn new(config: EngineConfig) -> Result<Self> {
        Self::with_provider(Arc::new(SystemProvider), config)
    }

    pub fn with_provider(provider: Arc<dyn CryptoProvider>, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { provider, config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn provider(&self) -> &dyn CryptoProvider {
        self.provider.as_ref()
    }

    /// Credential-free summary, honouring this engine's legacy setting
    pub fn inspect(&self, container: &[u8]) -> Result<ContainerSummary> {
        inspect(container, self.config.accept_legacy)
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine").field("config", &self.config).finish()
    }
}

/// Report the terminal state for `result` and pass it through
fn finish<T>(operation: &str, result: Result<T>, progress: &dyn ProgressSink) -> Result<T> {
    let state = match &result {
        Ok(_) => StreamState::Completed,
        Err(e) if e.is_cancelled() => StreamState::Cancelled,
        Err(_) => StreamState::Failed,
    };
    match &result {
        Ok(_) => tracing::info!(operation, "stream {}", state),
        Err(e) => tracing::warn!(operation, error = %e, "stream {}", state),
    }
    progress.on_state(state);
    result
}

/// Record a transition with the sink and the trace log
fn transition(progress: &dyn ProgressSink, state: StreamState) {
    tracing::debug!(%state, "stream state");
    progress.on_state(state);
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use super::*;

    pub const FAST: u32 = 1_000;

    pub fn fast_engine(chunk_size: usize) -> Engine {
        Engine::new(EngineConfig {
            chunk_size,
            kdf_iterations: FAST,
            accept_legacy: true,
        })
        .unwrap()
    }

    /// Records everything it is told
    #[derive(Debug, Default)]
    pub struct RecordingSink {
        pub progress: Mutex<Vec<u64>>,
        pub states: Mutex<Vec<StreamState>>,
        pub files: Mutex<Vec<(String, u64)>>,
    }

    impl ProgressSink for RecordingSink {
        fn on_progress(&self, processed: u64) {
            self.progress.lock().unwrap().push(processed);
        }

        fn on_state(&self, state: StreamState) {
            self.states.lock().unwrap().push(state);
        }

        fn on_file(&self, name: &str, total: u64) {
            self.files.lock().unwrap().push((name.to_string(), total));
        }
    }

    /// Cancels the token once progress reaches `after` bytes
    pub struct CancelAfter {
        pub token: CancelToken,
        pub after: u64,
    }

    impl ProgressSink for CancelAfter {
        fn on_progress(&self, processed: u64) {
            if processed >= self.after {
                self.token.cancel();
            }
        }
    }

    /// Cancels as soon as `frame` enters processing, before its AEAD call
    pub struct CancelOnProcessing {
        pub token: CancelToken,
        pub frame: usize,
        pub progress: Mutex<Vec<u64>>,
    }

    impl CancelOnProcessing {
        pub fn new(frame: usize) -> Self {
            Self {
                token: CancelToken::new(),
                frame,
                progress: Mutex::new(Vec::new()),
            }
        }
    }

    impl ProgressSink for CancelOnProcessing {
        fn on_progress(&self, processed: u64) {
            self.progress.lock().unwrap().push(processed);
        }

        fn on_state(&self, state: StreamState) {
            if state == (StreamState::Processing { frame: self.frame }) {
                self.token.cancel();
            }
        }
    }
}
