//! Sequential multi-file processing
//!
//! Files run strictly one after another. A failure is recorded and the batch
//! moves on; cancellation stops it.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::{CancelToken, Engine, ProgressSink, Source};
use crate::config::{decrypted_name, encrypted_name};
use crate::crypto::Credential;
use crate::error::{AegisError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Encrypt,
    Decrypt,
}

impl Direction {
    /// Output name for an input called `name`
    pub fn output_name(self, name: &str) -> String {
        match self {
            Direction::Encrypt => encrypted_name(name),
            Direction::Decrypt => decrypted_name(name),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Encrypt => "encrypt",
            Direction::Decrypt => "decrypt",
        }
    }
}

/// Destination for completed outputs
#[async_trait]
pub trait BatchSink: Send {
    /// Take ownership of the finished output for `input`
    async fn deliver(&mut self, input: &Path, name: &str, data: Vec<u8>) -> Result<()>;
}

/// Result for one input
#[derive(Debug)]
pub struct FileOutcome {
    pub input: PathBuf,
    /// Output name, known once the input was opened
    pub output: Option<String>,
    /// Bytes delivered to the sink
    pub result: Result<u64>,
}

impl FileOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<FileOutcome>,
    pub cancelled: bool,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    pub fn is_success(&self) -> bool {
        !self.cancelled && self.failed() == 0
    }
}

/// Process `inputs` in order, handing each finished output to `sink`
pub async fn run_batch(
    engine: &Engine,
    direction: Direction,
    inputs: &[PathBuf],
    credential: &Credential,
    cancel: &CancelToken,
    progress: &dyn ProgressSink,
    sink: &mut dyn BatchSink,
) -> BatchReport {
    let mut report = BatchReport::default();
    tracing::info!(direction = direction.as_str(), files = inputs.len(), "batch started");

    for input in inputs {
        if cancel.is_cancelled() {
            report.cancelled = true;
            break;
        }

        let mut outcome = FileOutcome {
            input: input.clone(),
            output: None,
            result: Ok(0),
        };
        outcome.result = process_file(
            engine,
            direction,
            input,
            credential,
            cancel,
            progress,
            sink,
            &mut outcome.output,
        )
        .await;

        match &outcome.result {
            Ok(bytes) => tracing::info!(input = %input.display(), bytes, "file done"),
            Err(e) => tracing::warn!(input = %input.display(), error = %e, "file failed"),
        }

        let stop = matches!(outcome.result, Err(AegisError::Cancelled));
        report.outcomes.push(outcome);
        if stop {
            report.cancelled = true;
            break;
        }
    }

    tracing::info!(
        succeeded = report.succeeded(),
        failed = report.failed(),
        cancelled = report.cancelled,
        "batch finished"
    );
    report
}

#[allow(clippy::too_many_arguments)]
async fn process_file(
    engine: &Engine,
    direction: Direction,
    input: &Path,
    credential: &Credential,
    cancel: &CancelToken,
    progress: &dyn ProgressSink,
    sink: &mut dyn BatchSink,
    output: &mut Option<String>,
) -> Result<u64> {
    let source = Source::open(input).await?;
    let name = direction.output_name(source.name());
    *output = Some(name.clone());
    progress.on_file(source.name(), source.total_len());

    let data = match direction {
        Direction::Encrypt => engine.encrypt_stream(source, credential, cancel, progress).await?,
        Direction::Decrypt => {
            let container = source.into_bytes().await?;
            engine
                .decrypt_stream(&container, credential, cancel, progress)
                .await?
        }
    };

    let len = data.len() as u64;
    sink.deliver(input, &name, data).await?;
    Ok(len)
}
