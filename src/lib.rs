//! Aegis - chunked, password-based AES-256-GCM file containers
//!
//! This crate provides:
//! - A versioned binary container: magic, version, salt, then length-prefixed frames
//! - PBKDF2-HMAC-SHA256 keys from a password and optional keyfile
//! - Streaming encryption and decryption with progress and cancellation
//! - Sequential batch processing and credential-free inspection

pub mod cli;
pub mod config;
pub mod container;
pub mod crypto;
pub mod error;
pub mod stream;

pub use config::{EngineConfig, Settings};
pub use container::{inspect, ContainerSummary, FormatVersion};
pub use crypto::{CryptoProvider, Credential, SystemProvider};
pub use error::{AegisError, FormatError, Result};
pub use stream::{
    run_batch, BatchReport, BatchSink, CancelToken, Direction, Engine, NoProgress, ProgressSink,
    Source, StreamState,
};
