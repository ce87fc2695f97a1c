//! Configuration management for aegis
//!
//! Handles:
//! - Engine parameters and the JSON settings file
//! - Output name derivation

mod naming;
mod settings;

pub use naming::{decrypted_name, encrypted_name, EXTENSION};
pub use settings::{default_config_path, EngineConfig, Settings, CONFIG_ENV, MAX_CHUNK_SIZE};
