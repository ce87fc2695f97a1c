//! Engine and application settings
//!
//! Stored as JSON. Lookup order: explicit path, `$AEGIS_CONFIG`, then
//! `<config dir>/aegis/config.json`; defaults apply when none exists.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::crypto::PBKDF2_ITERATIONS;
use crate::error::{AegisError, Result};

/// Largest plaintext slice per chunk (1 MiB)
pub const MAX_CHUNK_SIZE: usize = 1024 * 1024;

pub const CONFIG_ENV: &str = "AEGIS_CONFIG";
const CONFIG_DIR: &str = "aegis";
const CONFIG_FILE: &str = "config.json";

/// Parameters of the streaming engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Plaintext bytes per chunk frame
    pub chunk_size: usize,
    /// PBKDF2 rounds. Not recorded in the container: both sides must agree.
    pub kdf_iterations: u32,
    /// Decode version-1 whole-file containers
    pub accept_legacy: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            chunk_size: MAX_CHUNK_SIZE,
            kdf_iterations: PBKDF2_ITERATIONS,
            accept_legacy: true,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 || self.chunk_size > MAX_CHUNK_SIZE {
            return Err(AegisError::InvalidConfig(format!(
                "chunk_size must be between 1 and {} bytes, got {}",
                MAX_CHUNK_SIZE, self.chunk_size
            )));
        }
        if self.kdf_iterations == 0 {
            return Err(AegisError::InvalidConfig(
                "kdf_iterations must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Everything the `aegis` binary reads from its config file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub engine: EngineConfig,
    /// Default tracing filter, overridden by `--log` / `AEGIS_LOG`
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            log_level: "warn".to_string(),
        }
    }
}

impl Settings {
    /// Read and validate settings from a JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let data = fs::read(path)?;
        let settings: Settings = serde_json::from_slice(&data)?;
        settings.engine.validate()?;
        Ok(settings)
    }

    /// Resolve the config file and load it, or fall back to defaults.
    ///
    /// An explicitly named file must exist; the default location is optional.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Self::from_file(Path::new(&path));
        }
        match default_config_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_vec_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

/// `<config dir>/aegis/config.json`, when the platform has a config dir
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
}
