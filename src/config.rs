//! Engine configuration.
//!
//! Values are resolved in this order, later sources winning:
//! - built-in defaults
//! - an optional JSON file
//! - environment variables (a `.env` file is loaded first, if present)
//! - command line flags, applied by the caller through [`EngineConfig::merge_overrides`]

use std::{env, fs, path::Path, path::PathBuf};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// The number of rows a single scan batch holds, unless configured otherwise.
pub const DEFAULT_SCAN_BATCH_SIZE: usize = 2048;

const ENV_DATA_DIR: &str = "RUCKS_DATA_DIR";
const ENV_BACKEND: &str = "RUCKS_BACKEND";
const ENV_SCAN_BATCH_SIZE: &str = "RUCKS_SCAN_BATCH_SIZE";
const ENV_LOG_LEVEL: &str = "RUCKS_LOG_LEVEL";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    // Everything is lost when the process exits.
    Memory,

    // A sled tree under `data_dir`.
    Sled,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub data_dir: PathBuf,
    pub backend: BackendKind,
    pub scan_batch_size: usize,
    pub log_level: String,
}

/// Values that were given explicitly on the command line.
#[derive(Default)]
pub struct ConfigOverrides {
    pub data_dir: Option<PathBuf>,
    pub backend: Option<BackendKind>,
    pub scan_batch_size: Option<usize>,
    pub log_level: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> EngineConfig {
        EngineConfig {
            data_dir: PathBuf::from("./rucks_data"),
            backend: BackendKind::Sled,
            scan_batch_size: DEFAULT_SCAN_BATCH_SIZE,
            log_level: "warn".to_string(),
        }
    }
}

impl EngineConfig {
    pub fn from_file(path: &Path) -> Result<EngineConfig> {
        //! Read a JSON config file. Missing fields take their defaults.

        let text = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {}", path.display(), e)))?;
        serde_json::from_str(&text)
            .map_err(|e| Error::Config(format!("cannot parse {}: {}", path.display(), e)))
    }

    pub fn load(file: Option<&Path>) -> Result<EngineConfig> {
        //! Build the config from defaults, the optional file and the environment.
        //!
        //! A missing `.env` file is not an error.

        let _ = dotenvy::dotenv();

        let mut config = match file {
            Some(path) => EngineConfig::from_file(path)?,
            None => EngineConfig::default(),
        };
        config.apply_env(|key| env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        //! Override fields from environment variables. `lookup` is
        //! [`std::env::var`] outside of tests.

        if let Some(dir) = lookup(ENV_DATA_DIR) {
            self.data_dir = PathBuf::from(dir);
        }

        if let Some(backend) = lookup(ENV_BACKEND) {
            self.backend = BackendKind::from_str(&backend, true)
                .map_err(|_| Error::Config(format!("unknown backend '{}'", backend)))?;
        }

        if let Some(size) = lookup(ENV_SCAN_BATCH_SIZE) {
            self.scan_batch_size = size.trim().parse().map_err(|_| {
                Error::Config(format!("{} must be a positive integer", ENV_SCAN_BATCH_SIZE))
            })?;
        }

        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            self.log_level = level;
        }

        Ok(())
    }

    pub fn merge_overrides(&mut self, overrides: ConfigOverrides) -> Result<()> {
        if let Some(dir) = overrides.data_dir {
            self.data_dir = dir;
        }
        if let Some(backend) = overrides.backend {
            self.backend = backend;
        }
        if let Some(size) = overrides.scan_batch_size {
            self.scan_batch_size = size;
        }
        if let Some(level) = overrides.log_level {
            self.log_level = level;
        }

        self.validate()
    }

    pub fn validate(&self) -> Result<()> {
        if self.scan_batch_size == 0 {
            return Err(Error::Config(
                "scan batch size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
