//! # Configuration Module
//!
//! Data directory, catalog location and the tunable thresholds.
//!
//! ## Data Storage
//!
//! The track catalog lives in the platform-standard data directory:
//! - Linux: `~/.local/share/scrobbletime/`
//! - macOS: `~/Library/Application Support/scrobbletime/`
//! - Windows: `%APPDATA%\scrobbletime\`
//!
//! An optional `config.json` next to it overrides the defaults of
//! [`RuntimeConfig`]. Command-line flags override both.

use crate::hyped::HypeThresholds;
use crate::resolver::DEFAULT_TRACK_LENGTH;
use anyhow::{anyhow, Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "scrobbletime";
const DB_FILE: &str = "catalog.db";
const CONFIG_FILE: &str = "config.json";

/// Returns the platform-appropriate data directory.
///
/// Only resolves the path. The directory is created by
/// [`SqliteCatalog::open`](crate::catalog::SqliteCatalog::open) when the
/// catalog is first written.
///
/// # Errors
///
/// Fails if the system data directory cannot be determined.
pub fn get_data_dir() -> Result<PathBuf> {
    let data_dir = dirs::data_dir().ok_or_else(|| {
        anyhow!(
            "Could not determine system data directory. Please ensure your platform supports standard data directories."
        )
    })?;

    Ok(data_dir.join(APP_DIR))
}

/// Returns the path of the catalog database file.
///
/// # Errors
///
/// See [`get_data_dir`].
///
/// # Examples
///
/// ```no_run
/// use scrobbletime::config::get_db_path;
///
/// let db_path = get_db_path()?;
/// println!("Catalog location: {}", db_path.display());
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn get_db_path() -> Result<PathBuf> {
    Ok(get_data_dir()?.join(DB_FILE))
}

/// Configuration for runtime behavior
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Path to the catalog database file
    pub db_path: PathBuf,
    /// Seconds assumed for tracks missing from the catalog
    pub default_length: u32,
    pub significant_ratio: f64,
    /// Seconds
    pub significant_length: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        let hype = HypeThresholds::default();
        Self {
            db_path: get_db_path().unwrap_or_else(|_| PathBuf::from(DB_FILE)),
            default_length: DEFAULT_TRACK_LENGTH,
            significant_ratio: hype.significant_ratio,
            significant_length: hype.significant_length,
        }
    }
}

impl RuntimeConfig {
    /// Loads `config.json` from the data directory, or the defaults if absent.
    /// Creates nothing on disk.
    ///
    /// # Errors
    ///
    /// Fails if the data directory is unavailable or the file is invalid.
    pub fn load() -> Result<Self> {
        Self::load_from(&get_data_dir()?.join(CONFIG_FILE))
    }

    /// Loads the configuration at `path`, or the defaults if it does not exist.
    ///
    /// # Errors
    ///
    /// Fails if the file exists but cannot be read, parsed or validated.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Self = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid configuration in {}", path.display()))?;

        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Create configuration with explicit database path
    pub fn with_db_path(db_path: PathBuf) -> Self {
        Self {
            db_path,
            ..Self::default()
        }
    }

    pub fn hype_thresholds(&self) -> HypeThresholds {
        HypeThresholds {
            significant_ratio: self.significant_ratio,
            significant_length: self.significant_length,
        }
    }

    /// # Errors
    ///
    /// Rejects a significant ratio outside `[0, 1]`.
    pub fn validate(&self) -> Result<()> {
        self.hype_thresholds().validate()
    }
}
