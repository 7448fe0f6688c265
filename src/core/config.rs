use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::core::memory_monitor::PressureThresholds;
use crate::platform::HostProfile;

/// Operator configuration. Every field has a default; the file is optional.
#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    /// Default sampling interval for monitoring sessions, in milliseconds.
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    /// Usage-ratio thresholds for pressure classification.
    #[serde(default)]
    pub thresholds: PressureThresholds,
    /// Fraction of total RAM under which the host counts as low on memory.
    #[serde(default = "default_low_memory_fraction")]
    pub low_memory_fraction: f64,
    /// Override for the app memory ceiling, in bytes.
    #[serde(default)]
    pub heap_limit_bytes: Option<u64>,
}

fn default_interval_ms() -> u64 {
    5000
}

fn default_low_memory_fraction() -> f64 {
    0.10
}

impl Default for Config {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            thresholds: PressureThresholds::default(),
            low_memory_fraction: default_low_memory_fraction(),
            heap_limit_bytes: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;

        if !config_path.exists() {
            return Ok(Config::default());
        }

        let data = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {:?}", config_path))?;

        if data.trim().is_empty() {
            return Ok(Config::default());
        }

        // A corrupted file falls back to defaults rather than blocking the tool
        Ok(serde_json::from_str(&data).unwrap_or_default())
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::get_config_path()?;

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let data = serde_json::to_string_pretty(self)?;
        fs::write(&config_path, data)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;

        Ok(())
    }

    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("Could not determine config directory")?;
        Ok(config_dir.join("memwatch").join("config.json"))
    }

    /// Host profile with this config's overrides applied.
    pub fn host_profile(&self) -> HostProfile {
        let mut profile = HostProfile::detect();
        profile.low_memory_fraction = self.low_memory_fraction;
        profile.heap_limit_override = self.heap_limit_bytes;
        profile
    }
}
