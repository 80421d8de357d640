use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::model::SavedLocation;

/// Overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "ATMOS_CONFIG";
/// Overrides the directory holding the saved default location.
pub const DATA_DIR_ENV: &str = "ATMOS_DATA_DIR";

const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Base URLs of the services the gateway talks to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub forecast: String,
    pub geocoding: String,
    pub reverse_geocoding: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            forecast: "https://api.open-meteo.com/v1/forecast".to_string(),
            geocoding: "https://geocoding-api.open-meteo.com/v1/search".to_string(),
            reverse_geocoding: "https://api.bigdatacloud.net/data/reverse-geocode-client"
                .to_string(),
        }
    }
}

impl Endpoints {
    /// All three endpoints under one base URL, as `/v1/forecast`, `/v1/search`
    /// and `/data/reverse-geocode-client`. Used to point the gateway at a
    /// mock server.
    pub fn with_base(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            forecast: format!("{base}/v1/forecast"),
            geocoding: format!("{base}/v1/search"),
            reverse_geocoding: format!("{base}/data/reverse-geocode-client"),
        }
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// timeout_secs = 10
///
/// [default_location]
/// lat = 40.71
/// lon = -74.0
/// name = "New York (Default)"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Per-request timeout for every outbound call.
    pub timeout_secs: u64,

    /// Location shown when nothing is saved and no coordinates were given.
    pub default_location: SavedLocation,

    pub endpoints: Endpoints,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            default_location: SavedLocation {
                lat: 40.71,
                lon: -74.00,
                name: "New York (Default)".to_string(),
            },
            endpoints: Endpoints::default(),
        }
    }
}

impl Config {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    /// Load config from disk, or return the defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, use defaults.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
            return Ok(PathBuf::from(path));
        }

        Ok(project_dirs()?.config_dir().join("config.toml"))
    }

    /// Directory holding persisted state (the saved default location).
    pub fn data_dir() -> Result<PathBuf> {
        if let Some(dir) = std::env::var_os(DATA_DIR_ENV) {
            return Ok(PathBuf::from(dir));
        }

        Ok(project_dirs()?.data_dir().to_path_buf())
    }
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("dev", "atmos", "atmos")
        .ok_or_else(|| anyhow!("Could not determine platform config directory"))
}
