//! The saved default location: one key, one JSON value, overwritten on save.

use anyhow::{Context, Result};
use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use crate::{
    error::WeatherError,
    model::{DisplayWeather, SavedLocation},
};

/// Key the default location is stored under.
pub const DEFAULT_LOCATION_KEY: &str = "atmos_default_location";

#[derive(Debug, Clone)]
pub struct LocationStore {
    path: PathBuf,
}

impl LocationStore {
    /// Store rooted in `dir`; the value lives in `<dir>/atmos_default_location.json`.
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(format!("{DEFAULT_LOCATION_KEY}.json")),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The saved location, if any. Unreadable or malformed data clears the
    /// key and yields `None`.
    pub fn load(&self) -> Option<SavedLocation> {
        let contents = match fs::read(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "failed to read saved location"
                );
                return None;
            }
        };

        match parse_saved(&contents) {
            Ok(saved) => Some(saved),
            Err(e) => {
                tracing::warn!(error = %e, "discarding saved location");
                if let Err(e) = self.clear() {
                    tracing::warn!(error = %e, "failed to clear saved location");
                }
                None
            }
        }
    }

    /// Replace the saved location.
    pub fn save(&self, location: &SavedLocation) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create data directory: {}", parent.display()))?;
        }

        let json = serde_json::to_string(location).context("Failed to serialize saved location")?;

        fs::write(&self.path, json)
            .with_context(|| format!("Failed to write saved location: {}", self.path.display()))?;

        tracing::info!(name = %location.name, "saved default location");
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| {
                format!("Failed to remove saved location: {}", self.path.display())
            }),
        }
    }

    /// Whether `weather` is showing the saved default.
    pub fn is_default(&self, weather: &DisplayWeather) -> bool {
        self.load().is_some_and(|saved| saved.name == weather.location)
    }
}

/// Decodes the stored bytes. Invalid UTF-8 and invalid JSON both count as
/// malformed data.
fn parse_saved(contents: &[u8]) -> Result<SavedLocation, WeatherError> {
    serde_json::from_slice(contents).map_err(|e| WeatherError::Parse(e.to_string()))
}
