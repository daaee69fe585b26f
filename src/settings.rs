// SPDX-License-Identifier: MPL-2.0
//! Persisted diagnostics settings.
//!
//! The host application decides where the file lives (usually next to
//! its own settings); this module only knows how to read and write the
//! diagnostics section as TOML. Missing keys fall back to defaults so
//! old files keep loading as settings grow.

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::buffer::{capacity_bounds, BufferCapacity};
use crate::resource::{sampling_bounds, SamplingInterval};

/// User-facing diagnostics settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticsSettings {
    /// Whether events are collected at all.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Retention capacity in events; clamped on use.
    #[serde(default = "default_capacity")]
    pub buffer_capacity: usize,
    /// Resource sampling interval in milliseconds; clamped on use.
    #[serde(default = "default_interval_ms")]
    pub sampling_interval_ms: u64,
}

fn default_enabled() -> bool {
    true
}

fn default_capacity() -> usize {
    capacity_bounds::DEFAULT
}

fn default_interval_ms() -> u64 {
    sampling_bounds::DEFAULT_MS
}

impl Default for DiagnosticsSettings {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            buffer_capacity: default_capacity(),
            sampling_interval_ms: default_interval_ms(),
        }
    }
}

impl DiagnosticsSettings {
    /// The configured retention capacity, clamped to valid bounds.
    #[must_use]
    pub fn buffer_capacity(&self) -> BufferCapacity {
        BufferCapacity::new(self.buffer_capacity)
    }

    /// The configured sampling interval, clamped to valid bounds.
    #[must_use]
    pub fn sampling_interval(&self) -> SamplingInterval {
        SamplingInterval::new(self.sampling_interval_ms)
    }
}

/// Failure reading or writing the settings file.
#[derive(Debug)]
pub enum SettingsError {
    /// The file could not be read or written.
    Io(io::Error),
    /// The file exists but is not valid TOML for these settings.
    Parse(toml::de::Error),
    /// The settings could not be encoded as TOML.
    Serialize(toml::ser::Error),
}

impl std::fmt::Display for SettingsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "settings I/O error: {err}"),
            Self::Parse(err) => write!(f, "settings parse error: {err}"),
            Self::Serialize(err) => write!(f, "settings encode error: {err}"),
        }
    }
}

impl std::error::Error for SettingsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Parse(err) => Some(err),
            Self::Serialize(err) => Some(err),
        }
    }
}

impl From<io::Error> for SettingsError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

/// Loads settings from a TOML file.
///
/// # Errors
///
/// Returns [`SettingsError::Io`] if the file cannot be read and
/// [`SettingsError::Parse`] if its contents are not valid.
pub fn load_from_path(path: &Path) -> Result<DiagnosticsSettings, SettingsError> {
    let contents = fs::read_to_string(path)?;
    toml::from_str(&contents).map_err(SettingsError::Parse)
}

/// Saves settings as TOML.
///
/// # Errors
///
/// Returns [`SettingsError::Serialize`] if encoding fails and
/// [`SettingsError::Io`] if the file cannot be written.
pub fn save_to_path(settings: &DiagnosticsSettings, path: &Path) -> Result<(), SettingsError> {
    let contents = toml::to_string_pretty(settings).map_err(SettingsError::Serialize)?;
    fs::write(path, contents)?;
    Ok(())
}
