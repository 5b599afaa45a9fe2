/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Navigator preferences, read from TOML.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const PREFS_FILE_NAME: &str = "navigator.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NavigatorPrefs {
    /// Pause after each action before the loading check.
    pub settle_delay_ms: u64,
    /// Poll interval while the loading sentinel is on screen.
    pub loading_poll_interval_ms: u64,
    /// Extra full attempts after the first failed navigation.
    pub max_retry: u32,
    pub recovery: RecoveryPrefs,
}

impl Default for NavigatorPrefs {
    fn default() -> Self {
        Self {
            settle_delay_ms: 700,
            loading_poll_interval_ms: 1000,
            max_retry: 1,
            recovery: RecoveryPrefs::default(),
        }
    }
}

/// Out-of-band route back to the main page when detection fails.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RecoveryPrefs {
    pub key: String,
    pub max_presses: u32,
    pub min_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RecoveryPrefs {
    fn default() -> Self {
        Self {
            key: "esc".to_string(),
            max_presses: 5,
            min_delay_ms: 500,
            max_delay_ms: 4000,
        }
    }
}

impl NavigatorPrefs {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn loading_poll_interval(&self) -> Duration {
        Duration::from_millis(self.loading_poll_interval_ms)
    }

    pub fn from_toml_str(source: &str) -> Result<Self, PrefsError> {
        toml::from_str(source).map_err(|e| PrefsError::Parse(e.to_string()))
    }

    pub fn to_toml_string(&self) -> Result<String, PrefsError> {
        toml::to_string_pretty(self).map_err(|e| PrefsError::Parse(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self, PrefsError> {
        let source = fs::read_to_string(path)
            .map_err(|e| PrefsError::Io(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&source)
    }

    /// Explicit path must exist; the default location falls back to defaults
    /// when absent.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, PrefsError> {
        if let Some(path) = path {
            return Self::load(path);
        }
        match default_prefs_path() {
            Some(path) if path.exists() => Self::load(&path),
            Some(path) => {
                log::debug!("No prefs at {}, using defaults", path.display());
                Ok(Self::default())
            }
            None => {
                log::warn!("No config directory available, using default navigator prefs");
                Ok(Self::default())
            }
        }
    }
}

impl RecoveryPrefs {
    pub fn min_delay(&self) -> Duration {
        Duration::from_millis(self.min_delay_ms)
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms.max(self.min_delay_ms))
    }
}

pub fn default_prefs_path() -> Option<PathBuf> {
    let mut dir = dirs::config_dir()?;
    dir.push("pagenav");
    dir.push(PREFS_FILE_NAME);
    Some(dir)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrefsError {
    Io(String),
    Parse(String),
}

impl std::fmt::Display for PrefsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrefsError::Io(e) => write!(f, "IO error: {e}"),
            PrefsError::Parse(e) => write!(f, "Parse error: {e}"),
        }
    }
}

impl std::error::Error for PrefsError {}
