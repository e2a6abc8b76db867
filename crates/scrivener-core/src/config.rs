// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Result, ScrivenerError};
use crate::language::LanguageCode;
use crate::types::{DocumentStyle, ImageAdjustmentSettings, OutputFormat};

/// File name of the persisted configuration inside the config directory.
pub const CONFIG_FILE: &str = "config.json";

/// Settings for the external recognition engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Path (or bare name looked up on `PATH`) of the `tesseract` executable.
    pub tesseract_path: PathBuf,
    /// Extra arguments appended to every tesseract invocation (e.g. `--psm 3`).
    pub tesseract_args: Vec<String>,
    /// Directory holding `.rten` models for the built-in engine.
    pub model_dir: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tesseract_path: PathBuf::from("tesseract"),
            tesseract_args: Vec::new(),
            model_dir: None,
        }
    }
}

/// Persistent application settings.
///
/// Value objects inside are validated while deserialising, so a loaded config
/// never carries out-of-range adjustments or an unsupported language.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Recognition language.
    pub language: LanguageCode,
    /// Image pre-processing applied before recognition.
    pub adjustments: ImageAdjustmentSettings,
    /// Formatting of the produced document.
    pub style: DocumentStyle,
    /// Format written by `convert` and `batch`.
    pub output_format: OutputFormat,
    /// Recognition engine settings.
    pub engine: EngineConfig,
}

impl AppConfig {
    /// Load a config file. A missing file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = match std::fs::read_to_string(path) {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(err) => {
                return Err(ScrivenerError::Configuration(format!(
                    "failed to read {}: {}",
                    path.display(),
                    err
                )));
            }
        };
        let config: Self = serde_json::from_str(&data).map_err(|err| {
            ScrivenerError::Configuration(format!("invalid config {}: {}", path.display(), err))
        })?;
        info!(path = %path.display(), language = %config.language, "config loaded");
        Ok(config)
    }

    /// Write the config as pretty-printed JSON, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

/// Default location of the config file.
///
/// Follows the XDG Base Directory specification: `$XDG_CONFIG_HOME/scrivener`,
/// falling back to `~/.config/scrivener`.
pub fn default_config_path() -> PathBuf {
    let base = if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        PathBuf::from(xdg)
    } else if let Ok(home) = std::env::var("HOME") {
        PathBuf::from(home).join(".config")
    } else {
        // Last resort — current directory.
        PathBuf::from(".")
    };
    base.join("scrivener").join(CONFIG_FILE)
}
