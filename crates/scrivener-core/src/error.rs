// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Scrivener.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Top-level error type for all Scrivener operations.
#[derive(Debug, Error)]
pub enum ScrivenerError {
    // -- Detected before any expensive work --
    #[error("invalid configuration: {0}")]
    Configuration(String),

    // -- Per-item pipeline errors --
    #[error("image decode failed: {0}")]
    Decode(String),

    #[error(transparent)]
    Recognition(#[from] RecognitionError),

    #[error("document rendering failed: {0}")]
    Render(String),

    // -- Storage / persistence --
    #[error("could not write output: {0}")]
    Persistence(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // -- Batch control --
    #[error("batch cancelled before this item started")]
    Cancelled,
}

/// Failures reported by (or about) the external recognition engine.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum RecognitionError {
    #[error("language `{0}` is not supported by the recognition engine")]
    UnsupportedLanguage(String),

    #[error("recognition engine failed: {0}")]
    EngineFailed(String),

    #[error("recognition engine unavailable: {0}")]
    Unavailable(String),
}

/// Coarse error classification carried by failed pipeline results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    Configuration,
    Decode,
    Recognition,
    Render,
    Persistence,
    Cancelled,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Configuration => "ConfigurationError",
            Self::Decode => "DecodeError",
            Self::Recognition => "RecognitionError",
            Self::Render => "RenderError",
            Self::Persistence => "PersistenceError",
            Self::Cancelled => "Cancelled",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ScrivenerError {
    /// Classify this error for per-item reporting.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration(_) | Self::Serialization(_) => ErrorKind::Configuration,
            Self::Decode(_) => ErrorKind::Decode,
            Self::Recognition(_) => ErrorKind::Recognition,
            Self::Render(_) => ErrorKind::Render,
            Self::Persistence(_) | Self::Io(_) => ErrorKind::Persistence,
            Self::Cancelled => ErrorKind::Cancelled,
        }
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ScrivenerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_errors_classify_as_persistence() {
        let err = ScrivenerError::from(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "read-only",
        ));
        assert_eq!(err.kind(), ErrorKind::Persistence);
    }

    #[test]
    fn recognition_errors_keep_their_message() {
        let err = ScrivenerError::from(RecognitionError::Unavailable("tesseract not found".into()));
        assert_eq!(err.kind(), ErrorKind::Recognition);
        assert_eq!(
            err.to_string(),
            "recognition engine unavailable: tesseract not found"
        );
    }

    #[test]
    fn kind_names_match_taxonomy() {
        assert_eq!(ErrorKind::Decode.to_string(), "DecodeError");
        assert_eq!(ErrorKind::Configuration.as_str(), "ConfigurationError");
    }
}
