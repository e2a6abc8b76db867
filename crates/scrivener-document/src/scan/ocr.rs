// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Built-in recogniser using the `ocrs` crate, a pure-Rust OCR engine backed by
// neural network models executed via `rten`.
//
// # Feature Gate
//
// This module is only available when the `ocrs` feature is enabled:
//
// ```toml
// scrivener-document = { path = "crates/scrivener-document", features = ["ocrs"] }
// ```
//
// # Model Setup
//
// The engine needs two model files in one directory:
//
// - `text-detection.rten` — locates text regions in the image.
// - `text-recognition.rten` — decodes characters from detected regions.
//
// Running `ocrs-cli` once downloads them to `$XDG_CACHE_HOME/ocrs`
// (typically `~/.cache/ocrs`), which is also the default lookup directory.
//
// The published models are trained on Latin script only, so this recogniser
// accepts English and nothing else.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use image::DynamicImage;
use ocrs::{ImageSource, OcrEngine, OcrEngineParams};
use rten::Model;
use scrivener_core::{LanguageCode, RecognitionError};
use tracing::{debug, info, instrument};

use crate::scan::recognize::Recognizer;

/// Well-known filenames for the detection and recognition models.
const DETECTION_MODEL_FILENAME: &str = "text-detection.rten";
const RECOGNITION_MODEL_FILENAME: &str = "text-recognition.rten";

/// Default directory for cached model files.
///
/// `$XDG_CACHE_HOME/ocrs`, falling back to `~/.cache/ocrs`.
pub fn default_model_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CACHE_HOME") {
        PathBuf::from(xdg).join("ocrs")
    } else if let Ok(home) = std::env::var("HOME") {
        PathBuf::from(home).join(".cache").join("ocrs")
    } else {
        PathBuf::from("ocrs-models")
    }
}

/// Recogniser running the `ocrs` engine in-process.
///
/// Model loading is the expensive step; build one recogniser and reuse it for
/// every page of a batch.
pub struct OcrsRecognizer {
    engine: Mutex<OcrEngine>,
}

impl OcrsRecognizer {
    /// Load both models from `dir`.
    ///
    /// # Errors
    ///
    /// [`RecognitionError::Unavailable`] if either model is missing or cannot
    /// be loaded.
    #[instrument(skip_all, fields(dir = %dir.as_ref().display()))]
    pub fn from_model_dir(dir: impl AsRef<Path>) -> Result<Self, RecognitionError> {
        let dir = dir.as_ref();
        let detection_model = load_model(&dir.join(DETECTION_MODEL_FILENAME))?;
        let recognition_model = load_model(&dir.join(RECOGNITION_MODEL_FILENAME))?;

        let engine = OcrEngine::new(OcrEngineParams {
            detection_model: Some(detection_model),
            recognition_model: Some(recognition_model),
            ..Default::default()
        })
        .map_err(|err| {
            RecognitionError::Unavailable(format!("failed to initialise OCR engine: {}", err))
        })?;

        info!("OCR engine initialised");
        Ok(Self {
            engine: Mutex::new(engine),
        })
    }

    /// Load models from [`default_model_dir`].
    pub fn with_defaults() -> Result<Self, RecognitionError> {
        Self::from_model_dir(default_model_dir())
    }
}

fn load_model(path: &Path) -> Result<Model, RecognitionError> {
    if !path.exists() {
        return Err(RecognitionError::Unavailable(format!(
            "model not found at {}; run `ocrs-cli` once to download models",
            path.display()
        )));
    }
    debug!(path = %path.display(), "Loading OCR model");
    Model::load_file(path).map_err(|err| {
        RecognitionError::Unavailable(format!(
            "failed to load model from {}: {}",
            path.display(),
            err
        ))
    })
}

impl Recognizer for OcrsRecognizer {
    fn name(&self) -> &str {
        "ocrs"
    }

    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    fn recognize(
        &self,
        image: &DynamicImage,
        language: LanguageCode,
    ) -> Result<String, RecognitionError> {
        if language != LanguageCode::ENGLISH {
            return Err(RecognitionError::UnsupportedLanguage(
                language.code().to_string(),
            ));
        }

        // ocrs expects RGB8.
        let rgb = image.to_rgb8();
        let (width, height) = rgb.dimensions();

        let source = ImageSource::from_bytes(rgb.as_raw(), (width, height)).map_err(|err| {
            RecognitionError::EngineFailed(format!(
                "failed to create image source ({}x{}): {}",
                width, height, err
            ))
        })?;

        let engine = self
            .engine
            .lock()
            .map_err(|_| RecognitionError::EngineFailed("OCR engine lock poisoned".into()))?;

        let input = engine.prepare_input(source).map_err(|err| {
            RecognitionError::EngineFailed(format!("OCR preprocessing failed: {}", err))
        })?;

        let text = engine.get_text(&input).map_err(|err| {
            RecognitionError::EngineFailed(format!("OCR text recognition failed: {}", err))
        })?;

        debug!(line_count = text.lines().count(), "OCR recognition complete");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_dir_ends_with_ocrs() {
        let dir = default_model_dir();
        assert!(dir.ends_with("ocrs") || dir.ends_with("ocrs-models"));
    }

    #[test]
    fn missing_models_are_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let err = OcrsRecognizer::from_model_dir(dir.path()).err().unwrap();
        assert!(matches!(err, RecognitionError::Unavailable(_)));
    }
}
