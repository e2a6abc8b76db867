// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Recognition boundary — the trait every OCR engine implements, and the
// invoker the pipeline calls through.

use std::sync::Arc;

use image::DynamicImage;
use scrivener_core::{LanguageCode, RecognitionError};
use tracing::{debug, instrument, warn};

/// An OCR engine: turns a processed image into text for one language.
///
/// Implementations must be usable from a worker thread, and must not retry on
/// their own.
pub trait Recognizer: Send + Sync {
    /// Short engine name for logs and diagnostics.
    fn name(&self) -> &str;

    /// Recognise the text in `image`.
    fn recognize(
        &self,
        image: &DynamicImage,
        language: LanguageCode,
    ) -> Result<String, RecognitionError>;
}

impl<R: Recognizer + ?Sized> Recognizer for Arc<R> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn recognize(
        &self,
        image: &DynamicImage,
        language: LanguageCode,
    ) -> Result<String, RecognitionError> {
        (**self).recognize(image, language)
    }
}

impl<R: Recognizer + ?Sized> Recognizer for Box<R> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn recognize(
        &self,
        image: &DynamicImage,
        language: LanguageCode,
    ) -> Result<String, RecognitionError> {
        (**self).recognize(image, language)
    }
}

/// Shared handle to a recogniser, adding structured logging around each call.
///
/// Cheap to clone; every clone talks to the same engine instance.
#[derive(Clone)]
pub struct RecognitionInvoker {
    engine: Arc<dyn Recognizer>,
}

impl RecognitionInvoker {
    /// Wrap an engine.
    pub fn new(engine: impl Recognizer + 'static) -> Self {
        Self {
            engine: Arc::new(engine),
        }
    }

    /// Wrap an engine that is already shared.
    pub fn from_shared(engine: Arc<dyn Recognizer>) -> Self {
        Self { engine }
    }

    /// Name of the wrapped engine.
    pub fn engine_name(&self) -> &str {
        self.engine.name()
    }

    /// Run recognition once. Errors are returned as-is; there are no retries.
    #[instrument(skip_all, fields(
        engine = self.engine.name(),
        language = language.code(),
        width = image.width(),
        height = image.height(),
    ))]
    pub fn recognize(
        &self,
        image: &DynamicImage,
        language: LanguageCode,
    ) -> Result<String, RecognitionError> {
        match self.engine.recognize(image, language) {
            Ok(text) => {
                debug!(
                    chars = text.chars().count(),
                    lines = text.lines().count(),
                    "Recognition complete"
                );
                Ok(text)
            }
            Err(err) => {
                warn!(error = %err, "Recognition failed");
                Err(err)
            }
        }
    }
}

impl std::fmt::Debug for RecognitionInvoker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecognitionInvoker")
            .field("engine", &self.engine.name())
            .finish()
    }
}
