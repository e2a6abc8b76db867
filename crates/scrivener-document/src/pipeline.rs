// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Single-item pipeline — decode, pre-process, recognise and assemble one image.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::DynamicImage;
use scrivener_core::{
    DocumentArtifact, DocumentStyle, ImageAdjustmentSettings, LanguageCode, PipelineResult,
    Result,
};
use tracing::{info, instrument, warn};

use crate::assemble::DocumentAssembler;
use crate::image::decode::ImageSource;
use crate::output::DocumentWriter;
use crate::scan::preprocess::Preprocessor;
use crate::scan::recognize::{RecognitionInvoker, Recognizer};

/// Runs one image through the whole chain.
///
/// Holds no per-run state, so one pipeline can serve many items (and many
/// threads) with the same recogniser.
#[derive(Debug, Clone)]
pub struct SingleItemPipeline {
    preprocessor: Preprocessor,
    invoker: RecognitionInvoker,
    assembler: DocumentAssembler,
}

impl SingleItemPipeline {
    /// Build a pipeline around a recognition engine.
    pub fn new(engine: impl Recognizer + 'static) -> Self {
        Self::with_invoker(RecognitionInvoker::new(engine))
    }

    /// Build a pipeline around an engine that is already shared.
    pub fn from_shared(engine: Arc<dyn Recognizer>) -> Self {
        Self::with_invoker(RecognitionInvoker::from_shared(engine))
    }

    fn with_invoker(invoker: RecognitionInvoker) -> Self {
        Self {
            preprocessor: Preprocessor::new(),
            invoker,
            assembler: DocumentAssembler::new(),
        }
    }

    /// Name of the recognition engine in use.
    pub fn engine_name(&self) -> &str {
        self.invoker.engine_name()
    }

    /// Run the pipeline and capture the outcome, success or failure.
    ///
    /// Never returns an error and never panics on bad input: every failure is
    /// recorded in [`PipelineResult::Failure`] with its kind.
    pub fn run(
        &self,
        source: &ImageSource,
        settings: &ImageAdjustmentSettings,
        language: LanguageCode,
        style: &DocumentStyle,
    ) -> PipelineResult {
        let source_path = source.source_path();
        match self.try_run(source, settings, language, style) {
            Ok(artifact) => PipelineResult::Success {
                source_path,
                artifact,
            },
            Err(err) => {
                warn!(source = %source_path.display(), kind = %err.kind(), error = %err, "Item failed");
                PipelineResult::failed(source_path, &err)
            }
        }
    }

    /// Run the pipeline, surfacing the first error.
    #[instrument(skip_all, fields(source = %source.source_path().display(), language = language.code()))]
    pub fn try_run(
        &self,
        source: &ImageSource,
        settings: &ImageAdjustmentSettings,
        language: LanguageCode,
        style: &DocumentStyle,
    ) -> Result<DocumentArtifact> {
        let image = source.decode()?;
        self.run_image(&image, settings, language, style)
    }

    /// Run everything after decoding on an image already in memory.
    pub fn run_image(
        &self,
        image: &DynamicImage,
        settings: &ImageAdjustmentSettings,
        language: LanguageCode,
        style: &DocumentStyle,
    ) -> Result<DocumentArtifact> {
        let text = self.recognize(image, settings, language)?;
        Ok(self.assembler.assemble(&text, style))
    }

    /// Pre-process and recognise without assembling a document.
    #[instrument(skip_all, fields(source = %source.source_path().display(), language = language.code()))]
    pub fn extract_text(
        &self,
        source: &ImageSource,
        settings: &ImageAdjustmentSettings,
        language: LanguageCode,
    ) -> Result<String> {
        let image = source.decode()?;
        self.recognize(&image, settings, language)
    }

    /// Convert one image and persist the document with `writer`.
    ///
    /// Single-item mode: the first error ends the run and is returned as-is.
    /// On success returns the path written.
    #[instrument(skip_all, fields(source = %source.source_path().display(), output = %output.display()))]
    pub fn convert_file(
        &self,
        source: &ImageSource,
        settings: &ImageAdjustmentSettings,
        language: LanguageCode,
        style: &DocumentStyle,
        writer: &dyn DocumentWriter,
        output: &Path,
    ) -> Result<PathBuf> {
        let artifact = self.try_run(source, settings, language, style)?;
        writer.write_to(&artifact, output)?;
        info!(paragraphs = artifact.paragraphs.len(), "Conversion complete");
        Ok(output.to_path_buf())
    }

    fn recognize(
        &self,
        image: &DynamicImage,
        settings: &ImageAdjustmentSettings,
        language: LanguageCode,
    ) -> Result<String> {
        let processed = self.preprocessor.process(image, settings);
        Ok(self.invoker.recognize(&processed, language)?)
    }
}
