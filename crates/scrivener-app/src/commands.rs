// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Subcommand implementations.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use scrivener_batch::{BatchItem, BatchOrchestrator, CancelToken, OutputPlan};
use scrivener_core::config::EngineConfig;
use scrivener_core::language::SUPPORTED_LANGUAGES;
use scrivener_core::{AppConfig, FONT_FAMILIES, Result, ScrivenerError};
use scrivener_document::output::{default_output_path, writer_for};
use scrivener_document::{ImageSource, SingleItemPipeline, TesseractCli};
use tracing::{info, warn};

use crate::cli::EngineChoice;
use crate::progress::ProgressPrinter;

/// Extensions picked up when a batch input is a folder.
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "gif", "tif", "tiff", "webp"];

// -- Engine selection ---------------------------------------------------------

pub fn build_pipeline(choice: EngineChoice, engine: &EngineConfig) -> Result<SingleItemPipeline> {
    match choice {
        EngineChoice::Tesseract => Ok(SingleItemPipeline::new(TesseractCli::from_config(engine))),
        EngineChoice::Ocrs => builtin_pipeline(engine),
    }
}

#[cfg(feature = "ocrs")]
fn builtin_pipeline(engine: &EngineConfig) -> Result<SingleItemPipeline> {
    use scrivener_document::OcrsRecognizer;

    let recognizer = match &engine.model_dir {
        Some(dir) => OcrsRecognizer::from_model_dir(dir)?,
        None => OcrsRecognizer::with_defaults()?,
    };
    Ok(SingleItemPipeline::new(recognizer))
}

#[cfg(not(feature = "ocrs"))]
fn builtin_pipeline(_engine: &EngineConfig) -> Result<SingleItemPipeline> {
    Err(ScrivenerError::Configuration(
        "this build has no built-in engine; rebuild with `--features ocrs` or use `--engine tesseract`"
            .into(),
    ))
}

// -- Commands -----------------------------------------------------------------

pub fn convert(
    pipeline: &SingleItemPipeline,
    config: &AppConfig,
    input: &Path,
    output: Option<PathBuf>,
) -> Result<ExitCode> {
    let output = output.unwrap_or_else(|| default_output_path(input, config.output_format));
    let writer = writer_for(config.output_format);
    let saved = pipeline.convert_file(
        &ImageSource::path(input),
        &config.adjustments,
        config.language,
        &config.style,
        writer.as_ref(),
        &output,
    )?;
    println!("Saved {}", saved.display());
    Ok(ExitCode::SUCCESS)
}

pub fn text(pipeline: &SingleItemPipeline, config: &AppConfig, input: &Path) -> Result<ExitCode> {
    let text = pipeline.extract_text(
        &ImageSource::path(input),
        &config.adjustments,
        config.language,
    )?;
    println!("{}", text.trim_end());
    Ok(ExitCode::SUCCESS)
}

/// Run a batch on a background worker while this thread prints progress.
/// Ctrl-C stops the batch after the file in progress.
pub fn batch(
    pipeline: SingleItemPipeline,
    config: &AppConfig,
    inputs: &[PathBuf],
    out_dir: &Path,
) -> Result<ExitCode> {
    let files = expand_inputs(inputs)?;
    if files.is_empty() {
        return Err(ScrivenerError::Configuration("no images to convert".into()));
    }
    let items = BatchItem::uniform(files, &config.adjustments, config.language, &config.style);
    let plan = OutputPlan::new(out_dir, config.output_format)?;

    let runtime = tokio::runtime::Runtime::new()?;
    let _context = runtime.enter();

    let cancel = CancelToken::new();
    let handle = BatchOrchestrator::new(pipeline).spawn_batch(items, plan, cancel.clone())?;
    let interrupt = runtime.spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted; stopping after the current file");
            cancel.cancel();
        }
    });

    let mut printer = ProgressPrinter::new(std::io::stderr());
    let report = runtime.block_on(handle.drive(&mut printer))?;
    interrupt.abort();

    info!(batch_id = %report.batch_id, "Batch finished");
    if report.failed == 0 {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

pub fn languages(engine: &EngineConfig, installed: bool) -> Result<ExitCode> {
    let available = if installed {
        Some(TesseractCli::from_config(engine).installed_languages()?)
    } else {
        None
    };

    for language in SUPPORTED_LANGUAGES {
        let marker = match &available {
            Some(codes) if codes.iter().any(|code| code == language.code) => "  installed",
            Some(_) => "  missing",
            None => "",
        };
        println!("{:<24}{:<10}{}", language.name, language.code, marker);
    }
    Ok(ExitCode::SUCCESS)
}

pub fn fonts() -> Result<ExitCode> {
    for family in FONT_FAMILIES {
        println!("{family}");
    }
    Ok(ExitCode::SUCCESS)
}

pub fn init_config(config: &AppConfig, path: &Path) -> Result<ExitCode> {
    config.save(path)?;
    println!("Wrote {}", path.display());
    Ok(ExitCode::SUCCESS)
}

// -- Helpers ------------------------------------------------------------------

/// Files stay as given; folders contribute their images sorted by name.
fn expand_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::with_capacity(inputs.len());
    for input in inputs {
        if !input.is_dir() {
            files.push(input.clone());
            continue;
        }
        let mut found: Vec<PathBuf> = std::fs::read_dir(input)?
            .filter_map(|entry| entry.ok().map(|entry| entry.path()))
            .filter(|path| path.is_file() && is_image(path))
            .collect();
        found.sort();
        files.extend(found);
    }
    Ok(files)
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folders_expand_to_sorted_images() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.PNG", "a.jpg", "notes.txt"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        std::fs::create_dir(dir.path().join("nested.png")).unwrap();

        let loose = PathBuf::from("/elsewhere/z.tif");
        let files = expand_inputs(&[loose.clone(), dir.path().to_path_buf()]).unwrap();
        assert_eq!(
            files,
            vec![loose, dir.path().join("a.jpg"), dir.path().join("b.PNG")]
        );
    }

    #[cfg(not(feature = "ocrs"))]
    #[test]
    fn builtin_engine_needs_the_feature() {
        let err = build_pipeline(EngineChoice::Ocrs, &EngineConfig::default()).unwrap_err();
        assert!(matches!(err, ScrivenerError::Configuration(_)));
    }

    #[test]
    fn tesseract_is_the_default_engine() {
        let pipeline = build_pipeline(EngineChoice::Tesseract, &EngineConfig::default()).unwrap();
        assert_eq!(pipeline.engine_name(), "tesseract");
    }
}
