// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Output planning — where each batch item's document is written, checked in
// full before the first item runs.

use std::collections::HashMap;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use scrivener_core::{OutputFormat, Result, ScrivenerError};
use scrivener_document::DocumentWriter;
use scrivener_document::output::writer_for;
use tracing::{debug, instrument};

use crate::orchestrator::BatchItem;

/// Probe file created and removed to prove the destination is writable.
const WRITE_PROBE: &str = ".scrivener-write-probe";

/// Destination directory plus the writer used for every item.
#[derive(Clone)]
pub struct OutputPlan {
    destination: PathBuf,
    writer: Arc<dyn DocumentWriter>,
}

impl OutputPlan {
    /// Plan output into `destination` using the default writer for `format`.
    ///
    /// # Errors
    ///
    /// [`ScrivenerError::Configuration`] if the destination is missing, is
    /// not a directory, or cannot be written to.
    pub fn new(destination: impl Into<PathBuf>, format: OutputFormat) -> Result<Self> {
        Self::with_writer(destination, Arc::from(writer_for(format)))
    }

    /// Plan output with a specific writer.
    pub fn with_writer(
        destination: impl Into<PathBuf>,
        writer: Arc<dyn DocumentWriter>,
    ) -> Result<Self> {
        let destination = destination.into();
        check_destination(&destination)?;
        debug!(
            destination = %destination.display(),
            format = writer.extension(),
            "Output destination ready"
        );
        Ok(Self {
            destination,
            writer,
        })
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    pub fn writer(&self) -> &dyn DocumentWriter {
        self.writer.as_ref()
    }

    /// Output path for one input: destination / input stem + extension.
    pub fn target_for(&self, source_path: &Path) -> Result<PathBuf> {
        let stem = source_path
            .file_stem()
            .filter(|stem| !stem.is_empty())
            .ok_or_else(|| {
                ScrivenerError::Configuration(format!(
                    "cannot derive an output name from {}",
                    source_path.display()
                ))
            })?;
        // Appended rather than `set_extension`, so "scan.v2.png" keeps ".v2".
        let mut file_name = stem.to_os_string();
        file_name.push(".");
        file_name.push(self.writer.extension());
        Ok(self.destination.join(file_name))
    }

    /// Output path for every item, in input order.
    ///
    /// # Errors
    ///
    /// [`ScrivenerError::Configuration`] naming the inputs if any two map to
    /// the same output file. Names differing only in case collide, since
    /// they do on case-insensitive filesystems.
    pub fn targets(&self, items: &[BatchItem]) -> Result<Vec<PathBuf>> {
        let mut targets = Vec::with_capacity(items.len());
        let mut claimed: HashMap<String, PathBuf> = HashMap::with_capacity(items.len());

        for item in items {
            let source = item.source_path();
            let target = self.target_for(&source)?;
            if let Some(first) = claimed.get(&folded_name(&target)) {
                return Err(ScrivenerError::Configuration(format!(
                    "{} and {} would both be written to {}",
                    first.display(),
                    source.display(),
                    target.display()
                )));
            }
            claimed.insert(folded_name(&target), source);
            targets.push(target);
        }
        Ok(targets)
    }
}

impl std::fmt::Debug for OutputPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutputPlan")
            .field("destination", &self.destination)
            .field("format", &self.writer.format())
            .finish()
    }
}

/// Case-folded file name; every target shares the destination directory.
fn folded_name(target: &Path) -> String {
    target
        .file_name()
        .map(|name| name.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

#[instrument(skip_all, fields(destination = %destination.display()))]
fn check_destination(destination: &Path) -> Result<()> {
    let metadata = std::fs::metadata(destination).map_err(|err| {
        ScrivenerError::Configuration(format!(
            "output folder {} is not accessible: {}",
            destination.display(),
            err
        ))
    })?;
    if !metadata.is_dir() {
        return Err(ScrivenerError::Configuration(format!(
            "output path {} is not a folder",
            destination.display()
        )));
    }

    let probe = destination.join(WRITE_PROBE);
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&probe)
        .map_err(|err| {
            ScrivenerError::Configuration(format!(
                "output folder {} is not writable: {}",
                destination.display(),
                err
            ))
        })?;
    // Leftover probe files are harmless.
    let _ = std::fs::remove_file(&probe);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrivener_core::{DocumentStyle, ErrorKind, ImageAdjustmentSettings, LanguageCode};

    fn item(path: &str) -> BatchItem {
        BatchItem::new(
            path,
            ImageAdjustmentSettings::neutral(),
            LanguageCode::ENGLISH,
            DocumentStyle::default(),
        )
    }

    #[test]
    fn targets_use_stem_and_writer_extension() {
        let dir = tempfile::tempdir().unwrap();
        let plan = OutputPlan::new(dir.path(), OutputFormat::Docx).unwrap();
        let targets = plan
            .targets(&[item("/scans/a.png"), item("/scans/b.final.jpg")])
            .unwrap();
        assert_eq!(
            targets,
            vec![dir.path().join("a.docx"), dir.path().join("b.final.docx")]
        );
        assert!(!dir.path().join(WRITE_PROBE).exists());
    }

    #[test]
    fn colliding_stems_are_rejected_with_both_names() {
        let dir = tempfile::tempdir().unwrap();
        let plan = OutputPlan::new(dir.path(), OutputFormat::Pdf).unwrap();
        let err = plan
            .targets(&[item("/in/one/page.png"), item("/in/b.png"), item("/in/two/page.jpg")])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        let message = err.to_string();
        assert!(message.contains("/in/one/page.png"));
        assert!(message.contains("/in/two/page.jpg"));
    }

    #[test]
    fn names_differing_only_in_case_collide() {
        let dir = tempfile::tempdir().unwrap();
        let plan = OutputPlan::new(dir.path(), OutputFormat::Docx).unwrap();
        let err = plan
            .targets(&[item("/in/Scan.png"), item("/in/scan.jpg")])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(err.to_string().contains("/in/Scan.png"));

        let targets = plan
            .targets(&[item("/in/Scan.png"), item("/in/scan2.jpg")])
            .unwrap();
        assert_eq!(targets[0], dir.path().join("Scan.docx"));
    }

    #[test]
    fn missing_or_non_directory_destination_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = OutputPlan::new(dir.path().join("absent"), OutputFormat::Docx).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);

        let file = dir.path().join("file.txt");
        std::fs::write(&file, "x").unwrap();
        let err = OutputPlan::new(&file, OutputFormat::Docx).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }
}
