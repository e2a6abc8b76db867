// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Output module — serialise a `DocumentArtifact` to DOCX, PDF or plain text
// and persist it.

pub mod docx;
pub mod pdf;
pub mod text;

use std::io::Write;
use std::path::{Path, PathBuf};

use scrivener_core::{DocumentArtifact, OutputFormat, Result, ScrivenerError};
use tempfile::NamedTempFile;
use tracing::{info, instrument};

pub use docx::DocxWriter;
pub use pdf::PdfWriter;
pub use text::TextWriter;

/// A document sink: renders an artifact to bytes in one file format.
pub trait DocumentWriter: Send + Sync {
    /// The format this writer produces.
    fn format(&self) -> OutputFormat;

    /// File extension without the leading dot.
    fn extension(&self) -> &'static str {
        self.format().extension()
    }

    /// Serialise the artifact. Failures are [`ScrivenerError::Render`].
    fn render(&self, artifact: &DocumentArtifact) -> Result<Vec<u8>>;

    /// Render and write to `path`, replacing any existing file.
    ///
    /// Rendering failures stay `Render`; filesystem failures become
    /// [`ScrivenerError::Persistence`].
    fn write_to(&self, artifact: &DocumentArtifact, path: &Path) -> Result<()> {
        let bytes = self.render(artifact)?;
        persist(&bytes, path)
    }
}

/// Writer for the given format.
pub fn writer_for(format: OutputFormat) -> Box<dyn DocumentWriter> {
    match format {
        OutputFormat::Docx => Box::new(DocxWriter::new()),
        OutputFormat::Pdf => Box::new(PdfWriter::a4()),
        OutputFormat::Text => Box::new(TextWriter::new()),
    }
}

/// Where a single converted image lands by default: next to the input, same
/// stem, the writer's extension.
pub fn default_output_path(input: &Path, format: OutputFormat) -> PathBuf {
    input.with_extension(format.extension())
}

/// Stage the bytes in a temp file beside `path`, then rename it into place.
///
/// A failed write never leaves a partial document at `path`; the staged file
/// is removed when it is dropped.
#[instrument(skip(bytes), fields(path = %path.display(), bytes_len = bytes.len()))]
fn persist(bytes: &[u8], path: &Path) -> Result<()> {
    let failed = |err: std::io::Error| {
        ScrivenerError::Persistence(format!("failed to write {}: {}", path.display(), err))
    };
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut staged = NamedTempFile::new_in(dir).map_err(failed)?;
    staged.write_all(bytes).map_err(failed)?;
    staged.as_file().sync_all().map_err(failed)?;
    staged.persist(path).map_err(|err| failed(err.error))?;

    info!("Document written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrivener_core::{Alignment, ErrorKind, Paragraph, TextRun};

    #[test]
    fn writers_match_their_format() {
        for format in [OutputFormat::Docx, OutputFormat::Pdf, OutputFormat::Text] {
            let writer = writer_for(format);
            assert_eq!(writer.format(), format);
            assert_eq!(writer.extension(), format.extension());
        }
    }

    #[test]
    fn default_output_sits_next_to_input() {
        assert_eq!(
            default_output_path(Path::new("/scans/page-01.png"), OutputFormat::Docx),
            PathBuf::from("/scans/page-01.docx")
        );
        assert_eq!(
            default_output_path(Path::new("receipt.jpeg"), OutputFormat::Text),
            PathBuf::from("receipt.txt")
        );
    }

    #[test]
    fn unwritable_destination_is_a_persistence_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("out.txt");
        let err = TextWriter::new()
            .write_to(&DocumentArtifact::default(), &path)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Persistence);
    }

    fn entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn failed_write_leaves_nothing_behind() {
        let dir = tempfile::tempdir().unwrap();
        // A non-empty directory at the target cannot be replaced by a file.
        let target = dir.path().join("page.txt");
        std::fs::create_dir(&target).unwrap();
        std::fs::write(target.join("keep"), b"x").unwrap();

        let artifact = DocumentArtifact {
            title: None,
            paragraphs: Vec::new(),
        };
        let err = TextWriter::new().write_to(&artifact, &target).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Persistence);

        assert_eq!(entries(dir.path()), vec!["page.txt"]);
        assert!(target.is_dir());
        assert_eq!(entries(&target), vec!["keep"]);
    }

    #[test]
    fn existing_document_is_replaced_whole() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("page.txt");
        std::fs::write(&target, "x".repeat(4096)).unwrap();

        let artifact = DocumentArtifact {
            title: None,
            paragraphs: vec![Paragraph {
                alignment: Alignment::Left,
                runs: vec![TextRun {
                    text: "short".into(),
                    font_family: "Arial".into(),
                    font_size_pt: 11,
                    bold: false,
                }],
            }],
        };
        TextWriter::new().write_to(&artifact, &target).unwrap();

        assert_eq!(std::fs::read_to_string(&target).unwrap(), artifact.plain_text());
        assert_eq!(entries(dir.path()), vec!["page.txt"]);
    }
}
