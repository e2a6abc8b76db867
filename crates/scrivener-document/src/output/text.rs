// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Plain-text writer.

use scrivener_core::{DocumentArtifact, OutputFormat, Result};

use crate::output::DocumentWriter;

/// Writes the artifact as UTF-8 text: title, then paragraphs separated by
/// blank lines. Formatting is dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextWriter;

impl TextWriter {
    pub fn new() -> Self {
        Self
    }
}

impl DocumentWriter for TextWriter {
    fn format(&self) -> OutputFormat {
        OutputFormat::Text
    }

    fn render(&self, artifact: &DocumentArtifact) -> Result<Vec<u8>> {
        Ok(artifact.plain_text().into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrivener_core::{Alignment, Paragraph, TextRun, TitleBlock};

    #[test]
    fn renders_title_and_paragraphs() {
        let run = |text: &str| TextRun {
            text: text.into(),
            font_family: "Calibri".into(),
            font_size_pt: 11,
            bold: false,
        };
        let artifact = DocumentArtifact {
            title: Some(TitleBlock {
                text: "Notes".into(),
                font_family: "Calibri".into(),
                font_size_pt: 22,
            }),
            paragraphs: vec![
                Paragraph {
                    alignment: Alignment::Left,
                    runs: vec![run("one")],
                },
                Paragraph {
                    alignment: Alignment::Left,
                    runs: vec![run("two\nlines")],
                },
            ],
        };
        let bytes = TextWriter::new().render(&artifact).unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), "Notes\n\none\n\ntwo\nlines\n");
    }
}
