// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document assembly — turns recognised text into a structured, styled
// document artifact. Purely in-memory; nothing here touches the engine.

use scrivener_core::{
    DocumentArtifact, DocumentStyle, MAX_FONT_SIZE_PT, Paragraph, TextRun, TitleBlock,
};
use tracing::{debug, instrument};

/// Paragraph separator in recogniser output.
const BLOCK_SEPARATOR: &str = "\n\n";

/// Builds a [`DocumentArtifact`] from plain text and a [`DocumentStyle`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentAssembler;

impl DocumentAssembler {
    pub fn new() -> Self {
        Self
    }

    /// Assemble `text` into a titled, paragraph-structured document.
    ///
    /// Blocks are separated by blank lines; each is trimmed and blocks left
    /// empty are dropped. Single newlines inside a block survive as line
    /// breaks. The title block, when enabled, is emitted even if the body
    /// ends up empty.
    #[instrument(skip_all, fields(text_len = text.len(), include_title = style.include_title()))]
    pub fn assemble(&self, text: &str, style: &DocumentStyle) -> DocumentArtifact {
        let title = style.include_title().then(|| TitleBlock {
            text: style.title_text().to_string(),
            font_family: style.font_family().to_string(),
            font_size_pt: title_size(style.font_size_pt()),
        });

        let paragraphs: Vec<Paragraph> = split_paragraphs(text)
            .into_iter()
            .map(|block| Paragraph {
                alignment: style.alignment(),
                runs: vec![TextRun {
                    text: block,
                    font_family: style.font_family().to_string(),
                    font_size_pt: style.font_size_pt(),
                    bold: false,
                }],
            })
            .collect();

        debug!(paragraphs = paragraphs.len(), "Document assembled");
        DocumentArtifact { title, paragraphs }
    }
}

/// Split recogniser output into trimmed, non-blank paragraph blocks.
///
/// Carriage returns are normalised first, so `\r\n\r\n` separates blocks the
/// same way `\n\n` does.
pub fn split_paragraphs(text: &str) -> Vec<String> {
    let normalised = text.replace("\r\n", "\n").replace('\r', "\n");
    normalised
        .split(BLOCK_SEPARATOR)
        .map(str::trim)
        .filter(|block| !block.is_empty())
        .map(str::to_string)
        .collect()
}

/// Heading size for a given body size: double, capped at the style maximum.
fn title_size(body_pt: u16) -> u16 {
    (body_pt as u32 * 2).min(MAX_FONT_SIZE_PT as u32) as u16
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrivener_core::Alignment;

    fn style(include_title: bool) -> DocumentStyle {
        DocumentStyle::new("Arial", 12, Alignment::Center, include_title, "Report").unwrap()
    }

    #[test]
    fn two_blocks_with_title() {
        let artifact =
            DocumentAssembler::new().assemble("Hello world\n\nSecond para", &style(true));

        let title = artifact.title.as_ref().unwrap();
        assert_eq!(title.text, "Report");
        assert!(title.font_size_pt > 12);

        assert_eq!(artifact.paragraphs.len(), 2);
        for paragraph in &artifact.paragraphs {
            assert_eq!(paragraph.alignment, Alignment::Center);
            for run in &paragraph.runs {
                assert_eq!(run.font_family, "Arial");
                assert_eq!(run.font_size_pt, 12);
                assert!(!run.bold);
            }
        }
        assert_eq!(artifact.paragraphs[0].text(), "Hello world");
        assert_eq!(artifact.paragraphs[1].text(), "Second para");
    }

    #[test]
    fn blank_blocks_are_dropped() {
        let text = "  \n\nfirst\n\n\n\n   \n\n second \n\n";
        let artifact = DocumentAssembler::new().assemble(text, &style(false));
        let texts: Vec<String> = artifact.paragraphs.iter().map(Paragraph::text).collect();
        assert_eq!(texts, vec!["first", "second"]);
        assert!(artifact.paragraphs.iter().all(|p| !p.text().trim().is_empty()));
    }

    #[test]
    fn no_title_when_disabled() {
        let artifact = DocumentAssembler::new().assemble("body", &style(false));
        assert!(artifact.title.is_none());
        assert_eq!(artifact.paragraphs.len(), 1);
    }

    #[test]
    fn title_survives_empty_text() {
        let artifact = DocumentAssembler::new().assemble(" \n \n\n", &style(true));
        assert!(artifact.title.is_some());
        assert!(artifact.paragraphs.is_empty());
    }

    #[test]
    fn single_newlines_stay_inside_paragraph() {
        let artifact =
            DocumentAssembler::new().assemble("line one\nline two\r\n\r\nnext", &style(false));
        assert_eq!(artifact.paragraphs.len(), 2);
        assert_eq!(artifact.paragraphs[0].text(), "line one\nline two");
    }

    #[test]
    fn title_size_is_capped() {
        assert_eq!(title_size(11), 22);
        assert_eq!(title_size(MAX_FONT_SIZE_PT), MAX_FONT_SIZE_PT);
    }
}
