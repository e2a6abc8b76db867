// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF writer — lays out a `DocumentArtifact` with `printpdf` 0.8.
//
// printpdf 0.8 uses a data-oriented API: documents are built by constructing
// `PdfPage` structs containing `Vec<Op>` operation lists, then serialised via
// `PdfDocument::save()`.
//
// Only the PDF built-in fonts are used, so family names are mapped to the
// nearest of Helvetica, Times and Courier, and text outside Latin-1 may not
// render. DOCX is the better target for non-Latin scripts.

use printpdf::{
    BuiltinFont, Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, Point, Pt, TextItem,
};
use scrivener_core::{Alignment, DocumentArtifact, OutputFormat, Result};
use tracing::{debug, info, instrument};

use crate::output::DocumentWriter;

/// A4 portrait, in millimetres.
const A4_MM: (f32, f32) = (210.0, 297.0);

const MARGIN_MM: f32 = 20.0;

/// Line height as a multiple of the font size.
const LINE_SPACING: f32 = 1.3;

/// Average built-in glyph width as a fraction of the font size.
const AVG_CHAR_WIDTH_EM: f32 = 0.50;

/// Writes paginated PDF documents.
#[derive(Debug, Clone)]
pub struct PdfWriter {
    page_width: Mm,
    page_height: Mm,
}

impl Default for PdfWriter {
    fn default() -> Self {
        Self::a4()
    }
}

impl PdfWriter {
    /// Create a writer for pages of the given size.
    pub fn new(width: Mm, height: Mm) -> Self {
        Self {
            page_width: width,
            page_height: height,
        }
    }

    /// Create a writer for A4 portrait pages.
    pub fn a4() -> Self {
        Self::new(Mm(A4_MM.0), Mm(A4_MM.1))
    }

    /// Flow the artifact into positioned lines, one `Vec` per page.
    fn layout(&self, artifact: &DocumentArtifact) -> Vec<Vec<PlacedLine>> {
        let margin_pt = Mm(MARGIN_MM).into_pt().0;
        let page_w_pt = self.page_width.into_pt().0;
        let page_h_pt = self.page_height.into_pt().0;
        let usable_w_pt = page_w_pt - 2.0 * margin_pt;
        let bottom_pt = margin_pt;

        let mut pages: Vec<Vec<PlacedLine>> = Vec::new();
        let mut current: Vec<PlacedLine> = Vec::new();
        let mut cursor_y = page_h_pt - margin_pt;

        let blocks = artifact
            .title
            .iter()
            .map(|title| Block {
                text: title.text.as_str(),
                font: builtin_font(&title.font_family, true),
                size_pt: title.font_size_pt as f32,
                alignment: Alignment::Left,
            })
            .chain(artifact.paragraphs.iter().flat_map(|paragraph| {
                paragraph.runs.iter().map(move |run| Block {
                    text: run.text.as_str(),
                    font: builtin_font(&run.font_family, run.bold),
                    size_pt: run.font_size_pt as f32,
                    alignment: paragraph.alignment,
                })
            }));

        for block in blocks {
            let line_height = block.size_pt * LINE_SPACING;
            let char_width = AVG_CHAR_WIDTH_EM * block.size_pt;
            let max_chars = ((usable_w_pt / char_width) as usize).max(1);

            for line in wrap_text(block.text, max_chars) {
                if cursor_y - line_height < bottom_pt && !current.is_empty() {
                    pages.push(std::mem::take(&mut current));
                    cursor_y = page_h_pt - margin_pt;
                }
                cursor_y -= line_height;

                let line_w = line.chars().count() as f32 * char_width;
                let x = match block.alignment {
                    Alignment::Left | Alignment::Justify => margin_pt,
                    Alignment::Center => margin_pt + (usable_w_pt - line_w).max(0.0) / 2.0,
                    Alignment::Right => margin_pt + (usable_w_pt - line_w).max(0.0),
                };

                current.push(PlacedLine {
                    text: line,
                    font: block.font.clone(),
                    size_pt: block.size_pt,
                    x,
                    y: cursor_y,
                });
            }
            // Half a line of space after every block.
            cursor_y -= line_height / 2.0;
        }

        if !current.is_empty() || pages.is_empty() {
            pages.push(current);
        }
        pages
    }
}

impl DocumentWriter for PdfWriter {
    fn format(&self) -> OutputFormat {
        OutputFormat::Pdf
    }

    #[instrument(skip_all, fields(paragraphs = artifact.paragraphs.len()))]
    fn render(&self, artifact: &DocumentArtifact) -> Result<Vec<u8>> {
        let title = artifact
            .title
            .as_ref()
            .map(|title| title.text.as_str())
            .unwrap_or("Scrivener Document");
        info!(title, "Creating PDF");

        let laid_out = self.layout(artifact);
        let mut doc = PdfDocument::new(title);

        let pages: Vec<PdfPage> = laid_out
            .into_iter()
            .map(|lines| {
                let mut ops: Vec<Op> = Vec::with_capacity(lines.len() * 5);
                for line in lines {
                    ops.push(Op::StartTextSection);
                    ops.push(Op::SetTextCursor {
                        pos: Point {
                            x: Pt(line.x),
                            y: Pt(line.y),
                        },
                    });
                    ops.push(Op::SetFontSizeBuiltinFont {
                        size: Pt(line.size_pt),
                        font: line.font.clone(),
                    });
                    ops.push(Op::WriteTextBuiltinFont {
                        items: vec![TextItem::Text(line.text)],
                        font: line.font,
                    });
                    ops.push(Op::EndTextSection);
                }
                PdfPage::new(self.page_width, self.page_height, ops)
            })
            .collect();

        doc.with_pages(pages);
        debug!(pages = doc.pages.len(), "PDF layout complete");

        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        let output = doc.save(&PdfSaveOptions::default(), &mut warnings);
        Ok(output)
    }
}

// -- Layout helpers -----------------------------------------------------------

struct Block<'a> {
    text: &'a str,
    font: BuiltinFont,
    size_pt: f32,
    alignment: Alignment,
}

struct PlacedLine {
    text: String,
    font: BuiltinFont,
    size_pt: f32,
    x: f32,
    y: f32,
}

/// Nearest built-in face for a family name.
fn builtin_font(family: &str, bold: bool) -> BuiltinFont {
    let family = family.to_ascii_lowercase();
    let serif = ["times", "georgia", "garamond", "cambria", "book"]
        .iter()
        .any(|name| family.contains(name));
    let mono = ["courier", "consolas", "mono"]
        .iter()
        .any(|name| family.contains(name));

    match (serif, mono, bold) {
        (_, true, false) => BuiltinFont::Courier,
        (_, true, true) => BuiltinFont::CourierBold,
        (true, _, false) => BuiltinFont::TimesRoman,
        (true, _, true) => BuiltinFont::TimesBold,
        (_, _, false) => BuiltinFont::Helvetica,
        (_, _, true) => BuiltinFont::HelveticaBold,
    }
}

/// Wrap a multi-line string so that no line exceeds `max_width` characters.
///
/// Splits on existing newlines first, then performs simple word-wrap within each
/// line. Words longer than `max_width` are force-broken on character
/// boundaries.
fn wrap_text(text: &str, max_width: usize) -> Vec<String> {
    let mut result = Vec::new();

    for source_line in text.split('\n') {
        let words: Vec<&str> = source_line.split_whitespace().collect();
        if words.is_empty() {
            result.push(String::new());
            continue;
        }

        let mut current_line = String::new();
        let mut current_len = 0usize;

        for word in words {
            let word_len = word.chars().count();
            if word_len > max_width {
                if !current_line.is_empty() {
                    result.push(std::mem::take(&mut current_line));
                }
                let chars: Vec<char> = word.chars().collect();
                let mut chunks = chars.chunks(max_width).peekable();
                while let Some(chunk) = chunks.next() {
                    if chunks.peek().is_some() {
                        result.push(chunk.iter().collect());
                    } else {
                        current_line = chunk.iter().collect();
                        current_len = chunk.len();
                    }
                }
            } else if current_line.is_empty() {
                current_line.push_str(word);
                current_len = word_len;
            } else if current_len + 1 + word_len <= max_width {
                current_line.push(' ');
                current_line.push_str(word);
                current_len += 1 + word_len;
            } else {
                result.push(std::mem::take(&mut current_line));
                current_line.push_str(word);
                current_len = word_len;
            }
        }

        if !current_line.is_empty() {
            result.push(current_line);
        }
    }

    result
}
