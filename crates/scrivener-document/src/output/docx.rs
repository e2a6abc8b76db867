// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// DOCX writer — a minimal WordprocessingML package (document, styles, core
// properties) zipped with `zip` and escaped with `quick-xml`.
//
// Every archive entry carries the same fixed timestamp and entries are written
// in a fixed order, so identical artifacts produce byte-identical files.

use std::borrow::Cow;
use std::io::{Cursor, Write};

use quick_xml::escape::escape;
use scrivener_core::{
    Alignment, DocumentArtifact, OutputFormat, Paragraph, Result, ScrivenerError, TextRun,
    TitleBlock,
};
use tracing::{debug, instrument};
use zip::write::{FileOptions, ZipWriter};
use zip::{CompressionMethod, DateTime};

use crate::output::DocumentWriter;

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/><Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/></Types>"#;

const PACKAGE_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/></Relationships>"#;

const DOCUMENT_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/></Relationships>"#;

const STYLES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:docDefaults><w:rPrDefault><w:rPr><w:rFonts w:ascii="Calibri" w:hAnsi="Calibri" w:eastAsia="Calibri" w:cs="Calibri"/><w:sz w:val="22"/><w:szCs w:val="22"/></w:rPr></w:rPrDefault><w:pPrDefault><w:pPr><w:spacing w:after="160" w:line="259" w:lineRule="auto"/></w:pPr></w:pPrDefault></w:docDefaults><w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/><w:qFormat/></w:style><w:style w:type="paragraph" w:styleId="Title"><w:name w:val="Title"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:qFormat/><w:pPr><w:spacing w:after="240"/></w:pPr><w:rPr><w:b/><w:bCs/><w:kern w:val="28"/></w:rPr></w:style></w:styles>"#;

const DOCUMENT_OPEN: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>"#;

/// A4 portrait with one-inch margins, in twentieths of a point.
const SECTION_PROPERTIES: &str = r#"<w:sectPr><w:pgSz w:w="11906" w:h="16838"/><w:pgMar w:top="1440" w:right="1440" w:bottom="1440" w:left="1440" w:header="708" w:footer="708" w:gutter="0"/></w:sectPr>"#;

const DOCUMENT_CLOSE: &str = "</w:body></w:document>";

/// Writes Office Open XML word-processing documents (`.docx`).
#[derive(Debug, Clone, Default)]
pub struct DocxWriter {
    /// Value of `dc:creator` in the core properties.
    creator: Option<String>,
}

impl DocxWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an author in the document properties.
    pub fn with_creator(mut self, creator: impl Into<String>) -> Self {
        self.creator = Some(creator.into());
        self
    }

    /// `word/document.xml` for the artifact.
    pub fn document_xml(&self, artifact: &DocumentArtifact) -> String {
        let mut xml = String::from(DOCUMENT_OPEN);
        if let Some(title) = &artifact.title {
            push_title(&mut xml, title);
        }
        for paragraph in &artifact.paragraphs {
            push_paragraph(&mut xml, paragraph);
        }
        xml.push_str(SECTION_PROPERTIES);
        xml.push_str(DOCUMENT_CLOSE);
        xml
    }

    fn core_xml(&self, artifact: &DocumentArtifact) -> String {
        let title = artifact
            .title
            .as_ref()
            .map(|title| xml_text(&title.text).into_owned())
            .unwrap_or_default();
        let creator = xml_text(self.creator.as_deref().unwrap_or("Scrivener")).into_owned();
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/"><dc:title>{title}</dc:title><dc:creator>{creator}</dc:creator></cp:coreProperties>"#
        )
    }
}

impl DocumentWriter for DocxWriter {
    fn format(&self) -> OutputFormat {
        OutputFormat::Docx
    }

    #[instrument(skip_all, fields(paragraphs = artifact.paragraphs.len()))]
    fn render(&self, artifact: &DocumentArtifact) -> Result<Vec<u8>> {
        let parts: [(&str, Cow<'_, str>); 6] = [
            ("[Content_Types].xml", Cow::Borrowed(CONTENT_TYPES_XML)),
            ("_rels/.rels", Cow::Borrowed(PACKAGE_RELS_XML)),
            ("docProps/core.xml", Cow::Owned(self.core_xml(artifact))),
            ("word/_rels/document.xml.rels", Cow::Borrowed(DOCUMENT_RELS_XML)),
            ("word/styles.xml", Cow::Borrowed(STYLES_XML)),
            ("word/document.xml", Cow::Owned(self.document_xml(artifact))),
        ];

        let mut cursor = Cursor::new(Vec::new());
        {
            let mut zip = ZipWriter::new(&mut cursor);
            let options = FileOptions::<'_, ()>::default()
                .compression_method(CompressionMethod::Deflated)
                .last_modified_time(DateTime::default());

            for (name, content) in &parts {
                zip.start_file(*name, options).map_err(|err| {
                    ScrivenerError::Render(format!("failed to start {} in archive: {}", name, err))
                })?;
                zip.write_all(content.as_bytes()).map_err(|err| {
                    ScrivenerError::Render(format!("failed to write {} to archive: {}", name, err))
                })?;
            }

            zip.finish().map_err(|err| {
                ScrivenerError::Render(format!("failed to finish DOCX archive: {}", err))
            })?;
        }

        let bytes = cursor.into_inner();
        debug!(bytes_len = bytes.len(), "DOCX rendered");
        Ok(bytes)
    }
}

// -- WordprocessingML fragments -----------------------------------------------

fn push_title(xml: &mut String, title: &TitleBlock) {
    xml.push_str(r#"<w:p><w:pPr><w:pStyle w:val="Title"/></w:pPr>"#);
    push_run(xml, &title.text, &title.font_family, title.font_size_pt, true);
    xml.push_str("</w:p>");
}

fn push_paragraph(xml: &mut String, paragraph: &Paragraph) {
    xml.push_str("<w:p><w:pPr>");
    xml.push_str(&format!(r#"<w:jc w:val="{}"/>"#, justification(paragraph.alignment)));
    xml.push_str("</w:pPr>");
    for TextRun {
        text,
        font_family,
        font_size_pt,
        bold,
    } in &paragraph.runs
    {
        push_run(xml, text, font_family, *font_size_pt, *bold);
    }
    xml.push_str("</w:p>");
}

fn push_run(xml: &mut String, text: &str, font_family: &str, size_pt: u16, bold: bool) {
    let font = xml_text(font_family);
    // Word measures font size in half-points.
    let half_points = size_pt as u32 * 2;

    xml.push_str("<w:r><w:rPr>");
    xml.push_str(&format!(
        r#"<w:rFonts w:ascii="{font}" w:hAnsi="{font}" w:eastAsia="{font}" w:cs="{font}"/>"#
    ));
    if bold {
        xml.push_str("<w:b/><w:bCs/>");
    }
    xml.push_str(&format!(
        r#"<w:sz w:val="{half_points}"/><w:szCs w:val="{half_points}"/>"#
    ));
    xml.push_str("</w:rPr>");

    for (index, line) in text.split('\n').enumerate() {
        if index > 0 {
            xml.push_str("<w:br/>");
        }
        xml.push_str(r#"<w:t xml:space="preserve">"#);
        xml.push_str(&xml_text(line));
        xml.push_str("</w:t>");
    }
    xml.push_str("</w:r>");
}

fn justification(alignment: Alignment) -> &'static str {
    match alignment {
        Alignment::Left => "left",
        Alignment::Center => "center",
        Alignment::Right => "right",
        Alignment::Justify => "both",
    }
}

/// Escape markup characters and drop the control characters XML 1.0 forbids
/// (OCR output often contains form feeds between pages).
fn xml_text(text: &str) -> Cow<'_, str> {
    let is_forbidden = |c: char| c < ' ' && !matches!(c, '\t' | '\n' | '\r');
    if text.chars().any(is_forbidden) {
        let cleaned: String = text.chars().filter(|c| !is_forbidden(*c)).collect();
        Cow::Owned(escape(cleaned.as_str()).into_owned())
    } else {
        escape(text)
    }
}
