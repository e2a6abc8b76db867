// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Scrivener image-to-document pipeline.
//
// Settings and styles are immutable snapshots: every constructor validates,
// and deserialisation goes through the same constructors.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ErrorKind, Result, ScrivenerError};

// -- Identifiers --------------------------------------------------------------

/// Unique identifier for a batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BatchId(pub Uuid);

impl BatchId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for BatchId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for BatchId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// -- Image adjustments --------------------------------------------------------

/// Accepted brightness factors (inclusive).
pub const BRIGHTNESS_RANGE: (f32, f32) = (0.5, 2.0);
/// Accepted contrast factors (inclusive).
pub const CONTRAST_RANGE: (f32, f32) = (0.5, 2.0);
/// Accepted sharpness factors (inclusive).
pub const SHARPEN_RANGE: (f32, f32) = (0.0, 2.0);
/// Default binarization threshold.
pub const DEFAULT_THRESHOLD: u8 = 127;

/// Raw, unvalidated adjustment values as they appear in configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdjustmentValues {
    pub brightness: f32,
    pub contrast: f32,
    pub sharpen: f32,
    pub binarize: bool,
    pub threshold: u8,
}

impl Default for AdjustmentValues {
    fn default() -> Self {
        Self {
            brightness: 1.0,
            contrast: 1.0,
            sharpen: 1.0,
            binarize: false,
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl AdjustmentValues {
    /// Validate into an immutable settings snapshot.
    pub fn validate(self) -> Result<ImageAdjustmentSettings> {
        ImageAdjustmentSettings::try_from(self)
    }
}

/// Validated pre-processing settings, fixed for the duration of a run.
///
/// A factor of `1.0` is neutral for brightness, contrast and sharpness.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "AdjustmentValues", into = "AdjustmentValues")]
pub struct ImageAdjustmentSettings {
    brightness: f32,
    contrast: f32,
    sharpen: f32,
    binarize: bool,
    threshold: u8,
}

impl ImageAdjustmentSettings {
    /// Build a settings snapshot, rejecting out-of-range or non-finite factors.
    pub fn new(
        brightness: f32,
        contrast: f32,
        sharpen: f32,
        binarize: bool,
        threshold: u8,
    ) -> Result<Self> {
        check_factor("brightness", brightness, BRIGHTNESS_RANGE)?;
        check_factor("contrast", contrast, CONTRAST_RANGE)?;
        check_factor("sharpen", sharpen, SHARPEN_RANGE)?;
        Ok(Self {
            brightness,
            contrast,
            sharpen,
            binarize,
            threshold,
        })
    }

    /// All factors at 1.0, binarization off.
    pub fn neutral() -> Self {
        Self {
            brightness: 1.0,
            contrast: 1.0,
            sharpen: 1.0,
            binarize: false,
            threshold: DEFAULT_THRESHOLD,
        }
    }

    pub fn brightness(&self) -> f32 {
        self.brightness
    }

    pub fn contrast(&self) -> f32 {
        self.contrast
    }

    pub fn sharpen(&self) -> f32 {
        self.sharpen
    }

    pub fn binarize(&self) -> bool {
        self.binarize
    }

    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    /// Whether processing would leave an image untouched.
    pub fn is_neutral(&self) -> bool {
        self.brightness == 1.0 && self.contrast == 1.0 && self.sharpen == 1.0 && !self.binarize
    }
}

impl Default for ImageAdjustmentSettings {
    fn default() -> Self {
        Self::neutral()
    }
}

impl TryFrom<AdjustmentValues> for ImageAdjustmentSettings {
    type Error = ScrivenerError;

    fn try_from(values: AdjustmentValues) -> Result<Self> {
        Self::new(
            values.brightness,
            values.contrast,
            values.sharpen,
            values.binarize,
            values.threshold,
        )
    }
}

impl From<ImageAdjustmentSettings> for AdjustmentValues {
    fn from(settings: ImageAdjustmentSettings) -> Self {
        Self {
            brightness: settings.brightness,
            contrast: settings.contrast,
            sharpen: settings.sharpen,
            binarize: settings.binarize,
            threshold: settings.threshold,
        }
    }
}

fn check_factor(name: &str, value: f32, (min, max): (f32, f32)) -> Result<()> {
    if !value.is_finite() || value < min || value > max {
        return Err(ScrivenerError::Configuration(format!(
            "{name} must be between {min} and {max}, got {value}"
        )));
    }
    Ok(())
}

// -- Document style -----------------------------------------------------------

/// Font families offered for document output.
pub const FONT_FAMILIES: &[&str] = &[
    "Calibri",
    "Arial",
    "Times New Roman",
    "Courier New",
    "Verdana",
    "Tahoma",
    "Georgia",
    "Garamond",
    "Comic Sans MS",
];

/// Largest accepted font size in points.
pub const MAX_FONT_SIZE_PT: u16 = 400;

/// Paragraph alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

impl Alignment {
    /// Parse case-insensitively; anything unrecognised falls back to `Left`.
    pub fn parse_or_left(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "center" | "centre" => Self::Center,
            "right" => Self::Right,
            "justify" | "justified" => Self::Justify,
            _ => Self::Left,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "Left",
            Self::Center => "Center",
            Self::Right => "Right",
            Self::Justify => "Justify",
        }
    }
}

impl From<String> for Alignment {
    fn from(value: String) -> Self {
        Self::parse_or_left(&value)
    }
}

impl From<Alignment> for String {
    fn from(alignment: Alignment) -> Self {
        alignment.as_str().to_string()
    }
}

/// Raw, unvalidated style values as they appear in configuration files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleValues {
    pub font_family: String,
    pub font_size_pt: u16,
    pub alignment: Alignment,
    pub include_title: bool,
    pub title_text: String,
}

impl Default for StyleValues {
    fn default() -> Self {
        Self {
            font_family: "Calibri".into(),
            font_size_pt: 11,
            alignment: Alignment::Left,
            include_title: true,
            title_text: "OCR Extracted Text".into(),
        }
    }
}

impl StyleValues {
    /// Validate into an immutable style snapshot.
    pub fn validate(self) -> Result<DocumentStyle> {
        DocumentStyle::try_from(self)
    }
}

/// Validated document formatting, fixed for the duration of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "StyleValues", into = "StyleValues")]
pub struct DocumentStyle {
    font_family: String,
    font_size_pt: u16,
    alignment: Alignment,
    include_title: bool,
    title_text: String,
}

impl DocumentStyle {
    pub fn new(
        font_family: impl Into<String>,
        font_size_pt: u16,
        alignment: Alignment,
        include_title: bool,
        title_text: impl Into<String>,
    ) -> Result<Self> {
        let font_family = font_family.into().trim().to_string();
        if font_family.is_empty() {
            return Err(ScrivenerError::Configuration(
                "font family must not be empty".into(),
            ));
        }
        if font_size_pt == 0 || font_size_pt > MAX_FONT_SIZE_PT {
            return Err(ScrivenerError::Configuration(format!(
                "font size must be between 1 and {MAX_FONT_SIZE_PT} pt, got {font_size_pt}"
            )));
        }
        Ok(Self {
            font_family,
            font_size_pt,
            alignment,
            include_title,
            title_text: title_text.into(),
        })
    }

    pub fn font_family(&self) -> &str {
        &self.font_family
    }

    pub fn font_size_pt(&self) -> u16 {
        self.font_size_pt
    }

    pub fn alignment(&self) -> Alignment {
        self.alignment
    }

    pub fn include_title(&self) -> bool {
        self.include_title
    }

    pub fn title_text(&self) -> &str {
        &self.title_text
    }
}

impl Default for DocumentStyle {
    fn default() -> Self {
        let values = StyleValues::default();
        Self {
            font_family: values.font_family,
            font_size_pt: values.font_size_pt,
            alignment: values.alignment,
            include_title: values.include_title,
            title_text: values.title_text,
        }
    }
}

impl TryFrom<StyleValues> for DocumentStyle {
    type Error = ScrivenerError;

    fn try_from(values: StyleValues) -> Result<Self> {
        Self::new(
            values.font_family,
            values.font_size_pt,
            values.alignment,
            values.include_title,
            values.title_text,
        )
    }
}

impl From<DocumentStyle> for StyleValues {
    fn from(style: DocumentStyle) -> Self {
        Self {
            font_family: style.font_family,
            font_size_pt: style.font_size_pt,
            alignment: style.alignment,
            include_title: style.include_title,
            title_text: style.title_text,
        }
    }
}

// -- Document artifact --------------------------------------------------------

/// A run of text sharing one font.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextRun {
    pub text: String,
    pub font_family: String,
    pub font_size_pt: u16,
    pub bold: bool,
}

/// A body paragraph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paragraph {
    pub alignment: Alignment,
    pub runs: Vec<TextRun>,
}

impl Paragraph {
    /// Concatenated text of every run.
    pub fn text(&self) -> String {
        self.runs.iter().map(|run| run.text.as_str()).collect()
    }
}

/// Heading shown above the body; always rendered bold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleBlock {
    pub text: String,
    pub font_family: String,
    pub font_size_pt: u16,
}

/// In-memory structured document, prior to serialisation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentArtifact {
    pub title: Option<TitleBlock>,
    pub paragraphs: Vec<Paragraph>,
}

impl DocumentArtifact {
    /// Plain-text rendition: title, then paragraphs separated by blank lines.
    pub fn plain_text(&self) -> String {
        let mut blocks: Vec<String> = Vec::with_capacity(self.paragraphs.len() + 1);
        if let Some(title) = &self.title {
            blocks.push(title.text.clone());
        }
        blocks.extend(self.paragraphs.iter().map(Paragraph::text));
        let mut out = blocks.join("\n\n");
        out.push('\n');
        out
    }
}

// -- Output formats -----------------------------------------------------------

/// Persistent document formats the sink can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Docx,
    Pdf,
    Text,
}

impl OutputFormat {
    /// File extension, without the leading dot.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Docx => "docx",
            Self::Pdf => "pdf",
            Self::Text => "txt",
        }
    }

    /// Infer the format from a file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "docx" => Some(Self::Docx),
            "pdf" => Some(Self::Pdf),
            "txt" | "text" => Some(Self::Text),
            _ => None,
        }
    }
}

// -- Results ------------------------------------------------------------------

/// Outcome of running the pipeline for one input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum PipelineResult {
    Success {
        source_path: PathBuf,
        artifact: DocumentArtifact,
    },
    Failure {
        source_path: PathBuf,
        kind: ErrorKind,
        message: String,
    },
}

impl PipelineResult {
    /// Capture an error as a failed result.
    pub fn failed(source_path: impl Into<PathBuf>, err: &ScrivenerError) -> Self {
        Self::Failure {
            source_path: source_path.into(),
            kind: err.kind(),
            message: err.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn source_path(&self) -> &Path {
        match self {
            Self::Success { source_path, .. } | Self::Failure { source_path, .. } => source_path,
        }
    }

    pub fn artifact(&self) -> Option<&DocumentArtifact> {
        match self {
            Self::Success { artifact, .. } => Some(artifact),
            Self::Failure { .. } => None,
        }
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { kind, .. } => Some(*kind),
        }
    }
}

/// One failed batch entry, as listed after a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureEntry<'a> {
    pub source_path: &'a Path,
    pub kind: ErrorKind,
    pub message: &'a str,
}

/// Summary of a batch run. `results` follows input order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub batch_id: BatchId,
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub results: Vec<PipelineResult>,
    pub cancelled: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl BatchReport {
    /// Every failed item, in input order.
    pub fn failures(&self) -> impl Iterator<Item = FailureEntry<'_>> {
        self.results.iter().filter_map(|result| match result {
            PipelineResult::Failure {
                source_path,
                kind,
                message,
            } => Some(FailureEntry {
                source_path,
                kind: *kind,
                message,
            }),
            PipelineResult::Success { .. } => None,
        })
    }

    /// One-line summary suitable for a status bar.
    pub fn summary(&self) -> String {
        let mut line = format!(
            "Batch processing complete. Success: {}, Failed: {}",
            self.succeeded, self.failed
        );
        if self.cancelled {
            line.push_str(" (cancelled)");
        }
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neutral_settings_are_default() {
        let settings = ImageAdjustmentSettings::default();
        assert!(settings.is_neutral());
        assert_eq!(settings.threshold(), 127);
    }

    #[test]
    fn settings_reject_out_of_range_factors() {
        assert!(ImageAdjustmentSettings::new(0.4, 1.0, 1.0, false, 127).is_err());
        assert!(ImageAdjustmentSettings::new(1.0, 2.5, 1.0, false, 127).is_err());
        assert!(ImageAdjustmentSettings::new(1.0, 1.0, -0.1, false, 127).is_err());
        assert!(ImageAdjustmentSettings::new(f32::NAN, 1.0, 1.0, false, 127).is_err());
        let err = ImageAdjustmentSettings::new(3.0, 1.0, 1.0, false, 0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn settings_accept_range_bounds() {
        let settings = ImageAdjustmentSettings::new(0.5, 2.0, 0.0, true, 255).unwrap();
        assert!(!settings.is_neutral());
        assert_eq!(settings.sharpen(), 0.0);
    }

    #[test]
    fn settings_deserialise_through_validation() {
        let ok: ImageAdjustmentSettings =
            serde_json::from_str(r#"{"brightness": 1.5, "binarize": true}"#).unwrap();
        assert_eq!(ok.brightness(), 1.5);
        assert_eq!(ok.contrast(), 1.0);
        assert!(ok.binarize());

        let bad = serde_json::from_str::<ImageAdjustmentSettings>(r#"{"contrast": 9.0}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn unknown_alignment_falls_back_to_left() {
        assert_eq!(Alignment::parse_or_left("CENTER"), Alignment::Center);
        assert_eq!(Alignment::parse_or_left("justify"), Alignment::Justify);
        assert_eq!(Alignment::parse_or_left("diagonal"), Alignment::Left);
        let parsed: Alignment = serde_json::from_str("\"sideways\"").unwrap();
        assert_eq!(parsed, Alignment::Left);
    }

    #[test]
    fn style_rejects_empty_font_and_bad_sizes() {
        assert!(DocumentStyle::new("  ", 11, Alignment::Left, false, "").is_err());
        assert!(DocumentStyle::new("Arial", 0, Alignment::Left, false, "").is_err());
        assert!(
            DocumentStyle::new("Arial", MAX_FONT_SIZE_PT + 1, Alignment::Left, false, "").is_err()
        );
        let style = DocumentStyle::new(" Arial ", 12, Alignment::Center, true, "Report").unwrap();
        assert_eq!(style.font_family(), "Arial");
    }

    #[test]
    fn style_defaults_match_catalogue() {
        let style = DocumentStyle::default();
        assert_eq!(style.font_family(), FONT_FAMILIES[0]);
        assert_eq!(style.font_size_pt(), 11);
        assert!(style.include_title());
        assert_eq!(style.title_text(), "OCR Extracted Text");
    }

    #[test]
    fn style_deserialises_with_alignment_fallback() {
        let style: DocumentStyle =
            serde_json::from_str(r#"{"font_family": "Georgia", "alignment": "weird"}"#).unwrap();
        assert_eq!(style.font_family(), "Georgia");
        assert_eq!(style.alignment(), Alignment::Left);
        assert!(serde_json::from_str::<DocumentStyle>(r#"{"font_size_pt": 0}"#).is_err());
    }

    #[test]
    fn failure_results_carry_kind_and_message() {
        let err = ScrivenerError::Decode("not an image".into());
        let result = PipelineResult::failed("scan.png", &err);
        assert!(!result.is_success());
        assert_eq!(result.error_kind(), Some(ErrorKind::Decode));
        assert_eq!(result.source_path(), Path::new("scan.png"));
        assert!(result.artifact().is_none());
    }

    #[test]
    fn plain_text_joins_blocks() {
        let run = |text: &str| TextRun {
            text: text.into(),
            font_family: "Arial".into(),
            font_size_pt: 12,
            bold: false,
        };
        let artifact = DocumentArtifact {
            title: Some(TitleBlock {
                text: "Report".into(),
                font_family: "Arial".into(),
                font_size_pt: 24,
            }),
            paragraphs: vec![
                Paragraph {
                    alignment: Alignment::Left,
                    runs: vec![run("one")],
                },
                Paragraph {
                    alignment: Alignment::Left,
                    runs: vec![run("two")],
                },
            ],
        };
        assert_eq!(artifact.plain_text(), "Report\n\none\n\ntwo\n");
    }

    #[test]
    fn output_format_extensions() {
        assert_eq!(OutputFormat::default().extension(), "docx");
        assert_eq!(OutputFormat::from_extension("PDF"), Some(OutputFormat::Pdf));
        assert_eq!(OutputFormat::from_extension("odt"), None);
    }
}
