// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command-line arguments and how they override the loaded configuration.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use scrivener_core::{
    AppConfig, Alignment, DocumentStyle, ImageAdjustmentSettings, LanguageCode, OutputFormat,
    Result,
};

#[derive(Debug, Parser)]
#[command(name = "scrivener", version)]
#[command(about = "Turn scanned images into formatted documents", long_about = None)]
pub struct Cli {
    /// Configuration file (defaults to $XDG_CONFIG_HOME/scrivener/config.json)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Recognition engine
    #[arg(long, value_enum, global = true, default_value = "tesseract")]
    pub engine: EngineChoice,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Convert one image into a document
    Convert {
        /// Image to convert
        input: PathBuf,

        /// Output file (defaults to the input path with the format's extension)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        overrides: Overrides,
    },

    /// Convert many images into one output folder
    Batch {
        /// Images, or folders whose images are all converted
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Folder receiving one document per input
        #[arg(short = 'd', long)]
        out_dir: PathBuf,

        #[command(flatten)]
        overrides: Overrides,
    },

    /// Print the recognised text of one image
    Text {
        input: PathBuf,

        #[command(flatten)]
        overrides: Overrides,
    },

    /// List recognition languages
    Languages {
        /// Also ask the engine which language packs are installed
        #[arg(long)]
        installed: bool,
    },

    /// List offered font families
    Fonts,

    /// Write the effective configuration (defaults plus overrides) to the config file
    InitConfig {
        #[command(flatten)]
        overrides: Overrides,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EngineChoice {
    /// External `tesseract` executable
    Tesseract,
    /// Built-in engine (requires the `ocrs` build feature)
    Ocrs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Docx,
    Pdf,
    Txt,
}

impl From<FormatArg> for OutputFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Docx => OutputFormat::Docx,
            FormatArg::Pdf => OutputFormat::Pdf,
            FormatArg::Txt => OutputFormat::Text,
        }
    }
}

/// Per-run overrides of the configured settings.
#[derive(Debug, Clone, Default, Args)]
pub struct Overrides {
    /// Language name or code (e.g. "German" or "deu")
    #[arg(short, long)]
    pub language: Option<String>,

    /// Brightness factor, 0.5 to 2.0
    #[arg(long)]
    pub brightness: Option<f32>,

    /// Contrast factor, 0.5 to 2.0
    #[arg(long)]
    pub contrast: Option<f32>,

    /// Sharpen factor, 0.0 to 2.0
    #[arg(long)]
    pub sharpen: Option<f32>,

    /// Convert to black and white before recognition
    #[arg(long, conflicts_with = "no_binarize")]
    pub binarize: bool,

    /// Skip black and white conversion even if the config enables it
    #[arg(long)]
    pub no_binarize: bool,

    /// Binarize threshold
    #[arg(long)]
    pub threshold: Option<u8>,

    /// Font family
    #[arg(long)]
    pub font: Option<String>,

    /// Font size in points
    #[arg(long)]
    pub font_size: Option<u16>,

    /// Paragraph alignment (left, center, right, justify)
    #[arg(long)]
    pub align: Option<String>,

    /// Title text
    #[arg(long, conflicts_with = "no_title")]
    pub title: Option<String>,

    /// Leave out the title
    #[arg(long)]
    pub no_title: bool,

    /// Output format
    #[arg(short, long, value_enum)]
    pub format: Option<FormatArg>,
}

impl Overrides {
    /// Apply to a loaded config. Every value goes back through validation.
    pub fn apply(&self, mut config: AppConfig) -> Result<AppConfig> {
        if let Some(language) = &self.language {
            config.language = LanguageCode::resolve(language)?;
        }

        let current = &config.adjustments;
        let binarize = !self.no_binarize && (self.binarize || current.binarize());
        config.adjustments = ImageAdjustmentSettings::new(
            self.brightness.unwrap_or(current.brightness()),
            self.contrast.unwrap_or(current.contrast()),
            self.sharpen.unwrap_or(current.sharpen()),
            binarize,
            self.threshold.unwrap_or(current.threshold()),
        )?;

        let style = &config.style;
        let include_title = if self.no_title {
            false
        } else {
            self.title.is_some() || style.include_title()
        };
        config.style = DocumentStyle::new(
            self.font.clone().unwrap_or_else(|| style.font_family().to_string()),
            self.font_size.unwrap_or(style.font_size_pt()),
            self.align
                .as_deref()
                .map(Alignment::parse_or_left)
                .unwrap_or(style.alignment()),
            include_title,
            self.title.clone().unwrap_or_else(|| style.title_text().to_string()),
        )?;

        if let Some(format) = self.format {
            config.output_format = format.into();
        }
        Ok(config)
    }
}
