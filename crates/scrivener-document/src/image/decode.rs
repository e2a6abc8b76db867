// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image sources — where a pipeline item's pixels come from. Decoding is the
// only place a `DecodeError` originates.

use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageReader};
use scrivener_core::{Result, ScrivenerError};
use tracing::{debug, instrument};

/// An encoded image waiting to be decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// An image file on disk. The format is sniffed from the content, so a
    /// misnamed extension still decodes.
    Path(PathBuf),
    /// Encoded bytes already in memory, with a display name used in results.
    Bytes { name: String, data: Vec<u8> },
}

impl ImageSource {
    /// Source backed by a file path.
    pub fn path(path: impl Into<PathBuf>) -> Self {
        Self::Path(path.into())
    }

    /// Source backed by in-memory bytes.
    pub fn bytes(name: impl Into<String>, data: Vec<u8>) -> Self {
        Self::Bytes {
            name: name.into(),
            data,
        }
    }

    /// The path reported in pipeline results for this source.
    pub fn source_path(&self) -> PathBuf {
        match self {
            Self::Path(path) => path.clone(),
            Self::Bytes { name, .. } => PathBuf::from(name),
        }
    }

    /// Decode the source into pixels.
    ///
    /// # Errors
    ///
    /// Returns [`ScrivenerError::Decode`] if the file is missing, unreadable,
    /// or not an image in a supported format.
    #[instrument(skip(self), fields(source = %self.source_path().display()))]
    pub fn decode(&self) -> Result<DynamicImage> {
        let image = match self {
            Self::Path(path) => decode_path(path)?,
            Self::Bytes { name, data } => image::load_from_memory(data).map_err(|err| {
                ScrivenerError::Decode(format!("failed to decode {}: {}", name, err))
            })?,
        };
        debug!(
            width = image.width(),
            height = image.height(),
            "Image decoded"
        );
        Ok(image)
    }
}

impl From<PathBuf> for ImageSource {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

impl From<&Path> for ImageSource {
    fn from(path: &Path) -> Self {
        Self::Path(path.to_path_buf())
    }
}

fn decode_path(path: &Path) -> Result<DynamicImage> {
    let reader = ImageReader::open(path)
        .and_then(|reader| reader.with_guessed_format())
        .map_err(|err| {
            ScrivenerError::Decode(format!("failed to open {}: {}", path.display(), err))
        })?;
    reader.decode().map_err(|err| {
        ScrivenerError::Decode(format!("failed to decode {}: {}", path.display(), err))
    })
}
