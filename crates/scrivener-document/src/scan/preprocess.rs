// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pre-processing — the fixed adjustment chain run on every image before it is
// handed to the recogniser.

use image::DynamicImage;
use scrivener_core::ImageAdjustmentSettings;
use tracing::{debug, instrument};

use crate::image::processor::ImageProcessor;

/// Factor at which brightness, contrast and sharpness leave an image untouched.
const NEUTRAL: f32 = 1.0;

/// Applies [`ImageAdjustmentSettings`] to a decoded image.
///
/// Steps always run in the same order: brightness, contrast, sharpness, then
/// binarization. A step whose factor is neutral is skipped entirely, so
/// all-neutral settings return a pixel-identical copy of the input.
#[derive(Debug, Clone, Copy, Default)]
pub struct Preprocessor;

impl Preprocessor {
    /// Create a preprocessor.
    pub fn new() -> Self {
        Self
    }

    /// Produce the processed image. The input is never modified.
    #[instrument(skip_all, fields(
        width = image.width(),
        height = image.height(),
        brightness = settings.brightness(),
        contrast = settings.contrast(),
        sharpen = settings.sharpen(),
        binarize = settings.binarize(),
    ))]
    pub fn process(
        &self,
        image: &DynamicImage,
        settings: &ImageAdjustmentSettings,
    ) -> DynamicImage {
        if settings.is_neutral() {
            debug!("Neutral settings, returning copy");
            return image.clone();
        }

        let mut processor = ImageProcessor::from_dynamic(image.clone());

        if settings.brightness() != NEUTRAL {
            processor = processor.adjust_brightness(settings.brightness());
        }
        if settings.contrast() != NEUTRAL {
            processor = processor.adjust_contrast(settings.contrast());
        }
        if settings.sharpen() != NEUTRAL {
            processor = processor.sharpen(settings.sharpen());
        }
        // Binarization always comes last so it sees the adjusted tones.
        if settings.binarize() {
            processor = processor.binarize(settings.threshold());
        }

        processor.into_dynamic()
    }
}
