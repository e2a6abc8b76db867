// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image processor — brightness, contrast, sharpness and threshold adjustments
// applied to an in-memory image before recognition.

use image::{DynamicImage, GrayImage, ImageFormat, Luma, Rgba, RgbaImage};
use tracing::{debug, instrument};

/// 3x3 smoothing kernel the sharpen step blends against (weights sum to 13).
const SMOOTH_KERNEL: [[u32; 3]; 3] = [[1, 1, 1], [1, 5, 1], [1, 1, 1]];
const SMOOTH_WEIGHT: u32 = 13;

/// Image adjustment chain operating on a single in-memory image.
///
/// Each method consumes `self` and returns a new `ImageProcessor` wrapping the
/// transformed image, enabling method chaining. The input image is never
/// modified in place.
///
/// All three enhancement factors share one convention: `1.0` leaves the image
/// unchanged, values below soften the effect, values above strengthen it.
///
/// ```ignore
/// let prepared = ImageProcessor::from_dynamic(image)
///     .adjust_brightness(1.2)
///     .adjust_contrast(1.5)
///     .sharpen(2.0)
///     .binarize(127)
///     .into_dynamic();
/// ```
pub struct ImageProcessor {
    /// The current working image.
    image: DynamicImage,
}

impl ImageProcessor {
    // -- Construction ---------------------------------------------------------

    /// Wrap an already-decoded `DynamicImage`.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self { image }
    }

    // -- Accessors ------------------------------------------------------------

    /// Current image width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Current image height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Borrow the underlying `DynamicImage`.
    pub fn as_dynamic(&self) -> &DynamicImage {
        &self.image
    }

    /// Consume the processor and return the underlying `DynamicImage`.
    pub fn into_dynamic(self) -> DynamicImage {
        self.image
    }

    // -- Adjustments (consume self, return new Self) --------------------------

    /// Scale every colour channel by `factor`.
    ///
    /// `0.0` would give black; `2.0` doubles each channel (clamped to 255).
    /// Alpha is carried through untouched.
    #[instrument(skip(self), fields(factor))]
    pub fn adjust_brightness(self, factor: f32) -> Self {
        debug!(factor, "Adjusting brightness");

        let rgba = self.image.to_rgba8();
        let brightened = RgbaImage::from_fn(rgba.width(), rgba.height(), |x, y| {
            let Rgba([r, g, b, a]) = *rgba.get_pixel(x, y);
            let adjust = |channel: u8| to_channel(channel as f32 * factor);
            Rgba([adjust(r), adjust(g), adjust(b), a])
        });

        Self {
            image: DynamicImage::ImageRgba8(brightened),
        }
    }

    /// Push every colour channel away from (or toward) the image's mean
    /// luminance by `factor`.
    #[instrument(skip(self), fields(factor))]
    pub fn adjust_contrast(self, factor: f32) -> Self {
        let rgba = self.image.to_rgba8();
        let mean = mean_luminance(&rgba);
        debug!(factor, mean, "Adjusting contrast");

        let contrasted = RgbaImage::from_fn(rgba.width(), rgba.height(), |x, y| {
            let Rgba([r, g, b, a]) = *rgba.get_pixel(x, y);
            let adjust = |channel: u8| to_channel(mean + factor * (channel as f32 - mean));
            Rgba([adjust(r), adjust(g), adjust(b), a])
        });

        Self {
            image: DynamicImage::ImageRgba8(contrasted),
        }
    }

    /// Blend the image against a softened copy of itself.
    ///
    /// `factor` below 1.0 moves toward the smoothed copy; above 1.0 it
    /// extrapolates away from it, crisping glyph edges. The one-pixel border
    /// has no full neighbourhood and is left as it was.
    #[instrument(skip(self), fields(factor))]
    pub fn sharpen(self, factor: f32) -> Self {
        debug!(factor, "Sharpening");

        let rgba = self.image.to_rgba8();
        let smoothed = smooth(&rgba);

        let sharpened = RgbaImage::from_fn(rgba.width(), rgba.height(), |x, y| {
            let Rgba([r, g, b, a]) = *rgba.get_pixel(x, y);
            let Rgba([sr, sg, sb, _]) = *smoothed.get_pixel(x, y);
            let blend = |orig: u8, soft: u8| {
                let soft = soft as f32;
                to_channel(soft + factor * (orig as f32 - soft))
            };
            Rgba([blend(r, sr), blend(g, sg), blend(b, sb), a])
        });

        Self {
            image: DynamicImage::ImageRgba8(sharpened),
        }
    }

    /// Convert to grayscale and then to pure black and white.
    ///
    /// Luminance strictly below `threshold` becomes black (0); everything else,
    /// including luminance equal to the threshold, becomes white (255).
    #[instrument(skip(self), fields(threshold))]
    pub fn binarize(self, threshold: u8) -> Self {
        debug!(threshold, "Applying fixed-threshold binarization");

        let gray = self.image.to_luma8();
        let (width, height) = gray.dimensions();
        let mut output = GrayImage::new(width, height);

        for y in 0..height {
            for x in 0..width {
                let val = gray.get_pixel(x, y).0[0];
                let binary = if val < threshold { 0u8 } else { 255u8 };
                output.put_pixel(x, y, Luma([binary]));
            }
        }

        Self {
            image: DynamicImage::ImageLuma8(output),
        }
    }

    // -- Output ---------------------------------------------------------------

    /// Encode the current image as PNG bytes.
    pub fn to_png_bytes(&self) -> image::ImageResult<Vec<u8>> {
        encode_png(&self.image)
    }
}

/// Encode a `DynamicImage` as PNG, returning the raw bytes.
pub fn encode_png(image: &DynamicImage) -> image::ImageResult<Vec<u8>> {
    let mut cursor = std::io::Cursor::new(Vec::new());
    image.write_to(&mut cursor, ImageFormat::Png)?;
    Ok(cursor.into_inner())
}

/// Apply [`SMOOTH_KERNEL`] to every interior pixel, copying the border.
fn smooth(rgba: &RgbaImage) -> RgbaImage {
    let (width, height) = rgba.dimensions();
    let mut output = rgba.clone();
    if width < 3 || height < 3 {
        return output;
    }

    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let mut sums = [0u32; 3];
            for (ky, row) in SMOOTH_KERNEL.iter().enumerate() {
                for (kx, weight) in row.iter().enumerate() {
                    let pixel = rgba.get_pixel(x + kx as u32 - 1, y + ky as u32 - 1);
                    for (sum, channel) in sums.iter_mut().zip(pixel.0.iter()) {
                        *sum += *channel as u32 * weight;
                    }
                }
            }
            let alpha = rgba.get_pixel(x, y).0[3];
            let rounded = |sum: u32| ((sum + SMOOTH_WEIGHT / 2) / SMOOTH_WEIGHT) as u8;
            output.put_pixel(
                x,
                y,
                Rgba([rounded(sums[0]), rounded(sums[1]), rounded(sums[2]), alpha]),
            );
        }
    }
    output
}

/// Mean ITU-R 601 luma over every pixel; `0.0` for an empty image.
fn mean_luminance(rgba: &RgbaImage) -> f32 {
    let count = rgba.width() as u64 * rgba.height() as u64;
    if count == 0 {
        return 0.0;
    }
    let total: u64 = rgba
        .pixels()
        .map(|Rgba([r, g, b, _])| {
            (*r as u64 * 299 + *g as u64 * 587 + *b as u64 * 114) / 1000
        })
        .sum();
    total as f32 / count as f32
}

fn to_channel(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(r: u8, g: u8, b: u8, a: u8) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(6, 6, Rgba([r, g, b, a])))
    }

    #[test]
    fn brightness_scales_channels_and_keeps_alpha() {
        let out = ImageProcessor::from_dynamic(solid(100, 50, 200, 77))
            .adjust_brightness(2.0)
            .into_dynamic()
            .to_rgba8();
        assert_eq!(*out.get_pixel(0, 0), Rgba([200, 100, 255, 77]));
    }

    #[test]
    fn contrast_leaves_uniform_image_alone() {
        let out = ImageProcessor::from_dynamic(solid(90, 90, 90, 255))
            .adjust_contrast(2.0)
            .into_dynamic()
            .to_rgba8();
        assert_eq!(*out.get_pixel(3, 3), Rgba([90, 90, 90, 255]));
    }

    #[test]
    fn contrast_spreads_around_the_mean() {
        // Left half 100, right half 200: mean luminance 150.
        let img = RgbaImage::from_fn(4, 2, |x, _| {
            let v = if x < 2 { 100 } else { 200 };
            Rgba([v, v, v, 255])
        });
        let out = ImageProcessor::from_dynamic(DynamicImage::ImageRgba8(img))
            .adjust_contrast(2.0)
            .into_dynamic()
            .to_rgba8();
        assert_eq!(out.get_pixel(0, 0).0[0], 50);
        assert_eq!(out.get_pixel(3, 0).0[0], 250);
    }

    #[test]
    fn sharpen_at_one_is_identity() {
        let img = RgbaImage::from_fn(8, 8, |x, y| {
            let v = ((x * 31 + y * 17) % 256) as u8;
            Rgba([v, 255 - v, v / 2, 200])
        });
        let original = DynamicImage::ImageRgba8(img.clone());
        let out = ImageProcessor::from_dynamic(original)
            .sharpen(1.0)
            .into_dynamic()
            .to_rgba8();
        assert_eq!(out, img);
    }

    #[test]
    fn sharpen_increases_edge_contrast() {
        let img = RgbaImage::from_fn(10, 10, |x, _| {
            let v = if x < 5 { 60 } else { 190 };
            Rgba([v, v, v, 255])
        });
        let out = ImageProcessor::from_dynamic(DynamicImage::ImageRgba8(img))
            .sharpen(2.0)
            .into_dynamic()
            .to_rgba8();
        assert!(out.get_pixel(4, 5).0[0] < 60);
        assert!(out.get_pixel(5, 5).0[0] > 190);
    }

    #[test]
    fn binarize_threshold_is_inclusive_on_the_light_side() {
        let img = GrayImage::from_fn(3, 1, |x, _| Luma([[126u8, 127, 128][x as usize]]));
        let out = ImageProcessor::from_dynamic(DynamicImage::ImageLuma8(img))
            .binarize(127)
            .into_dynamic();
        let gray = out.as_luma8().unwrap();
        assert_eq!(gray.as_raw(), &vec![0, 255, 255]);
    }

    #[test]
    fn png_encoding_produces_decodable_bytes() {
        let bytes = ImageProcessor::from_dynamic(solid(1, 2, 3, 255))
            .to_png_bytes()
            .unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!(decoded.width(), 6);
    }
}
