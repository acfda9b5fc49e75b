// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pixel filters applied to question previews: crop and background matching.
//
// Filters never modify their input; they return a new image or an error and
// leave recovery to the caller.

use examsheet_core::error::{ExamsheetError, Result};
use image::{DynamicImage, Rgba, RgbaImage};
use tracing::{debug, instrument};

use crate::image::processor::{ImageProcessor, MAX_PROCESS_SIZE};

/// A transformation from one preview image to a corrected one.
pub trait PixelFilter: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    fn apply(&self, image: &DynamicImage) -> Result<DynamicImage>;
}

/// Crop rectangle in source pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropFilter {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelFilter for CropFilter {
    fn name(&self) -> &'static str {
        "crop"
    }

    fn apply(&self, image: &DynamicImage) -> Result<DynamicImage> {
        if self.width == 0 || self.height == 0 {
            return Err(ExamsheetError::ImageError(format!(
                "empty crop rectangle {}x{}",
                self.width, self.height
            )));
        }
        Ok(ImageProcessor::from_dynamic(image.clone())
            .crop(self.x, self.y, self.width, self.height)
            .into_dynamic())
    }
}

/// Normalises paper colour so photographed questions share a white background.
///
/// Samples a thin band along all four edges, takes the per-channel median as
/// the paper colour, and scales each channel so that colour maps to 255.
/// Channels whose median is at or below `dark_threshold` are left alone.
#[derive(Debug, Clone, Copy)]
pub struct BackgroundMatcher {
    /// Border band thickness as a fraction of the shorter side.
    pub margin_ratio: f32,
    /// Minimum band thickness in pixels.
    pub min_margin: u32,
    /// Samples taken along each edge.
    pub samples_per_edge: u32,
    pub dark_threshold: u8,
}

impl Default for BackgroundMatcher {
    fn default() -> Self {
        Self {
            margin_ratio: 0.03,
            min_margin: 2,
            samples_per_edge: 40,
            dark_threshold: 20,
        }
    }
}

impl BackgroundMatcher {
    /// Estimate the paper colour from the border band.
    fn border_median(&self, rgba: &RgbaImage) -> [u8; 3] {
        let (w, h) = rgba.dimensions();
        let margin = ((w.min(h) as f32 * self.margin_ratio) as u32)
            .max(self.min_margin)
            .min(w.min(h));
        let step_x = (w / self.samples_per_edge).max(1) as usize;
        let step_y = (h / self.samples_per_edge).max(1) as usize;

        let mut channels: [Vec<u8>; 3] = [Vec::new(), Vec::new(), Vec::new()];
        let mut sample = |x: u32, y: u32| {
            let Rgba([r, g, b, _]) = *rgba.get_pixel(x, y);
            channels[0].push(r);
            channels[1].push(g);
            channels[2].push(b);
        };

        for x in (0..w).step_by(step_x) {
            for row in 0..margin {
                sample(x, row);
                sample(x, h - 1 - row);
            }
        }
        for y in (0..h).step_by(step_y) {
            for col in 0..margin {
                sample(col, y);
                sample(w - 1 - col, y);
            }
        }

        channels.map(|mut values| {
            values.sort_unstable();
            values[values.len() / 2]
        })
    }
}

impl PixelFilter for BackgroundMatcher {
    fn name(&self) -> &'static str {
        "match-background"
    }

    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    fn apply(&self, image: &DynamicImage) -> Result<DynamicImage> {
        if image.width() == 0 || image.height() == 0 {
            return Err(ExamsheetError::ImageError(
                "cannot match background of an empty image".into(),
            ));
        }

        let mut rgba = ImageProcessor::from_dynamic(image.clone())
            .limit_size(MAX_PROCESS_SIZE)
            .into_dynamic()
            .to_rgba8();

        let background = self.border_median(&rgba);
        let scale = background.map(|bg| {
            if bg > self.dark_threshold {
                255.0 / bg as f32
            } else {
                1.0
            }
        });
        debug!(?background, ?scale, "Background estimated");

        for pixel in rgba.pixels_mut() {
            for (channel, factor) in pixel.0.iter_mut().take(3).zip(scale) {
                *channel = (*channel as f32 * factor + 0.5).min(255.0) as u8;
            }
        }

        Ok(DynamicImage::ImageRgba8(rgba))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Grey paper (200) with a dark square in the middle.
    fn grey_page() -> DynamicImage {
        let mut img = RgbaImage::from_pixel(100, 100, Rgba([200, 200, 200, 255]));
        for y in 40..60 {
            for x in 40..60 {
                img.put_pixel(x, y, Rgba([40, 40, 40, 255]));
            }
        }
        DynamicImage::ImageRgba8(img)
    }

    #[test]
    fn grey_background_becomes_white() {
        let out = BackgroundMatcher::default().apply(&grey_page()).expect("filter");
        let rgba = out.to_rgba8();
        assert_eq!(*rgba.get_pixel(2, 2), Rgba([255, 255, 255, 255]));
        // Ink is scaled by the same factor: 40 * 255 / 200 = 51.
        assert_eq!(*rgba.get_pixel(50, 50), Rgba([51, 51, 51, 255]));
    }

    #[test]
    fn input_is_not_modified() {
        let input = grey_page();
        let before = input.to_rgba8();
        let _ = BackgroundMatcher::default().apply(&input).expect("filter");
        assert_eq!(input.to_rgba8(), before);
    }

    #[test]
    fn dark_background_is_left_alone() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(30, 30, Rgba([10, 10, 10, 255])));
        let out = BackgroundMatcher::default().apply(&img).expect("filter");
        assert_eq!(*out.to_rgba8().get_pixel(5, 5), Rgba([10, 10, 10, 255]));
    }

    #[test]
    fn tiny_image_does_not_underflow() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(1, 1, Rgba([128, 128, 128, 255])));
        let out = BackgroundMatcher::default().apply(&img).expect("filter");
        assert_eq!(*out.to_rgba8().get_pixel(0, 0), Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn empty_image_is_an_error() {
        assert!(BackgroundMatcher::default()
            .apply(&DynamicImage::new_rgba8(0, 0))
            .is_err());
    }

    #[test]
    fn crop_filter_clamps_and_rejects_empty() {
        let filter = CropFilter { x: 10, y: 10, width: 500, height: 20 };
        let out = filter.apply(&grey_page()).expect("crop");
        assert_eq!((out.width(), out.height()), (90, 20));

        let empty = CropFilter { x: 0, y: 0, width: 0, height: 5 };
        assert!(empty.apply(&grey_page()).is_err());
    }
}
