// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image processor — decode, downscale, crop, and encode question images.
// Operates on in-memory images using the `image` crate.

use examsheet_core::error::ExamsheetError;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage, RgbaImage};
use tracing::{debug, info, instrument};

/// Longest side, in pixels, that pixel filters work on.
pub const MAX_PROCESS_SIZE: u32 = 2000;

/// Image processing pipeline operating on a single in-memory image.
///
/// Each transformation consumes `self` and returns a new `ImageProcessor`
/// wrapping the transformed image, enabling method chaining.
///
/// ```ignore
/// let png = ImageProcessor::from_bytes(&bytes)?
///     .limit_size(MAX_PROCESS_SIZE)
///     .crop(0, 40, 800, 300)
///     .to_png_bytes()?;
/// ```
pub struct ImageProcessor {
    /// The current working image.
    image: DynamicImage,
}

impl ImageProcessor {
    // -- Construction ---------------------------------------------------------

    /// Create a processor from raw encoded bytes (JPEG, PNG, etc.).
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self, ExamsheetError> {
        let img = image::load_from_memory(data).map_err(|err| {
            ExamsheetError::ImageError(format!("failed to decode image: {}", err))
        })?;
        debug!(
            width = img.width(),
            height = img.height(),
            "Image decoded from bytes"
        );
        Ok(Self { image: img })
    }

    /// Wrap an already-decoded `DynamicImage`.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self { image }
    }

    // -- Accessors ------------------------------------------------------------

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn into_dynamic(self) -> DynamicImage {
        self.image
    }

    // -- Transformations (consume self, return new Self) -----------------------

    /// Downscale so neither side exceeds `max_side`, preserving aspect ratio.
    /// Images already within bounds are returned untouched.
    #[instrument(skip(self), fields(max_side))]
    pub fn limit_size(self, max_side: u32) -> Self {
        let (w, h) = (self.image.width(), self.image.height());
        if w <= max_side && h <= max_side {
            return self;
        }
        let ratio = (max_side as f32 / w as f32).min(max_side as f32 / h as f32);
        let new_w = ((w as f32 * ratio).round() as u32).max(1);
        let new_h = ((h as f32 * ratio).round() as u32).max(1);
        debug!(from_w = w, from_h = h, new_w, new_h, "Downscaling for processing");
        Self {
            image: self
                .image
                .resize_exact(new_w, new_h, image::imageops::FilterType::Triangle),
        }
    }

    /// Crop a rectangular region from the image.
    ///
    /// `x` and `y` are the top-left corner; `width` and `height` define the
    /// size of the crop rectangle. Values are clamped to image bounds.
    #[instrument(skip(self), fields(x, y, width, height))]
    pub fn crop(self, x: u32, y: u32, width: u32, height: u32) -> Self {
        let img_w = self.image.width();
        let img_h = self.image.height();

        let safe_x = x.min(img_w.saturating_sub(1));
        let safe_y = y.min(img_h.saturating_sub(1));
        let safe_w = width.min(img_w - safe_x).max(1);
        let safe_h = height.min(img_h - safe_y).max(1);

        info!(safe_x, safe_y, safe_w, safe_h, "Cropping image");

        let cropped = self.image.crop_imm(safe_x, safe_y, safe_w, safe_h);
        Self { image: cropped }
    }

    // -- Output ---------------------------------------------------------------

    /// Encode the current image as PNG bytes.
    pub fn to_png_bytes(&self) -> Result<Vec<u8>, ExamsheetError> {
        encode_to_format(&self.image, ImageFormat::Png)
    }
}

/// Alpha-composite an RGBA buffer onto white.
pub fn flatten_rgba(rgba: &RgbaImage) -> RgbImage {
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let image::Rgba([r, g, b, a]) = *rgba.get_pixel(x, y);
        let alpha = a as u32;
        let blend = |channel: u8| -> u8 {
            ((channel as u32 * alpha + 255 * (255 - alpha) + 127) / 255) as u8
        };
        Rgb([blend(r), blend(g), blend(b)])
    })
}

/// Encode an RGB buffer as baseline JPEG.
pub fn encode_jpeg(rgb: &RgbImage, quality: u8) -> Result<Vec<u8>, ExamsheetError> {
    let mut buffer = Vec::new();
    let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buffer, quality);
    rgb.write_with_encoder(encoder)
        .map_err(|err| ExamsheetError::ImageError(format!("JPEG encoding failed: {}", err)))?;
    Ok(buffer)
}

/// Encode a `DynamicImage` into the specified format, returning the raw bytes.
fn encode_to_format(image: &DynamicImage, format: ImageFormat) -> Result<Vec<u8>, ExamsheetError> {
    let mut buffer = Vec::new();
    let mut cursor = std::io::Cursor::new(&mut buffer);
    image
        .write_to(&mut cursor, format)
        .map_err(|err| ExamsheetError::ImageError(format!("image encoding failed: {}", err)))?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn solid(w: u32, h: u32) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(w, h, Rgba([10, 20, 30, 255])))
    }

    #[test]
    fn limit_size_keeps_small_images() {
        let p = ImageProcessor::from_dynamic(solid(300, 200)).limit_size(MAX_PROCESS_SIZE);
        assert_eq!((p.width(), p.height()), (300, 200));
    }

    #[test]
    fn limit_size_preserves_aspect() {
        let p = ImageProcessor::from_dynamic(solid(4000, 1000)).limit_size(2000);
        assert_eq!((p.width(), p.height()), (2000, 500));
    }

    #[test]
    fn crop_is_clamped() {
        let p = ImageProcessor::from_dynamic(solid(100, 80)).crop(90, 70, 50, 50);
        assert_eq!((p.width(), p.height()), (10, 10));
    }

    #[test]
    fn transparent_pixels_become_white() {
        let rgba = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 0]));
        let flat = flatten_rgba(&rgba);
        assert_eq!(*flat.get_pixel(0, 0), Rgb([255, 255, 255]));
    }

    #[test]
    fn opaque_pixels_unchanged_by_flatten() {
        let rgba = RgbaImage::from_pixel(1, 1, Rgba([12, 34, 56, 255]));
        assert_eq!(*flatten_rgba(&rgba).get_pixel(0, 0), Rgb([12, 34, 56]));
    }

    #[test]
    fn png_bytes_decode_back() {
        let bytes = ImageProcessor::from_dynamic(solid(4, 3))
            .to_png_bytes()
            .expect("encode");
        let p = ImageProcessor::from_bytes(&bytes).expect("decode");
        assert_eq!((p.width(), p.height()), (4, 3));
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        assert!(matches!(
            ImageProcessor::from_bytes(b"not an image"),
            Err(ExamsheetError::ImageError(_))
        ));
    }
}
