// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Glyph rasterisation onto RGBA canvases using `rusttype`.

use std::path::Path;

use examsheet_core::error::{ExamsheetError, Result};
use image::{Rgba, RgbaImage};
use rusttype::{Font, Scale, point};
use tracing::{info, instrument};

/// Horizontal anchor for a line of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

/// Draws single lines of text with one loaded font.
pub struct TextPainter {
    font: Font<'static>,
}

impl TextPainter {
    /// Parse a TrueType/OpenType font from memory.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let font = Font::try_from_vec(data)
            .ok_or_else(|| ExamsheetError::Render("font data is not a valid TrueType font".into()))?;
        Ok(Self { font })
    }

    /// Load a font file.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read(path.as_ref())?;
        let painter = Self::from_bytes(data)?;
        info!("Font loaded");
        Ok(painter)
    }

    /// Advance width of `text` at a pixel height of `size_px`.
    pub fn measure(&self, text: &str, size_px: f32) -> f32 {
        let scale = Scale::uniform(size_px);
        self.font
            .layout(text, scale, point(0.0, 0.0))
            .last()
            .map(|glyph| glyph.position().x + glyph.unpositioned().h_metrics().advance_width)
            .unwrap_or(0.0)
    }

    /// Draw `text` with its top edge at `top`. `x` is the left edge, centre, or
    /// right edge depending on `align`. Pixels outside the canvas are dropped.
    #[allow(clippy::too_many_arguments)]
    pub fn draw(
        &self,
        canvas: &mut RgbaImage,
        text: &str,
        x: f32,
        top: f32,
        size_px: f32,
        align: Align,
        color: Rgba<u8>,
    ) {
        let scale = Scale::uniform(size_px);
        let left = match align {
            Align::Left => x,
            Align::Center => x - self.measure(text, size_px) / 2.0,
            Align::Right => x - self.measure(text, size_px),
        };
        let baseline = top + self.font.v_metrics(scale).ascent;
        let (width, height) = canvas.dimensions();

        for glyph in self.font.layout(text, scale, point(left, baseline)) {
            let Some(bounds) = glyph.pixel_bounding_box() else {
                continue;
            };
            glyph.draw(|gx, gy, coverage| {
                let px = bounds.min.x + gx as i32;
                let py = bounds.min.y + gy as i32;
                if px < 0 || py < 0 || px as u32 >= width || py as u32 >= height {
                    return;
                }
                let target = canvas.get_pixel_mut(px as u32, py as u32);
                blend_into(target, color, coverage);
            });
        }
    }
}

/// Source-over blend of `color` at `coverage` onto `target`.
fn blend_into(target: &mut Rgba<u8>, color: Rgba<u8>, coverage: f32) {
    let alpha = coverage.clamp(0.0, 1.0) * (color.0[3] as f32 / 255.0);
    for channel in 0..3 {
        let src = color.0[channel] as f32;
        let dst = target.0[channel] as f32;
        target.0[channel] = (src * alpha + dst * (1.0 - alpha)).round() as u8;
    }
    target.0[3] = 255;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_font_bytes_are_rejected() {
        assert!(matches!(
            TextPainter::from_bytes(b"definitely not a font".to_vec()),
            Err(ExamsheetError::Render(_))
        ));
    }

    #[test]
    fn missing_font_file_is_io_error() {
        assert!(matches!(
            TextPainter::open("/nonexistent/examsheet/font.ttf"),
            Err(ExamsheetError::Io(_))
        ));
    }

    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
    const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

    // DejaVu Sans Mono, Bitstream Vera license (see the fixture's LICENSE file).
    fn painter() -> TextPainter {
        TextPainter::from_bytes(include_bytes!("../../tests/fixtures/DejaVuSansMono.ttf").to_vec())
            .expect("fixture font")
    }

    /// Bounding box (min x, min y, max x, max y) of the darkened pixels.
    fn ink_bounds(canvas: &RgbaImage) -> Option<(u32, u32, u32, u32)> {
        canvas
            .enumerate_pixels()
            .filter(|(_, _, px)| px.0[0] < 200)
            .fold(None, |acc, (x, y, _)| match acc {
                None => Some((x, y, x, y)),
                Some((x0, y0, x1, y1)) => Some((x0.min(x), y0.min(y), x1.max(x), y1.max(y))),
            })
    }

    #[test]
    fn opens_font_from_disk() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/DejaVuSansMono.ttf");
        assert!(TextPainter::open(path).is_ok());
    }

    #[test]
    fn measure_scales_with_length_and_size() {
        let text = painter();
        assert_eq!(text.measure("", 20.0), 0.0);
        let one = text.measure("1", 20.0);
        assert!(one > 0.0);
        // Monospaced: five digits advance five times as far.
        assert!((text.measure("12345", 20.0) - 5.0 * one).abs() < 0.5);
        assert!((text.measure("1", 40.0) - 2.0 * one).abs() < 0.5);
    }

    #[test]
    fn left_aligned_text_starts_at_x() {
        let text = painter();
        let mut canvas = RgbaImage::from_pixel(240, 60, WHITE);
        text.draw(&mut canvas, "Exam", 20.0, 10.0, 32.0, Align::Left, BLACK);
        let (x0, y0, x1, y1) = ink_bounds(&canvas).expect("text drawn");
        assert!(x0 >= 19, "ink starts at {x0}");
        assert!((x1 as f32) <= 20.0 + text.measure("Exam", 32.0) + 1.0);
        assert!(y0 >= 10 && y1 < 10 + 32);
    }

    #[test]
    fn right_and_centre_alignment_anchor_on_x() {
        let text = painter();
        let mut right = RgbaImage::from_pixel(240, 60, WHITE);
        text.draw(&mut right, "1 / 2", 200.0, 10.0, 24.0, Align::Right, BLACK);
        let (_, _, x1, _) = ink_bounds(&right).expect("text drawn");
        assert!(x1 <= 201, "ink ends at {x1}");

        let mut centred = RgbaImage::from_pixel(240, 60, WHITE);
        text.draw(&mut centred, "HMH", 120.0, 10.0, 24.0, Align::Center, BLACK);
        let (x0, _, x1, _) = ink_bounds(&centred).expect("text drawn");
        let middle = (x0 + x1) as f32 / 2.0;
        assert!((middle - 120.0).abs() < 3.0, "ink centred at {middle}");
    }

    #[test]
    fn glyphs_off_canvas_are_dropped() {
        let text = painter();
        let mut canvas = RgbaImage::from_pixel(40, 20, WHITE);
        text.draw(&mut canvas, "clipped", -30.0, -12.0, 24.0, Align::Left, BLACK);
        text.draw(&mut canvas, "gone", 100.0, 100.0, 24.0, Align::Left, BLACK);
        assert!(canvas.pixels().all(|px| px.0[3] == 255));
    }

    #[test]
    fn full_coverage_replaces_pixel() {
        let mut px = Rgba([255, 255, 255, 255]);
        blend_into(&mut px, Rgba([0, 0, 0, 255]), 1.0);
        assert_eq!(px, Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn half_coverage_mixes() {
        let mut px = Rgba([255, 255, 255, 255]);
        blend_into(&mut px, Rgba([0, 0, 0, 255]), 0.5);
        assert_eq!(px, Rgba([128, 128, 128, 255]));
    }
}
