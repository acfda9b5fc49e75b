// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Fixed A4 exam sheet geometry. All lengths are millimetres.

use crate::types::ImageDimensions;

/// PostScript points per millimetre.
pub const PT_PER_MM: f32 = 72.0 / 25.4;

/// CSS reference pixels per millimetre (96 dpi).
pub const PX_PER_MM: f32 = 96.0 / 25.4;

/// Convert millimetres to PDF points.
pub fn mm_to_pt(mm: f32) -> f32 {
    mm * PT_PER_MM
}

/// Page layout constants for a two-column exam sheet.
///
/// Only one instance exists ([`PageGeometry::A4_EXAM`]); the struct keeps the
/// numbers together so the layout engine and the renderer derive their
/// measurements from the same source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub page_width: f32,
    pub page_height: f32,
    /// Top and bottom padding.
    pub padding_y: f32,
    /// Left and right padding.
    pub padding_x: f32,
    /// Space reserved for the header block on the first page only.
    pub header_height: f32,
    pub column_gap: f32,
    /// Vertical gap after each question block.
    pub item_gap: f32,
    /// Height of the "N." question label above each image.
    pub label_height: f32,
    /// Image height assumed for records without usable dimensions.
    pub fallback_image_height: f32,
}

impl PageGeometry {
    pub const A4_EXAM: Self = Self {
        page_width: 210.0,
        page_height: 297.0,
        padding_y: 10.0,
        padding_x: 12.0,
        header_height: 38.0,
        column_gap: 3.0,
        item_gap: 3.0,
        label_height: 5.0,
        fallback_image_height: 40.0,
    };

    pub fn content_width(&self) -> f32 {
        self.page_width - 2.0 * self.padding_x
    }

    pub fn column_width(&self) -> f32 {
        (self.content_width() - self.column_gap) / 2.0
    }

    /// Printable height between the top and bottom padding.
    pub fn usable_height(&self) -> f32 {
        self.page_height - 2.0 * self.padding_y
    }

    /// Height available to question rows on a page.
    pub fn available_height(&self, is_first: bool) -> f32 {
        if is_first {
            self.usable_height() - self.header_height
        } else {
            self.usable_height()
        }
    }

    /// Rendered image height at full column width.
    pub fn image_height(&self, dimensions: Option<ImageDimensions>) -> f32 {
        dimensions
            .and_then(|d| d.aspect_ratio())
            .map(|ratio| ratio * self.column_width())
            .unwrap_or(self.fallback_image_height)
    }

    /// Full block height: image, label, and trailing gap.
    pub fn item_height(&self, dimensions: Option<ImageDimensions>) -> f32 {
        self.image_height(dimensions) + self.label_height + self.item_gap
    }

    /// Left edge of the given column (0 = left, 1 = right).
    pub fn column_x(&self, column: usize) -> f32 {
        self.padding_x + column as f32 * (self.column_width() + self.column_gap)
    }

    /// Top edge of the question area on a page.
    pub fn content_top(&self, is_first: bool) -> f32 {
        if is_first {
            self.padding_y + self.header_height
        } else {
            self.padding_y
        }
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::A4_EXAM
    }
}
