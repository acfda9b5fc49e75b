// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page renderer — composes one A4 exam sheet raster per page descriptor.
//
// Every rendered page is exactly 210 x 297 mm at the requested scale, so the
// export driver can place it full-bleed without any further geometry.

use std::collections::HashMap;
use std::sync::Arc;

use examsheet_core::error::{ExamsheetError, Result};
use examsheet_core::geometry::PX_PER_MM;
use examsheet_core::{ExportConfig, ImageId, PageGeometry, ResolvedHeader};
use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect;
use tracing::{debug, instrument, warn};

use crate::layout::{LayoutItem, PageDescriptor, Pagination};
use crate::render::text::{Align, TextPainter};

const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
const INK: Rgba<u8> = Rgba([34, 34, 34, 255]);
const LABEL_FILL: Rgba<u8> = Rgba([243, 244, 246, 255]);

// Header block offsets from the top of the header reservation, in mm.
const SCHOOL_TOP: f32 = 0.0;
const SCHOOL_SIZE: f32 = 6.5;
const TITLE_TOP: f32 = 7.5;
const TITLE_SIZE: f32 = 4.2;
const STUDENT_TOP: f32 = 13.0;
const TABLE_TOP: f32 = 18.5;
const TABLE_ROW: f32 = 6.0;
const RULE_TOP: f32 = 33.5;
const RULE_THICKNESS: f32 = 0.6;
const SMALL_TEXT: f32 = 3.2;
const LABEL_TEXT: f32 = 3.7;
const FOOTER_TEXT: f32 = 3.0;

/// Info table column widths as fractions of the content width.
const TABLE_COLUMNS: [f32; 6] = [0.13, 0.20, 0.13, 0.20, 0.13, 0.21];

/// Identity of a page element: its 1-based position and the page total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageMarker {
    pub index: usize,
    pub count: usize,
}

impl std::fmt::Display for PageMarker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "page-{}", self.index)
    }
}

/// A discrete, independently rasterisable page.
pub trait RasterPage: Send + Sync + 'static {
    fn marker(&self) -> PageMarker;

    /// Render the page at `scale` times 96 dpi.
    fn rasterize(&self, scale: f32) -> Result<RgbaImage>;
}

/// Converts page descriptors into rasters.
pub struct PageRenderer {
    geometry: PageGeometry,
    text: Option<TextPainter>,
}

impl PageRenderer {
    pub fn new(geometry: PageGeometry, text: Option<TextPainter>) -> Self {
        if text.is_none() {
            warn!("no font configured, pages will render without text");
        }
        Self { geometry, text }
    }

    /// Build a renderer for the fixed A4 geometry, loading the configured font.
    pub fn from_config(config: &ExportConfig) -> Result<Self> {
        let text = match &config.font_path {
            Some(path) => Some(TextPainter::open(path)?),
            None => None,
        };
        Ok(Self::new(PageGeometry::A4_EXAM, text))
    }

    pub fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }

    /// Pixel size of a rendered page at `scale`.
    pub fn page_size_px(&self, scale: f32) -> (u32, u32) {
        let ppm = PX_PER_MM * scale;
        (
            px(self.geometry.page_width, ppm).max(1),
            px(self.geometry.page_height, ppm).max(1),
        )
    }

    /// Render one page element onto an opaque white canvas.
    #[instrument(skip_all, fields(page = page.marker.index, scale = scale))]
    pub fn render(&self, page: &PageElement, scale: f32) -> Result<RgbaImage> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(ExamsheetError::Render(format!("invalid render scale {scale}")));
        }
        let ppm = PX_PER_MM * scale;
        let (width, height) = self.page_size_px(scale);
        let mut canvas = RgbaImage::from_pixel(width, height, WHITE);

        if let Some(header) = page.header.as_ref().filter(|_| page.descriptor.is_first) {
            self.draw_header(&mut canvas, header, ppm);
        }

        let g = &self.geometry;
        let mut y = g.content_top(page.descriptor.is_first);
        for row in &page.descriptor.rows {
            self.draw_item(&mut canvas, page, &row.left, g.column_x(0), y, ppm)?;
            if let Some(right) = &row.right {
                self.draw_item(&mut canvas, page, right, g.column_x(1), y, ppm)?;
            }
            y += row.height();
        }

        if let Some(text) = &self.text {
            let label = page.descriptor.footer_label(page.marker.count);
            let top = g.page_height - g.padding_y / 2.0 - FOOTER_TEXT / 2.0;
            text.draw(
                &mut canvas,
                &label,
                g.page_width / 2.0 * ppm,
                top * ppm,
                FOOTER_TEXT * ppm,
                Align::Center,
                INK,
            );
        }

        debug!(width, height, "Page rendered");
        Ok(canvas)
    }

    fn draw_item(
        &self,
        canvas: &mut RgbaImage,
        page: &PageElement,
        item: &LayoutItem,
        x_mm: f32,
        y_mm: f32,
        ppm: f32,
    ) -> Result<()> {
        let source = page.sources.get(&item.image_id).ok_or_else(|| {
            ExamsheetError::Render(format!(
                "no source for image {} (question {})",
                item.image_id, item.number
            ))
        })?;

        if let Some(text) = &self.text {
            text.draw(
                canvas,
                &format!("{}.", item.number),
                x_mm * ppm,
                y_mm * ppm,
                LABEL_TEXT * ppm,
                Align::Left,
                INK,
            );
        }

        let (width_mm, height_mm) = self.image_box(item, page.descriptor.is_first);
        let left = x_mm + (self.geometry.column_width() - width_mm) / 2.0;
        let top = y_mm + self.geometry.label_height;
        let scaled = imageops::resize(
            &source.to_rgba8(),
            px(width_mm, ppm).max(1),
            px(height_mm, ppm).max(1),
            FilterType::Triangle,
        );
        imageops::overlay(
            canvas,
            &scaled,
            (left * ppm).round() as i64,
            (top * ppm).round() as i64,
        );
        Ok(())
    }

    /// Drawn width and height of an item's image in mm. An image taller than
    /// the page can hold is shrunk, keeping its aspect ratio, so it ends above
    /// the bottom padding.
    fn image_box(&self, item: &LayoutItem, is_first: bool) -> (f32, f32) {
        let g = &self.geometry;
        let column = g.column_width();
        let max_height = g.available_height(is_first) - g.label_height - g.item_gap;
        if item.image_height <= max_height || item.image_height <= 0.0 {
            return (column, item.image_height);
        }
        debug!(
            question = item.number,
            image_height = item.image_height,
            max_height,
            "Fitting oversized image to page"
        );
        (column * max_height / item.image_height, max_height)
    }

    fn draw_header(&self, canvas: &mut RgbaImage, header: &ResolvedHeader, ppm: f32) {
        let g = &self.geometry;
        let top = g.padding_y;
        let left = g.padding_x;
        let right = g.page_width - g.padding_x;
        let centre = g.page_width / 2.0;

        if let Some(text) = &self.text {
            text.draw(
                canvas,
                &header.school_name,
                centre * ppm,
                (top + SCHOOL_TOP) * ppm,
                SCHOOL_SIZE * ppm,
                Align::Center,
                INK,
            );
            text.draw(
                canvas,
                &header.exam_title,
                centre * ppm,
                (top + TITLE_TOP) * ppm,
                TITLE_SIZE * ppm,
                Align::Center,
                INK,
            );
        }

        // Student line, laid out right to left: "{grade}  이름: ____  번호: ___".
        let line_top = top + STUDENT_TOP;
        let baseline = line_top + SMALL_TEXT + 0.3;
        let mut cursor = right;
        let blank = |canvas: &mut RgbaImage, end: f32, length: f32| {
            fill_mm(canvas, end - length, baseline, length, 0.25, ppm, INK);
        };
        blank(canvas, cursor, 10.0);
        cursor -= 10.0;
        cursor = self.draw_text_leftward(canvas, "번호: ", cursor, line_top, ppm);
        cursor -= 4.0;
        blank(canvas, cursor, 18.0);
        cursor -= 18.0;
        cursor = self.draw_text_leftward(canvas, "이름: ", cursor, line_top, ppm);
        cursor -= 2.0;
        self.draw_text_leftward(canvas, &header.grade, cursor, line_top, ppm);

        // Two-row info table.
        let content_w = g.content_width();
        let edges: Vec<f32> = std::iter::once(left)
            .chain(TABLE_COLUMNS.iter().scan(left, |x, frac| {
                *x += frac * content_w;
                Some(*x)
            }))
            .collect();
        let total = format!("{}문항", header.total_questions);
        let rows: [[(&str, bool); 6]; 2] = [
            [
                ("과 목", true),
                (header.subject.as_str(), false),
                ("일 시", true),
                (header.date.as_str(), false),
                ("시 간", true),
                (header.time_limit.as_str(), false),
            ],
            [
                ("출제교사", true),
                (header.teacher_name.as_str(), false),
                ("총문항", true),
                (total.as_str(), false),
                ("", false),
                ("", false),
            ],
        ];
        for (r, cells) in rows.iter().enumerate() {
            let cell_top = top + TABLE_TOP + r as f32 * TABLE_ROW;
            for (c, (label, is_heading)) in cells.iter().enumerate() {
                // The question count spans the last three columns.
                let spans_rest = r == 1 && c == 3;
                if r == 1 && c > 3 {
                    continue;
                }
                let x0 = edges[c];
                let x1 = if spans_rest { edges[6] } else { edges[c + 1] };
                if *is_heading {
                    fill_mm(canvas, x0, cell_top, x1 - x0, TABLE_ROW, ppm, LABEL_FILL);
                }
                outline_mm(canvas, x0, cell_top, x1 - x0, TABLE_ROW, ppm, INK);
                if let Some(text) = &self.text {
                    text.draw(
                        canvas,
                        label,
                        (x0 + 1.5) * ppm,
                        (cell_top + (TABLE_ROW - SMALL_TEXT) / 2.0) * ppm,
                        SMALL_TEXT * ppm,
                        Align::Left,
                        INK,
                    );
                }
            }
        }

        fill_mm(canvas, left, top + RULE_TOP, content_w, RULE_THICKNESS, ppm, INK);
    }

    /// Draw `label` ending at `right_mm`; returns the new left edge in mm.
    fn draw_text_leftward(
        &self,
        canvas: &mut RgbaImage,
        label: &str,
        right_mm: f32,
        top_mm: f32,
        ppm: f32,
    ) -> f32 {
        match &self.text {
            Some(text) => {
                let size = SMALL_TEXT * ppm;
                text.draw(canvas, label, right_mm * ppm, top_mm * ppm, size, Align::Right, INK);
                right_mm - text.measure(label, size) / ppm
            }
            None => right_mm,
        }
    }
}

/// One page of a preview document, ready to rasterise.
///
/// Holds its own references to the image pixels it shows, so releasing a
/// preview from the store does not affect an element built before the release.
pub struct PageElement {
    pub marker: PageMarker,
    pub descriptor: PageDescriptor,
    /// Present on the first page only.
    pub header: Option<ResolvedHeader>,
    sources: HashMap<ImageId, Arc<DynamicImage>>,
    renderer: Arc<PageRenderer>,
}

impl PageElement {
    pub fn new(
        descriptor: PageDescriptor,
        count: usize,
        header: Option<ResolvedHeader>,
        sources: HashMap<ImageId, Arc<DynamicImage>>,
        renderer: Arc<PageRenderer>,
    ) -> Self {
        Self {
            marker: PageMarker {
                index: descriptor.index,
                count,
            },
            descriptor,
            header,
            sources,
            renderer,
        }
    }

    /// Build one element per page, looking image pixels up through `resolve`.
    ///
    /// Images that `resolve` cannot supply are left out of the element's
    /// sources; rendering such a page fails.
    pub fn build_all<F>(
        pagination: &Pagination,
        header: &ResolvedHeader,
        renderer: &Arc<PageRenderer>,
        mut resolve: F,
    ) -> Vec<Arc<PageElement>>
    where
        F: FnMut(ImageId) -> Option<Arc<DynamicImage>>,
    {
        let count = pagination.page_count();
        pagination
            .pages
            .iter()
            .map(|descriptor| {
                let sources = descriptor
                    .items()
                    .filter_map(|item| resolve(item.image_id).map(|img| (item.image_id, img)))
                    .collect();
                let header = descriptor.is_first.then(|| header.clone());
                Arc::new(PageElement::new(
                    descriptor.clone(),
                    count,
                    header,
                    sources,
                    Arc::clone(renderer),
                ))
            })
            .collect()
    }

    pub fn render(&self, scale: f32) -> Result<RgbaImage> {
        self.renderer.render(self, scale)
    }
}

impl RasterPage for PageElement {
    fn marker(&self) -> PageMarker {
        self.marker
    }

    fn rasterize(&self, scale: f32) -> Result<RgbaImage> {
        self.render(scale)
    }
}

fn px(mm: f32, ppm: f32) -> u32 {
    (mm * ppm).round().max(0.0) as u32
}

fn rect_mm(x: f32, y: f32, w: f32, h: f32, ppm: f32) -> Rect {
    Rect::at((x * ppm).round() as i32, (y * ppm).round() as i32)
        .of_size(px(w, ppm).max(1), px(h, ppm).max(1))
}

fn fill_mm(canvas: &mut RgbaImage, x: f32, y: f32, w: f32, h: f32, ppm: f32, color: Rgba<u8>) {
    draw_filled_rect_mut(canvas, rect_mm(x, y, w, h, ppm), color);
}

fn outline_mm(canvas: &mut RgbaImage, x: f32, y: f32, w: f32, h: f32, ppm: f32, color: Rgba<u8>) {
    draw_hollow_rect_mut(canvas, rect_mm(x, y, w, h, ppm), color);
}
