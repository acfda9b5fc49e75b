// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// examsheet-document — Layout, rendering and PDF export for exam papers.
//
// Provides the two-column pagination engine, the page renderer that turns a
// page descriptor into a raster, image processing for question previews
// (decode, measure, crop, background matching), and the PDF export driver.

pub mod image;
pub mod layout;
pub mod pdf;
pub mod render;

// Re-export the primary types so callers can use `examsheet_document::PdfExporter` etc.
pub use image::processor::ImageProcessor;
pub use layout::{LayoutItem, LayoutRow, PageDescriptor, Pagination, paginate};
pub use pdf::{PdfExporter, PdfReader};
pub use render::{PageElement, PageMarker, PageRenderer, RasterPage};
