// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Render module — page rasterisation and text drawing.

pub mod page;
pub mod text;

pub use page::{PageElement, PageMarker, PageRenderer, RasterPage};
pub use text::{Align, TextPainter};
