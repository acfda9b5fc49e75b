// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF module — exporting rendered exam pages and inspecting the result.

pub mod export;
pub mod reader;

pub use export::{EncodedPage, PdfExporter, rasterize_page};
pub use reader::PdfReader;
