// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image module — decoding, metrics, pixel filters, and encoding.

pub mod filter;
pub mod metrics;
pub mod processor;

pub use filter::{BackgroundMatcher, CropFilter, PixelFilter};
pub use metrics::{measure, probe_dimensions};
pub use processor::ImageProcessor;
