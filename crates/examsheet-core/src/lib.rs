// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Examsheet — Core types, page geometry, and error definitions shared across
// all crates.

pub mod config;
pub mod error;
pub mod filename;
pub mod geometry;
pub mod header;
pub mod types;

pub use config::ExportConfig;
pub use error::ExamsheetError;
pub use filename::derive_filename;
pub use geometry::PageGeometry;
pub use header::{HeaderInfo, ResolvedHeader};
pub use types::*;
