// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// `examsheet inspect` — summarise an exported PDF.

use std::fmt::Write;
use std::path::Path;

use anyhow::Result;
use examsheet_document::PdfReader;

pub fn run(path: &Path) -> Result<String> {
    let reader = PdfReader::open(path)?;
    let mut out = String::new();
    writeln!(out, "{}", path.display())?;
    if let Some(title) = reader.title() {
        writeln!(out, "  title: {title}")?;
    }
    writeln!(out, "  pages: {}", reader.page_count())?;
    for (k, (width, height)) in reader.page_sizes_mm()?.into_iter().enumerate() {
        writeln!(out, "  {:>3}: {:.1} x {:.1} mm", k + 1, width, height)?;
    }
    Ok(out)
}
