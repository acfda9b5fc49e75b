// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// `examsheet build` — manifest in, exam PDF out.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use examsheet_core::ExportConfig;
use examsheet_document::PageRenderer;
use examsheet_editor::{Editor, MemoryPreviewStore, default_export_path, export_pdf};
use tracing::{info, warn};

use crate::manifest::Manifest;
use crate::paths;

/// Build the PDF. Returns the written path, or `None` for an empty manifest.
pub async fn run(manifest_path: &Path, output: Option<PathBuf>, config_path: Option<PathBuf>) -> Result<Option<PathBuf>> {
    let config_path = config_path.unwrap_or_else(paths::default_config_path);
    let config = ExportConfig::load(&config_path)
        .with_context(|| format!("loading export config {}", config_path.display()))?;
    let manifest = Manifest::load(manifest_path)
        .with_context(|| format!("loading manifest {}", manifest_path.display()))?;
    let blobs = manifest.read_images()?;

    let store = Arc::new(MemoryPreviewStore::new());
    let editor = Editor::spawn(store.clone());
    editor.add_images(blobs).await?;

    if manifest.match_background {
        let report = editor.match_all_backgrounds().await?;
        if report.failed > 0 {
            warn!(failed = report.failed, "Some backgrounds could not be matched");
        }
    }

    let snapshot = editor.snapshot().await?;
    let renderer = Arc::new(PageRenderer::from_config(&config)?);
    let target = output.unwrap_or_else(|| default_export_path(".", &manifest.header));
    info!(images = snapshot.len(), target = %target.display(), "Exporting");

    let written = export_pdf(&manifest.header, &snapshot, store.as_ref(), &renderer, &config, &target)
        .await
        .with_context(|| format!("exporting {}", target.display()))?;
    Ok(written)
}
