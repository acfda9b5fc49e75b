// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Preview document assembly and PDF export of an image list snapshot.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::NaiveDate;
use examsheet_core::error::Result;
use examsheet_core::{ExportConfig, HeaderInfo, ImageRecord, PreviewKey, ResolvedHeader, derive_filename};
use examsheet_document::{PageElement, PageRenderer, Pagination, PdfExporter, paginate};
use tracing::{info, instrument};

use crate::store::PreviewStore;

/// The paginated, renderable form of one snapshot.
pub struct PreviewDocument {
    pub header: ResolvedHeader,
    pub pagination: Pagination,
    pub pages: Vec<Arc<PageElement>>,
}

impl PreviewDocument {
    /// Paginate `records` and resolve each page's previews from `store`.
    #[instrument(skip_all, fields(images = records.len()))]
    pub fn build(
        header: &HeaderInfo,
        records: &[ImageRecord],
        store: &dyn PreviewStore,
        renderer: &Arc<PageRenderer>,
        today: NaiveDate,
    ) -> Self {
        let resolved = header.resolve(records.len(), today);
        let pagination = paginate(records, renderer.geometry());
        let keys: HashMap<_, PreviewKey> = records.iter().map(|r| (r.id, r.preview)).collect();
        let pages = PageElement::build_all(&pagination, &resolved, renderer, |id| {
            keys.get(&id).and_then(|&key| store.resolve(key))
        });
        Self {
            header: resolved,
            pagination,
            pages,
        }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

/// `dir` joined with the filename derived from `header`.
pub fn default_export_path(dir: impl AsRef<Path>, header: &HeaderInfo) -> PathBuf {
    dir.as_ref().join(derive_filename(header))
}

/// Export `records` to `path` as an exam PDF.
///
/// An empty list writes nothing and returns `Ok(None)`.
#[instrument(skip_all, fields(images = records.len(), path = %path.as_ref().display()))]
pub async fn export_pdf(
    header: &HeaderInfo,
    records: &[ImageRecord],
    store: &dyn PreviewStore,
    renderer: &Arc<PageRenderer>,
    config: &ExportConfig,
    path: impl AsRef<Path>,
) -> Result<Option<PathBuf>> {
    if records.is_empty() {
        info!("No images, export skipped");
        return Ok(None);
    }

    let today = chrono::Local::now().date_naive();
    let document = PreviewDocument::build(header, records, store, renderer, today);
    let mut exporter = PdfExporter::new(config.clone())?;
    exporter.set_title(format!("{} {}", document.header.school_name, document.header.exam_title));
    exporter.export_to_file(&document.pages, path).await
}
