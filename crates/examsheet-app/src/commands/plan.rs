// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// `examsheet plan` — show how a manifest paginates without rendering.

use std::path::Path;

use anyhow::{Context, Result};
use examsheet_core::PageGeometry;
use examsheet_document::{Pagination, paginate};
use examsheet_editor::{EditCommand, ImageList, MemoryPreviewStore};

use crate::manifest::Manifest;

/// Paginate the manifest's images exactly as `build` would.
pub fn run(manifest_path: &Path) -> Result<Pagination> {
    let manifest = Manifest::load(manifest_path)
        .with_context(|| format!("loading manifest {}", manifest_path.display()))?;
    let store = MemoryPreviewStore::new();
    let mut list = ImageList::new();
    list.apply(EditCommand::AddImages(manifest.read_images()?), &store)?;
    Ok(paginate(&list.snapshot(), &PageGeometry::A4_EXAM))
}

/// Plan as text or pretty JSON.
pub fn render(pagination: &Pagination, json: bool) -> Result<String> {
    if json {
        return Ok(serde_json::to_string_pretty(pagination)?);
    }
    if pagination.is_empty() {
        return Ok("no images, no pages\n".to_string());
    }
    Ok(pagination.describe())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, Rgba, RgbaImage};

    #[test]
    fn plans_every_manifest_image() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut names = Vec::new();
        for k in 0..3 {
            let name = format!("q{k}.png");
            DynamicImage::ImageRgba8(RgbaImage::from_pixel(100, 50, Rgba([255, 255, 255, 255])))
                .save(dir.path().join(&name))
                .expect("save");
            names.push(name);
        }
        let manifest = dir.path().join("exam.json");
        std::fs::write(&manifest, serde_json::json!({ "images": names }).to_string()).expect("write");

        let pagination = run(&manifest).expect("plan");
        assert_eq!(pagination.image_count(), 3);
        let text = render(&pagination, false).expect("text");
        assert!(text.starts_with("page 1 / 1 (3 items"));
        let json = render(&pagination, true).expect("json");
        assert!(json.contains("\"isFirst\": true"));
    }

    #[test]
    fn empty_plan_says_so() {
        assert_eq!(render(&Pagination::default(), false).expect("text"), "no images, no pages\n");
    }
}
