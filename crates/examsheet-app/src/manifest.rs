// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Exam manifest — the header and ordered question image files of one exam.

use std::path::{Path, PathBuf};

use examsheet_core::HeaderInfo;
use examsheet_core::error::{ExamsheetError, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Manifest {
    pub header: HeaderInfo,
    /// Question images in exam order. Relative paths are relative to the
    /// manifest file.
    pub images: Vec<PathBuf>,
    /// Normalise paper colour of every image before export.
    pub match_background: bool,
}

impl Manifest {
    /// Parse a manifest file and resolve its image paths.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path)?;
        let mut manifest: Manifest = serde_json::from_str(&data)?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        for image in &mut manifest.images {
            if image.is_relative() {
                *image = base.join(&*image);
            }
        }
        info!(images = manifest.images.len(), "Manifest loaded");
        Ok(manifest)
    }

    /// Read every image file, in order.
    pub fn read_images(&self) -> Result<Vec<Vec<u8>>> {
        self.images
            .iter()
            .map(|path| {
                let data = std::fs::read(path).map_err(|err| {
                    ExamsheetError::ImageError(format!("failed to read {}: {}", path.display(), err))
                })?;
                debug!(path = %path.display(), bytes = data.len(), "Image read");
                Ok(data)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_camel_case_and_resolves_paths() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("exam.json");
        std::fs::write(
            &path,
            r#"{
                "header": { "schoolName": "한빛고등학교", "subject": "수학", "totalQuestions": 20 },
                "images": ["q1.png", "/abs/q2.png"],
                "matchBackground": true
            }"#,
        )
        .expect("write");

        let manifest = Manifest::load(&path).expect("load");
        assert_eq!(manifest.header.school_name, "한빛고등학교");
        assert_eq!(manifest.header.total_questions, 20);
        assert_eq!(manifest.images[0], dir.path().join("q1.png"));
        assert_eq!(manifest.images[1], PathBuf::from("/abs/q2.png"));
        assert!(manifest.match_background);
    }

    #[test]
    fn missing_fields_default() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("exam.json");
        std::fs::write(&path, "{}").expect("write");
        let manifest = Manifest::load(&path).expect("load");
        assert!(manifest.images.is_empty());
        assert!(!manifest.match_background);
        assert_eq!(manifest.header, HeaderInfo::default());
    }

    #[test]
    fn unreadable_image_is_reported_with_its_path() {
        let manifest = Manifest {
            images: vec![PathBuf::from("/nonexistent/examsheet/q1.png")],
            ..Default::default()
        };
        match manifest.read_images() {
            Err(ExamsheetError::ImageError(msg)) => assert!(msg.contains("q1.png")),
            other => panic!("unexpected {other:?}"),
        }
    }
}
