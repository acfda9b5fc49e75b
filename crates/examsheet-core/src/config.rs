// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Export configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ExamsheetError, Result};

/// Minimum rasterisation oversampling factor.
pub const MIN_OVERSAMPLING: f32 = 2.0;

/// Settings for page rendering and PDF export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExportConfig {
    /// Rasterisation scale relative to 96 dpi. Must be at least 2.0.
    pub oversampling: f32,
    /// JPEG quality for page images (1-100).
    pub jpeg_quality: u8,
    /// TrueType/OpenType font used for header, labels, and footer text.
    /// Without one, text is omitted from rendered pages.
    pub font_path: Option<PathBuf>,
    /// Creator string written to the PDF info dictionary.
    pub creator: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            oversampling: MIN_OVERSAMPLING,
            jpeg_quality: 92,
            font_path: None,
            creator: "examsheet".to_string(),
        }
    }
}

impl ExportConfig {
    /// Load settings from a JSON file. A missing file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    /// Write settings as pretty-printed JSON.
    pub fn persist(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if !self.oversampling.is_finite() || self.oversampling < MIN_OVERSAMPLING {
            return Err(ExamsheetError::Config(format!(
                "oversampling must be at least {MIN_OVERSAMPLING}, got {}",
                self.oversampling
            )));
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(ExamsheetError::Config(format!(
                "jpeg quality must be within 1..=100, got {}",
                self.jpeg_quality
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = ExportConfig::default();
        assert_eq!(config.oversampling, 2.0);
        assert_eq!(config.jpeg_quality, 92);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_low_oversampling() {
        let config = ExportConfig {
            oversampling: 1.0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ExamsheetError::Config(_))));
    }

    #[test]
    fn rejects_zero_quality() {
        let config = ExportConfig {
            jpeg_quality: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = ExportConfig::load(dir.path().join("absent.json")).expect("load");
        assert_eq!(config, ExportConfig::default());
    }

    #[test]
    fn persist_then_load() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("export.json");
        let config = ExportConfig {
            oversampling: 3.0,
            jpeg_quality: 80,
            font_path: Some(PathBuf::from("/usr/share/fonts/NanumGothic.ttf")),
            ..Default::default()
        };
        config.persist(&path).expect("persist");
        assert_eq!(ExportConfig::load(&path).expect("load"), config);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: ExportConfig = serde_json::from_str(r#"{"jpegQuality":75}"#).expect("parse");
        assert_eq!(config.jpeg_quality, 75);
        assert_eq!(config.oversampling, 2.0);
    }
}
