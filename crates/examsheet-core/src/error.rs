// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Examsheet.

use thiserror::Error;

use crate::types::ImageId;

/// Top-level error type for all Examsheet operations.
#[derive(Debug, Error)]
pub enum ExamsheetError {
    // -- Image / document errors --
    #[error("image processing failed: {0}")]
    ImageError(String),

    #[error("PDF operation failed: {0}")]
    PdfError(String),

    #[error("page rendering failed: {0}")]
    Render(String),

    // -- Editing errors --
    #[error("no image with id {0}")]
    UnknownImage(ImageId),

    #[error("invalid reorder: {0}")]
    InvalidReorder(String),

    #[error("editor is no longer running")]
    EditorClosed,

    // -- Configuration --
    #[error("invalid configuration: {0}")]
    Config(String),

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ExamsheetError>;
