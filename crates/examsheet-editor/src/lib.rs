// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// examsheet-editor — The editable list of question images.
//
// Owns the copy-on-write image list and the commands that mutate it, the
// preview store holding decoded pixels, the single-writer `Editor` task, and
// assembly of preview documents for rendering and export.

pub mod commands;
pub mod document;
pub mod editor;
pub mod list;
pub mod store;

pub use commands::{EditCommand, EditOutcome, MoveDirection};
pub use document::{PreviewDocument, default_export_path, export_pdf};
pub use editor::{BackgroundReport, Editor};
pub use list::{DecodedPreview, ImageList, decode_preview};
pub use store::{MemoryPreviewStore, PreviewStore};
