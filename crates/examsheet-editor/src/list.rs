// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The ordered list of question images.
//
// Records live behind an `Arc`; every edit builds a new vector and swaps it in,
// so snapshots handed out earlier never change. A failed edit leaves the list
// and the preview store untouched.

use std::collections::HashSet;
use std::sync::Arc;

use examsheet_core::error::{ExamsheetError, Result};
use examsheet_core::{ImageDimensions, ImageId, ImageRecord, normalize_order};
use examsheet_document::ImageProcessor;
use examsheet_document::image::{measure, probe_dimensions};
use examsheet_document::image::processor::MAX_PROCESS_SIZE;
use image::{DynamicImage, Rgba, RgbaImage};
use tracing::{debug, instrument, warn};

use crate::commands::{EditCommand, EditOutcome, MoveDirection};
use crate::store::PreviewStore;

/// A blob decoded into a preview, ready to append.
#[derive(Debug, Clone)]
pub struct DecodedPreview {
    pub image: DynamicImage,
    /// `None` for placeholders standing in for undecodable input.
    pub dimensions: Option<ImageDimensions>,
}

/// Decode one blob, downscaled for processing. The recorded dimensions are
/// the intrinsic size from the encoded header, not the downscaled preview.
/// Undecodable input yields a blank white 1×1 placeholder with no measured
/// dimensions.
pub fn decode_preview(bytes: &[u8]) -> DecodedPreview {
    match ImageProcessor::from_bytes(bytes) {
        Ok(processor) => {
            let image = processor.limit_size(MAX_PROCESS_SIZE).into_dynamic();
            let dimensions = Some(probe_dimensions(bytes));
            DecodedPreview { image, dimensions }
        }
        Err(err) => {
            warn!(bytes = bytes.len(), "Image could not be decoded, using a placeholder: {err}");
            DecodedPreview {
                image: DynamicImage::ImageRgba8(RgbaImage::from_pixel(1, 1, Rgba([255, 255, 255, 255]))),
                dimensions: None,
            }
        }
    }
}

/// Copy-on-write list of image records.
#[derive(Debug, Clone, Default)]
pub struct ImageList {
    records: Arc<Vec<ImageRecord>>,
}

impl ImageList {
    pub fn new() -> Self {
        Self::default()
    }

    /// The current records. Later edits do not affect a snapshot.
    pub fn snapshot(&self) -> Arc<Vec<ImageRecord>> {
        Arc::clone(&self.records)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: ImageId) -> Option<&ImageRecord> {
        self.records.iter().find(|record| record.id == id)
    }

    /// Apply one command. Previews of removed or replaced records are
    /// released to `store` once the edit has been committed.
    #[instrument(skip_all, fields(command = command.name(), images = self.records.len()))]
    pub fn apply(&mut self, command: EditCommand, store: &dyn PreviewStore) -> Result<EditOutcome> {
        match command {
            EditCommand::AddImages(blobs) => {
                let decoded = blobs.iter().map(|blob| decode_preview(blob)).collect();
                let added = self.add_decoded(decoded, store);
                Ok(EditOutcome {
                    changed: !added.is_empty(),
                    added,
                    released: 0,
                })
            }
            EditCommand::SetDimensions { id, dimensions } => {
                let position = self.position(id)?;
                if self.records[position].dimensions == Some(dimensions) {
                    return Ok(EditOutcome::unchanged());
                }
                let mut next = self.records.to_vec();
                next[position].dimensions = Some(dimensions);
                self.commit(next);
                Ok(EditOutcome::changed())
            }
            EditCommand::RemoveImage(id) => {
                let position = self.position(id)?;
                let mut next = self.records.to_vec();
                let removed = next.remove(position);
                self.commit(next);
                store.release(removed.preview);
                debug!(%id, "Image removed");
                Ok(EditOutcome {
                    released: 1,
                    ..EditOutcome::changed()
                })
            }
            EditCommand::Reorder(ids) => {
                let next = self.reordered(&ids)?;
                let changed = next.iter().zip(self.records.iter()).any(|(a, b)| a.id != b.id);
                if !changed {
                    return Ok(EditOutcome::unchanged());
                }
                self.commit(next);
                Ok(EditOutcome::changed())
            }
            EditCommand::MoveImage { id, direction } => {
                let position = self.position(id)?;
                let target = match direction {
                    MoveDirection::Earlier => position.checked_sub(1),
                    MoveDirection::Later => Some(position + 1).filter(|&t| t < self.records.len()),
                };
                let Some(target) = target else {
                    return Ok(EditOutcome::unchanged());
                };
                let mut next = self.records.to_vec();
                next.swap(position, target);
                self.commit(next);
                Ok(EditOutcome::changed())
            }
            EditCommand::UpdatePreview { id, image } => {
                let position = self.position(id)?;
                let dimensions = measure(&image);
                let key = store.acquire(image);
                let mut next = self.records.to_vec();
                let previous = std::mem::replace(&mut next[position].preview, key);
                next[position].dimensions = dimensions;
                self.commit(next);
                store.release(previous);
                debug!(%id, old = %previous, new = %key, "Preview replaced");
                Ok(EditOutcome {
                    released: 1,
                    ..EditOutcome::changed()
                })
            }
            EditCommand::ClearAll => {
                if self.records.is_empty() {
                    return Ok(EditOutcome::unchanged());
                }
                let dropped = std::mem::take(&mut self.records);
                for record in dropped.iter() {
                    store.release(record.preview);
                }
                Ok(EditOutcome {
                    released: dropped.len(),
                    ..EditOutcome::changed()
                })
            }
        }
    }

    /// Append decoded previews with unknown dimensions, then patch in the
    /// measured ones.
    pub fn add_decoded(&mut self, decoded: Vec<DecodedPreview>, store: &dyn PreviewStore) -> Vec<ImageId> {
        if decoded.is_empty() {
            return Vec::new();
        }

        let mut measured = Vec::with_capacity(decoded.len());
        let mut next = self.records.to_vec();
        for preview in decoded {
            let record = ImageRecord::new(store.acquire(preview.image));
            measured.push((record.id, preview.dimensions));
            next.push(record);
        }
        self.commit(next);

        let mut next = self.records.to_vec();
        for record in next.iter_mut() {
            if let Some((_, dimensions)) = measured.iter().find(|(id, _)| *id == record.id) {
                record.dimensions = *dimensions;
            }
        }
        self.commit(next);

        debug!(added = measured.len(), total = self.records.len(), "Images appended");
        measured.into_iter().map(|(id, _)| id).collect()
    }

    fn position(&self, id: ImageId) -> Result<usize> {
        self.records
            .iter()
            .position(|record| record.id == id)
            .ok_or(ExamsheetError::UnknownImage(id))
    }

    fn reordered(&self, ids: &[ImageId]) -> Result<Vec<ImageRecord>> {
        if ids.len() != self.records.len() {
            return Err(ExamsheetError::InvalidReorder(format!(
                "expected {} ids, got {}",
                self.records.len(),
                ids.len()
            )));
        }
        let mut seen = HashSet::with_capacity(ids.len());
        ids.iter()
            .map(|&id| {
                if !seen.insert(id) {
                    return Err(ExamsheetError::InvalidReorder(format!("{id} listed twice")));
                }
                self.get(id)
                    .cloned()
                    .ok_or_else(|| ExamsheetError::InvalidReorder(format!("{id} is not in the list")))
            })
            .collect()
    }

    fn commit(&mut self, mut next: Vec<ImageRecord>) {
        normalize_order(&mut next);
        self.records = Arc::new(next);
    }
}
