// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for question images.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a question image. Stable across reorders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageId(pub Uuid);

impl ImageId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ImageId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ImageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Handle to a renderable preview held by a preview store.
///
/// The handle itself owns nothing; the store that issued it decides when the
/// underlying pixels are freed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PreviewKey(pub u64);

impl std::fmt::Display for PreviewKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "preview#{}", self.0)
    }
}

/// Intrinsic pixel dimensions of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDimensions {
    pub width: u32,
    pub height: u32,
}

impl ImageDimensions {
    /// Dimensions reported for sources that cannot be decoded.
    pub const FALLBACK: Self = Self {
        width: 1,
        height: 1,
    };

    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Height-to-width ratio, or `None` when either side is zero.
    pub fn aspect_ratio(&self) -> Option<f32> {
        if self.width == 0 || self.height == 0 {
            return None;
        }
        Some(self.height as f32 / self.width as f32)
    }
}

/// One question image in the exam.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
    pub id: ImageId,
    /// Renderable reference into the preview store.
    pub preview: PreviewKey,
    /// Dense 0-based rank; equals the record's position after every edit.
    pub order: usize,
    /// Filled in asynchronously after the record is inserted.
    pub dimensions: Option<ImageDimensions>,
}

impl ImageRecord {
    /// Create a record with unknown dimensions. `order` is assigned by the
    /// next [`normalize_order`] pass.
    pub fn new(preview: PreviewKey) -> Self {
        Self {
            id: ImageId::new(),
            preview,
            order: 0,
            dimensions: None,
        }
    }
}

/// Renumber `order` so it matches array position (0, 1, 2, ...).
///
/// Applied after every add/remove/reorder. Running it on an already dense list
/// leaves the list unchanged.
pub fn normalize_order(records: &mut [ImageRecord]) {
    for (index, record) in records.iter_mut().enumerate() {
        record.order = index;
    }
}
