// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Preview resource store — owns the decoded pixels behind each `PreviewKey`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use examsheet_core::PreviewKey;
use image::DynamicImage;
use tracing::{debug, warn};

/// Storage for preview images, addressed by key.
///
/// The image list calls `release` exactly once for every key it drops.
/// `resolve` hands out shared references, so a reader holding one keeps its
/// pixels after the key is released.
pub trait PreviewStore: Send + Sync {
    fn acquire(&self, image: DynamicImage) -> PreviewKey;

    fn resolve(&self, key: PreviewKey) -> Option<Arc<DynamicImage>>;

    fn release(&self, key: PreviewKey);
}

/// In-process store keeping every preview in a hash map.
#[derive(Default)]
pub struct MemoryPreviewStore {
    next_key: AtomicU64,
    entries: Mutex<HashMap<PreviewKey, Arc<DynamicImage>>>,
}

impl MemoryPreviewStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live previews.
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PreviewStore for MemoryPreviewStore {
    fn acquire(&self, image: DynamicImage) -> PreviewKey {
        let key = PreviewKey(self.next_key.fetch_add(1, Ordering::Relaxed));
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, Arc::new(image));
        debug!(%key, "Preview stored");
        key
    }

    fn resolve(&self, key: PreviewKey) -> Option<Arc<DynamicImage>> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .cloned()
    }

    fn release(&self, key: PreviewKey) {
        let removed = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&key);
        if removed.is_none() {
            warn!(%key, "Released a preview that was not stored");
        }
    }
}
