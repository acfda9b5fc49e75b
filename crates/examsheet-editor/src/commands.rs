// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Edit commands accepted by the image list.

use examsheet_core::{ImageDimensions, ImageId};
use image::DynamicImage;

/// Step direction for [`EditCommand::MoveImage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    /// Towards the front of the exam (lower question number).
    Earlier,
    /// Towards the back of the exam.
    Later,
}

/// One mutation of the image list.
#[derive(Debug, Clone)]
pub enum EditCommand {
    /// Decode and append raw image blobs, in the given order.
    AddImages(Vec<Vec<u8>>),
    /// Record measured dimensions for an image.
    SetDimensions {
        id: ImageId,
        dimensions: ImageDimensions,
    },
    RemoveImage(ImageId),
    /// Replace the order with `ids`, which must be a permutation of the
    /// current ids.
    Reorder(Vec<ImageId>),
    /// Swap an image with its neighbour. A move past either end does nothing.
    MoveImage {
        id: ImageId,
        direction: MoveDirection,
    },
    /// Replace an image's preview, e.g. after a crop or background fix.
    UpdatePreview {
        id: ImageId,
        image: DynamicImage,
    },
    ClearAll,
}

impl EditCommand {
    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::AddImages(_) => "add-images",
            Self::SetDimensions { .. } => "set-dimensions",
            Self::RemoveImage(_) => "remove-image",
            Self::Reorder(_) => "reorder",
            Self::MoveImage { .. } => "move-image",
            Self::UpdatePreview { .. } => "update-preview",
            Self::ClearAll => "clear-all",
        }
    }
}

/// What an applied command changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditOutcome {
    /// Ids of newly appended images, in insertion order.
    pub added: Vec<ImageId>,
    /// Preview keys released to the store.
    pub released: usize,
    /// False when the command left the list as it was.
    pub changed: bool,
}

impl EditOutcome {
    pub(crate) fn unchanged() -> Self {
        Self::default()
    }

    pub(crate) fn changed() -> Self {
        Self {
            changed: true,
            ..Self::default()
        }
    }
}
