// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image metrics — intrinsic pixel dimensions with a safe fallback.

use std::io::Cursor;

use examsheet_core::ImageDimensions;
use image::{DynamicImage, ImageReader};
use tracing::warn;

/// Read the pixel dimensions from an encoded image header.
///
/// Never fails: undecodable input yields [`ImageDimensions::FALLBACK`].
pub fn probe_dimensions(data: &[u8]) -> ImageDimensions {
    let probed = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|err| err.to_string())
        .and_then(|reader| reader.into_dimensions().map_err(|err| err.to_string()));

    match probed {
        Ok((width, height)) if width > 0 && height > 0 => ImageDimensions::new(width, height),
        Ok((width, height)) => {
            warn!(width, height, "degenerate image dimensions, using fallback");
            ImageDimensions::FALLBACK
        }
        Err(err) => {
            warn!(%err, "cannot read image dimensions, using fallback");
            ImageDimensions::FALLBACK
        }
    }
}

/// Dimensions of a decoded image, or `None` when either side is zero.
pub fn measure(image: &DynamicImage) -> Option<ImageDimensions> {
    let dims = ImageDimensions::new(image.width(), image.height());
    dims.aspect_ratio().map(|_| dims)
}
