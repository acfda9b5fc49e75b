// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF reader — inspects exported exam PDFs using the `lopdf` crate.

use std::path::Path;

use examsheet_core::error::{ExamsheetError, Result};
use examsheet_core::geometry::PT_PER_MM;
use lopdf::{Document, Object};
use tracing::{debug, info, instrument};

/// Read-only view over an existing PDF file.
pub struct PdfReader {
    document: Document,
}

impl PdfReader {
    /// Open a PDF from the filesystem.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path_ref = path.as_ref();
        info!("Opening PDF: {}", path_ref.display());

        let document = Document::load(path_ref).map_err(|err| {
            ExamsheetError::PdfError(format!("failed to open {}: {}", path_ref.display(), err))
        })?;

        debug!(pages = document.get_pages().len(), "PDF loaded");

        Ok(Self { document })
    }

    /// Create a reader from raw PDF bytes already in memory.
    #[instrument(skip_all, fields(bytes_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let document = Document::load_mem(data).map_err(|err| {
            ExamsheetError::PdfError(format!("failed to load PDF from memory: {}", err))
        })?;

        Ok(Self { document })
    }

    pub fn page_count(&self) -> usize {
        self.document.get_pages().len()
    }

    /// Media box width and height of every page, in millimetres.
    pub fn page_sizes_mm(&self) -> Result<Vec<(f32, f32)>> {
        self.document
            .get_pages()
            .into_iter()
            .map(|(number, id)| {
                let page = self.document.get_dictionary(id).map_err(|err| {
                    ExamsheetError::PdfError(format!("page {} is not a dictionary: {}", number, err))
                })?;
                let media_box = page
                    .get(b"MediaBox")
                    .and_then(Object::as_array)
                    .map_err(|err| {
                        ExamsheetError::PdfError(format!("page {} has no media box: {}", number, err))
                    })?;
                let coords = media_box
                    .iter()
                    .map(Object::as_float)
                    .collect::<std::result::Result<Vec<f32>, _>>()
                    .map_err(|err| {
                        ExamsheetError::PdfError(format!("page {} media box: {}", number, err))
                    })?;
                match coords.as_slice() {
                    [x0, y0, x1, y1] => Ok(((x1 - x0) / PT_PER_MM, (y1 - y0) / PT_PER_MM)),
                    _ => Err(ExamsheetError::PdfError(format!(
                        "page {} media box has {} entries",
                        number,
                        coords.len()
                    ))),
                }
            })
            .collect()
    }

    /// Document title from the /Info dictionary, if present.
    pub fn title(&self) -> Option<String> {
        let info = self.document.trailer.get(b"Info").ok()?.as_reference().ok()?;
        let bytes = self
            .document
            .get_dictionary(info)
            .ok()?
            .get(b"Title")
            .ok()?
            .as_str()
            .ok()?;
        Some(decode_text_string(bytes))
    }
}

/// Decode a PDF text string: UTF-16BE when it starts with a byte order mark,
/// otherwise treated as UTF-8.
fn decode_text_string(bytes: &[u8]) -> String {
    match bytes {
        [0xFE, 0xFF, rest @ ..] => {
            let units: Vec<u16> = rest
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                .collect();
            String::from_utf16_lossy(&units)
        }
        _ => String::from_utf8_lossy(bytes).into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn garbage_bytes_are_rejected() {
        assert!(matches!(
            PdfReader::from_bytes(b"%PDF-nope"),
            Err(ExamsheetError::PdfError(_))
        ));
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(PdfReader::open("/nonexistent/examsheet/exam.pdf").is_err());
    }

    #[test]
    fn decodes_utf16_titles() {
        let mut bytes = vec![0xFE, 0xFF];
        for unit in "국어".encode_utf16() {
            bytes.extend_from_slice(&unit.to_be_bytes());
        }
        assert_eq!(decode_text_string(&bytes), "국어");
        assert_eq!(decode_text_string(b"Exam"), "Exam");
    }
}
