// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF export driver — rasterises page elements one at a time and places each
// full-bleed on its own A4 page using `lopdf`.
//
// Page content is a single DCT-encoded (JPEG) image XObject per page; there is
// no text layer. Rasterisation runs on tokio's blocking pool, strictly one page
// after another.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use examsheet_core::error::{ExamsheetError, Result};
use examsheet_core::geometry::mm_to_pt;
use examsheet_core::{ExportConfig, PageGeometry};
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, StringFormat, dictionary};
use tracing::{debug, info, instrument};

use crate::image::processor::{encode_jpeg, flatten_rgba};
use crate::render::{PageMarker, RasterPage};

/// XObject name used for the page image on every page.
const PAGE_IMAGE_NAME: &str = "Im0";

/// One rasterised, JPEG-encoded page.
#[derive(Debug, Clone)]
pub struct EncodedPage {
    pub marker: PageMarker,
    pub width_px: u32,
    pub height_px: u32,
    pub jpeg: Vec<u8>,
}

/// Rasterise a single page onto opaque white and encode it as JPEG.
pub fn rasterize_page<P: RasterPage + ?Sized>(
    page: &P,
    scale: f32,
    quality: u8,
) -> Result<EncodedPage> {
    let marker = page.marker();
    let raster = page.rasterize(scale)?;
    if raster.width() == 0 || raster.height() == 0 {
        return Err(ExamsheetError::Render(format!("{marker} rendered an empty raster")));
    }
    let rgb = flatten_rgba(&raster);
    let jpeg = encode_jpeg(&rgb, quality)?;
    debug!(%marker, width = rgb.width(), height = rgb.height(), jpeg_bytes = jpeg.len(), "Page rasterised");
    Ok(EncodedPage {
        marker,
        width_px: rgb.width(),
        height_px: rgb.height(),
        jpeg,
    })
}

/// Produces the exam PDF from rendered page elements.
pub struct PdfExporter {
    config: ExportConfig,
    geometry: PageGeometry,
    /// Title metadata embedded in the PDF /Info dictionary.
    title: Option<String>,
}

impl PdfExporter {
    /// Create an exporter. Fails if the configuration is out of range.
    pub fn new(config: ExportConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            geometry: PageGeometry::A4_EXAM,
            title: None,
        })
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    /// Rasterise every page in order and assemble the PDF in memory.
    ///
    /// Returns `Ok(None)` when there are no pages. The first page that fails to
    /// rasterise aborts the export.
    #[instrument(skip_all, fields(pages = pages.len()))]
    pub async fn render_pdf<P: RasterPage>(&self, pages: &[Arc<P>]) -> Result<Option<Vec<u8>>> {
        if pages.is_empty() {
            debug!("No page elements, nothing to export");
            return Ok(None);
        }

        let scale = self.config.oversampling;
        let quality = self.config.jpeg_quality;
        let mut encoded = Vec::with_capacity(pages.len());

        for page in pages {
            let page = Arc::clone(page);
            let marker = page.marker();
            let result = tokio::task::spawn_blocking(move || rasterize_page(page.as_ref(), scale, quality))
                .await
                .map_err(|err| {
                    ExamsheetError::Render(format!("rasterisation of {marker} did not complete: {err}"))
                })?;
            encoded.push(result?);
        }

        let bytes = self.assemble(&encoded)?;
        info!(pages = encoded.len(), bytes = bytes.len(), "PDF assembled");
        Ok(Some(bytes))
    }

    /// Export to `path`. Nothing is written when there are no pages.
    ///
    /// The document is written to a temporary file beside `path` and renamed
    /// into place only once complete.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub async fn export_to_file<P: RasterPage>(
        &self,
        pages: &[Arc<P>],
        path: impl AsRef<Path>,
    ) -> Result<Option<PathBuf>> {
        let path = path.as_ref();
        let Some(bytes) = self.render_pdf(pages).await? else {
            return Ok(None);
        };

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let mut staged = tempfile::NamedTempFile::new_in(&dir)?;
        staged.write_all(&bytes)?;
        staged.as_file().sync_all()?;
        staged.persist(path).map_err(|err| ExamsheetError::Io(err.error))?;

        info!("Wrote exam PDF to {}", path.display());
        Ok(Some(path.to_path_buf()))
    }

    /// Build the PDF: one page per encoded raster, each spanning the full
    /// A4 media box.
    fn assemble(&self, pages: &[EncodedPage]) -> Result<Vec<u8>> {
        let page_w = mm_to_pt(self.geometry.page_width);
        let page_h = mm_to_pt(self.geometry.page_height);

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let mut kids: Vec<Object> = Vec::with_capacity(pages.len());

        for page in pages {
            let image_id = doc.add_object(Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Image",
                    "Width" => page.width_px as i64,
                    "Height" => page.height_px as i64,
                    "ColorSpace" => "DeviceRGB",
                    "BitsPerComponent" => 8,
                    "Filter" => "DCTDecode",
                },
                page.jpeg.clone(),
            ));

            let content = Content {
                operations: vec![
                    Operation::new("q", vec![]),
                    Operation::new(
                        "cm",
                        vec![
                            Object::Real(page_w),
                            Object::Integer(0),
                            Object::Integer(0),
                            Object::Real(page_h),
                            Object::Integer(0),
                            Object::Integer(0),
                        ],
                    ),
                    Operation::new("Do", vec![Object::Name(PAGE_IMAGE_NAME.as_bytes().to_vec())]),
                    Operation::new("Q", vec![]),
                ],
            };
            let encoded = content.encode().map_err(|err| {
                ExamsheetError::PdfError(format!("failed to encode content for {}: {}", page.marker, err))
            })?;
            let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));

            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Real(page_w),
                    Object::Real(page_h),
                ],
                "Contents" => content_id,
                "Resources" => dictionary! {
                    "XObject" => dictionary! { PAGE_IMAGE_NAME => image_id },
                },
            });
            kids.push(Object::Reference(page_id));
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let title = self.title.as_deref().unwrap_or("Exam");
        let info_id = doc.add_object(dictionary! {
            "Title" => text_string(title),
            "Creator" => text_string(&self.config.creator),
        });
        doc.trailer.set("Info", info_id);

        let mut output = Vec::new();
        doc.save_to(&mut output).map_err(|err| {
            ExamsheetError::PdfError(format!("failed to serialise exam PDF: {}", err))
        })?;
        Ok(output)
    }
}

/// Encode a PDF text string: literal for ASCII, UTF-16BE with BOM otherwise.
fn text_string(value: &str) -> Object {
    if value.is_ascii() {
        return Object::string_literal(value);
    }
    let mut bytes = vec![0xFE, 0xFF];
    for unit in value.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}
