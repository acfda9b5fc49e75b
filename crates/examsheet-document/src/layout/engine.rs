// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pagination engine — partitions ordered question images into two-column A4
// pages without splitting any image across a page boundary.
//
// Rows are formed from consecutive pairs (2i, 2i+1). A row is as tall as its
// taller member. Rows fill a page while the running height stays within the
// page's available height; the first page loses the header reservation.
// A row that does not fit on an empty page is placed there alone.

use examsheet_core::{ImageId, ImageRecord, PageGeometry};
use serde::Serialize;
use tracing::{debug, instrument};

/// Slack for floating-point accumulation when comparing against page height.
const HEIGHT_EPSILON: f32 = 1e-3;

/// One numbered question block placed on a page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutItem {
    pub image_id: ImageId,
    /// 1-based question number across the whole exam.
    pub number: usize,
    /// Height of the scaled image at column width.
    pub image_height: f32,
    /// Image plus label plus trailing gap.
    pub height: f32,
}

/// A left/right pair of items sharing a vertical band.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutRow {
    pub left: LayoutItem,
    pub right: Option<LayoutItem>,
}

impl LayoutRow {
    pub fn height(&self) -> f32 {
        match &self.right {
            Some(right) => self.left.height.max(right.height),
            None => self.left.height,
        }
    }

    /// Items in reading order (left, then right).
    pub fn items(&self) -> impl Iterator<Item = &LayoutItem> {
        std::iter::once(&self.left).chain(self.right.as_ref())
    }
}

/// Content assignment for one printable page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageDescriptor {
    /// 1-based page number.
    pub index: usize,
    /// The shared header renders on this page.
    pub is_first: bool,
    pub rows: Vec<LayoutRow>,
}

impl PageDescriptor {
    pub fn left_column(&self) -> impl Iterator<Item = &LayoutItem> {
        self.rows.iter().map(|row| &row.left)
    }

    pub fn right_column(&self) -> impl Iterator<Item = &LayoutItem> {
        self.rows.iter().filter_map(|row| row.right.as_ref())
    }

    /// All items in reading order: row by row, left before right.
    pub fn items(&self) -> impl Iterator<Item = &LayoutItem> {
        self.rows.iter().flat_map(LayoutRow::items)
    }

    pub fn item_count(&self) -> usize {
        self.rows.iter().map(|row| 1 + row.right.is_some() as usize).sum()
    }

    /// Sum of row heights, excluding the header reservation.
    pub fn content_height(&self) -> f32 {
        self.rows.iter().map(LayoutRow::height).sum()
    }

    /// Footer label, e.g. "2 / 5".
    pub fn footer_label(&self, page_count: usize) -> String {
        format!("{} / {}", self.index, page_count)
    }
}

/// Result of a pagination pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Pagination {
    pub pages: Vec<PageDescriptor>,
}

impl Pagination {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn image_count(&self) -> usize {
        self.pages.iter().map(PageDescriptor::item_count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Human-readable plan, one line per row.
    pub fn describe(&self) -> String {
        let mut out = String::new();
        let count = self.page_count();
        for page in &self.pages {
            out.push_str(&format!(
                "page {} ({} items, {:.1} mm{})\n",
                page.footer_label(count),
                page.item_count(),
                page.content_height(),
                if page.is_first { ", header" } else { "" }
            ));
            for row in &page.rows {
                match &row.right {
                    Some(right) => out.push_str(&format!(
                        "  {:>3}. | {:>3}.  {:.1} mm\n",
                        row.left.number,
                        right.number,
                        row.height()
                    )),
                    None => out.push_str(&format!(
                        "  {:>3}. |       {:.1} mm\n",
                        row.left.number,
                        row.height()
                    )),
                }
            }
        }
        out
    }
}

/// Paginate records in their slice order.
///
/// Pure and deterministic: the same records and geometry always produce the
/// same pages. Zero records produce zero pages.
#[instrument(skip_all, fields(images = records.len()))]
pub fn paginate(records: &[ImageRecord], geometry: &PageGeometry) -> Pagination {
    let items: Vec<LayoutItem> = records
        .iter()
        .enumerate()
        .map(|(position, record)| LayoutItem {
            image_id: record.id,
            number: position + 1,
            image_height: geometry.image_height(record.dimensions),
            height: geometry.item_height(record.dimensions),
        })
        .collect();

    let mut pages: Vec<PageDescriptor> = Vec::new();
    let mut rows: Vec<LayoutRow> = Vec::new();
    let mut used = 0.0_f32;

    let mut iter = items.into_iter();
    while let Some(left) = iter.next() {
        let row = LayoutRow {
            left,
            right: iter.next(),
        };
        let row_height = row.height();
        let available = geometry.available_height(pages.is_empty());

        if !rows.is_empty() && used + row_height > available + HEIGHT_EPSILON {
            close_page(&mut pages, std::mem::take(&mut rows));
            used = 0.0;
        }

        used += row_height;
        rows.push(row);
    }
    if !rows.is_empty() {
        close_page(&mut pages, rows);
    }

    debug!(pages = pages.len(), "Pagination complete");
    Pagination { pages }
}

fn close_page(pages: &mut Vec<PageDescriptor>, rows: Vec<LayoutRow>) {
    let index = pages.len() + 1;
    pages.push(PageDescriptor {
        index,
        is_first: index == 1,
        rows,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use examsheet_core::{ImageDimensions, PreviewKey, normalize_order};

    const G: PageGeometry = PageGeometry::A4_EXAM;

    /// Records whose item heights (image + 8 mm of label and gap) are the
    /// given values in mm.
    fn records_with_heights(heights: &[f32]) -> Vec<ImageRecord> {
        let mut records: Vec<ImageRecord> = heights
            .iter()
            .enumerate()
            .map(|(k, &h)| {
                let image_h = h - G.label_height - G.item_gap;
                // Column width is 91.5 mm; use 915 px wide so 10 px = 1 mm.
                let mut rec = ImageRecord::new(PreviewKey(k as u64));
                rec.dimensions = Some(ImageDimensions::new(915, (image_h * 10.0).round() as u32));
                rec
            })
            .collect();
        normalize_order(&mut records);
        records
    }

    fn numbers(page: &PageDescriptor) -> Vec<usize> {
        page.items().map(|item| item.number).collect()
    }

    #[test]
    fn zero_images_zero_pages() {
        let pagination = paginate(&[], &G);
        assert!(pagination.is_empty());
        assert_eq!(pagination.image_count(), 0);
    }

    #[test]
    fn single_image_single_first_page() {
        let pagination = paginate(&records_with_heights(&[50.0]), &G);
        assert_eq!(pagination.page_count(), 1);
        let page = &pagination.pages[0];
        assert!(page.is_first);
        assert_eq!(page.index, 1);
        assert!(page.rows[0].right.is_none());
    }

    #[test]
    fn numbering_is_row_major() {
        let pagination = paginate(&records_with_heights(&[50.0; 5]), &G);
        let page = &pagination.pages[0];
        let left: Vec<usize> = page.left_column().map(|i| i.number).collect();
        let right: Vec<usize> = page.right_column().map(|i| i.number).collect();
        assert_eq!(left, vec![1, 3, 5]);
        assert_eq!(right, vec![2, 4]);
        assert_eq!(numbers(page), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn row_height_is_taller_member() {
        let pagination = paginate(&records_with_heights(&[30.0, 70.0]), &G);
        assert!((pagination.pages[0].rows[0].height() - 70.0).abs() < 0.05);
    }

    #[test]
    fn seven_images_split_three_pages() {
        // Rows (1,2)=100 (3,4)=100 (5,6)=150 (7)=200.
        // Page 1 (239 mm): 100 + 100, then 150 overflows.
        // Page 2 (277 mm): 150, then 200 overflows.
        let heights = [100.0, 60.0, 100.0, 80.0, 150.0, 150.0, 200.0];
        let pagination = paginate(&records_with_heights(&heights), &G);
        assert_eq!(pagination.page_count(), 3);
        assert_eq!(numbers(&pagination.pages[0]), vec![1, 2, 3, 4]);
        assert_eq!(numbers(&pagination.pages[1]), vec![5, 6]);
        assert_eq!(numbers(&pagination.pages[2]), vec![7]);
        assert!(pagination.pages[0].is_first);
        assert!(!pagination.pages[1].is_first);

        // Same input, same split.
        assert_eq!(pagination, paginate(&records_with_heights(&heights), &G));
    }

    #[test]
    fn header_reservation_only_on_first_page() {
        // 120 + 120 = 240 > 239 on page 1, but fits the 277 mm of page 2.
        let pagination = paginate(&records_with_heights(&[120.0; 6]), &G);
        assert_eq!(pagination.pages[0].rows.len(), 1);
        assert_eq!(pagination.pages[1].rows.len(), 2);
    }

    #[test]
    fn oversized_image_is_placed_alone() {
        let pagination = paginate(&records_with_heights(&[50.0, 50.0, 400.0, 10.0, 50.0, 50.0]), &G);
        assert_eq!(pagination.page_count(), 3);
        assert_eq!(numbers(&pagination.pages[0]), vec![1, 2]);
        assert_eq!(numbers(&pagination.pages[1]), vec![3, 4]);
        assert_eq!(pagination.pages[1].rows.len(), 1);
        assert_eq!(numbers(&pagination.pages[2]), vec![5, 6]);
    }

    #[test]
    fn unmeasured_images_use_fallback_height() {
        let mut records: Vec<ImageRecord> = (0..2).map(|k| ImageRecord::new(PreviewKey(k))).collect();
        normalize_order(&mut records);
        let pagination = paginate(&records, &G);
        let row = &pagination.pages[0].rows[0];
        assert_eq!(row.left.image_height, G.fallback_image_height);
        assert_eq!(row.height(), 48.0);
    }

    #[test]
    fn item_heights_follow_geometry() {
        let mut records: Vec<ImageRecord> = (0..3).map(|k| ImageRecord::new(PreviewKey(k))).collect();
        records[0].dimensions = Some(ImageDimensions::new(400, 300));
        records[1].dimensions = Some(ImageDimensions::new(1200, 5000));
        normalize_order(&mut records);
        let pagination = paginate(&records, &G);
        let items: Vec<&LayoutItem> = pagination.pages.iter().flat_map(|p| p.items()).collect();
        assert_eq!(items.len(), 3);
        for (item, record) in items.iter().zip(&records) {
            assert_eq!(item.image_height, G.image_height(record.dimensions));
            assert_eq!(item.height, G.item_height(record.dimensions));
        }
    }

    #[test]
    fn exact_fit_stays_on_page() {
        // Two rows summing to exactly 239 mm fit the first page.
        let pagination = paginate(&records_with_heights(&[119.5, 119.5, 119.5, 119.5]), &G);
        assert_eq!(pagination.page_count(), 1);
    }

    #[test]
    fn describe_lists_every_row() {
        let pagination = paginate(&records_with_heights(&[50.0; 3]), &G);
        let plan = pagination.describe();
        assert!(plan.starts_with("page 1 / 1 (3 items"));
        assert!(plan.contains("  1. |   2."));
        assert!(plan.contains("  3. |      "));
    }

    #[test]
    fn pagination_serialises_camel_case() {
        let pagination = paginate(&records_with_heights(&[50.0]), &G);
        let json = serde_json::to_value(&pagination).expect("serialise");
        assert_eq!(json["pages"][0]["isFirst"], true);
        assert_eq!(json["pages"][0]["rows"][0]["left"]["number"], 1);
        assert!(json["pages"][0]["rows"][0]["right"].is_null());
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn arbitrary_records() -> impl Strategy<Value = Vec<ImageRecord>> {
            prop::collection::vec(prop::option::of((1u32..4000, 1u32..8000)), 0..40).prop_map(|dims| {
                let mut records: Vec<ImageRecord> = dims
                    .into_iter()
                    .enumerate()
                    .map(|(k, dims)| {
                        let mut rec = ImageRecord::new(PreviewKey(k as u64));
                        rec.dimensions = dims.map(|(w, h)| ImageDimensions::new(w, h));
                        rec
                    })
                    .collect();
                normalize_order(&mut records);
                records
            })
        }

        proptest! {
            #[test]
            fn every_image_placed_once_in_order(records in arbitrary_records()) {
                let pagination = paginate(&records, &G);
                let placed: Vec<ImageId> = pagination
                    .pages
                    .iter()
                    .flat_map(PageDescriptor::items)
                    .map(|item| item.image_id)
                    .collect();
                let expected: Vec<ImageId> = records.iter().map(|r| r.id).collect();
                prop_assert_eq!(placed, expected);
            }

            #[test]
            fn pages_overflow_only_with_a_single_row(records in arbitrary_records()) {
                let pagination = paginate(&records, &G);
                for page in &pagination.pages {
                    let available = G.available_height(page.is_first);
                    prop_assert!(!page.rows.is_empty());
                    prop_assert!(
                        page.rows.len() == 1 || page.content_height() <= available + HEIGHT_EPSILON
                    );
                }
            }

            #[test]
            fn only_page_one_is_first(records in arbitrary_records()) {
                let pagination = paginate(&records, &G);
                for (k, page) in pagination.pages.iter().enumerate() {
                    prop_assert_eq!(page.index, k + 1);
                    prop_assert_eq!(page.is_first, k == 0);
                }
            }
        }
    }
}
