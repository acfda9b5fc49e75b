// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Layout module — row-paired pagination onto two-column A4 pages.

pub mod engine;

pub use engine::{LayoutItem, LayoutRow, PageDescriptor, Pagination, paginate};
