// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Editor service — the single writer of the image list.
//
// The list lives inside one tokio task. Handles send requests over an mpsc
// channel and wait on a oneshot reply, so edits apply strictly in arrival
// order. Decoding and pixel filters run on the blocking pool, while the
// task holds the list, so a filter always reads the preview it replaces.

use std::sync::Arc;

use examsheet_core::error::{ExamsheetError, Result};
use examsheet_core::{ImageId, ImageRecord};
use examsheet_document::image::{BackgroundMatcher, PixelFilter};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, instrument, warn};

use crate::commands::{EditCommand, EditOutcome};
use crate::list::{DecodedPreview, ImageList, decode_preview};
use crate::store::PreviewStore;

/// Pending requests before senders wait.
const REQUEST_BUFFER: usize = 64;

enum Request {
    Edit {
        command: EditCommand,
        reply: oneshot::Sender<Result<EditOutcome>>,
    },
    Filter {
        id: ImageId,
        filter: Arc<dyn PixelFilter>,
        reply: oneshot::Sender<Result<EditOutcome>>,
    },
    Snapshot {
        reply: oneshot::Sender<Arc<Vec<ImageRecord>>>,
    },
}

/// Result of a batch background correction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BackgroundReport {
    pub corrected: usize,
    pub failed: usize,
}

/// Cloneable handle to the editor task.
#[derive(Clone)]
pub struct Editor {
    requests: mpsc::Sender<Request>,
}

impl Editor {
    /// Start the editor task on the current runtime. The task ends when the
    /// last handle is dropped.
    pub fn spawn(store: Arc<dyn PreviewStore>) -> Self {
        let (requests, inbox) = mpsc::channel(REQUEST_BUFFER);
        tokio::spawn(run(ImageList::new(), store, inbox));
        debug!("Editor task started");
        Self { requests }
    }

    /// Apply one command and wait for its outcome.
    pub async fn apply(&self, command: EditCommand) -> Result<EditOutcome> {
        let (reply, response) = oneshot::channel();
        self.requests
            .send(Request::Edit { command, reply })
            .await
            .map_err(|_| ExamsheetError::EditorClosed)?;
        response.await.map_err(|_| ExamsheetError::EditorClosed)?
    }

    /// Append blobs and return the new ids.
    pub async fn add_images(&self, blobs: Vec<Vec<u8>>) -> Result<Vec<ImageId>> {
        Ok(self.apply(EditCommand::AddImages(blobs)).await?.added)
    }

    pub async fn snapshot(&self) -> Result<Arc<Vec<ImageRecord>>> {
        let (reply, response) = oneshot::channel();
        self.requests
            .send(Request::Snapshot { reply })
            .await
            .map_err(|_| ExamsheetError::EditorClosed)?;
        response.await.map_err(|_| ExamsheetError::EditorClosed)
    }

    /// Run `filter` over one image's preview and store the result.
    ///
    /// Edits sent meanwhile wait until the filtered preview is committed.
    /// On failure the image keeps its current preview.
    #[instrument(skip(self, filter), fields(filter = filter.name()))]
    pub async fn apply_filter(&self, id: ImageId, filter: Arc<dyn PixelFilter>) -> Result<()> {
        let (reply, response) = oneshot::channel();
        self.requests
            .send(Request::Filter { id, filter, reply })
            .await
            .map_err(|_| ExamsheetError::EditorClosed)?;
        response.await.map_err(|_| ExamsheetError::EditorClosed)??;
        Ok(())
    }

    /// Match the background of every image. Per-image failures are logged
    /// and skipped.
    #[instrument(skip(self))]
    pub async fn match_all_backgrounds(&self) -> Result<BackgroundReport> {
        let filter: Arc<dyn PixelFilter> = Arc::new(BackgroundMatcher::default());
        let mut report = BackgroundReport::default();

        for record in self.snapshot().await?.iter() {
            match self.apply_filter(record.id, Arc::clone(&filter)).await {
                Ok(()) => report.corrected += 1,
                Err(ExamsheetError::EditorClosed) => return Err(ExamsheetError::EditorClosed),
                Err(err) => {
                    warn!(id = %record.id, "Background matching failed: {err}");
                    report.failed += 1;
                }
            }
        }

        info!(corrected = report.corrected, failed = report.failed, "Backgrounds matched");
        Ok(report)
    }
}

async fn run(mut list: ImageList, store: Arc<dyn PreviewStore>, mut inbox: mpsc::Receiver<Request>) {
    while let Some(request) = inbox.recv().await {
        match request {
            Request::Edit { command, reply } => {
                let result = match command {
                    EditCommand::AddImages(blobs) => add_images(&mut list, store.as_ref(), blobs).await,
                    other => list.apply(other, store.as_ref()),
                };
                // The caller may have stopped waiting.
                let _ = reply.send(result);
            }
            Request::Filter { id, filter, reply } => {
                let _ = reply.send(filter_preview(&mut list, store.as_ref(), id, filter).await);
            }
            Request::Snapshot { reply } => {
                let _ = reply.send(list.snapshot());
            }
        }
    }
    debug!(images = list.len(), "Editor task stopped");
}

async fn add_images(list: &mut ImageList, store: &dyn PreviewStore, blobs: Vec<Vec<u8>>) -> Result<EditOutcome> {
    let decoded: Vec<DecodedPreview> =
        tokio::task::spawn_blocking(move || blobs.iter().map(|blob| decode_preview(blob)).collect())
            .await
            .map_err(|err| ExamsheetError::ImageError(format!("decode task did not complete: {err}")))?;
    let added = list.add_decoded(decoded, store);
    Ok(EditOutcome {
        changed: !added.is_empty(),
        added,
        released: 0,
    })
}

async fn filter_preview(
    list: &mut ImageList,
    store: &dyn PreviewStore,
    id: ImageId,
    filter: Arc<dyn PixelFilter>,
) -> Result<EditOutcome> {
    let record = list.get(id).ok_or(ExamsheetError::UnknownImage(id))?;
    let source = store.resolve(record.preview).ok_or_else(|| {
        ExamsheetError::ImageError(format!("preview {} of {} is not stored", record.preview, id))
    })?;

    let image = tokio::task::spawn_blocking(move || filter.apply(&source))
        .await
        .map_err(|err| ExamsheetError::ImageError(format!("filter task did not complete: {err}")))??;

    list.apply(EditCommand::UpdatePreview { id, image }, store)
}
