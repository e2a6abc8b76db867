// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Batch orchestrator — runs the single-item pipeline over an ordered list of
// inputs, isolating per-item failures and reporting progress.
//
// The same loop serves both modes: `run_batch` drives it on the caller's
// thread, `spawn_batch` moves it onto a blocking worker and streams events
// back over a channel.

use std::path::{Path, PathBuf};

use chrono::Utc;
use scrivener_core::{
    BatchId, BatchReport, DocumentStyle, ImageAdjustmentSettings, LanguageCode, PipelineResult,
    Result, ScrivenerError,
};
use scrivener_document::{DocumentWriter, ImageSource, SingleItemPipeline};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use crate::cancel::CancelToken;
use crate::events::{BatchEvent, BatchObserver, NullObserver};
use crate::plan::OutputPlan;

/// Events buffered between the worker and a slow consumer before the worker
/// waits.
const EVENT_BUFFER: usize = 64;

// -- Batch items --------------------------------------------------------------

/// One input and the settings it is processed with.
#[derive(Debug, Clone)]
pub struct BatchItem {
    source: ImageSource,
    settings: ImageAdjustmentSettings,
    language: LanguageCode,
    style: DocumentStyle,
}

impl BatchItem {
    /// Item reading an image file.
    pub fn new(
        path: impl Into<PathBuf>,
        settings: ImageAdjustmentSettings,
        language: LanguageCode,
        style: DocumentStyle,
    ) -> Self {
        Self::from_source(ImageSource::Path(path.into()), settings, language, style)
    }

    /// Item from any image source.
    pub fn from_source(
        source: ImageSource,
        settings: ImageAdjustmentSettings,
        language: LanguageCode,
        style: DocumentStyle,
    ) -> Self {
        Self {
            source,
            settings,
            language,
            style,
        }
    }

    /// Items for many files sharing one set of settings, in the given order.
    pub fn uniform<I, P>(
        paths: I,
        settings: &ImageAdjustmentSettings,
        language: LanguageCode,
        style: &DocumentStyle,
    ) -> Vec<Self>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        paths
            .into_iter()
            .map(|path| Self::new(path, settings.clone(), language, style.clone()))
            .collect()
    }

    pub fn source(&self) -> &ImageSource {
        &self.source
    }

    /// Path reported for this item in results and events.
    pub fn source_path(&self) -> PathBuf {
        self.source.source_path()
    }
}

// -- Orchestrator -------------------------------------------------------------

/// Runs batches through a [`SingleItemPipeline`].
#[derive(Debug, Clone)]
pub struct BatchOrchestrator {
    pipeline: SingleItemPipeline,
}

impl BatchOrchestrator {
    pub fn new(pipeline: SingleItemPipeline) -> Self {
        Self { pipeline }
    }

    pub fn pipeline(&self) -> &SingleItemPipeline {
        &self.pipeline
    }

    /// Process every item in order on the calling thread.
    ///
    /// Output targets are planned before anything runs; a collision fails
    /// the whole batch up front with [`ScrivenerError::Configuration`]. After
    /// that, no single item can stop the batch: its failure is counted and
    /// recorded, and the loop moves on.
    ///
    /// # Errors
    ///
    /// Only planning errors. Per-item errors live in the report.
    #[instrument(skip_all, fields(total = items.len(), destination = %plan.destination().display()))]
    pub fn run_batch(
        &self,
        items: &[BatchItem],
        plan: &OutputPlan,
        observer: &mut dyn BatchObserver,
        cancel: &CancelToken,
    ) -> Result<BatchReport> {
        let targets = plan.targets(items)?;
        Ok(self.execute(items, &targets, plan.writer(), observer, cancel))
    }

    /// Run the batch on a blocking worker and return a handle for its events.
    ///
    /// Planning happens here, synchronously, so a rejected batch never starts
    /// a worker. Must be called from within a Tokio runtime.
    pub fn spawn_batch(
        &self,
        items: Vec<BatchItem>,
        plan: OutputPlan,
        cancel: CancelToken,
    ) -> Result<BatchHandle> {
        let targets = plan.targets(&items)?;
        let runtime = tokio::runtime::Handle::try_current().map_err(|err| {
            ScrivenerError::Configuration(format!(
                "background batches need a Tokio runtime: {}",
                err
            ))
        })?;

        let (sender, receiver) = mpsc::channel(EVENT_BUFFER);
        let orchestrator = self.clone();
        let worker_cancel = cancel.clone();

        let worker = runtime.spawn_blocking(move || {
            let mut forwarder = ChannelObserver { sender };
            orchestrator.execute(&items, &targets, plan.writer(), &mut forwarder, &worker_cancel)
        });

        Ok(BatchHandle {
            events: receiver,
            worker,
            cancel,
        })
    }

    /// The batch loop. Sole writer of the report; results are pushed in input
    /// order.
    fn execute(
        &self,
        items: &[BatchItem],
        targets: &[PathBuf],
        writer: &dyn DocumentWriter,
        observer: &mut dyn BatchObserver,
        cancel: &CancelToken,
    ) -> BatchReport {
        let batch_id = BatchId::new();
        let started_at = Utc::now();
        let total = items.len();
        info!(%batch_id, total, engine = self.pipeline.engine_name(), "Batch started");

        let mut results: Vec<PipelineResult> = Vec::with_capacity(total);
        let mut succeeded = 0usize;
        let mut failed = 0usize;
        let mut cancelled = false;

        for (position, (item, target)) in items.iter().zip(targets).enumerate() {
            let source_path = item.source_path();

            let result = if cancelled || cancel.is_cancelled() {
                if !cancelled {
                    info!(remaining = total - position, "Batch cancelled");
                    cancelled = true;
                }
                PipelineResult::failed(source_path, &ScrivenerError::Cancelled)
            } else {
                let index = position + 1;
                observer.on_progress(index, total, &source_path);
                info!(index, total, source = %source_path.display(), "Processing file {} of {}", index, total);
                self.run_item(item, target, writer)
            };

            if result.is_success() {
                succeeded += 1;
            } else {
                failed += 1;
            }
            observer.on_item_complete(&result);
            results.push(result);
        }

        let report = BatchReport {
            batch_id,
            total,
            succeeded,
            failed,
            results,
            cancelled,
            started_at,
            finished_at: Utc::now(),
        };
        info!(%batch_id, succeeded, failed, cancelled, "{}", report.summary());
        observer.on_batch_complete(&report);
        report
    }

    /// Pipeline plus persistence for one item. A write failure turns a
    /// success into a failure.
    fn run_item(
        &self,
        item: &BatchItem,
        target: &Path,
        writer: &dyn DocumentWriter,
    ) -> PipelineResult {
        let result = self
            .pipeline
            .run(&item.source, &item.settings, item.language, &item.style);

        if let PipelineResult::Success {
            source_path,
            artifact,
        } = &result
        {
            if let Err(err) = writer.write_to(artifact, target) {
                warn!(source = %source_path.display(), target = %target.display(), error = %err, "Saving failed");
                return PipelineResult::failed(source_path.clone(), &err);
            }
            debug!(target = %target.display(), "Saved");
        }
        result
    }
}

// -- Background mode ----------------------------------------------------------

/// Forwards worker-side notifications to the handle's channel.
struct ChannelObserver {
    sender: mpsc::Sender<BatchEvent>,
}

impl ChannelObserver {
    fn forward(&self, event: BatchEvent) {
        // A dropped handle just means nobody is listening; the batch carries on.
        if self.sender.blocking_send(event).is_err() {
            debug!("Batch event receiver gone");
        }
    }
}

impl BatchObserver for ChannelObserver {
    fn on_progress(&mut self, index: usize, total: usize, source_path: &Path) {
        self.forward(BatchEvent::Progress {
            index,
            total,
            source_path: source_path.to_path_buf(),
        });
    }

    fn on_item_complete(&mut self, result: &PipelineResult) {
        self.forward(BatchEvent::ItemComplete(result.clone()));
    }

    fn on_batch_complete(&mut self, report: &BatchReport) {
        self.forward(BatchEvent::BatchComplete(report.clone()));
    }
}

/// A batch running on a background worker.
///
/// Drain it from the caller's own task with [`next_event`](Self::next_event)
/// or [`drive`](Self::drive); observer callbacks then run there, never on the
/// worker.
pub struct BatchHandle {
    events: mpsc::Receiver<BatchEvent>,
    worker: JoinHandle<BatchReport>,
    cancel: CancelToken,
}

impl BatchHandle {
    /// Ask the worker to stop before its next item.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Token controlling this batch.
    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    /// Next notification, or `None` once the worker has finished.
    pub async fn next_event(&mut self) -> Option<BatchEvent> {
        self.events.recv().await
    }

    /// Deliver every remaining event to `observer`, then return the report.
    pub async fn drive(mut self, observer: &mut dyn BatchObserver) -> Result<BatchReport> {
        while let Some(event) = self.events.recv().await {
            event.dispatch(observer);
        }
        self.finish().await
    }

    /// Discard events and wait for the report.
    pub async fn wait(self) -> Result<BatchReport> {
        self.drive(&mut NullObserver).await
    }

    async fn finish(self) -> Result<BatchReport> {
        self.worker.await.map_err(|err| {
            ScrivenerError::Io(std::io::Error::other(format!(
                "batch worker stopped unexpectedly: {}",
                err
            )))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, GrayImage, Luma};
    use scrivener_core::{ErrorKind, OutputFormat, RecognitionError};
    use scrivener_document::Recognizer;

    struct EchoRecognizer;

    impl Recognizer for EchoRecognizer {
        fn name(&self) -> &str {
            "echo"
        }

        fn recognize(
            &self,
            image: &DynamicImage,
            _language: LanguageCode,
        ) -> std::result::Result<String, RecognitionError> {
            Ok(format!("Page {}x{}\n\nBody text", image.width(), image.height()))
        }
    }

    fn orchestrator() -> BatchOrchestrator {
        BatchOrchestrator::new(SingleItemPipeline::new(EchoRecognizer))
    }

    fn write_pngs(dir: &Path, names: &[&str]) -> Vec<PathBuf> {
        names
            .iter()
            .map(|name| {
                let path = dir.join(name);
                GrayImage::from_pixel(5, 3, Luma([180]))
                    .save(&path)
                    .unwrap();
                path
            })
            .collect()
    }

    fn items(paths: &[PathBuf]) -> Vec<BatchItem> {
        BatchItem::uniform(
            paths.iter().cloned(),
            &ImageAdjustmentSettings::neutral(),
            LanguageCode::ENGLISH,
            &DocumentStyle::default(),
        )
    }

    /// Cancels as soon as the given 1-based index starts.
    struct CancelAt {
        index: usize,
        token: CancelToken,
        progress: Vec<usize>,
    }

    impl BatchObserver for CancelAt {
        fn on_progress(&mut self, index: usize, _total: usize, _source_path: &Path) {
            self.progress.push(index);
            if index == self.index {
                self.token.cancel();
            }
        }
    }

    #[test]
    fn events_arrive_in_order() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        let paths = write_pngs(input.path(), &["a.png", "b.png"]);
        let plan = OutputPlan::new(output.path(), OutputFormat::Text).unwrap();

        let mut log: Vec<BatchEvent> = Vec::new();
        let report = orchestrator()
            .run_batch(&items(&paths), &plan, &mut log, &CancelToken::new())
            .unwrap();

        assert_eq!(report.succeeded, 2);
        assert_eq!(log.len(), 5);
        assert!(matches!(log[0], BatchEvent::Progress { index: 1, total: 2, .. }));
        assert!(matches!(log[1], BatchEvent::ItemComplete(_)));
        assert!(matches!(log[2], BatchEvent::Progress { index: 2, total: 2, .. }));
        assert!(matches!(log[4], BatchEvent::BatchComplete(_)));

        let text = std::fs::read_to_string(output.path().join("a.txt")).unwrap();
        assert!(text.contains("Page 5x3"));
    }

    #[test]
    fn cancellation_finishes_current_item_and_skips_the_rest() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        let paths = write_pngs(input.path(), &["1.png", "2.png", "3.png", "4.png"]);
        let plan = OutputPlan::new(output.path(), OutputFormat::Docx).unwrap();

        let token = CancelToken::new();
        let mut observer = CancelAt {
            index: 2,
            token: token.clone(),
            progress: Vec::new(),
        };
        let report = orchestrator()
            .run_batch(&items(&paths), &plan, &mut observer, &token)
            .unwrap();

        assert!(report.cancelled);
        assert_eq!(observer.progress, vec![1, 2]);
        assert_eq!(report.total, 4);
        assert_eq!(report.results.len(), 4);
        assert_eq!(report.succeeded, 2);
        assert_eq!(report.failed, 2);
        assert_eq!(report.results[2].error_kind(), Some(ErrorKind::Cancelled));
        assert_eq!(report.results[3].error_kind(), Some(ErrorKind::Cancelled));
        assert!(output.path().join("2.docx").exists());
        assert!(!output.path().join("3.docx").exists());
    }

    #[test]
    fn collisions_stop_the_batch_before_it_starts() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        let paths = write_pngs(input.path(), &["scan.png", "scan.jpg"]);
        let plan = OutputPlan::new(output.path(), OutputFormat::Docx).unwrap();

        let mut log: Vec<BatchEvent> = Vec::new();
        let err = orchestrator()
            .run_batch(&items(&paths), &plan, &mut log, &CancelToken::new())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(log.is_empty());
    }

    #[test]
    fn unwritable_target_becomes_a_persistence_failure() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        let paths = write_pngs(input.path(), &["ok.png", "blocked.png"]);
        // A directory squatting on the target name makes the write fail.
        std::fs::create_dir(output.path().join("blocked.txt")).unwrap();
        let plan = OutputPlan::new(output.path(), OutputFormat::Text).unwrap();

        let report = orchestrator()
            .run_batch(&items(&paths), &plan, &mut NullObserver, &CancelToken::new())
            .unwrap();
        assert_eq!((report.succeeded, report.failed), (1, 1));
        assert_eq!(report.results[1].error_kind(), Some(ErrorKind::Persistence));

        // Only the good document and the squatting directory; no staged leftovers.
        let mut names: Vec<String> = std::fs::read_dir(output.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names, vec!["blocked.txt", "ok.txt"]);
        assert!(output.path().join("blocked.txt").is_dir());
    }

    #[tokio::test]
    async fn background_batch_streams_events_to_the_caller() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        let paths = write_pngs(input.path(), &["x.png", "y.png", "z.png"]);
        let plan = OutputPlan::new(output.path(), OutputFormat::Docx).unwrap();

        let mut handle = orchestrator()
            .spawn_batch(items(&paths), plan, CancelToken::new())
            .unwrap();

        let mut progress = Vec::new();
        while let Some(event) = handle.next_event().await {
            if let BatchEvent::Progress { index, .. } = event {
                progress.push(index);
            }
        }
        assert_eq!(progress, vec![1, 2, 3]);

        let report = handle.wait().await.unwrap();
        assert_eq!(report.succeeded, 3);
        assert_eq!(report.summary(), "Batch processing complete. Success: 3, Failed: 0");
    }

    #[tokio::test]
    async fn drive_delivers_every_callback() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        let paths = write_pngs(input.path(), &["p.png", "q.png"]);
        let plan = OutputPlan::new(output.path(), OutputFormat::Text).unwrap();

        let handle = orchestrator()
            .spawn_batch(items(&paths), plan, CancelToken::new())
            .unwrap();
        let mut log: Vec<BatchEvent> = Vec::new();
        let report = handle.drive(&mut log).await.unwrap();

        assert_eq!(report.total, 2);
        assert_eq!(log.len(), 5);
        assert!(matches!(log.last(), Some(BatchEvent::BatchComplete(_))));
    }

    #[test]
    fn spawn_outside_a_runtime_is_rejected() {
        let output = tempfile::tempdir().unwrap();
        let plan = OutputPlan::new(output.path(), OutputFormat::Text).unwrap();
        let result = orchestrator().spawn_batch(Vec::new(), plan, CancelToken::new());
        assert!(matches!(result, Err(ScrivenerError::Configuration(_))));
    }
}
