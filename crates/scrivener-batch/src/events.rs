// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Batch progress notifications — the observer trait callers implement and the
// plain-data events that carry the same notifications across threads.

use std::path::{Path, PathBuf};

use scrivener_core::{BatchReport, PipelineResult};

/// Receives progress from a running batch.
///
/// Every method has an empty default, so observers implement only what they
/// display. Callbacks run on whichever thread drives the batch: the caller's
/// own thread for [`run_batch`](crate::BatchOrchestrator::run_batch), or the
/// task draining a [`BatchHandle`](crate::BatchHandle) in background mode.
pub trait BatchObserver {
    /// An item is about to start. `index` is 1-based.
    fn on_progress(&mut self, index: usize, total: usize, source_path: &Path) {
        let _ = (index, total, source_path);
    }

    /// An item finished, successfully or not.
    fn on_item_complete(&mut self, result: &PipelineResult) {
        let _ = result;
    }

    /// The whole batch finished (or was cancelled).
    fn on_batch_complete(&mut self, report: &BatchReport) {
        let _ = report;
    }
}

/// Observer that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullObserver;

impl BatchObserver for NullObserver {}

/// One notification, as data.
#[derive(Debug, Clone)]
pub enum BatchEvent {
    Progress {
        index: usize,
        total: usize,
        source_path: PathBuf,
    },
    ItemComplete(PipelineResult),
    BatchComplete(BatchReport),
}

impl BatchEvent {
    /// Deliver this event to an observer.
    pub fn dispatch(&self, observer: &mut dyn BatchObserver) {
        match self {
            Self::Progress {
                index,
                total,
                source_path,
            } => observer.on_progress(*index, *total, source_path),
            Self::ItemComplete(result) => observer.on_item_complete(result),
            Self::BatchComplete(report) => observer.on_batch_complete(report),
        }
    }
}

/// Collects events in order; handy for inspecting a finished run.
impl BatchObserver for Vec<BatchEvent> {
    fn on_progress(&mut self, index: usize, total: usize, source_path: &Path) {
        self.push(BatchEvent::Progress {
            index,
            total,
            source_path: source_path.to_path_buf(),
        });
    }

    fn on_item_complete(&mut self, result: &PipelineResult) {
        self.push(BatchEvent::ItemComplete(result.clone()));
    }

    fn on_batch_complete(&mut self, report: &BatchReport) {
        self.push(BatchEvent::BatchComplete(report.clone()));
    }
}
