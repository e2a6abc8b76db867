// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Terminal progress for batch runs.

use std::io::Write;
use std::path::Path;

use scrivener_batch::BatchObserver;
use scrivener_core::human_errors::describe_kind;
use scrivener_core::{BatchReport, PipelineResult};

/// Prints one status line per event.
pub struct ProgressPrinter<W: Write> {
    out: W,
}

impl<W: Write> ProgressPrinter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

// Terminal write errors are not worth aborting a batch over.
impl<W: Write> BatchObserver for ProgressPrinter<W> {
    fn on_progress(&mut self, index: usize, total: usize, source_path: &Path) {
        let _ = writeln!(
            self.out,
            "Processing file {} of {}: {}",
            index,
            total,
            display_name(source_path)
        );
    }

    fn on_item_complete(&mut self, result: &PipelineResult) {
        if let PipelineResult::Failure {
            source_path,
            kind,
            message,
        } = result
        {
            let _ = writeln!(
                self.out,
                "  {}: {} ({})",
                display_name(source_path),
                describe_kind(*kind),
                message
            );
        }
    }

    fn on_batch_complete(&mut self, report: &BatchReport) {
        let _ = writeln!(self.out, "{}", report.summary());
    }
}
