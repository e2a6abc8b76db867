// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// scrivener-batch — runs the single-item pipeline over many images.
//
// Provides output planning (destination checks, collision rejection),
// cooperative cancellation, progress events, and the batch orchestrator with
// both a synchronous loop and a background worker handle.

pub mod cancel;
pub mod events;
pub mod orchestrator;
pub mod plan;

pub use cancel::CancelToken;
pub use events::{BatchEvent, BatchObserver, NullObserver};
pub use orchestrator::{BatchHandle, BatchItem, BatchOrchestrator};
pub use plan::OutputPlan;
