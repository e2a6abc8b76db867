// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image module — decoding from files or memory, and per-pixel adjustments.

pub mod decode;
pub mod processor;

pub use decode::ImageSource;
pub use processor::ImageProcessor;
