// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scan module — pre-processing and text recognition for scanned pages.

pub mod preprocess;
pub mod recognize;
pub mod tesseract;

#[cfg(feature = "ocrs")]
pub mod ocr;
