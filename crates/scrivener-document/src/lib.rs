// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// scrivener-document — the single-image half of Scrivener.
//
// Provides image decoding and pre-processing (brightness, contrast, sharpness,
// binarization), OCR invocation behind the `Recognizer` trait, paragraph-based
// document assembly, DOCX/PDF/text writers, and the single-item pipeline that
// chains them together.

pub mod assemble;
pub mod image;
pub mod output;
pub mod pipeline;
pub mod scan;

// Re-export the primary structs so callers can use `scrivener_document::Preprocessor` etc.
pub use assemble::DocumentAssembler;
pub use image::decode::ImageSource;
pub use image::processor::ImageProcessor;
pub use output::{DocumentWriter, DocxWriter, PdfWriter, TextWriter, writer_for};
pub use pipeline::SingleItemPipeline;
pub use scan::preprocess::Preprocessor;
pub use scan::recognize::{RecognitionInvoker, Recognizer};
pub use scan::tesseract::TesseractCli;

#[cfg(feature = "ocrs")]
pub use scan::ocr::OcrsRecognizer;
