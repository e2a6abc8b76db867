// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scrivener — Core value objects, catalogues, configuration, and error
// definitions shared across all crates.

pub mod config;
pub mod error;
pub mod human_errors;
pub mod language;
pub mod types;

pub use config::AppConfig;
pub use error::{ErrorKind, RecognitionError, Result, ScrivenerError};
pub use language::LanguageCode;
pub use types::*;
