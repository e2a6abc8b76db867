// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages.
//
// Every technical error is mapped to plain English with a clear suggestion.
// Single-item failures are shown as one message; batch failures reuse the
// same wording per failed entry.

use crate::error::{ErrorKind, RecognitionError, ScrivenerError};

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    /// Whether running again unchanged could succeed.
    pub retriable: bool,
}

impl std::fmt::Display for HumanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.message, self.suggestion)
    }
}

/// Convert a `ScrivenerError` into a `HumanError`.
pub fn humanize_error(err: &ScrivenerError) -> HumanError {
    match err {
        ScrivenerError::Configuration(detail) => HumanError {
            message: "Some of the settings aren't valid.".into(),
            suggestion: format!("Check the settings and try again. ({detail})"),
            retriable: false,
        },

        ScrivenerError::Serialization(_) => HumanError {
            message: "The settings file couldn't be read.".into(),
            suggestion: "Fix or delete the settings file to go back to the defaults.".into(),
            retriable: false,
        },

        ScrivenerError::Decode(_) => HumanError {
            message: "There's a problem with this image.".into(),
            suggestion: "The image may be damaged or in an unusual format. Try saving it as a PNG or JPEG first.".into(),
            retriable: false,
        },

        ScrivenerError::Recognition(rec) => humanize_recognition_error(rec),

        ScrivenerError::Render(_) => HumanError {
            message: "The document couldn't be built.".into(),
            suggestion: "Try a different output format, or report this if it keeps happening.".into(),
            retriable: false,
        },

        ScrivenerError::Persistence(detail) => HumanError {
            message: "The document couldn't be saved.".into(),
            suggestion: format!("Check that the output folder exists and you can write to it. ({detail})"),
            retriable: true,
        },

        ScrivenerError::Io(io_err) => match io_err.kind() {
            std::io::ErrorKind::NotFound => HumanError {
                message: "The file couldn't be found.".into(),
                suggestion: "It may have been moved or deleted. Try choosing the file again.".into(),
                retriable: false,
            },
            std::io::ErrorKind::PermissionDenied => HumanError {
                message: "Scrivener doesn't have permission to use that file.".into(),
                suggestion: "Check the file permissions, or choose a different output folder.".into(),
                retriable: false,
            },
            _ => HumanError {
                message: "There was a problem reading or writing a file.".into(),
                suggestion: "Try again. If this keeps happening, your disk may be full.".into(),
                retriable: true,
            },
        },

        ScrivenerError::Cancelled => HumanError {
            message: "This file was skipped.".into(),
            suggestion: "The batch was stopped before this file was reached.".into(),
            retriable: true,
        },
    }
}

fn humanize_recognition_error(err: &RecognitionError) -> HumanError {
    match err {
        RecognitionError::UnsupportedLanguage(code) => HumanError {
            message: "Text recognition isn't available for this language.".into(),
            suggestion: format!("Install the language data for `{code}`, or pick another language."),
            retriable: false,
        },
        RecognitionError::Unavailable(_) => HumanError {
            message: "The text recognition engine isn't installed.".into(),
            suggestion: "Install Tesseract OCR and make sure it is on your PATH, or set its location in the settings.".into(),
            retriable: false,
        },
        RecognitionError::EngineFailed(_) => HumanError {
            message: "Text recognition didn't work on this image.".into(),
            suggestion: "Try adjusting brightness or contrast, or turn on black-and-white conversion.".into(),
            retriable: false,
        },
    }
}

/// Short label for a failed batch entry.
pub fn describe_kind(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::Configuration => "invalid settings",
        ErrorKind::Decode => "unreadable image",
        ErrorKind::Recognition => "text recognition failed",
        ErrorKind::Render => "document could not be built",
        ErrorKind::Persistence => "could not save document",
        ErrorKind::Cancelled => "skipped",
    }
}
