// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Tesseract recogniser — drives the `tesseract` command-line tool as a child
// process. The processed image is piped to it as PNG on stdin and the text is
// read back from stdout.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Output, Stdio};

use image::DynamicImage;
use scrivener_core::config::EngineConfig;
use scrivener_core::{LanguageCode, RecognitionError};
use tracing::{debug, info, instrument, warn};

use crate::image::processor::encode_png;
use crate::scan::recognize::Recognizer;

/// Default executable name, looked up on `PATH`.
const DEFAULT_BINARY: &str = "tesseract";

/// Fragments tesseract prints on stderr when the requested traineddata file
/// is not installed.
const MISSING_LANGUAGE_MARKERS: &[&str] = &["Failed loading language", "Error opening data file"];

/// Recogniser backed by an installed Tesseract executable.
#[derive(Debug, Clone)]
pub struct TesseractCli {
    /// Path (or bare name) of the executable.
    binary: PathBuf,
    /// Extra arguments appended after the language, e.g. `["--psm", "3"]`.
    extra_args: Vec<String>,
}

impl Default for TesseractCli {
    fn default() -> Self {
        Self::new()
    }
}

impl TesseractCli {
    // -- Construction ---------------------------------------------------------

    /// Use `tesseract` from `PATH` with no extra arguments.
    pub fn new() -> Self {
        Self {
            binary: PathBuf::from(DEFAULT_BINARY),
            extra_args: Vec::new(),
        }
    }

    /// Build from the engine section of the application config.
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            binary: config.tesseract_path.clone(),
            extra_args: config.tesseract_args.clone(),
        }
    }

    /// Use a specific executable.
    pub fn with_binary(mut self, binary: impl Into<PathBuf>) -> Self {
        self.binary = binary.into();
        self
    }

    /// Append extra arguments to every invocation.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra_args.extend(args.into_iter().map(Into::into));
        self
    }

    /// The executable this recogniser runs.
    pub fn binary(&self) -> &Path {
        &self.binary
    }

    // -- Diagnostics ----------------------------------------------------------

    /// First line of `tesseract --version`.
    pub fn version(&self) -> Result<String, RecognitionError> {
        let output = self.run_simple("--version")?;
        // Older releases print the version banner on stderr.
        let text = if output.stdout.is_empty() {
            String::from_utf8_lossy(&output.stderr).into_owned()
        } else {
            String::from_utf8_lossy(&output.stdout).into_owned()
        };
        Ok(text.lines().next().unwrap_or_default().trim().to_string())
    }

    /// Language codes reported by `tesseract --list-langs`.
    pub fn installed_languages(&self) -> Result<Vec<String>, RecognitionError> {
        let output = self.run_simple("--list-langs")?;
        if !output.status.success() {
            return Err(RecognitionError::EngineFailed(stderr_text(&output)));
        }
        let listing = String::from_utf8_lossy(&output.stdout);
        Ok(listing
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with("List of available languages"))
            .map(str::to_string)
            .collect())
    }

    fn run_simple(&self, flag: &str) -> Result<Output, RecognitionError> {
        Command::new(&self.binary)
            .arg(flag)
            .output()
            .map_err(|err| self.spawn_error(err))
    }

    fn spawn_error(&self, err: std::io::Error) -> RecognitionError {
        if err.kind() == std::io::ErrorKind::NotFound {
            RecognitionError::Unavailable(format!(
                "`{}` not found; install Tesseract OCR or set its path",
                self.binary.display()
            ))
        } else {
            RecognitionError::Unavailable(format!(
                "failed to start `{}`: {}",
                self.binary.display(),
                err
            ))
        }
    }
}

impl Recognizer for TesseractCli {
    fn name(&self) -> &str {
        "tesseract"
    }

    #[instrument(skip_all, fields(binary = %self.binary.display(), language = language.code()))]
    fn recognize(
        &self,
        image: &DynamicImage,
        language: LanguageCode,
    ) -> Result<String, RecognitionError> {
        let png = encode_png(image).map_err(|err| {
            RecognitionError::EngineFailed(format!("failed to encode image for tesseract: {}", err))
        })?;

        let mut child = Command::new(&self.binary)
            .arg("stdin")
            .arg("stdout")
            .arg("-l")
            .arg(language.code())
            .args(&self.extra_args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| self.spawn_error(err))?;
        debug!(png_len = png.len(), "tesseract started");

        if let Some(mut stdin) = child.stdin.take() {
            // A process that exits early (e.g. missing language data) closes
            // the pipe; its stderr below explains why.
            if let Err(err) = stdin.write_all(&png) {
                if err.kind() != std::io::ErrorKind::BrokenPipe {
                    drop(stdin);
                    reap(&mut child);
                    return Err(RecognitionError::EngineFailed(format!(
                        "failed to send image to tesseract: {}",
                        err
                    )));
                }
                debug!("tesseract closed stdin early");
            }
        }

        let output = child.wait_with_output().map_err(|err| {
            RecognitionError::EngineFailed(format!("failed to read tesseract output: {}", err))
        })?;

        if !output.status.success() {
            let stderr = stderr_text(&output);
            if MISSING_LANGUAGE_MARKERS
                .iter()
                .any(|marker| stderr.contains(marker))
            {
                warn!(language = language.code(), "language data not installed");
                return Err(RecognitionError::UnsupportedLanguage(
                    language.code().to_string(),
                ));
            }
            return Err(RecognitionError::EngineFailed(format!(
                "tesseract exited with {}: {}",
                output.status, stderr
            )));
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        info!(chars = text.len(), "tesseract finished");
        Ok(text)
    }
}

/// Stop a child we have given up on and collect its exit status.
fn reap(child: &mut Child) {
    if let Err(err) = child.kill() {
        debug!(error = %err, "tesseract already exited");
    }
    if let Err(err) = child.wait() {
        warn!(error = %err, "failed to reap tesseract");
    }
}

fn stderr_text(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_and_config() {
        let engine = TesseractCli::new()
            .with_binary("/opt/tess/bin/tesseract")
            .with_args(["--psm", "6"]);
        assert_eq!(engine.binary(), Path::new("/opt/tess/bin/tesseract"));
        assert_eq!(engine.extra_args, vec!["--psm", "6"]);

        let config = EngineConfig {
            tesseract_path: PathBuf::from("/usr/local/bin/tesseract"),
            tesseract_args: vec!["--oem".into(), "1".into()],
            model_dir: None,
        };
        let engine = TesseractCli::from_config(&config);
        assert_eq!(engine.binary(), Path::new("/usr/local/bin/tesseract"));
        assert_eq!(engine.extra_args, vec!["--oem", "1"]);
    }

    #[cfg(unix)]
    #[test]
    fn abandoned_child_is_killed_and_reaped() {
        let mut child = Command::new("sleep")
            .arg("30")
            .stdin(Stdio::piped())
            .spawn()
            .unwrap();
        reap(&mut child);

        let status = child.try_wait().unwrap().expect("child collected");
        assert!(!status.success());

        // Reaping twice is harmless.
        reap(&mut child);
    }

    /// All child-process cases live in one test so no script file is still
    /// open for writing while another test thread spawns a process.
    #[cfg(unix)]
    #[test]
    fn child_process_outcomes() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let write_script = |name: &str, body: &str| {
            let path = dir.path().join(name);
            std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
            path
        };

        let echo = write_script(
            "echo-tess",
            "cat > /dev/null\necho \"read $1 to $2 with $3 $4 $5 $6\"",
        );
        let missing_lang = write_script(
            "nolang-tess",
            "echo \"Failed loading language '$4'\" >&2\nexit 1",
        );
        let crash = write_script("crash-tess", "cat > /dev/null\necho 'boom' >&2\nexit 3");

        let image = DynamicImage::new_rgb8(8, 8);
        let language = LanguageCode::parse("deu").unwrap();

        let text = TesseractCli::new()
            .with_binary(&echo)
            .with_args(["--psm", "6"])
            .recognize(&image, language)
            .unwrap();
        assert_eq!(text.trim(), "read stdin to stdout with -l deu --psm 6");

        let err = TesseractCli::new()
            .with_binary(&missing_lang)
            .recognize(&image, language)
            .unwrap_err();
        assert_eq!(err, RecognitionError::UnsupportedLanguage("deu".into()));

        let err = TesseractCli::new()
            .with_binary(&crash)
            .recognize(&image, language)
            .unwrap_err();
        match err {
            RecognitionError::EngineFailed(message) => assert!(message.contains("boom")),
            other => panic!("expected EngineFailed, got {other:?}"),
        }

        let err = TesseractCli::new()
            .with_binary(dir.path().join("no-such-binary"))
            .recognize(&image, language)
            .unwrap_err();
        assert!(matches!(err, RecognitionError::Unavailable(_)));
    }
}
