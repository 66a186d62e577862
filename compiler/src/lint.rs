//! XML instance validation with `xmllint`.
//!
//! Every file in a target directory is checked with
//! `xmllint --noout --schema <schema> <file>`. A file passes only when the
//! tool's stderr contains `validates`; nonzero exits, other output and
//! timeouts all count as invalid.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};
use wait_timeout::ChildExt;

/// Default validator executable.
pub const DEFAULT_XMLLINT: &str = "xmllint";

/// Default per-file timeout.
pub const DEFAULT_LINT_TIMEOUT_MS: u64 = 30_000;

/// Marker `xmllint` prints for a valid document.
const VALID_MARKER: &str = "validates";

/// Errors that stop a lint run.
#[derive(Debug, Error)]
pub enum LintError {
    /// The validator executable could not be started.
    #[error("{0} not found")]
    ToolNotFound(String),

    /// A target directory could not be listed, or the process failed.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// A schema and the directory of instances validated against it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LintTarget {
    pub schema: PathBuf,
    pub directory: PathBuf,
}

/// Verdict for one instance file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileVerdict {
    Valid,
    Invalid,
    TimedOut,
}

/// Result of a lint run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LintReport {
    /// Number of files checked.
    pub checked: usize,
    /// Files that did not validate, including timeouts.
    pub invalid: Vec<PathBuf>,
    /// Subset of `invalid` that hit the timeout.
    pub timed_out: Vec<PathBuf>,
}

impl LintReport {
    pub fn is_valid(&self) -> bool {
        self.invalid.is_empty()
    }

    fn record(&mut self, path: PathBuf, verdict: FileVerdict) {
        self.checked += 1;
        match verdict {
            FileVerdict::Valid => {}
            FileVerdict::Invalid => self.invalid.push(path),
            FileVerdict::TimedOut => {
                self.timed_out.push(path.clone());
                self.invalid.push(path);
            }
        }
    }
}

/// Runs the external validator.
#[derive(Debug, Clone)]
pub struct Linter {
    program: String,
    timeout: Duration,
}

impl Default for Linter {
    fn default() -> Self {
        Self::new(DEFAULT_XMLLINT, Duration::from_millis(DEFAULT_LINT_TIMEOUT_MS))
    }
}

impl Linter {
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    /// Validates one file against `schema`.
    ///
    /// # Errors
    ///
    /// Returns [`LintError::ToolNotFound`] if the validator cannot be
    /// spawned.
    pub fn check_file(&self, schema: &Path, target: &Path) -> Result<FileVerdict, LintError> {
        let mut child = Command::new(&self.program)
            .arg("--noout")
            .arg("--schema")
            .arg(schema)
            .arg(target)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => LintError::ToolNotFound(self.program.clone()),
                _ => LintError::IoError(e),
            })?;

        // Drain stderr in the background so a chatty validator cannot block
        // on a full pipe.
        let stderr_thread = child.stderr.take().map(|mut pipe| {
            std::thread::spawn(move || {
                let mut buf = Vec::new();
                let result = pipe.read_to_end(&mut buf);
                (buf, result)
            })
        });

        match child.wait_timeout(self.timeout)? {
            Some(_status) => {
                let stderr_buf = stderr_thread
                    .and_then(|t| t.join().ok())
                    .map(|(buf, res)| {
                        if let Err(e) = res {
                            debug!(file = %target.display(), error = %e, "Failed to read stderr");
                        }
                        buf
                    })
                    .unwrap_or_default();
                let stderr = String::from_utf8_lossy(&stderr_buf);
                if stderr.contains(VALID_MARKER) {
                    Ok(FileVerdict::Valid)
                } else {
                    debug!(file = %target.display(), output = %stderr.trim(), "Validation failed");
                    Ok(FileVerdict::Invalid)
                }
            }
            None => {
                debug!(
                    file = %target.display(),
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Validator timed out, killing process"
                );
                let _ = child.kill();
                let _ = child.wait();
                Ok(FileVerdict::TimedOut)
            }
        }
    }

    /// Validates every regular file in `target.directory`, sorted by path.
    pub fn lint_target(&self, target: &LintTarget, report: &mut LintReport) -> Result<(), LintError> {
        let mut files = Vec::new();
        for entry in std::fs::read_dir(&target.directory)? {
            let path = entry?.path();
            if path.is_file() {
                files.push(path);
            }
        }
        files.sort();

        info!(
            schema = %target.schema.display(),
            directory = %target.directory.display(),
            files = files.len(),
            "Validating instances"
        );
        for file in files {
            let verdict = self.check_file(&target.schema, &file)?;
            if verdict != FileVerdict::Valid {
                warn!(file = %file.display(), verdict = ?verdict, "INVALID");
            }
            report.record(file, verdict);
        }
        Ok(())
    }

    /// Validates all targets in order.
    pub fn lint(&self, targets: &[LintTarget]) -> Result<LintReport, LintError> {
        let mut report = LintReport::default();
        for target in targets {
            self.lint_target(target, &mut report)?;
        }
        Ok(report)
    }
}
