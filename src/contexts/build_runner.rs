//! Compile, execute and roll back one candidate program.
//!
//! The persisted source and the artifact are both guarded by a
//! [`FileTransaction`] for the duration of a run. Whether the build succeeded
//! is decided solely by the artifact existing afterwards: compiler output is
//! filtered down to error lines, which hides the tool's exit status in the
//! command-line pipeline this reproduces. The status is logged but never
//! trusted.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::file_transaction::{FileTransaction, TransactionError};
use crate::data::{BuildOutput, SessionPaths, Toolchain, ToolchainError};

pub const DEFAULT_ERROR_PATTERN: &str = "error:";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildOutcome {
    /// The artifact appeared and was run.
    Success { exit_code: Option<i32> },
    CompileFailed,
}

impl BuildOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, BuildOutcome::Success { .. })
    }
}

#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Transaction(#[from] TransactionError),
    #[error(transparent)]
    Toolchain(ToolchainError),
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Keeps only the compiler output lines worth showing.
#[derive(Debug, Clone)]
pub struct DiagnosticFilter {
    pattern: Regex,
}

impl DiagnosticFilter {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
        })
    }

    pub fn filter<'a>(&self, output: &'a BuildOutput) -> Vec<&'a str> {
        output
            .stdout
            .lines()
            .chain(output.stderr.lines())
            .filter(|line| self.pattern.is_match(line))
            .collect()
    }
}

fn default_error_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(DEFAULT_ERROR_PATTERN).expect("valid regex"))
}

impl Default for DiagnosticFilter {
    fn default() -> Self {
        Self {
            pattern: default_error_re().clone(),
        }
    }
}

pub struct BuildRunner<T: Toolchain> {
    toolchain: T,
    paths: SessionPaths,
    diagnostics: DiagnosticFilter,
}

impl<T: Toolchain> BuildRunner<T> {
    pub fn new(toolchain: T, paths: SessionPaths, diagnostics: DiagnosticFilter) -> Self {
        Self {
            toolchain,
            paths,
            diagnostics,
        }
    }

    pub fn paths(&self) -> &SessionPaths {
        &self.paths
    }

    pub fn toolchain(&self) -> &T {
        &self.toolchain
    }

    /// Writes `text` as the persisted source, builds it, and runs the artifact
    /// if one was produced.
    ///
    /// The source keeps `text` only when the build succeeded and the round is
    /// not `ephemeral`. The artifact is always restored to its pre-run state.
    pub fn run(&self, text: &str, ephemeral: bool) -> Result<BuildOutcome, BuildError> {
        let source_tx = FileTransaction::begin(&self.paths.source)?;
        fs::write(&self.paths.source, text).map_err(|source| BuildError::Write {
            path: self.paths.source.clone(),
            source,
        })?;
        let artifact_tx = FileTransaction::begin(&self.paths.artifact)?;

        match self.toolchain.build(&self.paths.source, &self.paths.artifact) {
            Ok(output) => {
                debug!(
                    toolchain = %self.toolchain.describe(),
                    status = ?output.status_code,
                    "build finished"
                );
                for line in self.diagnostics.filter(&output) {
                    println!("{}", line);
                }
            }
            Err(err @ ToolchainError::Launch { .. }) => {
                eprintln!("cppconsole: *** {}", err);
            }
            Err(err) => return Err(BuildError::Toolchain(err)),
        }

        let outcome = if self.paths.artifact.exists() {
            BuildOutcome::Success {
                exit_code: self.execute(),
            }
        } else {
            BuildOutcome::CompileFailed
        };

        artifact_tx.rollback()?;
        if outcome.is_success() && !ephemeral {
            source_tx.commit()?;
        } else {
            source_tx.rollback()?;
        }

        info!(?outcome, ephemeral, "round finished");
        Ok(outcome)
    }

    fn execute(&self) -> Option<i32> {
        let artifact = match fs::canonicalize(&self.paths.artifact) {
            Ok(path) => path,
            Err(e) => {
                warn!(error = %e, "could not resolve artifact path");
                self.paths.artifact.clone()
            }
        };

        // Keep the prompt ordered ahead of the child's output.
        let _ = io::stdout().flush();
        match self.toolchain.execute(&artifact) {
            Ok(code) => {
                debug!(artifact = %artifact.display(), exit_code = ?code, "artifact exited");
                code
            }
            Err(e) => {
                eprintln!("cppconsole: *** failed to run {}: {}", artifact.display(), e);
                None
            }
        }
    }
}
