use std::io;
use std::path::Path;
use std::process::Command;

use thiserror::Error;

use crate::contexts::TransactionError;

/// Captured output of one compiler or build-tool invocation.
///
/// `status_code` is informational only. Whether a build succeeded is decided
/// by the presence of the artifact, never by this value.
#[derive(Debug, Clone, Default)]
pub struct BuildOutput {
    pub status_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

#[derive(Debug, Error)]
pub enum ToolchainError {
    #[error("failed to launch {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Transaction(#[from] TransactionError),
    #[error("failed to stage {path}: {source}")]
    Stage {
        path: String,
        #[source]
        source: io::Error,
    },
}

/// External compiler collaborator.
///
/// Implementations turn the generated source into the artifact and run it.
/// Constructing the literal command line is entirely their business.
pub trait Toolchain {
    /// Builds `source` into `artifact`. Must not remove a pre-existing artifact.
    fn build(&self, source: &Path, artifact: &Path) -> Result<BuildOutput, ToolchainError>;

    /// Runs the artifact synchronously with inherited stdio and returns its exit code.
    fn execute(&self, artifact: &Path) -> io::Result<Option<i32>> {
        let status = Command::new(artifact).status()?;
        Ok(status.code())
    }

    /// Short human readable name used in logs.
    fn describe(&self) -> String;
}
