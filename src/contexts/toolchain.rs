use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tracing::debug;

use super::file_transaction::FileTransaction;
use crate::data::{BuildLocation, BuildOutput, ProjectLayout, Toolchain, ToolchainError};

fn capture(output: Output) -> BuildOutput {
    BuildOutput {
        status_code: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    }
}

/// Compiles the generated source straight into the artifact, e.g.
/// `g++ -w -o cpp_console.exe cpp_console.cpp`.
#[derive(Debug, Clone)]
pub struct StandaloneCompiler {
    program: String,
    flags: Vec<String>,
}

impl StandaloneCompiler {
    pub fn new(program: impl Into<String>, flags: Vec<String>) -> Self {
        Self {
            program: program.into(),
            flags,
        }
    }
}

impl Toolchain for StandaloneCompiler {
    fn build(&self, source: &Path, artifact: &Path) -> Result<BuildOutput, ToolchainError> {
        debug!(program = %self.program, source = %source.display(), "compiling");
        let output = Command::new(&self.program)
            .args(&self.flags)
            .arg("-o")
            .arg(artifact)
            .arg(source)
            .output()
            .map_err(|source| ToolchainError::Launch {
                program: self.program.clone(),
                source,
            })?;
        Ok(capture(output))
    }

    fn describe(&self) -> String {
        self.program.clone()
    }
}

/// Builds through the user's own build tool.
///
/// The project's entry-point file is swapped for the generated source for the
/// duration of the build and put back afterwards whatever the outcome.
#[derive(Debug, Clone)]
pub struct ProjectBuild {
    program: String,
    flags: Vec<String>,
    layout: ProjectLayout,
}

impl ProjectBuild {
    pub fn new(program: impl Into<String>, flags: Vec<String>, layout: ProjectLayout) -> Self {
        Self {
            program: program.into(),
            flags,
            layout,
        }
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.flags);
        if let BuildLocation::BuildFile(file) = &self.layout.build_location {
            cmd.arg("-f").arg(file.file_name().unwrap_or(file.as_os_str()));
        }
        cmd.current_dir(self.layout.build_location.working_dir());
        cmd
    }
}

impl Toolchain for ProjectBuild {
    fn build(&self, source: &Path, _artifact: &Path) -> Result<BuildOutput, ToolchainError> {
        let entry_point = &self.layout.entry_point;
        let swap = FileTransaction::begin(entry_point)?;
        fs::copy(source, entry_point).map_err(|e| ToolchainError::Stage {
            path: entry_point.display().to_string(),
            source: e,
        })?;

        debug!(
            program = %self.program,
            dir = %self.layout.build_location.working_dir().display(),
            "running project build"
        );
        let result = self.command().output();
        swap.rollback()?;

        let output = result.map_err(|source| ToolchainError::Launch {
            program: self.program.clone(),
            source,
        })?;
        Ok(capture(output))
    }

    fn describe(&self) -> String {
        format!("{} ({})", self.program, self.layout.build_location.working_dir().display())
    }
}
