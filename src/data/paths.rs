use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Base name for every file the console generates.
pub const APP_NAME: &str = "cpp_console";

/// Returns the sibling backup slot for `path` (`path` + ".bak").
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".bak");
    PathBuf::from(name)
}

/// Where the project build tool is run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildLocation {
    /// Run the build tool inside this directory.
    Directory(PathBuf),
    /// Run the build tool against this build file, from its parent directory.
    BuildFile(PathBuf),
}

impl BuildLocation {
    pub fn working_dir(&self) -> PathBuf {
        match self {
            BuildLocation::Directory(dir) => dir.clone(),
            BuildLocation::BuildFile(file) => match file.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
                _ => PathBuf::from("."),
            },
        }
    }
}

/// A user project whose real entry-point file is swapped out for each build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    pub entry_point: PathBuf,
    pub build_location: BuildLocation,
}

/// Fixed on-disk locations for one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionPaths {
    /// Generated program text.
    pub source: PathBuf,
    /// Compiled executable. In project mode this belongs to the user.
    pub artifact: PathBuf,
    /// Scaffold the program is bootstrapped from. Survives the session.
    pub template: PathBuf,
    pub project: Option<ProjectLayout>,
}

impl SessionPaths {
    /// Standalone layout rooted at `dir`.
    pub fn standalone(dir: &Path) -> Self {
        Self {
            source: dir.join(format!("{}.cpp", APP_NAME)),
            artifact: dir.join(format!("{}.exe", APP_NAME)),
            template: dir.join(format!("{}.config", APP_NAME)),
            project: None,
        }
    }

    /// Project layout: generated source and template still live in `dir`, but
    /// the artifact is the project's own executable.
    pub fn project(dir: &Path, layout: ProjectLayout, artifact: PathBuf) -> Self {
        Self {
            artifact,
            project: Some(layout),
            ..Self::standalone(dir)
        }
    }

    pub fn is_project(&self) -> bool {
        self.project.is_some()
    }

    /// Files removed when the session terminates. The template is never listed,
    /// and a project artifact belongs to the user.
    pub fn session_scoped_files(&self) -> Vec<PathBuf> {
        let mut files = vec![self.source.clone(), backup_path(&self.source)];
        if !self.is_project() {
            files.push(self.artifact.clone());
            files.push(backup_path(&self.artifact));
        }
        files
    }
}
