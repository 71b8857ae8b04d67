use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

use super::source_splicer::missing_markers;
use crate::data::FragmentKind;

const HEADER: &str = "//<Add additional includes and namespaces here.>
#include <stdlib.h>
#include <iostream>
#include <sstream>
using namespace std;

";

const DISPLAY_HELPER_DEFINITION: &str = "//This method is required to allow the CppConsole to print.
// *** Do not remove this method.
template <typename T> void cpp_console_print(T value) {
  stringstream ss;
  ss << value << \"\\n\";
  cout << ss.str();
}

";

const ENTRY_POINT_OPEN: &str = "int main(int argc, char** argv) {
//<Add custom initialization logic here.>
";

const ENTRY_POINT_CLOSE: &str = "  return EXIT_SUCCESS;
}
";

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("failed to write template {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to read template {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// The scaffold every session starts from: a display helper and an empty
/// entry point, with all three structural markers on their own lines.
pub fn scaffold() -> String {
    [HEADER, DISPLAY_HELPER_DEFINITION, ENTRY_POINT_OPEN, ENTRY_POINT_CLOSE].concat()
}

/// Boilerplate tail for a round whose splice marker could not be found.
pub fn fallback_postamble(kind: FragmentKind) -> String {
    match kind {
        FragmentKind::IncludeOrNamespace => String::new(),
        FragmentKind::StaticDeclaration => {
            [DISPLAY_HELPER_DEFINITION, ENTRY_POINT_OPEN, ENTRY_POINT_CLOSE].concat()
        }
        FragmentKind::Statement => ENTRY_POINT_CLOSE.to_string(),
    }
}

/// File-backed scaffold. The file outlives the session so users can edit it.
#[derive(Debug, Clone)]
pub struct TemplateStore {
    path: PathBuf,
}

impl TemplateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes the scaffold if no template exists. Never overwrites.
    /// Returns whether a new template was written.
    pub fn ensure_template(&self) -> Result<bool, TemplateError> {
        if self.path.exists() {
            return Ok(false);
        }
        fs::write(&self.path, scaffold()).map_err(|source| TemplateError::Write {
            path: self.path.clone(),
            source,
        })?;
        debug!(path = %self.path.display(), "created template");
        Ok(true)
    }

    /// Reads the template verbatim.
    pub fn load_template(&self) -> Result<String, TemplateError> {
        let text = fs::read_to_string(&self.path).map_err(|source| TemplateError::Read {
            path: self.path.clone(),
            source,
        })?;
        let missing = missing_markers(&text);
        if !missing.is_empty() {
            warn!(
                path = %self.path.display(),
                missing = ?missing,
                "template lacks structural markers; splices will fall back to built-in boilerplate"
            );
        }
        Ok(text)
    }
}
