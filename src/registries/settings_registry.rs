use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use yaml_rust::{Yaml, YamlLoader};

use crate::contexts::DEFAULT_ERROR_PATTERN;
use crate::data::APP_NAME;

/// Environment variable overriding the compiler program.
pub const COMPILER_ENV: &str = "CPP_CONSOLE_CXX";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to read settings {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Invalid settings YAML: {0}")]
    InvalidYaml(String),
    #[error("Setting '{field}' must be {expected}")]
    InvalidField {
        field: &'static str,
        expected: &'static str,
    },
}

/// Toolchain and routing settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub compiler: String,
    pub compiler_flags: Vec<String>,
    pub build_tool: String,
    pub build_flags: Vec<String>,
    /// Lines starting with this go to file scope.
    pub static_prefix: String,
    /// Compiler output lines matching this regex are shown.
    pub error_pattern: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            compiler: "g++".to_string(),
            compiler_flags: vec!["-w".to_string()],
            build_tool: "make".to_string(),
            build_flags: vec!["--silent".to_string()],
            static_prefix: "static ".to_string(),
            error_pattern: DEFAULT_ERROR_PATTERN.to_string(),
        }
    }
}

impl Settings {
    /// Applies `CPP_CONSOLE_CXX` when set and non-empty.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(compiler) = env::var(COMPILER_ENV) {
            if !compiler.trim().is_empty() {
                self.compiler = compiler.trim().to_string();
            }
        }
        self
    }
}

/// File-based settings, loaded from a YAML file next to the generated sources.
/// A missing file yields the defaults.
#[derive(Clone, Debug)]
pub struct FileSettingsRegistry {
    settings_path: PathBuf,
}

impl FileSettingsRegistry {
    /// Creates a new FileSettingsRegistry
    ///
    /// # Arguments
    /// * `settings_path` - Optional path to the settings file (defaults to "cpp_console.yml")
    pub fn new(settings_path: Option<PathBuf>) -> Self {
        Self {
            settings_path: settings_path
                .unwrap_or_else(|| PathBuf::from(format!("{}.yml", APP_NAME))),
        }
    }

    pub fn path(&self) -> &Path {
        &self.settings_path
    }

    pub fn load(&self) -> Result<Settings, SettingsError> {
        if !self.settings_path.exists() {
            return Ok(Settings::default());
        }

        let content = fs::read_to_string(&self.settings_path).map_err(|source| SettingsError::Read {
            path: self.settings_path.clone(),
            source,
        })?;

        parse_settings(&content)
    }
}

/// Parses the YAML settings. Absent keys keep their defaults.
fn parse_settings(yaml_content: &str) -> Result<Settings, SettingsError> {
    let docs = YamlLoader::load_from_str(yaml_content)
        .map_err(|e| SettingsError::InvalidYaml(e.to_string()))?;

    let mut settings = Settings::default();
    let Some(doc) = docs.first() else {
        return Ok(settings);
    };
    match doc {
        Yaml::Hash(_) => {}
        Yaml::Null => return Ok(settings),
        _ => return Err(SettingsError::InvalidYaml("expected a mapping".to_string())),
    }

    if let Some(value) = string_field(doc, "compiler")? {
        settings.compiler = value;
    }
    if let Some(value) = list_field(doc, "compiler_flags")? {
        settings.compiler_flags = value;
    }
    if let Some(value) = string_field(doc, "build_tool")? {
        settings.build_tool = value;
    }
    if let Some(value) = list_field(doc, "build_flags")? {
        settings.build_flags = value;
    }
    if let Some(value) = string_field(doc, "static_prefix")? {
        settings.static_prefix = value;
    }
    if let Some(value) = string_field(doc, "error_pattern")? {
        settings.error_pattern = value;
    }

    Ok(settings)
}

fn string_field(doc: &Yaml, field: &'static str) -> Result<Option<String>, SettingsError> {
    match &doc[field] {
        Yaml::BadValue | Yaml::Null => Ok(None),
        Yaml::String(s) => Ok(Some(s.clone())),
        _ => Err(SettingsError::InvalidField {
            field,
            expected: "a string",
        }),
    }
}

fn list_field(doc: &Yaml, field: &'static str) -> Result<Option<Vec<String>>, SettingsError> {
    let invalid = || SettingsError::InvalidField {
        field,
        expected: "a list of strings",
    };
    match &doc[field] {
        Yaml::BadValue | Yaml::Null => Ok(None),
        Yaml::Array(items) => {
            let mut values = Vec::with_capacity(items.len());
            for item in items {
                match item.as_str() {
                    Some(s) => values.push(s.to_string()),
                    None => return Err(invalid()),
                }
            }
            Ok(Some(values))
        }
        _ => Err(invalid()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_overrides_only_given_keys() {
        let yaml = r#"
compiler: clang++
compiler_flags: [-w, -std=c++17]
static_prefix: "def "
"#;

        let settings = parse_settings(yaml).unwrap();
        assert_eq!(settings.compiler, "clang++");
        assert_eq!(settings.compiler_flags, vec!["-w", "-std=c++17"]);
        assert_eq!(settings.static_prefix, "def ");
        assert_eq!(settings.build_tool, "make");
        assert_eq!(settings.error_pattern, "error:");
    }

    #[test]
    fn test_parse_empty_document_is_default() {
        assert_eq!(parse_settings("").unwrap(), Settings::default());
        assert_eq!(parse_settings("~").unwrap(), Settings::default());
    }

    #[test]
    fn test_parse_rejects_wrong_types() {
        let result = parse_settings("compiler_flags: -w\n");
        assert!(matches!(
            result,
            Err(SettingsError::InvalidField {
                field: "compiler_flags",
                ..
            })
        ));
        assert!(parse_settings("- just\n- a list\n").is_err());
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let registry = FileSettingsRegistry::new(Some(dir.path().join("absent.yml")));
        assert_eq!(registry.load().unwrap(), Settings::default());
    }

    #[test]
    fn test_default_path() {
        let registry = FileSettingsRegistry::new(None);
        assert_eq!(registry.path(), Path::new("cpp_console.yml"));
    }
}
