use anyhow::{Context, Result};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

mod line_reader;

pub use line_reader::{LineSource, StdinLines};

use cppconsole::build_tracker::RoundKind;
use cppconsole::contexts::{
    clean_session_files, BuildOutcome, BuildRunner, DiagnosticFilter, ProjectBuild, SessionEngine,
    SessionError, StandaloneCompiler, Submission, TemplateStore,
};
use cppconsole::data::{BuildLocation, FragmentClassifier, ProjectLayout, SessionPaths, Toolchain};
use cppconsole::registries::{FileSettingsRegistry, Settings, SettingsError};

#[derive(Clone, Copy)]
pub struct Config {
    pub verbose: bool,
}

const PROMPT_NAME: &str = "CppConsole";

#[derive(Debug, Error)]
pub enum StartupConfigError {
    #[error("The Project executable file was not provided.")]
    MissingArtifactArgument,
    #[error("Could not find project main file: {}", .0.display())]
    ProjectMainNotFound(PathBuf),
    #[error("Could not find project executable file: {}", .0.display())]
    ArtifactNotFound(PathBuf),
    #[error("Could not find makefile directory: {}", .0.display())]
    BuildOverrideNotFound(PathBuf),
    #[error("Option '-m' requires a project main file and executable.")]
    BuildOverrideWithoutProject,
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error("Invalid error pattern '{pattern}': {source}")]
    InvalidErrorPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Raw command line values before validation.
#[derive(Debug, Default, Clone)]
pub struct StartupOptions {
    pub project_main: Option<PathBuf>,
    pub project_artifact: Option<PathBuf>,
    pub build_override: Option<PathBuf>,
    pub static_prefix: Option<String>,
    pub settings: Option<PathBuf>,
}

/// Validated start-up configuration.
pub struct StartupConfig {
    pub paths: SessionPaths,
    pub settings: Settings,
    pub diagnostics: DiagnosticFilter,
}

impl StartupConfig {
    /// Checks the project files exist and resolves settings. Generated files
    /// live in `work_dir`.
    pub fn resolve(options: StartupOptions, work_dir: &Path) -> Result<Self, StartupConfigError> {
        let paths = match (options.project_main, options.project_artifact) {
            (None, None) => {
                if options.build_override.is_some() {
                    return Err(StartupConfigError::BuildOverrideWithoutProject);
                }
                SessionPaths::standalone(work_dir)
            }
            (Some(_), None) | (None, Some(_)) => {
                return Err(StartupConfigError::MissingArtifactArgument);
            }
            (Some(main), Some(artifact)) => {
                if !main.is_file() {
                    return Err(StartupConfigError::ProjectMainNotFound(main));
                }
                if !artifact.exists() {
                    return Err(StartupConfigError::ArtifactNotFound(artifact));
                }
                let build_location = match options.build_override {
                    None => BuildLocation::Directory(PathBuf::from(".")),
                    Some(path) if path.is_dir() => BuildLocation::Directory(path),
                    Some(path) if path.is_file() => BuildLocation::BuildFile(path),
                    Some(path) => return Err(StartupConfigError::BuildOverrideNotFound(path)),
                };
                let layout = ProjectLayout {
                    entry_point: main,
                    build_location,
                };
                SessionPaths::project(work_dir, layout, artifact)
            }
        };

        let mut settings = FileSettingsRegistry::new(options.settings)
            .load()?
            .with_env_overrides();
        if let Some(prefix) = options.static_prefix {
            settings.static_prefix = prefix;
        }

        let diagnostics = DiagnosticFilter::new(&settings.error_pattern).map_err(|source| {
            StartupConfigError::InvalidErrorPattern {
                pattern: settings.error_pattern.clone(),
                source,
            }
        })?;

        Ok(Self {
            paths,
            settings,
            diagnostics,
        })
    }
}

/// `CppConsole:>` when idle, one `{` per open brace otherwise.
pub fn prompt(depth: usize) -> String {
    if depth == 0 {
        format!("{}:>", PROMPT_NAME)
    } else {
        format!("{}{}>", PROMPT_NAME, "{".repeat(depth))
    }
}

/// Runs an interactive session until `exit` or end of input.
pub fn run_console(startup: StartupConfig, config: &Config) -> Result<()> {
    let stdin = io::stdin();
    let mut input = StdinLines::new(stdin.lock());

    match startup.paths.project.clone() {
        Some(layout) => {
            let toolchain = ProjectBuild::new(
                startup.settings.build_tool.clone(),
                startup.settings.build_flags.clone(),
                layout,
            );
            run_session(toolchain, startup, config, &mut input)
        }
        None => {
            let toolchain = StandaloneCompiler::new(
                startup.settings.compiler.clone(),
                startup.settings.compiler_flags.clone(),
            );
            run_session(toolchain, startup, config, &mut input)
        }
    }
}

/// Owns the session's generated files: clears leftovers from a previous run,
/// drives the loop, and always cleans up afterwards.
pub fn run_session<T: Toolchain>(
    toolchain: T,
    startup: StartupConfig,
    config: &Config,
    input: &mut impl LineSource,
) -> Result<()> {
    let paths = startup.paths;
    clean_session_files(&paths).context("Failed to remove files left by a previous session")?;

    let runner = BuildRunner::new(toolchain, paths.clone(), startup.diagnostics);
    let mut engine = SessionEngine::new(
        runner,
        TemplateStore::new(&paths.template),
        FragmentClassifier::new(startup.settings.static_prefix),
    );

    let result = drive(&mut engine, input);

    if config.verbose {
        println!("{}", engine.ledger().summary());
    }
    clean_session_files(&paths).context("Failed to remove generated files")?;
    result
}

fn drive<T: Toolchain>(engine: &mut SessionEngine<T>, input: &mut impl LineSource) -> Result<()> {
    match engine.bootstrap() {
        Ok(()) => {}
        Err(err @ SessionError::BootstrapCompile { .. }) => {
            println!("cppconsole: *** {}", err);
            return Ok(());
        }
        Err(err) => return Err(err).context("Failed to start session"),
    }

    loop {
        print!("{}", prompt(engine.depth()));
        io::stdout().flush()?;

        let Some(line) = input.read_line().context("Failed to read input")? else {
            println!();
            break;
        };

        match engine.submit(&line).context("Session aborted")? {
            Submission::Exit => break,
            Submission::Dispatched {
                kind: RoundKind::Bootstrap,
                outcome: BuildOutcome::CompileFailed,
                ..
            } => {
                println!(
                    "cppconsole: *** Compile failed. Ensure {} has no syntax errors.",
                    engine.templates().path().display()
                );
            }
            _ => {}
        }
    }

    Ok(())
}
