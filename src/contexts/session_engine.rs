//! The interactive session state machine.
//!
//! Lines are routed, code fragments accumulate until their braces balance,
//! and each completed round is spliced into the persisted program and handed
//! to the [`BuildRunner`]. The splice baseline is always re-read from disk,
//! so whatever the runner left behind (new program or rolled back one) is
//! what the next round builds on.

use std::fs;
use std::io;
use std::path::PathBuf;

use thiserror::Error;
use tracing::{debug, info};

use super::brace_tracker::BraceTracker;
use super::build_runner::{BuildError, BuildOutcome, BuildRunner};
use super::source_splicer::{splice_for, Splice};
use super::template_store::{fallback_postamble, TemplateError, TemplateStore};
use crate::build_tracker::{BuildTracker, RoundKind};
use crate::data::{
    FragmentClassifier, FragmentKind, Input, SessionPaths, Toolchain, DISPLAY_HELPER,
};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Build(#[from] BuildError),
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error("failed to read {}: {source}", path.display())]
    ReadSource {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Compile failed. Ensure {} has no syntax errors.", template.display())]
    BootstrapCompile { template: PathBuf },
}

/// What a submitted line did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    /// The fragment was buffered; the round is still open.
    Buffered { depth: usize },
    Dispatched {
        kind: RoundKind,
        ephemeral: bool,
        outcome: BuildOutcome,
    },
    /// Nothing to do (blank line with nothing to repeat).
    Ignored,
    Exit,
}

/// Fragments of the round currently being accumulated.
#[derive(Debug, Clone)]
struct PendingRound {
    kind: FragmentKind,
    splice: Splice,
    lines: Vec<String>,
}

impl PendingRound {
    fn assemble(&self) -> String {
        let mut inserted = String::new();
        for line in &self.lines {
            inserted.push_str(line);
            inserted.push('\n');
        }
        if self.splice.marker_found {
            self.splice.assemble(&inserted)
        } else {
            format!(
                "{}{}{}",
                self.splice.preamble,
                inserted,
                fallback_postamble(self.kind)
            )
        }
    }
}

/// Mutable state of one session. Empty `round` and zero depth is IDLE.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    braces: BraceTracker,
    round: Option<PendingRound>,
    /// Last single-line statement, re-displayed on a blank line.
    last_statement: Option<String>,
}

impl SessionState {
    pub fn depth(&self) -> usize {
        self.braces.depth()
    }

    pub fn is_idle(&self) -> bool {
        self.round.is_none() && self.braces.is_closed()
    }

    fn reset(&mut self) {
        self.braces.reset();
        self.round = None;
    }
}

/// Applies the trailing `!` / `@` affordances to the fragment completing a
/// statement round. Returns the rewritten fragment and whether the round is
/// ephemeral.
pub fn transform_trailing(fragment: &str) -> (String, bool) {
    if let Some(body) = fragment.strip_suffix('!') {
        (format!("{};", body), true)
    } else if let Some(body) = fragment.strip_suffix('@') {
        (format!("{}({} );", DISPLAY_HELPER, body), true)
    } else {
        (fragment.to_string(), false)
    }
}

/// Wraps a previously entered statement in the display helper.
fn display_call(statement: &str) -> String {
    format!("{}({});", DISPLAY_HELPER, statement.replace(';', " "))
}

pub struct SessionEngine<T: Toolchain> {
    runner: BuildRunner<T>,
    templates: TemplateStore,
    classifier: FragmentClassifier,
    state: SessionState,
    ledger: BuildTracker,
}

impl<T: Toolchain> SessionEngine<T> {
    pub fn new(
        runner: BuildRunner<T>,
        templates: TemplateStore,
        classifier: FragmentClassifier,
    ) -> Self {
        Self {
            runner,
            templates,
            classifier,
            state: SessionState::default(),
            ledger: BuildTracker::new(),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn depth(&self) -> usize {
        self.state.depth()
    }

    pub fn ledger(&self) -> &BuildTracker {
        &self.ledger
    }

    pub fn paths(&self) -> &SessionPaths {
        self.runner.paths()
    }

    pub fn runner(&self) -> &BuildRunner<T> {
        &self.runner
    }

    pub fn templates(&self) -> &TemplateStore {
        &self.templates
    }

    /// Current persisted program, or an empty string before the first build.
    pub fn persisted_source(&self) -> Result<String, SessionError> {
        let path = &self.runner.paths().source;
        match fs::read_to_string(path) {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(String::new()),
            Err(source) => Err(SessionError::ReadSource {
                path: path.clone(),
                source,
            }),
        }
    }

    /// First verification build. The session must not start if it fails.
    pub fn bootstrap(&mut self) -> Result<(), SessionError> {
        match self.reload()? {
            BuildOutcome::Success { .. } => Ok(()),
            BuildOutcome::CompileFailed => Err(SessionError::BootstrapCompile {
                template: self.templates.path().to_path_buf(),
            }),
        }
    }

    /// Rebuilds the program from the template and returns to IDLE.
    pub fn reload(&mut self) -> Result<BuildOutcome, SessionError> {
        println!("Reloading...");
        if self.templates.ensure_template()? {
            info!(path = %self.templates.path().display(), "wrote default template");
        }
        let text = self.templates.load_template()?;
        self.state.reset();
        self.dispatch(RoundKind::Bootstrap, &text, false)
    }

    pub fn submit(&mut self, line: &str) -> Result<Submission, SessionError> {
        match Input::parse(line) {
            Input::Exit => Ok(Submission::Exit),
            Input::Reload => {
                let outcome = self.reload()?;
                Ok(Submission::Dispatched {
                    kind: RoundKind::Bootstrap,
                    ephemeral: false,
                    outcome,
                })
            }
            Input::Blank => self.repeat_last(),
            Input::Include(text) => self.submit_include(text),
            Input::Code(text) => self.submit_code(text),
        }
    }

    /// Includes skip accumulation and go to the very top of the program.
    /// A round still being accumulated keeps its fragments and depth, and is
    /// re-based onto the updated program.
    fn submit_include(&mut self, text: &str) -> Result<Submission, SessionError> {
        let source = self.persisted_source()?;
        let program =
            splice_for(FragmentKind::IncludeOrNamespace, &source).assemble(&format!("{}\n", text));
        let outcome = self.dispatch(RoundKind::Include, &program, false)?;

        if self.state.round.is_some() {
            let source = self.persisted_source()?;
            if let Some(round) = self.state.round.as_mut() {
                round.splice = splice_for(round.kind, &source);
                debug!(kind = round.kind.label(), "re-based pending round");
            }
        }

        Ok(Submission::Dispatched {
            kind: RoundKind::Include,
            ephemeral: false,
            outcome,
        })
    }

    fn submit_code(&mut self, text: &str) -> Result<Submission, SessionError> {
        if self.state.round.is_none() {
            let kind = self.classifier.classify(text);
            let source = self.persisted_source()?;
            self.state.round = Some(PendingRound {
                kind,
                splice: splice_for(kind, &source),
                lines: Vec::new(),
            });
        }

        let depth = self.state.braces.update(text);
        let Some(mut round) = self.state.round.take() else {
            return Ok(Submission::Ignored);
        };

        if depth > 0 {
            round.lines.push(text.to_string());
            self.state.round = Some(round);
            debug!(depth, "buffered fragment");
            return Ok(Submission::Buffered { depth });
        }

        let (fragment, ephemeral) = match round.kind {
            FragmentKind::Statement => transform_trailing(text),
            _ => (text.to_string(), false),
        };
        if round.kind == FragmentKind::Statement && round.lines.is_empty() {
            let statement = text.strip_suffix(['!', '@']).unwrap_or(text);
            self.state.last_statement = Some(statement.to_string());
        }
        round.lines.push(fragment);

        let kind = match round.kind {
            FragmentKind::StaticDeclaration => RoundKind::Static,
            _ => RoundKind::Statement,
        };
        let program = round.assemble();
        self.state.reset();
        let outcome = self.dispatch(kind, &program, ephemeral)?;

        Ok(Submission::Dispatched {
            kind,
            ephemeral,
            outcome,
        })
    }

    /// A blank line at IDLE re-displays the last single-line statement.
    fn repeat_last(&mut self) -> Result<Submission, SessionError> {
        if !self.state.is_idle() {
            return Ok(Submission::Ignored);
        }
        let Some(statement) = self.state.last_statement.clone() else {
            return Ok(Submission::Ignored);
        };

        let source = self.persisted_source()?;
        let round = PendingRound {
            kind: FragmentKind::Statement,
            splice: splice_for(FragmentKind::Statement, &source),
            lines: vec![display_call(&statement)],
        };
        let outcome = self.dispatch(RoundKind::Repeat, &round.assemble(), true)?;

        Ok(Submission::Dispatched {
            kind: RoundKind::Repeat,
            ephemeral: true,
            outcome,
        })
    }

    fn dispatch(
        &mut self,
        kind: RoundKind,
        program: &str,
        ephemeral: bool,
    ) -> Result<BuildOutcome, SessionError> {
        debug!(?kind, ephemeral, "dispatching round");
        let before = BuildTracker::hash_bytes(self.persisted_source()?.as_bytes());
        let outcome = self.runner.run(program, ephemeral)?;
        let after = BuildTracker::hash_bytes(self.persisted_source()?.as_bytes());
        self.ledger.record(kind, ephemeral, outcome, before, after);
        Ok(outcome)
    }
}

/// Removes the session-scoped generated files. Missing files are fine.
pub fn clean_session_files(paths: &SessionPaths) -> io::Result<()> {
    for path in paths.session_scoped_files() {
        match fs::remove_file(&path) {
            Ok(()) => debug!(path = %path.display(), "removed"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }
    }
    Ok(())
}
