mod brace_tracker;
mod build_runner;
mod file_transaction;
mod session_engine;
mod source_splicer;
mod template_store;
mod toolchain;

pub use brace_tracker::{next_depth, BraceTracker};
pub use build_runner::{
    BuildError, BuildOutcome, BuildRunner, DiagnosticFilter, DEFAULT_ERROR_PATTERN,
};
pub use file_transaction::{FileTransaction, SlotState, TransactionError};
pub use session_engine::{
    clean_session_files, transform_trailing, SessionEngine, SessionError, SessionState, Submission,
};
pub use source_splicer::{
    missing_markers, splice_for, splice_postamble, splice_preamble, split, split_within, Splice,
};
pub use template_store::{fallback_postamble, scaffold, TemplateError, TemplateStore};
pub use toolchain::{ProjectBuild, StandaloneCompiler};
