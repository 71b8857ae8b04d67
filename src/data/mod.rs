mod fragment;
mod markers;
mod paths;
mod toolchain;

pub use fragment::{FragmentClassifier, FragmentKind, Input};
pub use markers::{left_trim, StructuralMarker, DISPLAY_HELPER};
pub use paths::{backup_path, BuildLocation, ProjectLayout, SessionPaths, APP_NAME};
pub use toolchain::{BuildOutput, Toolchain, ToolchainError};
