/// Name of the display helper every generated program defines.
pub const DISPLAY_HELPER: &str = "cpp_console_print";

/// Fixed literal lines used as splice anchors in generated source.
///
/// Markers are only ever located in existing text; they are never written
/// into user fragments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructuralMarker {
    /// Opens the display helper. File-scope code goes above it.
    HelperOpen,
    /// Opens the program entry point.
    EntryOpen,
    /// Terminates the entry point body. Statements go above it.
    EntryClose,
}

impl StructuralMarker {
    pub const ALL: [StructuralMarker; 3] = [
        StructuralMarker::HelperOpen,
        StructuralMarker::EntryOpen,
        StructuralMarker::EntryClose,
    ];

    pub const fn literal(self) -> &'static str {
        match self {
            StructuralMarker::HelperOpen => "template <typename T> void cpp_console_print(",
            StructuralMarker::EntryOpen => "int main(",
            StructuralMarker::EntryClose => "return EXIT_SUCCESS;",
        }
    }

    /// True when the line, ignoring leading blanks and tabs, starts with the marker.
    pub fn matches(self, line: &str) -> bool {
        left_trim(line).starts_with(self.literal())
    }
}

/// Strips leading spaces and tabs only.
pub fn left_trim(line: &str) -> &str {
    line.trim_start_matches([' ', '\t'])
}
