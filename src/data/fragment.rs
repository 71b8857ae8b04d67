/// Literal prefixes that always route a line to the top of the program.
const INCLUDE_PREFIX: &str = "#include";
const NAMESPACE_PREFIX: &str = "using namespace";

const RELOAD_COMMAND: &str = "reload!";
const EXIT_COMMAND: &str = "exit";

/// Where a fragment is spliced into the generated program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FragmentKind {
    /// `#include` / `using namespace`: prepended to the whole file.
    IncludeOrNamespace,
    /// File-scope code, placed above the display helper.
    StaticDeclaration,
    /// Code placed inside the entry point body.
    Statement,
}

impl FragmentKind {
    pub fn label(self) -> &'static str {
        match self {
            FragmentKind::IncludeOrNamespace => "include",
            FragmentKind::StaticDeclaration => "static",
            FragmentKind::Statement => "statement",
        }
    }
}

/// A console line after routing. Control words are recognised before any
/// fragment classification takes place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input<'a> {
    Exit,
    Reload,
    Blank,
    Include(&'a str),
    Code(&'a str),
}

impl<'a> Input<'a> {
    pub fn parse(line: &'a str) -> Self {
        if line == EXIT_COMMAND {
            Input::Exit
        } else if line == RELOAD_COMMAND {
            Input::Reload
        } else if line.is_empty() {
            Input::Blank
        } else if line.starts_with(INCLUDE_PREFIX) || line.starts_with(NAMESPACE_PREFIX) {
            Input::Include(line)
        } else {
            Input::Code(line)
        }
    }
}

/// Chooses between file-scope and entry-point placement for code lines.
///
/// Matching is a literal prefix test; nothing else about the line is inspected.
#[derive(Debug, Clone)]
pub struct FragmentClassifier {
    static_prefix: String,
}

impl FragmentClassifier {
    pub fn new(static_prefix: impl Into<String>) -> Self {
        Self {
            static_prefix: static_prefix.into(),
        }
    }

    pub fn classify(&self, line: &str) -> FragmentKind {
        if line.starts_with(INCLUDE_PREFIX) || line.starts_with(NAMESPACE_PREFIX) {
            FragmentKind::IncludeOrNamespace
        } else if !self.static_prefix.is_empty() && line.starts_with(&self.static_prefix) {
            FragmentKind::StaticDeclaration
        } else {
            FragmentKind::Statement
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routes_control_words_before_code() {
        assert_eq!(Input::parse("exit"), Input::Exit);
        assert_eq!(Input::parse("reload!"), Input::Reload);
        assert_eq!(Input::parse(""), Input::Blank);
        assert_eq!(Input::parse("exit;"), Input::Code("exit;"));
    }

    #[test]
    fn include_and_namespace_lines_are_always_includes() {
        assert_eq!(
            Input::parse("#include <vector>"),
            Input::Include("#include <vector>")
        );
        assert_eq!(
            Input::parse("using namespace std;"),
            Input::Include("using namespace std;")
        );
        // Prefix match is literal, leading whitespace makes it ordinary code.
        assert_eq!(
            Input::parse("  #include <vector>"),
            Input::Code("  #include <vector>")
        );
    }

    #[test]
    fn classifies_static_prefix_and_defaults_to_statement() {
        let classifier = FragmentClassifier::new("static ");
        assert_eq!(
            classifier.classify("static int add(int a, int b) {"),
            FragmentKind::StaticDeclaration
        );
        assert_eq!(
            classifier.classify("static_cast<int>(x);"),
            FragmentKind::Statement
        );
        assert_eq!(classifier.classify("int x = 5;"), FragmentKind::Statement);
    }

    #[test]
    fn empty_static_prefix_never_matches() {
        let classifier = FragmentClassifier::new("");
        assert_eq!(classifier.classify("static int y;"), FragmentKind::Statement);
    }
}
