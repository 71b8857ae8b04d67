//! Line-oriented partitioning of generated source around structural markers.
//!
//! No parsing happens here. The source is cut at the first line whose
//! left-trimmed text starts with a marker: everything above is the preamble,
//! the marker line and everything below is the postamble.

use crate::data::{left_trim, FragmentKind, StructuralMarker, DISPLAY_HELPER};

/// Source cut into the text above and the text from the marker onward.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Splice {
    pub preamble: String,
    pub postamble: String,
    /// False when the marker was absent and the whole source became preamble.
    pub marker_found: bool,
}

impl Splice {
    /// Joins preamble, inserted text and postamble.
    pub fn assemble(&self, inserted: &str) -> String {
        let mut text = String::with_capacity(
            self.preamble.len() + inserted.len() + self.postamble.len(),
        );
        text.push_str(&self.preamble);
        text.push_str(inserted);
        text.push_str(&self.postamble);
        text
    }
}

/// Lines strictly before the first `marker` line.
pub fn splice_preamble(source: &str, marker: StructuralMarker) -> String {
    split(source, marker).preamble
}

/// The first `marker` line and everything after it.
pub fn splice_postamble(source: &str, marker: StructuralMarker) -> String {
    split(source, marker).postamble
}

pub fn split(source: &str, marker: StructuralMarker) -> Splice {
    let lines: Vec<&str> = source.lines().collect();
    let at = lines.iter().position(|line| marker.matches(line));
    cut(&lines, at)
}

/// Like [`split`], but `marker` is only looked for below the first `anchor`
/// line. Without an anchor the whole source is searched.
pub fn split_within(source: &str, anchor: StructuralMarker, marker: StructuralMarker) -> Splice {
    let lines: Vec<&str> = source.lines().collect();
    let start = lines
        .iter()
        .position(|line| anchor.matches(line))
        .map(|i| i + 1)
        .unwrap_or(0);
    let at = lines[start..]
        .iter()
        .position(|line| marker.matches(line))
        .map(|i| i + start);
    cut(&lines, at)
}

/// Splice point for a round of the given kind.
///
/// Includes go above everything, file-scope code above the display helper,
/// statements above the entry point terminator. Display calls left in the
/// program by an earlier round are dropped from a statement preamble, so they
/// print once.
pub fn splice_for(kind: FragmentKind, source: &str) -> Splice {
    match kind {
        FragmentKind::IncludeOrNamespace => Splice {
            preamble: String::new(),
            postamble: join_lines(source.lines()),
            marker_found: true,
        },
        FragmentKind::StaticDeclaration => split(source, StructuralMarker::HelperOpen),
        FragmentKind::Statement => {
            let mut splice =
                split_within(source, StructuralMarker::EntryOpen, StructuralMarker::EntryClose);
            splice.preamble = join_lines(
                splice
                    .preamble
                    .lines()
                    .filter(|line| !is_display_call(line)),
            );
            splice
        }
    }
}

/// A line that starts with a call to the display helper.
fn is_display_call(line: &str) -> bool {
    left_trim(line)
        .strip_prefix(DISPLAY_HELPER)
        .is_some_and(|rest| rest.starts_with('('))
}

/// Markers that do not occur anywhere in `source`.
pub fn missing_markers(source: &str) -> Vec<StructuralMarker> {
    StructuralMarker::ALL
        .into_iter()
        .filter(|marker| !source.lines().any(|line| marker.matches(line)))
        .collect()
}

fn cut(lines: &[&str], at: Option<usize>) -> Splice {
    match at {
        Some(i) => Splice {
            preamble: join_lines(lines[..i].iter().copied()),
            postamble: join_lines(lines[i..].iter().copied()),
            marker_found: true,
        },
        None => Splice {
            preamble: join_lines(lines.iter().copied()),
            postamble: String::new(),
            marker_found: false,
        },
    }
}

fn join_lines<'a>(lines: impl Iterator<Item = &'a str>) -> String {
    let mut out = String::new();
    for line in lines {
        out.push_str(line);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROGRAM: &str = "#include <iostream>\n\
template <typename T> void cpp_console_print(T value) {\n\
  std::cout << value;\n\
}\n\
int main(int argc, char** argv) {\n\
  int x = 5;\n\
  return EXIT_SUCCESS;\n\
}\n";

    #[test]
    fn statement_splice_lands_before_terminator() {
        let splice = splice_for(FragmentKind::Statement, PROGRAM);
        assert!(splice.marker_found);
        assert!(splice.preamble.ends_with("  int x = 5;\n"));
        assert_eq!(splice.postamble, "  return EXIT_SUCCESS;\n}\n");
    }

    #[test]
    fn static_splice_lands_before_helper() {
        let splice = splice_for(FragmentKind::StaticDeclaration, PROGRAM);
        assert_eq!(splice.preamble, "#include <iostream>\n");
        assert!(splice.postamble.starts_with("template <typename T>"));
    }

    #[test]
    fn include_splice_prepends_to_everything() {
        let splice = splice_for(FragmentKind::IncludeOrNamespace, PROGRAM);
        assert!(splice.preamble.is_empty());
        assert_eq!(splice.postamble, PROGRAM);
        assert_eq!(
            splice.assemble("#include <vector>\n"),
            format!("#include <vector>\n{}", PROGRAM)
        );
    }

    #[test]
    fn preamble_and_postamble_partition_the_source() {
        for marker in StructuralMarker::ALL {
            let joined = format!(
                "{}{}",
                splice_preamble(PROGRAM, marker),
                splice_postamble(PROGRAM, marker)
            );
            assert_eq!(joined, PROGRAM);
        }
    }

    #[test]
    fn missing_marker_makes_everything_preamble() {
        let source = "int main() {\n}\n";
        let splice = split(source, StructuralMarker::EntryClose);
        assert!(!splice.marker_found);
        assert_eq!(splice.preamble, source);
        assert!(splice.postamble.is_empty());
    }

    #[test]
    fn terminator_inside_file_scope_helper_is_skipped() {
        let source = "static int helper() {\n\
  return EXIT_SUCCESS;\n\
}\n\
int main(int argc, char** argv) {\n\
  return EXIT_SUCCESS;\n\
}\n";
        let splice = splice_for(FragmentKind::Statement, source);
        assert!(splice.preamble.contains("static int helper()"));
        assert!(splice.preamble.ends_with("int main(int argc, char** argv) {\n"));
        assert_eq!(splice.postamble, "  return EXIT_SUCCESS;\n}\n");
    }

    #[test]
    fn statement_splice_drops_earlier_display_calls() {
        let source = "template <typename T> void cpp_console_print(T value) {\n\
  std::cout << value;\n\
}\n\
int main(int argc, char** argv) {\n\
  int x = 5;\n\
  cpp_console_print(x);\n\
\tcpp_console_print (x);\n\
  return EXIT_SUCCESS;\n\
}\n";
        let splice = splice_for(FragmentKind::Statement, source);
        assert!(splice.preamble.starts_with("template <typename T> void cpp_console_print("));
        assert!(!splice.preamble.contains("  cpp_console_print(x);\n"));
        assert!(splice.preamble.contains("\tcpp_console_print (x);\n"));
        assert!(splice.preamble.ends_with("  int x = 5;\n\tcpp_console_print (x);\n"));
        assert_eq!(splice.postamble, "  return EXIT_SUCCESS;\n}\n");
    }

    #[test]
    fn reports_missing_markers() {
        assert!(missing_markers(PROGRAM).is_empty());
        assert_eq!(
            missing_markers("int main() {\n}\n"),
            vec![StructuralMarker::HelperOpen, StructuralMarker::EntryClose]
        );
    }
}
