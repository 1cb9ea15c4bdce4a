//! Diagnostics raised while parsing a rule file.

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Errors that abort parsing.
///
/// Each variant carries the rule file as named source code with the offending
/// line labelled, so `miette` can render the context.
///
/// # Examples
/// ```rust
/// use makefile2batch::{macros::MacroTable, parser};
///
/// let err = parser::parse("Makefile", "a b: c\n", MacroTable::default())
///     .expect_err("two targets");
/// assert_eq!(err.line(), 1);
/// assert!(err.to_string().contains("none or multi targets"));
/// ```
#[derive(Debug, Error, Diagnostic)]
pub enum ParseError {
    /// The line is neither a macro definition, a rule header nor a recipe.
    #[error("Syntax Error: {text}")]
    #[diagnostic(
        code(makefile2batch::parse::syntax),
        help("expected `NAME = value`, `target: prerequisites` or an indented recipe line")
    )]
    Syntax {
        /// Offending logical line.
        text: String,
        /// 1-based line number.
        line: usize,
        /// Rule file contents.
        #[source_code]
        src: NamedSource<String>,
        /// Location of the offending line.
        #[label("unrecognised line")]
        span: SourceSpan,
    },

    /// A rule header names zero targets or more than one.
    #[error("none or multi targets: found {count} in `{text}`")]
    #[diagnostic(
        code(makefile2batch::parse::target_count),
        help("write one rule per target; multi-target rules are not supported")
    )]
    TargetCount {
        /// Number of target names before the colon.
        count: usize,
        /// Offending logical line.
        text: String,
        /// 1-based line number.
        line: usize,
        /// Rule file contents.
        #[source_code]
        src: NamedSource<String>,
        /// Location of the offending line.
        #[label("exactly one target expected here")]
        span: SourceSpan,
    },

    /// An indented recipe line appears before any rule header.
    #[error("no current target for recipe line `{text}`")]
    #[diagnostic(
        code(makefile2batch::parse::no_current_target),
        help("recipe lines must follow a `target: prerequisites` header")
    )]
    NoCurrentTarget {
        /// Offending logical line.
        text: String,
        /// 1-based line number.
        line: usize,
        /// Rule file contents.
        #[source_code]
        src: NamedSource<String>,
        /// Location of the offending line.
        #[label("no rule is open")]
        span: SourceSpan,
    },
}

impl ParseError {
    /// Line number of the offending line.
    #[must_use]
    pub const fn line(&self) -> usize {
        match self {
            Self::Syntax { line, .. }
            | Self::TargetCount { line, .. }
            | Self::NoCurrentTarget { line, .. } => *line,
        }
    }
}

/// Byte span of the 1-based physical line `number` within `text`.
///
/// The trailing newline is excluded. A line past the end of input maps to an
/// empty span at the end.
pub(crate) fn line_span(text: &str, number: usize) -> SourceSpan {
    let mut offset = 0usize;
    for (idx, segment) in text.split_inclusive('\n').enumerate() {
        if idx + 1 == number {
            let line = segment.trim_end_matches(['\n', '\r']);
            return SourceSpan::new(offset.into(), line.len());
        }
        offset += segment.len();
    }
    SourceSpan::new(text.len().into(), 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("a\nbb\nccc\n", 1, 0, 1)]
    #[case("a\nbb\nccc\n", 2, 2, 2)]
    #[case("a\r\nbb\r\n", 2, 3, 2)]
    #[case("a\nbb", 3, 4, 0)]
    fn line_span_locates_physical_lines(
        #[case] text: &str,
        #[case] number: usize,
        #[case] offset: usize,
        #[case] len: usize,
    ) {
        let span = line_span(text, number);
        assert_eq!(span.offset(), offset);
        assert_eq!(span.len(), len);
    }
}
