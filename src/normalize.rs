//! Physical-to-logical line normalisation.
//!
//! Each physical line of a rule file passes through [`LineNormalizer::push`],
//! which joins backslash continuations, drops blank and comment lines, drops
//! conditional directives and expands macro references.
//!
//! Conditional directives are only recognised, never evaluated: the lines
//! between `ifeq` and `endif` are kept whichever branch would apply. A
//! directive is any non-indented line starting with `if`, `else` or `end`,
//! with an optional NMAKE `!` and in any case. The match is by prefix, so
//! `endef` is dropped too, and so is a rule header whose target happens to
//! start with one of the prefixes, such as `endpoint:` or `iface.obj:`.
//! Macro definitions are exempt: `IFLAGS = /I inc` is still a definition.
//!
//! ```
//! use makefile2batch::macros::MacroTable;
//! use makefile2batch::normalize::LineNormalizer;
//!
//! let macros = MacroTable::default();
//! let mut normalizer = LineNormalizer::default();
//! assert!(normalizer.push(1, "all: a \\", &macros).is_none());
//! let line = normalizer.push(2, "\t\tb", &macros).expect("complete line");
//! assert_eq!(line.text, "all: a b");
//! assert_eq!(line.number, 1);
//! ```

use crate::macros::{MacroTable, split_definition};
use std::borrow::Cow;

/// Marker that starts a comment line.
pub const COMMENT_MARKER: char = '#';

/// Marker that joins a line with the next physical line.
pub const CONTINUATION_MARKER: char = '\\';

/// Prefixes of directive lines that are dropped without evaluation.
const CONDITIONAL_PREFIXES: [&str; 3] = ["if", "else", "end"];

/// A complete, macro-expanded line ready for classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalLine {
    /// 1-based number of the first physical line it was built from.
    pub number: usize,
    /// Expanded text. Escaped dollars (`$$`) are still doubled.
    pub text: String,
}

/// Stateful line normaliser holding a pending continuation.
#[derive(Debug, Default)]
pub struct LineNormalizer {
    pending: Option<(usize, String)>,
}

impl LineNormalizer {
    /// Feed the physical line `number` and return a logical line once one is
    /// complete.
    pub fn push(
        &mut self,
        line_number: usize,
        raw: &str,
        macros: &MacroTable,
    ) -> Option<LogicalLine> {
        let physical = raw.trim_end_matches('\r');
        if physical.trim().is_empty() || physical.starts_with(COMMENT_MARKER) {
            return None;
        }
        let (number, text) = match self.pending.take() {
            Some((start, mut joined)) => {
                joined.push_str(physical.trim_start());
                (start, joined)
            }
            None => (line_number, physical.to_owned()),
        };
        if let Some(head) = text.strip_suffix(CONTINUATION_MARKER) {
            self.pending = Some((number, head.to_owned()));
            return None;
        }
        complete(number, &text, macros)
    }

    /// Flush a continuation left open at end of input.
    pub fn finish(&mut self, macros: &MacroTable) -> Option<LogicalLine> {
        let (number, text) = self.pending.take()?;
        complete(number, &text, macros)
    }
}

fn complete(number: usize, text: &str, macros: &MacroTable) -> Option<LogicalLine> {
    let body = if is_indented(text) {
        Cow::Borrowed(text)
    } else {
        let stripped = strip_comment(text);
        if stripped.trim().is_empty() || is_conditional(&stripped) {
            tracing::debug!(line = number, text, "skipping directive or comment");
            return None;
        }
        stripped
    };
    Some(LogicalLine {
        number,
        text: expand(&body, macros),
    })
}

/// Whether `line` starts with recipe indentation.
#[must_use]
pub fn is_indented(line: &str) -> bool {
    line.starts_with(['\t', ' '])
}

/// Whether `line` is a conditional directive such as `ifeq` or `!ENDIF`.
///
/// Matching is by prefix and ignores case; macro definitions never match.
#[must_use]
pub fn is_conditional(line: &str) -> bool {
    if split_definition(line).is_some() {
        return false;
    }
    let body = line.strip_prefix('!').unwrap_or(line).trim_start();
    CONDITIONAL_PREFIXES.iter().any(|prefix| {
        body.get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
    })
}

/// Remove a trailing `#` comment; `\#` stands for a literal `#`.
fn strip_comment(line: &str) -> Cow<'_, str> {
    if !line.contains(COMMENT_MARKER) {
        return Cow::Borrowed(line);
    }
    let mut out = String::with_capacity(line.len());
    let mut chars = line.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' if chars.peek() == Some(&COMMENT_MARKER) => {
                out.push(COMMENT_MARKER);
                chars.next();
            }
            COMMENT_MARKER => break,
            other => out.push(other),
        }
    }
    out.truncate(out.trim_end().len());
    Cow::Owned(out)
}

const fn is_macro_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

/// Match `$(NAME)` or `${NAME}` at the start of `text`.
///
/// The opening and closing brackets need not agree. Returns the name and the
/// byte length of the whole reference.
fn reference_at(text: &str) -> Option<(&str, usize)> {
    let body = text
        .strip_prefix("$(")
        .or_else(|| text.strip_prefix("${"))?;
    let len = body
        .find(|c: char| !is_macro_char(c))
        .unwrap_or(body.len());
    if len == 0 {
        return None;
    }
    let (name, after) = body.split_at(len);
    after.starts_with([')', '}']).then_some((name, len + 3))
}

/// Expand macro references in a single left-to-right pass.
///
/// `$$` is copied through untouched so `$$(X)` never names a macro, and
/// replacement text is not rescanned.
#[must_use]
pub fn expand(text: &str, macros: &MacroTable) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find('$') {
        let (head, tail) = rest.split_at(pos);
        out.push_str(head);
        if let Some(after) = tail.strip_prefix("$$") {
            out.push_str("$$");
            rest = after;
        } else if let Some((name, len)) = reference_at(tail) {
            out.push_str(&macros.resolve(name));
            rest = tail.get(len..).unwrap_or_default();
        } else {
            out.push('$');
            rest = tail.get(1..).unwrap_or_default();
        }
    }
    out.push_str(rest);
    out
}

/// Collapse each escaped `$$` into a literal `$`.
#[must_use]
pub fn unescape_dollars(text: &str) -> String {
    text.replace("$$", "$")
}
