//! Line-ending convention for the generated script.
//!
//! `cmd.exe` expects CRLF line endings, so scripts written to a file or
//! piped into another program use CRLF. Output shown directly on a terminal
//! keeps plain LF so it reads naturally.

use crate::cli::NewlineArg;
use std::io::{self, IsTerminal};

/// Newline sequence written between script lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEnding {
    /// `\r\n`, as `cmd.exe` expects.
    Crlf,
    /// `\n`.
    Lf,
}

impl LineEnding {
    /// Convert `\n`-separated `text` to this convention.
    ///
    /// Existing `\r\n` pairs are left as they are.
    ///
    /// ```
    /// use makefile2batch::line_ending::LineEnding;
    ///
    /// assert_eq!(LineEnding::Crlf.apply("a\nb\r\n"), "a\r\nb\r\n");
    /// assert_eq!(LineEnding::Lf.apply("a\nb\n"), "a\nb\n");
    /// ```
    #[must_use]
    pub fn apply(self, text: &str) -> String {
        match self {
            Self::Lf => text.to_owned(),
            Self::Crlf => {
                let mut out = String::with_capacity(text.len() + text.matches('\n').count());
                let mut prev = None;
                for ch in text.chars() {
                    if ch == '\n' && prev != Some('\r') {
                        out.push('\r');
                    }
                    out.push(ch);
                    prev = Some(ch);
                }
                out
            }
        }
    }
}

impl From<NewlineArg> for LineEnding {
    fn from(arg: NewlineArg) -> Self {
        match arg {
            NewlineArg::Crlf => Self::Crlf,
            NewlineArg::Lf => Self::Lf,
        }
    }
}

/// Resolve the line ending from explicit configuration and the destination.
///
/// Precedence:
/// 1. `explicit`, when given.
/// 2. [`Crlf`](LineEnding::Crlf) when writing to a file.
/// 3. [`Lf`](LineEnding::Lf) when standard output is a terminal, otherwise
///    [`Crlf`](LineEnding::Crlf).
#[must_use]
pub fn resolve(explicit: Option<LineEnding>, to_file: bool) -> LineEnding {
    resolve_with(explicit, to_file, || io::stdout().is_terminal())
}

/// Testable variant that accepts a terminal probe for standard output.
///
/// The probe is only consulted when output goes to standard output and no
/// convention was forced.
///
/// ```
/// use makefile2batch::line_ending::{LineEnding, resolve_with};
///
/// assert_eq!(resolve_with(None, false, || true), LineEnding::Lf);
/// assert_eq!(resolve_with(None, false, || false), LineEnding::Crlf);
/// ```
#[must_use]
pub fn resolve_with<F>(explicit: Option<LineEnding>, to_file: bool, stdout_is_terminal: F) -> LineEnding
where
    F: FnOnce() -> bool,
{
    if let Some(forced) = explicit {
        return forced;
    }
    if to_file || !stdout_is_terminal() {
        LineEnding::Crlf
    } else {
        LineEnding::Lf
    }
}
