//! Recipe token substitution.
//!
//! Tokens are replaced in one left-to-right pass, so a replacement value is
//! never scanned again and `$$@` yields the literal text `$@`.

use crate::graph::pattern::stem;
use crate::rules::Rule;

/// Values substituted into a recipe line.
#[derive(Debug, Clone)]
pub(crate) struct TokenContext<'a> {
    target: &'a str,
    stem: &'a str,
    primary: Option<&'a str>,
    all: Option<String>,
}

impl<'a> TokenContext<'a> {
    /// Tokens resolve against `rule` even when its recipe came from a
    /// pattern rule.
    pub(crate) fn for_rule(rule: &'a Rule) -> Self {
        Self {
            target: &rule.target,
            stem: stem(&rule.target),
            primary: rule.primary_source(),
            all: (!rule.sources.is_empty()).then(|| rule.sources.join(" ")),
        }
    }

    fn value(&self, token: char) -> Option<&str> {
        match token {
            '@' => Some(self.target),
            '*' => Some(self.stem),
            '<' => self.primary,
            '^' => self.all.as_deref(),
            '$' => Some("$"),
            _ => None,
        }
    }

    /// Substitute `$@`, `$*`, `$<`, `$^` and `$$` in `line`.
    ///
    /// `$<` and `$^` stay verbatim when the rule has no prerequisites.
    pub(crate) fn substitute(&self, line: &str) -> String {
        let mut out = String::with_capacity(line.len());
        let mut chars = line.chars().peekable();
        while let Some(ch) = chars.next() {
            if ch != '$' {
                out.push(ch);
                continue;
            }
            match chars.peek().and_then(|next| self.value(*next)) {
                Some(value) => {
                    out.push_str(value);
                    chars.next();
                }
                None => out.push('$'),
            }
        }
        out
    }
}
