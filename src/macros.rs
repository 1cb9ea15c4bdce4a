//! Macro table used while normalising rule-file lines.
//!
//! Values are looked up in a fixed precedence order: caller overrides first,
//! then file assignments, then the built-ins. A file assignment to a name the
//! caller has overridden is recorded but never observed.
//!
//! ```
//! use makefile2batch::macros::{AssignOp, MacroTable};
//!
//! let mut table = MacroTable::with_overrides([("CC".to_owned(), "clang".to_owned())]);
//! table.assign("CC", AssignOp::Recursive, "gcc");
//! assert_eq!(table.lookup("CC"), Some("clang"));
//! assert_eq!(table.lookup("MAKEDIR"), Some("%~dp0."));
//! ```

use std::collections::HashMap;

/// Built-in macros available to every rule file.
pub const BUILTINS: [(&str, &str); 2] = [("MAKEDIR", "%~dp0."), ("MAKE", "CMD.EXE /C %~f0")];

/// Assignment operator of a macro-definition line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    /// `=`
    Recursive,
    /// `:=` or `::=`
    Simple,
    /// `?=`, assigns only when the name is undefined.
    Conditional,
    /// `+=`, appends after a single space.
    Append,
}

impl AssignOp {
    /// Operators in match order; longer spellings come first.
    pub const SPELLINGS: [(&'static str, Self); 5] = [
        ("::=", Self::Simple),
        (":=", Self::Simple),
        ("?=", Self::Conditional),
        ("+=", Self::Append),
        ("=", Self::Recursive),
    ];
}

/// Split a `NAME op value` macro-definition line.
///
/// Names are identifier characters; whitespace around the operator and the
/// value is dropped. Returns `None` when `text` is not a definition.
///
/// ```
/// use makefile2batch::macros::{AssignOp, split_definition};
///
/// assert_eq!(split_definition("CC := cl "), Some(("CC", AssignOp::Simple, "cl")));
/// assert_eq!(split_definition("all: a"), None);
/// ```
#[must_use]
pub fn split_definition(text: &str) -> Option<(&str, AssignOp, &str)> {
    let name_len = text
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(text.len());
    if name_len == 0 {
        return None;
    }
    let (name, rest) = text.split_at(name_len);
    let operator = rest.trim_start();
    AssignOp::SPELLINGS.iter().find_map(|(spelling, op)| {
        operator
            .strip_prefix(spelling)
            .map(|value| (name, *op, value.trim()))
    })
}

/// Mapping from macro name to replacement text.
#[derive(Debug, Clone)]
pub struct MacroTable {
    overrides: HashMap<String, String>,
    defined: HashMap<String, String>,
}

impl Default for MacroTable {
    fn default() -> Self {
        Self::with_overrides(std::iter::empty())
    }
}

impl MacroTable {
    /// Seed the table with built-ins and the caller's `NAME=VALUE` overrides.
    pub fn with_overrides<I>(overrides: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let defined = BUILTINS
            .iter()
            .map(|(name, value)| ((*name).to_owned(), (*value).to_owned()))
            .collect();
        Self {
            overrides: overrides.into_iter().collect(),
            defined,
        }
    }

    /// Record a file-level assignment. Never fails; redefinition overwrites.
    pub fn assign(&mut self, name: &str, op: AssignOp, value: &str) {
        match op {
            AssignOp::Recursive | AssignOp::Simple => {
                self.defined.insert(name.to_owned(), value.to_owned());
            }
            AssignOp::Conditional => {
                if self.lookup(name).is_none() {
                    self.defined.insert(name.to_owned(), value.to_owned());
                }
            }
            AssignOp::Append => {
                let entry = self.defined.entry(name.to_owned()).or_default();
                if !entry.is_empty() && !value.is_empty() {
                    entry.push(' ');
                }
                entry.push_str(value);
            }
        }
        tracing::debug!(name, ?op, value, "macro assigned");
    }

    /// Current value of `name`, honouring override precedence.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&str> {
        self.overrides
            .get(name)
            .or_else(|| self.defined.get(name))
            .map(String::as_str)
    }

    /// Expansion of a reference to `name`.
    ///
    /// Unknown names become a batch variable reference so resolution is
    /// deferred to the generated script's environment.
    #[must_use]
    pub fn resolve(&self, name: &str) -> String {
        self.lookup(name)
            .map_or_else(|| format!("%{name}%"), ToOwned::to_owned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn table() -> MacroTable {
        MacroTable::with_overrides([("OUT".to_owned(), "bin".to_owned())])
    }

    #[rstest]
    fn builtins_are_seeded(table: MacroTable) {
        assert_eq!(table.lookup("MAKE"), Some("CMD.EXE /C %~f0"));
        assert_eq!(table.lookup("MAKEDIR"), Some("%~dp0."));
    }

    #[rstest]
    fn override_wins_regardless_of_order(mut table: MacroTable) {
        table.assign("OUT", AssignOp::Recursive, "build");
        assert_eq!(table.lookup("OUT"), Some("bin"));
    }

    #[rstest]
    fn file_definition_can_replace_builtin(mut table: MacroTable) {
        table.assign("MAKE", AssignOp::Simple, "nmake");
        assert_eq!(table.lookup("MAKE"), Some("nmake"));
    }

    #[rstest]
    fn conditional_assignment_keeps_existing(mut table: MacroTable) {
        table.assign("CC", AssignOp::Recursive, "cl");
        table.assign("CC", AssignOp::Conditional, "gcc");
        table.assign("LD", AssignOp::Conditional, "link");
        table.assign("OUT", AssignOp::Conditional, "x");
        assert_eq!(table.lookup("CC"), Some("cl"));
        assert_eq!(table.lookup("LD"), Some("link"));
        assert_eq!(table.lookup("OUT"), Some("bin"));
    }

    #[rstest]
    fn append_joins_with_space(mut table: MacroTable) {
        table.assign("CFLAGS", AssignOp::Append, "/O2");
        table.assign("CFLAGS", AssignOp::Append, "/W3");
        assert_eq!(table.lookup("CFLAGS"), Some("/O2 /W3"));
    }

    #[rstest]
    #[case("IFLAGS = /I inc", Some(("IFLAGS", AssignOp::Recursive, "/I inc")))]
    #[case("endpoint ?= host", Some(("endpoint", AssignOp::Conditional, "host")))]
    #[case("endpoint: a", None)]
    #[case("= value", None)]
    fn definitions_are_split(
        #[case] text: &str,
        #[case] expected: Option<(&str, AssignOp, &str)>,
    ) {
        assert_eq!(split_definition(text), expected);
    }

    #[rstest]
    fn unknown_names_defer_to_environment(table: MacroTable) {
        assert_eq!(table.resolve("USERPROFILE"), "%USERPROFILE%");
        assert_eq!(table.resolve("OUT"), "bin");
    }
}
