//! Rule graph data model.
//!
//! A parsed rule file is represented as a flat map from target name to
//! [`Rule`]. There are no pointer links between nodes: prerequisites are
//! plain names and are looked up in the [`RuleGraph`] on demand, which keeps
//! pattern resolution and call emission simple map queries.
//!
//! ```
//! use makefile2batch::rules::{RecipeLine, Rule, RuleGraph};
//!
//! let mut graph = RuleGraph::default();
//! let mut rule = Rule::new("prog.exe", vec!["prog.obj".into()]);
//! rule.recipe.push(RecipeLine::parse("link $<"));
//! graph.insert(rule);
//! assert_eq!(graph.default_entry(), Some("prog.exe"));
//! ```

use serde::Serialize;
use std::collections::HashMap;

/// Marker that opens a pattern-rule name such as `.c.obj`.
pub const PATTERN_MARKER: char = '.';

/// Recipe prefix that tells the generator not to check the line's status.
pub const IGNORE_ERRORS_MARKER: char = '-';

/// Name of the pseudo-target whose prerequisites are always rebuilt.
pub const PHONY_TARGET: &str = ".PHONY";

/// One command of a rule's recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecipeLine {
    /// Command text with the failure-suppression marker removed.
    pub text: String,
    /// Whether a failure of this command is tolerated.
    pub ignore_errors: bool,
}

impl RecipeLine {
    /// Split an indented recipe body into its text and per-line flag.
    #[must_use]
    pub fn parse(body: &str) -> Self {
        body.strip_prefix(IGNORE_ERRORS_MARKER).map_or_else(
            || Self {
                text: body.to_owned(),
                ignore_errors: false,
            },
            |rest| Self {
                text: rest.to_owned(),
                ignore_errors: true,
            },
        )
    }
}

/// A single build target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rule {
    /// Target name; unique within a [`RuleGraph`].
    pub target: String,
    /// Prerequisites in declaration order. The first is the primary source.
    pub sources: Vec<String>,
    /// Commands run to bring the target up to date.
    pub recipe: Vec<RecipeLine>,
}

impl Rule {
    /// Create a rule with an empty recipe.
    #[must_use]
    pub fn new(target: impl Into<String>, sources: Vec<String>) -> Self {
        Self {
            target: target.into(),
            sources,
            recipe: Vec::new(),
        }
    }

    /// The prerequisite substituted for `$<`.
    #[must_use]
    pub fn primary_source(&self) -> Option<&str> {
        self.sources.first().map(String::as_str)
    }

    /// Whether the target name denotes a pattern or other dot pseudo-target.
    #[must_use]
    pub fn is_pattern(&self) -> bool {
        self.target.starts_with(PATTERN_MARKER)
    }
}

/// All rules of a rule file keyed by target name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RuleGraph {
    rules: HashMap<String, Rule>,
    default_entry: Option<String>,
}

impl RuleGraph {
    /// Store `rule`, replacing any previous rule for the same target.
    ///
    /// The first non-pattern target ever inserted becomes the default entry;
    /// later insertions never move it.
    pub fn insert(&mut self, rule: Rule) {
        if self.default_entry.is_none() && !rule.is_pattern() {
            self.default_entry = Some(rule.target.clone());
        }
        self.rules.insert(rule.target.clone(), rule);
    }

    /// Store a rule synthesised from a pattern rule.
    ///
    /// Unlike [`RuleGraph::insert`] this never sets the default entry.
    pub(crate) fn insert_inferred(&mut self, rule: Rule) {
        self.rules.insert(rule.target.clone(), rule);
    }

    /// Look up the rule for `target`.
    #[must_use]
    pub fn get(&self, target: &str) -> Option<&Rule> {
        self.rules.get(target)
    }

    /// Mutable access used while recipe lines are appended.
    pub fn get_mut(&mut self, target: &str) -> Option<&mut Rule> {
        self.rules.get_mut(target)
    }

    /// Whether a rule exists for `target`.
    #[must_use]
    pub fn contains(&self, target: &str) -> bool {
        self.rules.contains_key(target)
    }

    /// Target used when the generated script is run without arguments.
    #[must_use]
    pub fn default_entry(&self) -> Option<&str> {
        self.default_entry.as_deref()
    }

    /// Number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the graph holds no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rules ordered by target name.
    ///
    /// Generation iterates this snapshot so the emitted script is identical
    /// across runs.
    #[must_use]
    pub fn sorted(&self) -> Vec<&Rule> {
        let mut rules: Vec<_> = self.rules.values().collect();
        rules.sort_by(|a, b| a.target.cmp(&b.target));
        rules
    }

    /// Whether `target` is `.PHONY` or listed as one of its prerequisites.
    #[must_use]
    pub fn is_phony(&self, target: &str) -> bool {
        target == PHONY_TARGET
            || self
                .rules
                .get(PHONY_TARGET)
                .is_some_and(|phony| phony.sources.iter().any(|s| s == target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("cc -c foo.c", "cc -c foo.c", false)]
    #[case("-del foo.obj", "del foo.obj", true)]
    #[case("@echo done", "@echo done", false)]
    #[case("-", "", true)]
    fn recipe_line_records_ignore_flag(
        #[case] body: &str,
        #[case] text: &str,
        #[case] ignore: bool,
    ) {
        let line = RecipeLine::parse(body);
        assert_eq!(line.text, text);
        assert_eq!(line.ignore_errors, ignore);
    }

    #[test]
    fn later_definition_replaces_earlier() {
        let mut graph = RuleGraph::default();
        graph.insert(Rule::new("a", vec!["x".into()]));
        graph.insert(Rule::new("a", vec!["y".into()]));
        assert_eq!(graph.len(), 1);
        assert_eq!(graph.get("a").map(|r| r.sources.clone()), Some(vec!["y".to_owned()]));
    }

    #[test]
    fn default_entry_skips_pattern_targets_and_is_fixed() {
        let mut graph = RuleGraph::default();
        graph.insert(Rule::new(".c.obj", Vec::new()));
        assert_eq!(graph.default_entry(), None);
        graph.insert(Rule::new("all", Vec::new()));
        graph.insert(Rule::new("clean", Vec::new()));
        assert_eq!(graph.default_entry(), Some("all"));
    }

    #[test]
    fn sorted_orders_by_target_name() {
        let mut graph = RuleGraph::default();
        for name in ["b", "a", ".c.obj", "c"] {
            graph.insert(Rule::new(name, Vec::new()));
        }
        let names: Vec<_> = graph.sorted().iter().map(|r| r.target.as_str()).collect();
        assert_eq!(names, [".c.obj", "a", "b", "c"]);
    }

    #[test]
    fn phony_membership_reads_phony_prerequisites() {
        let mut graph = RuleGraph::default();
        graph.insert(Rule::new(PHONY_TARGET, vec!["clean".into()]));
        assert!(graph.is_phony("clean"));
        assert!(graph.is_phony(PHONY_TARGET));
        assert!(!graph.is_phony("all"));
    }
}
