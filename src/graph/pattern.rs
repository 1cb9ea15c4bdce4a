//! Suffix pattern-rule resolution.
//!
//! A rule that lists prerequisites but has no recipe borrows the recipe of
//! the pattern rule named by the primary prerequisite's extension followed by
//! the target's extension: `foo.obj: foo.c` uses `.c.obj`. Tokens in the
//! borrowed recipe are later substituted against the original rule, not the
//! pattern rule.
//!
//! ```
//! use makefile2batch::graph::pattern::{extension, pattern_key};
//! use makefile2batch::rules::Rule;
//!
//! assert_eq!(extension("src\\foo.c"), ".c");
//! let rule = Rule::new("foo.obj", vec!["foo.c".into()]);
//! assert_eq!(pattern_key(&rule).as_deref(), Some(".c.obj"));
//! ```
//!
//! A prerequisite that has no rule of its own gets one inferred when a
//! pattern rule's target suffix matches it and the corresponding source is
//! itself a rule target, so `all: prog.obj` with `.c.obj:` and `prog.c:`
//! yields a `prog.obj` rule built from `prog.c`.

use crate::rules::{PHONY_TARGET, RecipeLine, Rule, RuleGraph};
use tracing::debug;

/// Extension of the final path component, including the leading dot.
///
/// Both `/` and `\` separate components. Returns an empty string when the
/// final component has no dot.
#[must_use]
pub fn extension(name: &str) -> &str {
    let start = name.rfind(['/', '\\']).map_or(0, |pos| pos + 1);
    let component = name.get(start..).unwrap_or_default();
    component
        .rfind('.')
        .and_then(|pos| component.get(pos..))
        .unwrap_or_default()
}

/// `name` with its extension removed.
#[must_use]
pub fn stem(name: &str) -> &str {
    let ext = extension(name);
    name.strip_suffix(ext).unwrap_or(name)
}

/// Pattern-rule name consulted for `rule`, if it has a primary prerequisite.
#[must_use]
pub fn pattern_key(rule: &Rule) -> Option<String> {
    let source = rule.primary_source()?;
    Some(format!("{}{}", extension(source), extension(&rule.target)))
}

/// Recipe to emit for `rule`.
///
/// Returns the rule's own recipe when it has one. Otherwise, when a pattern
/// rule matches the prerequisite and target extensions, returns that rule's
/// recipe. A rule with neither yields an empty recipe and is treated as
/// satisfied once present.
#[must_use]
pub fn resolve_recipe<'g>(graph: &'g RuleGraph, rule: &'g Rule) -> &'g [RecipeLine] {
    if !rule.recipe.is_empty() {
        return &rule.recipe;
    }
    let Some(key) = pattern_key(rule) else {
        return &rule.recipe;
    };
    match graph.get(&key) {
        Some(pattern) => {
            debug!(rule = %rule.target, pattern = %key, "using pattern rule");
            &pattern.recipe
        }
        None => {
            debug!(rule = %rule.target, pattern = %key, "no pattern rule");
            &rule.recipe
        }
    }
}

/// Split a pattern-rule name into its source and target suffixes.
///
/// `.c.obj` yields `(".c", ".obj")`; a single-suffix rule such as `.c`
/// yields `(".c", "")`.
#[must_use]
pub fn suffix_pair(name: &str) -> Option<(&str, &str)> {
    let body = name.strip_prefix('.')?;
    let (source, target) = match body.split_once('.') {
        Some((from, to)) => (from, Some(to)),
        None => (body, None),
    };
    let is_suffix =
        |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !is_suffix(source) || target.is_some_and(|t| !is_suffix(t)) {
        return None;
    }
    let split = source.len() + 1;
    Some((name.get(..split)?, name.get(split..)?))
}

/// Copy of `graph` with rules inferred for rule-less prerequisites.
///
/// Prerequisites are visited in target order; pattern rules are tried in
/// name order and the first whose source file is a rule target wins.
#[must_use]
pub fn with_inferred_rules(graph: &RuleGraph) -> RuleGraph {
    let rules = graph.sorted();
    let patterns: Vec<(&str, &str)> = rules
        .iter()
        .filter(|rule| rule.target != PHONY_TARGET)
        .filter_map(|rule| suffix_pair(&rule.target))
        .collect();
    let mut inferred = graph.clone();
    if patterns.is_empty() {
        return inferred;
    }
    for name in rules.iter().copied().flat_map(|rule| rule.sources.iter()) {
        if inferred.contains(name) {
            continue;
        }
        let ext = extension(name);
        let base = stem(name);
        let source = patterns
            .iter()
            .filter(|(_, target_ext)| *target_ext == ext)
            .map(|(source_ext, _)| format!("{base}{source_ext}"))
            .find(|candidate| inferred.contains(candidate));
        if let Some(found) = source {
            debug!(rule = %name, source = %found, "inferred rule from pattern");
            inferred.insert_inferred(Rule::new(name.clone(), vec![found]));
        }
    }
    inferred
}
