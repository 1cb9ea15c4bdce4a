//! Batch script generator.
//!
//! This module lowers a [`RuleGraph`] into a Windows batch script. Every
//! rule, dot-prefixed ones included, becomes a label the script can `call`,
//! so each emitted prerequisite call has a block to land on; the preamble
//! dispatches to the label named by the first argument. Rules are emitted in
//! target-name order so the same graph always yields the same bytes.
//!
//! ```
//! use makefile2batch::batch_gen::{GeneratorOptions, generate};
//! use makefile2batch::rules::{RecipeLine, Rule, RuleGraph};
//!
//! let mut graph = RuleGraph::default();
//! let mut rule = Rule::new("clean", Vec::new());
//! rule.recipe.push(RecipeLine::parse("-del *.obj"));
//! graph.insert(rule);
//! let script = generate(&graph, &GeneratorOptions::default()).expect("script");
//! assert!(script.contains(":\"clean\"\n"));
//! assert!(script.contains("\n  del *.obj\n"));
//! ```

mod staleness;
mod tokens;

pub use staleness::TEST_LABEL;

use crate::graph::GenError;
use crate::graph::pattern::{resolve_recipe, with_inferred_rules};
use crate::rules::{Rule, RuleGraph};
use itertools::Itertools;
use staleness::{quote, write_subroutine};
use std::fmt::{self, Display, Formatter, Write};
use tokens::TokenContext;
use tracing::debug;

const HEADER: [&str; 3] = [
    "@rem ***",
    "@rem *** Code generated by `makefile2batch`; DO NOT EDIT.",
    "@rem ***",
];

const PREAMBLE: [&str; 5] = [
    "@setlocal",
    "@set \"PROMPT=$$ \"",
    "@call :\"%~1\"",
    "@endlocal",
    "@exit /b %ERRORLEVEL%",
];

/// Label of the shared error-reporting block.
pub const ERROR_LABEL: &str = "errpt";

/// Options that change the shape of the generated script.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GeneratorOptions {
    /// Bracket every recipe line with `@setlocal` / `@endlocal`.
    pub local_scope: bool,
}

/// Generate a batch script for `graph`.
///
/// Lines are separated by `\n`; converting to the target line-ending
/// convention is left to the caller.
///
/// # Errors
///
/// Returns [`GenError::CircularDependency`] when rule targets depend on each
/// other in a loop.
pub fn generate(graph: &RuleGraph, options: &GeneratorOptions) -> Result<String, GenError> {
    let resolved = with_inferred_rules(graph);
    resolved.detect_cycles()?;

    let mut out = String::new();
    for line in HEADER.iter().chain(&PREAMBLE) {
        writeln!(out, "{line}")?;
    }
    write!(
        out,
        "{}",
        DefaultBlock {
            entry: resolved.default_entry()
        }
    )?;
    writeln!(out, ":{ERROR_LABEL}")?;
    writeln!(out, "  @echo ERROR %ERRORLEVEL%")?;
    writeln!(out, "  @exit /b %ERRORLEVEL%")?;

    let mut uses_test = false;
    for rule in resolved.sorted() {
        let block = Block {
            graph: &resolved,
            rule,
            options,
        };
        uses_test |= block.uses_test();
        write!(out, "{block}")?;
    }
    debug!(blocks = resolved.len(), uses_test, "generated rule blocks");

    if uses_test {
        writeln!(out)?;
        write_subroutine(&mut out)?;
    }
    Ok(out)
}

/// Block run when the script is invoked without a target.
struct DefaultBlock<'a> {
    entry: Option<&'a str>,
}

impl Display for DefaultBlock<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, ":\"\"")?;
        match self.entry {
            Some(entry) => {
                writeln!(f, "  @call :{}", quote(entry))?;
                writeln!(f, "  @exit /b %ERRORLEVEL%")
            }
            None => writeln!(f, "  @exit /b 0"),
        }
    }
}

/// Callable block for one rule.
struct Block<'a> {
    graph: &'a RuleGraph,
    rule: &'a Rule,
    options: &'a GeneratorOptions,
}

impl Block<'_> {
    fn is_phony(&self) -> bool {
        self.graph.is_phony(&self.rule.target)
    }

    fn uses_test(&self) -> bool {
        !self.is_phony() && !self.rule.sources.is_empty()
    }

    fn write_freshness_check(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let target = quote(&self.rule.target);
        let up_to_date = format!(
            "(@echo '%~f0': '{}' is up to date.& @exit /b 0)",
            self.rule.target
        );
        if self.rule.sources.is_empty() {
            writeln!(f, "  @if exist {target} {up_to_date}")
        } else {
            let sources = self.rule.sources.iter().map(|s| quote(s)).join(" ");
            writeln!(f, "  @call :{TEST_LABEL} {target} {sources} && {up_to_date}")
        }
    }
}

impl Display for Block<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        writeln!(f, ":{}", quote(&self.rule.target))?;
        for dep in self.rule.sources.iter().filter(|dep| self.graph.contains(dep)) {
            writeln!(f, "  @call :{} || @exit /b", quote(dep))?;
        }
        if !self.is_phony() {
            self.write_freshness_check(f)?;
        }
        let tokens = TokenContext::for_rule(self.rule);
        for line in resolve_recipe(self.graph, self.rule) {
            let text = tokens.substitute(&line.text);
            if self.options.local_scope {
                writeln!(f, "  @setlocal")?;
            }
            if line.ignore_errors {
                writeln!(f, "  {text}")?;
            } else {
                writeln!(f, "  {text} || goto {ERROR_LABEL}")?;
            }
            if self.options.local_scope {
                writeln!(f, "  @endlocal")?;
            }
        }
        // Failures have already left through `errpt` or a guarded call.
        writeln!(f, "  @exit /b 0")
    }
}
