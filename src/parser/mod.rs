//! Rule-file parsing.
//!
//! A rule file is read in a single pass. Each physical line goes through the
//! [`LineNormalizer`](crate::normalize::LineNormalizer); each resulting
//! logical line is classified as a macro definition, a rule header or a
//! recipe line, and anything else is a syntax error.
//!
//! ```
//! use makefile2batch::{macros::MacroTable, parser};
//!
//! let text = "CC=cl\nall: prog.obj\n\t$(CC) /Fe$@ $^\n";
//! let graph = parser::parse("Makefile", text, MacroTable::default()).expect("parse");
//! assert_eq!(graph.default_entry(), Some("all"));
//! let rule = graph.get("all").expect("rule");
//! assert_eq!(rule.recipe[0].text, "cl /Fe$@ $^");
//! ```

mod error;
mod line;

pub use error::ParseError;

use crate::macros::MacroTable;
use crate::normalize::{LineNormalizer, LogicalLine, unescape_dollars};
use crate::rules::{RecipeLine, Rule, RuleGraph};
use error::line_span;
use line::{LineKind, classify};
use miette::NamedSource;
use tracing::debug;

/// Parse the rule file `text` named `name` using `macros` as the seeded
/// macro table.
///
/// # Errors
///
/// Returns [`ParseError`] for an unrecognised line, a rule header without
/// exactly one target, or a recipe line before any rule header.
pub fn parse(name: &str, text: &str, macros: MacroTable) -> Result<RuleGraph, ParseError> {
    let mut parser = Parser {
        name,
        text,
        macros,
        graph: RuleGraph::default(),
        current: None,
    };
    let mut normalizer = LineNormalizer::default();
    for (idx, raw) in text.lines().enumerate() {
        if let Some(line) = normalizer.push(idx + 1, raw, &parser.macros) {
            parser.apply(&line)?;
        }
    }
    if let Some(line) = normalizer.finish(&parser.macros) {
        parser.apply(&line)?;
    }
    debug!(rules = parser.graph.len(), "parsed rule file");
    Ok(parser.graph)
}

struct Parser<'a> {
    name: &'a str,
    text: &'a str,
    macros: MacroTable,
    graph: RuleGraph,
    current: Option<String>,
}

impl Parser<'_> {
    fn apply(&mut self, line: &LogicalLine) -> Result<(), ParseError> {
        match classify(&line.text) {
            LineKind::Recipe(body) => self.push_recipe(line, body),
            LineKind::MacroDef { name, op, value } => {
                self.macros.assign(name, op, value);
                self.current = None;
                Ok(())
            }
            LineKind::RuleHeader {
                targets,
                sources,
                inline_recipe,
            } => {
                let [raw_target] = targets.as_slice() else {
                    return Err(ParseError::TargetCount {
                        count: targets.len(),
                        text: line.text.clone(),
                        line: line.number,
                        src: self.source(),
                        span: line_span(self.text, line.number),
                    });
                };
                let target = unescape_dollars(raw_target);
                let prerequisites: Vec<String> =
                    sources.iter().map(|s| unescape_dollars(s)).collect();
                debug!(line = line.number, %target, ?prerequisites, "rule header");
                self.graph.insert(Rule::new(target.clone(), prerequisites));
                self.current = Some(target);
                match inline_recipe {
                    Some(body) if !body.trim().is_empty() => self.push_recipe(line, body),
                    _ => Ok(()),
                }
            }
            LineKind::Unknown => Err(ParseError::Syntax {
                text: line.text.clone(),
                line: line.number,
                src: self.source(),
                span: line_span(self.text, line.number),
            }),
        }
    }

    fn push_recipe(&mut self, line: &LogicalLine, body: &str) -> Result<(), ParseError> {
        let rule = self
            .current
            .as_deref()
            .and_then(|target| self.graph.get_mut(target));
        let Some(rule) = rule else {
            return Err(ParseError::NoCurrentTarget {
                text: line.text.clone(),
                line: line.number,
                src: self.source(),
                span: line_span(self.text, line.number),
            });
        };
        rule.recipe.push(RecipeLine::parse(body));
        Ok(())
    }

    fn source(&self) -> NamedSource<String> {
        NamedSource::new(self.name, self.text.to_owned())
    }
}
