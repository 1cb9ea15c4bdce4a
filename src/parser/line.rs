//! Flat classification of logical lines.

use crate::macros::{AssignOp, split_definition};
use crate::normalize::is_indented;

/// Shape of a logical line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum LineKind<'a> {
    /// `NAME op value`
    MacroDef {
        name: &'a str,
        op: AssignOp,
        value: &'a str,
    },
    /// `targets : sources [; recipe]`
    RuleHeader {
        targets: Vec<&'a str>,
        sources: Vec<&'a str>,
        inline_recipe: Option<&'a str>,
    },
    /// Indented recipe body with the indentation removed.
    Recipe(&'a str),
    /// Nothing recognisable.
    Unknown,
}

pub(crate) fn classify(text: &str) -> LineKind<'_> {
    if is_indented(text) {
        return LineKind::Recipe(text.trim_start());
    }
    if let Some(def) = macro_definition(text) {
        return def;
    }
    rule_colon(text).map_or(LineKind::Unknown, |pos| {
        let (head, colon_on) = text.split_at(pos);
        let after_colon = colon_on.get(1..).unwrap_or_default();
        let tail = after_colon.strip_prefix(':').unwrap_or(after_colon);
        let (sources, inline_recipe) = match tail.split_once(';') {
            Some((listed, recipe)) => (listed, Some(recipe.trim_start())),
            None => (tail, None),
        };
        LineKind::RuleHeader {
            targets: head.split_whitespace().collect(),
            sources: sources.split_whitespace().collect(),
            inline_recipe,
        }
    })
}

fn macro_definition(text: &str) -> Option<LineKind<'_>> {
    split_definition(text).map(|(name, op, value)| LineKind::MacroDef { name, op, value })
}

/// Byte offset of the colon separating targets from prerequisites.
///
/// A colon that forms a drive prefix such as `C:\` is skipped.
fn rule_colon(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    text.char_indices()
        .filter(|(_, ch)| *ch == ':')
        .map(|(pos, _)| pos)
        .find(|&pos| !is_drive_colon(bytes, pos))
}

fn is_drive_colon(bytes: &[u8], pos: usize) -> bool {
    let Some(letter_pos) = pos.checked_sub(1) else {
        return false;
    };
    let letter = bytes.get(letter_pos).is_some_and(u8::is_ascii_alphabetic);
    let starts_word = letter_pos
        .checked_sub(1)
        .and_then(|p| bytes.get(p))
        .is_none_or(u8::is_ascii_whitespace);
    let separator = matches!(bytes.get(pos + 1), Some(b'\\' | b'/'));
    letter && starts_word && separator
}
