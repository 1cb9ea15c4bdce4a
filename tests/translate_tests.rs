//! End-to-end translation of rule files into batch scripts.
//!
//! These tests drive the parser and generator together through the public
//! library API and check the behaviour a user of the generated script relies
//! on.

use makefile2batch::batch_gen::{GeneratorOptions, generate};
use makefile2batch::graph::GenError;
use makefile2batch::macros::MacroTable;
use makefile2batch::parser::{self, ParseError};
use rstest::rstest;
use std::collections::HashSet;

fn translate_with(text: &str, macros: MacroTable) -> String {
    let graph = parser::parse("Makefile", text, macros).expect("parse rule file");
    generate(&graph, &GeneratorOptions::default()).expect("generate script")
}

fn translate(text: &str) -> String {
    translate_with(text, MacroTable::default())
}

/// Lines of the block labelled `target`, label included.
fn block<'a>(script: &'a str, target: &str) -> Vec<&'a str> {
    let label = format!(":\"{target}\"");
    script
        .lines()
        .skip_while(|line| *line != label)
        .take_while(|line| !line.is_empty())
        .collect()
}

#[test]
fn pattern_rule_substitutes_original_prerequisite() {
    let script = translate("all: prog.obj\n\tlink prog.obj\n.c.obj:\n\tcompile $<\nprog.c:\n");
    let prog = block(&script, "prog.obj");
    assert!(prog.contains(&"  compile prog.c || goto errpt"), "{prog:#?}");
    assert!(!script.contains("compile prog.obj"));
    let all = block(&script, "all");
    assert_eq!(all.get(1), Some(&"  @call :\"prog.obj\" || @exit /b"));
}

#[test]
fn two_targets_are_a_syntax_error() {
    let err = parser::parse("Makefile", "a b: c\n\techo\n", MacroTable::default())
        .expect_err("two targets");
    assert!(matches!(err, ParseError::TargetCount { count: 2, .. }));
}

#[test]
fn failure_tolerant_line_is_not_guarded() {
    let script = translate("clean:\n\tdel a.obj\n\t-del b.obj\n\tdel c.obj\n");
    let clean = block(&script, "clean");
    let recipe: Vec<_> = clean.iter().filter(|line| line.contains("del ")).collect();
    assert_eq!(
        recipe,
        [
            &"  del a.obj || goto errpt",
            &"  del b.obj",
            &"  del c.obj || goto errpt"
        ]
    );
}

#[test]
fn translation_is_deterministic() {
    let text = "all: c b a\na:\n\techo a\nb: a\n\techo b\nc: b\n\techo c\n";
    assert_eq!(translate(text), translate(text));
}

#[rstest]
#[case("CC=cl\nall:\n\t$(CC) x.c\n")]
#[case("all:\n\t$(CC) x.c\nCC=cl\n")]
#[case("CC=cl\nCC+=/W3\nall:\n\t$(CC) x.c\n")]
fn command_line_override_wins(#[case] text: &str) {
    let macros = MacroTable::with_overrides([("CC".to_owned(), "clang-cl".to_owned())]);
    let script = translate_with(text, macros);
    assert!(script.contains("  clang-cl x.c || goto errpt"), "{script}");
}

#[test]
fn unresolved_macro_defers_to_environment() {
    let script = translate("all:\n\techo $(USERPROFILE)\n");
    assert!(script.contains("  echo %USERPROFILE% || goto errpt"));
}

#[test]
fn continuation_lines_join_without_marker() {
    let script = translate("all: a.obj \\\n\tb.obj\n\tlink a.obj \\\n\t  b.obj\n");
    let all = block(&script, "all");
    assert!(all.contains(&"  @call :test \"all\" \"a.obj\" \"b.obj\" && (@echo '%~f0': 'all' is up to date.& @exit /b 0)"));
    assert!(all.contains(&"  link a.obj b.obj || goto errpt"), "{all:#?}");
    assert!(!script.contains('\\'));
}

#[test]
fn escaped_dollars_reach_the_script_literally() {
    let script = translate("all:\n\techo $$@ costs $$5\n");
    assert!(script.contains("  echo $@ costs $5 || goto errpt"));
}

#[test]
fn builtin_macros_refer_to_the_script() {
    let script = translate("sub:\n\t$(MAKE) other\n\tcd $(MAKEDIR)\n");
    assert!(script.contains("  CMD.EXE /C %~f0 other || goto errpt"));
    assert!(script.contains("  cd %~dp0. || goto errpt"));
}

#[test]
fn circular_dependency_fails_generation() {
    let graph = parser::parse("Makefile", "a: b\nb: c\nc: a\n", MacroTable::default())
        .expect("parse");
    let err = generate(&graph, &GeneratorOptions::default()).expect_err("cycle");
    assert_eq!(err.to_string(), "circular dependency detected: a -> b -> c -> a");
    assert!(matches!(err, GenError::CircularDependency { .. }));
}

#[test]
fn rule_file_without_targets_still_runs() {
    let script = translate("# only macros\nCC=cl\n");
    assert!(script.contains(":\"\"\n  @exit /b 0\n"));
    assert!(!script.contains(":test"));
}

#[test]
fn every_called_label_is_emitted() {
    let text = concat!(
        "all: .env prog.obj\n\techo done\n",
        ".env:\n\techo X=1> $@\n",
        ".c.obj:\n\tcl /c $<\n",
        "prog.c:\n",
        ".PHONY: all\n",
    );
    let script = translate(text);
    let labels: HashSet<&str> = script.lines().filter(|line| line.starts_with(':')).collect();
    let called: Vec<&str> = script
        .lines()
        .filter_map(|line| line.trim_start().strip_prefix("@call :\""))
        .filter_map(|rest| rest.split('"').next())
        .filter(|name| !name.starts_with('%'))
        .collect();
    assert!(called.contains(&".env"), "{script}");
    for name in called {
        let label = format!(":\"{name}\"");
        assert!(labels.contains(label.as_str()), "no block for {name}:\n{script}");
    }
}
