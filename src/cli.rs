//! Command line interface definition using clap.
//!
//! This module only depends on `clap` and the standard library because the
//! build script includes it to render the manual page.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Split a `NAME=VALUE` macro override at its first `=`.
///
/// The name must be non-empty; the value may be empty.
///
/// # Errors
///
/// Returns a message when the argument has no `=` or an empty name.
pub fn parse_macro_override(s: &str) -> Result<(String, String), String> {
    let (raw_name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("`{s}` is not a NAME=VALUE macro definition"))?;
    let name = raw_name.trim();
    if name.is_empty() {
        return Err(format!("`{s}` has an empty macro name"));
    }
    Ok((name.to_owned(), value.to_owned()))
}

/// Line endings selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum NewlineArg {
    /// Carriage return and line feed.
    Crlf,
    /// Line feed only.
    Lf,
}

/// Translate a Makefile into a self-contained Windows batch script.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Rule file to translate.
    #[arg(short, long, value_name = "FILE", default_value = "Makefile")]
    pub file: PathBuf,

    /// Write the script to this file instead of standard output.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Run every recipe line inside its own `setlocal`/`endlocal` pair.
    #[arg(long)]
    pub local_scope: bool,

    /// Force the line ending of the generated script.
    #[arg(long, value_enum, value_name = "STYLE")]
    pub newline: Option<NewlineArg>,

    /// Enable verbose logging output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Macro overrides that win over definitions in the rule file.
    #[arg(value_name = "NAME=VALUE", value_parser = parse_macro_override)]
    pub macros: Vec<(String, String)>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("CC=cl", "CC", "cl")]
    #[case("CFLAGS=/O2 /W3", "CFLAGS", "/O2 /W3")]
    #[case("EMPTY=", "EMPTY", "")]
    #[case("URL=a=b", "URL", "a=b")]
    fn overrides_split_at_first_equals(
        #[case] arg: &str,
        #[case] name: &str,
        #[case] value: &str,
    ) {
        assert_eq!(
            parse_macro_override(arg),
            Ok((name.to_owned(), value.to_owned()))
        );
    }

    #[rstest]
    #[case("CC")]
    #[case("=cl")]
    fn malformed_overrides_are_rejected(#[case] arg: &str) {
        assert!(parse_macro_override(arg).is_err());
    }

    #[test]
    fn defaults() {
        let cli = Cli::parse_from(["makefile2batch"]);
        assert_eq!(cli.file, PathBuf::from("Makefile"));
        assert!(cli.output.is_none());
        assert!(!cli.local_scope);
        assert!(cli.newline.is_none());
        assert!(cli.macros.is_empty());
    }

    #[test]
    fn full_command_line() {
        let cli = Cli::parse_from([
            "makefile2batch",
            "-f",
            "build.mk",
            "-o",
            "make.cmd",
            "--local-scope",
            "--newline",
            "lf",
            "-v",
            "CC=clang",
            "MODE=release",
        ]);
        assert_eq!(cli.file, PathBuf::from("build.mk"));
        assert_eq!(cli.output, Some(PathBuf::from("make.cmd")));
        assert!(cli.local_scope);
        assert_eq!(cli.newline, Some(NewlineArg::Lf));
        assert!(cli.verbose);
        assert_eq!(
            cli.macros,
            [
                ("CC".to_owned(), "clang".to_owned()),
                ("MODE".to_owned(), "release".to_owned())
            ]
        );
    }

    #[test]
    fn positional_without_equals_is_an_error() {
        assert!(Cli::try_parse_from(["makefile2batch", "all"]).is_err());
    }
}
