//! CLI execution logic.
//!
//! This module keeps `main` minimal by providing a single entry point that
//! reads the rule file, translates it and writes the script. The script is
//! generated completely in memory before anything is written, so a failed
//! translation never leaves partial output behind.

use crate::batch_gen::{self, GeneratorOptions};
use crate::cli::Cli;
use crate::graph::GenError;
use crate::line_ending::{self, LineEnding};
use crate::macros::MacroTable;
use crate::parser::{self, ParseError};
use anyhow::{Context, Result};
use miette::Diagnostic;
use std::borrow::Cow;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, info, warn};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Errors raised while locating input.
#[derive(Debug, Error, Diagnostic)]
pub enum RunnerError {
    /// The rule file does not exist.
    #[error("rule file `{}` not found", .path.display())]
    #[diagnostic(
        code(makefile2batch::runner::rule_file_not_found),
        help("pass the rule file with `-f FILE`; the default is `Makefile` in the current directory")
    )]
    RuleFileNotFound {
        /// Path that was tried.
        path: PathBuf,
    },
}

/// Execute the parsed [`Cli`].
///
/// # Errors
///
/// Returns an error if the rule file cannot be read or translated, or if
/// the script cannot be written.
pub fn run(cli: &Cli) -> Result<()> {
    let options = GeneratorOptions {
        local_scope: cli.local_scope,
    };
    let script = generate_script(&cli.file, &cli.macros, &options)?;
    let destination = cli.output.as_deref().filter(|path| !is_stdout_path(path));
    let ending = line_ending::resolve(cli.newline.map(LineEnding::from), destination.is_some());
    debug!(?ending, "resolved line ending");
    let converted = ending.apply(&script);
    match destination {
        Some(path) => write_script_file(path, &converted),
        None => write_stdout(&converted),
    }
}

/// Translate the rule file at `path` into a `\n`-separated batch script.
///
/// # Errors
///
/// Returns [`RunnerError::RuleFileNotFound`] when `path` does not exist,
/// [`ParseError`] for a malformed rule file and [`GenError`] when the rules
/// cannot be lowered.
pub fn generate_script(
    path: &Path,
    overrides: &[(String, String)],
    options: &GeneratorOptions,
) -> Result<String> {
    let text = read_rule_file(path)?;
    let macros = MacroTable::with_overrides(overrides.iter().cloned());
    let graph = parser::parse(&path.display().to_string(), &text, macros)?;
    let graph_json = serde_json::to_string_pretty(&graph).context("serialising rule graph")?;
    debug!("rule graph:\n{graph_json}");
    let script = batch_gen::generate(&graph, options)?;
    Ok(script)
}

/// Convert a runner error into a renderable diagnostic when it carries one.
///
/// # Errors
///
/// Returns `err` unchanged when no diagnostic is attached.
pub fn into_report(err: anyhow::Error) -> Result<miette::Report, anyhow::Error> {
    let not_parse = match err.downcast::<ParseError>() {
        Ok(diag) => return Ok(miette::Report::new(diag)),
        Err(other) => other,
    };
    let not_gen = match not_parse.downcast::<GenError>() {
        Ok(diag) => return Ok(miette::Report::new(diag)),
        Err(other) => other,
    };
    not_gen.downcast::<RunnerError>().map(miette::Report::new)
}

/// Return `true` when `path` is the CLI sentinel indicating "write to stdout".
#[must_use]
pub fn is_stdout_path(path: &Path) -> bool {
    path.as_os_str() == "-"
}

fn read_rule_file(path: &Path) -> Result<String> {
    let raw = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Err(RunnerError::RuleFileNotFound {
                path: path.to_path_buf(),
            }
            .into());
        }
        Err(err) => {
            return Err(err).with_context(|| format!("reading {}", path.display()));
        }
    };
    let body = raw.strip_prefix(UTF8_BOM).unwrap_or(&raw);
    let text = String::from_utf8_lossy(body);
    if matches!(text, Cow::Owned(_)) {
        warn!(
            path = %path.display(),
            "rule file is not valid UTF-8; invalid bytes were replaced"
        );
    }
    Ok(text.into_owned())
}

/// Write `content` to `path` through a temporary file in the same directory.
fn write_script_file(path: &Path, content: &str) -> Result<()> {
    let dir = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("creating temporary file in {}", dir.display()))?;
    tmp.write_all(content.as_bytes())
        .with_context(|| format!("writing {}", tmp.path().display()))?;
    tmp.as_file()
        .sync_all()
        .with_context(|| format!("syncing {}", tmp.path().display()))?;
    tmp.persist(path)
        .with_context(|| format!("replacing {}", path.display()))?;
    info!("Generated batch script at {}", path.display());
    Ok(())
}

fn write_stdout(content: &str) -> Result<()> {
    let mut stdout = io::stdout().lock();
    let written = stdout
        .write_all(content.as_bytes())
        .and_then(|()| stdout.flush());
    match written {
        Err(err) if err.kind() != io::ErrorKind::BrokenPipe => {
            Err(err).context("writing script to standard output")
        }
        _ => Ok(()),
    }
}
