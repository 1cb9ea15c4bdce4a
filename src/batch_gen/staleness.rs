//! Staleness test subroutine.
//!
//! Batch files have no timestamp arithmetic. The `:stamp` helper captures a
//! file's modification date and time from `where /T` as `date_time` and
//! zero-pads a single-digit hour, so `9:05:03` becomes `09:05:03`. Once every
//! stamp has the same width, `if "%a%" gtr "%b%"` string comparison orders
//! stamps chronologically.
//!
//! `:test TARGET SOURCE...` exits with 0 when the target exists and no
//! source is newer than it, and with 1 otherwise. Sources are checked left
//! to right and the first newer one ends the scan.

use std::fmt::{self, Write};

/// Label of the staleness test subroutine.
pub const TEST_LABEL: &str = "test";

const SUBROUTINE: [&str; 18] = [
    ":test",
    "  @if not exist \"%~1\" @exit /b 1",
    "  @if \"%~2\" == \"\" @exit /b 0",
    "  @setlocal",
    "  @call :stamp \"%~1\"",
    "  @set \"TARGET=%STAMP%\"",
    ":test_next",
    "  @call :stamp \"%~2\"",
    "  @if \"%STAMP%\" gtr \"%TARGET%\" (@endlocal & @exit /b 1)",
    "  @shift /2",
    "  @if not \"%~2\" == \"\" @goto test_next",
    "  @endlocal & @exit /b 0",
    "",
    ":stamp",
    "  @set \"STAMP=\"",
    "  @for /F \"tokens=2,3\" %%I in ('where /T \"%~dp1.:%~nx1\" 2^>nul') do @set \"STAMP=%%I_%%J\"",
    "  @echo \"%STAMP%\" | findstr /R \"_[0-9]:\" > nul && @set \"STAMP=%STAMP:_=_0%\"",
    "  @exit /b 0",
];

/// Append the `:test` and `:stamp` subroutines to `out`.
pub(crate) fn write_subroutine(out: &mut String) -> fmt::Result {
    for line in SUBROUTINE {
        writeln!(out, "{line}")?;
    }
    Ok(())
}

/// Quote `name` as a single batch argument.
pub(crate) fn quote(name: &str) -> String {
    format!("\"{name}\"")
}
