//! The build script renders the manual page where packaging expects it.

use anyhow::{Context, Result, ensure};
use std::fs;
use std::path::Path;

#[test]
fn manual_page_is_named_after_the_binary() -> Result<()> {
    let page = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("target/generated-man")
        .join(format!("{}.1", env!("CARGO_PKG_NAME")));
    let text = fs::read_to_string(&page)
        .with_context(|| format!("reading {}", page.display()))?;
    ensure!(text.contains(".TH makefile2batch"), "unexpected title:\n{text}");
    ensure!(text.contains("local"), "options missing:\n{text}");
    Ok(())
}
