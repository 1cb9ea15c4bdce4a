//! Test utilities for rule-file translation.
//!
//! [`RuleFileFixture`] writes a rule file into a fresh temporary directory so
//! tests can point the translator at it and inspect what lands beside it.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Default rule-file name looked up by the translator.
pub const DEFAULT_RULE_FILE: &str = "Makefile";

/// A temporary directory holding one rule file.
#[derive(Debug)]
pub struct RuleFileFixture {
    dir: TempDir,
    path: PathBuf,
}

impl RuleFileFixture {
    /// Write `contents` to `Makefile` in a new temporary directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be created.
    pub fn new(contents: &str) -> Result<Self> {
        Self::named(DEFAULT_RULE_FILE, contents)
    }

    /// Write `contents` to `name` in a new temporary directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be created.
    pub fn named(name: &str, contents: &str) -> Result<Self> {
        let dir = TempDir::new().context("create temp dir for rule file")?;
        let path = dir.path().join(name);
        fs::write(&path, contents).with_context(|| format!("write {}", path.display()))?;
        Ok(Self { dir, path })
    }

    /// Copy a fixture from `tests/data` into a new temporary directory as
    /// `Makefile`.
    ///
    /// # Errors
    ///
    /// Returns an error if the fixture cannot be read or written.
    pub fn from_data(fixture: &Path) -> Result<Self> {
        let contents = fs::read_to_string(fixture)
            .with_context(|| format!("read fixture {}", fixture.display()))?;
        Self::new(&contents)
    }

    /// Directory containing the rule file.
    #[must_use]
    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    /// Path of the rule file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of `name` inside the fixture directory.
    #[must_use]
    pub fn join(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Read a file the translator wrote into the fixture directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file does not exist or is not UTF-8.
    pub fn read(&self, name: &str) -> Result<String> {
        let path = self.join(name);
        fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn writes_default_rule_file() -> Result<()> {
        let fixture = RuleFileFixture::new("all:\n")?;
        assert_eq!(fixture.path(), fixture.join(DEFAULT_RULE_FILE));
        assert_eq!(fixture.read(DEFAULT_RULE_FILE)?, "all:\n");
        Ok(())
    }

    #[rstest]
    fn named_rule_file_lives_in_fixture_dir() -> Result<()> {
        let fixture = RuleFileFixture::named("build.mk", "x:\n")?;
        assert_eq!(fixture.path().parent(), Some(fixture.dir()));
        assert!(fixture.read("missing").is_err());
        Ok(())
    }
}
