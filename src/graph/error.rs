//! Errors raised while preparing a rule graph for generation.

use miette::Diagnostic;
use thiserror::Error;

/// Errors that abort script generation.
#[derive(Debug, Error, Diagnostic)]
pub enum GenError {
    /// Rule targets depend on each other in a loop.
    #[error("circular dependency detected: {}", .cycle.join(" -> "))]
    #[diagnostic(
        code(makefile2batch::generate::circular_dependency),
        help("the generated script would call these blocks recursively forever")
    )]
    CircularDependency {
        /// Targets on the cycle, starting and ending with the same name.
        cycle: Vec<String>,
    },

    /// Writing the script text failed.
    #[error("failed to format the generated script")]
    #[diagnostic(code(makefile2batch::generate::format))]
    Format(#[from] std::fmt::Error),
}
