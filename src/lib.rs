//! makefile2batch core library.
//!
//! Translates a Makefile into a self-contained Windows batch script. The
//! rule file is parsed into a [`rules::RuleGraph`] by [`parser::parse`],
//! and [`batch_gen::generate`] lowers that graph into the script text.

pub mod batch_gen;
pub mod cli;
pub mod graph;
pub mod line_ending;
pub mod macros;
pub mod normalize;
pub mod parser;
pub mod rules;
pub mod runner;
