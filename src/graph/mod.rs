//! Generation-time queries over a frozen [`RuleGraph`](crate::rules::RuleGraph).
//!
//! Parsing never validates the graph. Before a script is generated the
//! graph is checked for circular dependencies, and rules without a recipe
//! are resolved against suffix pattern rules on demand.

mod cycle;
mod error;
pub mod pattern;

pub use error::GenError;
