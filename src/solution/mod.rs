//! Solution representation.
//!
//! Routes are stored in a flat arena inside [`Solution`]; nodes are plain
//! indices. A [`NodeLocator`] answers "where is node `n`" without routes
//! and nodes pointing at each other.

mod feasibility;
mod locator;
mod route;
mod stats;
mod types;

pub use feasibility::FeasibilityReport;
pub use locator::NodeLocator;
pub use route::Route;
pub(crate) use route::LOAD_TOLERANCE;
pub use stats::NodeStats;
pub use types::{Provenance, Solution};
