//! Problem model: families, demands, capacity and the cost matrix.
//!
//! A [`ProblemInstance`] is validated once on construction and shared by
//! reference with every search component afterwards.

mod error;
mod instance;

#[cfg(test)]
pub(crate) mod fixtures;

pub use error::ModelError;
pub use instance::{Family, ProblemInstance};
