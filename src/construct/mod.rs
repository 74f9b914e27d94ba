//! Initial solutions: customer selection followed by route construction.
//!
//! # References
//!
//! Martello & Toth (1990), "Knapsack Problems", Chapter 8 (best fit)

mod insertion;
mod selection;

pub use insertion::{best_fit, best_insertion, construct};
pub use selection::{CustomerSelector, DefaultSelector};
