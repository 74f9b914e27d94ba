//! Search guidance: promise pruning and guided arc penalization.
//!
//! # References
//!
//! Voudouris & Tsang (1999), "Guided local search and its application to
//! the traveling salesman problem"
//!
//! Zachariadis & Kiranoudis (2010), "A strategy for reducing the
//! computational complexity of local search-based methods for the vehicle
//! routing problem"

mod penalty;
mod promise;

pub use penalty::ArcPenalties;
pub use promise::PromiseTable;
