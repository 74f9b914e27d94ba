//! Promise-guided local search.
//!
//! Each iteration draws one neighborhood and one scoring mode, finds the
//! best non-promised candidate and applies it. Plain iterations accept any
//! candidate, which lets the search walk across plateaus while promises
//! keep it from undoing recent moves. Guided iterations accept a candidate
//! only if it improves the true or the penalized cost; otherwise the
//! costliest arcs of the current solution are penalized.
//!
//! # References
//!
//! Voudouris & Tsang (1999), "Guided local search and its application to
//! the traveling salesman problem"

mod config;
mod runner;

pub use config::{LocalSearchConfig, MoveWeights};
pub use runner::{LocalSearchResult, LocalSearchRunner};
