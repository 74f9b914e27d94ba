//! Adaptive-memory LNS driver.
//!
//! Rounds alternate promise-guided local search with a restart step:
//! the round's best feeds the adaptive memory, and the next start is a
//! restored partial solution or a same-family substitution. Perturbed
//! and random customer selections are the fallbacks when repair fails.
//!
//! # References
//!
//! Zachariadis & Kiranoudis (2010), "A strategy for reducing the
//! computational complexity of local search-based methods for the vehicle
//! routing problem"

mod config;
mod runner;

pub use config::SolverConfig;
pub use runner::{solve_many, SolverResult, SolverRunner};
