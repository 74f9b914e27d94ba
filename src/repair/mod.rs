//! Repair between local search rounds.
//!
//! [`Repairer`] is the seam for completing adaptive-memory partial
//! solutions and for same-family substitutions. An exact model can be
//! plugged in there; [`GreedyRepair`] is the built-in heuristic.

mod greedy;
mod types;

pub use greedy::GreedyRepair;
pub use types::{RepairConfig, RepairContext, Repairer};
