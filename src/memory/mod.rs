//! Adaptive memory of elite routes.
//!
//! Routes of good feasible solutions are kept in a bounded pool and cut
//! into chains. New starting points are assembled from the chains that
//! recur most often and have been reused least.
//!
//! # References
//!
//! Rochat & Taillard (1995), "Probabilistic diversification and
//! intensification in local search for vehicle routing"

mod chain;
mod config;
mod pool;

pub use chain::{Chain, ChainId};
pub use config::MemoryConfig;
pub use pool::{AdaptiveMemory, Member};
