//! Search engine for the Family Capacitated Vehicle Routing Problem (F-CVRP).
//!
//! Customers are grouped into families, and each family must be visited
//! exactly `required` times by capacity-limited vehicles that start and end
//! at a single depot. The engine minimizes total travel cost with:
//!
//! - **Move neighborhoods**: relocate, swap, 2-opt and same-family replace,
//!   each returning its best candidate with an exact cost delta.
//! - **Promise-guided local search**: per-arc promise thresholds prune
//!   moves that would undo recent work, and guided iterations penalize the
//!   costliest arcs when the search stalls.
//! - **Adaptive memory**: routes of good solutions are mined into chains
//!   that seed partial solutions for the next round.
//! - **LNS driver**: repair and substitution between local search rounds,
//!   with perturbed and random customer selections as fallbacks.
//!
//! # Architecture
//!
//! [`model`] and [`solution`] hold the data; [`moves`] and [`guidance`]
//! are the building blocks of [`ls`]; [`memory`], [`construct`] and
//! [`repair`] feed the round loop in [`solver`]. All randomness flows from
//! one seeded generator per solver run.
//!
//! # Example
//!
//! ```
//! use u_fcvrp::model::{Family, ProblemInstance};
//! use u_fcvrp::solver::{SolverConfig, SolverRunner};
//!
//! let points = [(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (0.0, 1.0), (0.0, 2.0)];
//! let families = vec![
//!     Family::new(vec![1, 2], 2, 1.0),
//!     Family::new(vec![3, 4], 1, 2.0),
//! ];
//! let inst = ProblemInstance::from_points(&points, 0, families, 4.0, 2).unwrap();
//!
//! let result = SolverRunner::run(&inst, &SolverConfig::default().with_seed(1));
//! assert!(result.is_solved());
//! ```

pub mod construct;
pub mod guidance;
pub mod ls;
pub mod memory;
pub mod model;
pub mod moves;
pub mod repair;
pub mod solution;
pub mod solver;
