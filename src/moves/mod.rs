//! Move neighborhoods: relocate, swap, 2-opt and replace.
//!
//! Every finder scans its full neighborhood over the current solution,
//! skips candidates a promise forbids, and returns the single best
//! [`MoveCandidate`] under the active [`Scoring`]. [`apply`] performs the
//! move with incremental cost bookkeeping and reports the arcs it removed,
//! which is what the promise table records.

mod relocate;
mod replace;
mod swap;
mod two_opt;
mod types;

pub use relocate::find_relocate;
pub use replace::find_replace;
pub use swap::find_swap;
pub use two_opt::find_two_opt;
pub use types::{Move, MoveCandidate, MoveKind, Scoring, SearchView};

pub(crate) use types::DELTA_EPS;

use crate::model::ProblemInstance;
use crate::solution::Solution;
use std::collections::HashSet;

/// Best candidate of one neighborhood.
pub fn find_best(view: &SearchView<'_>, kind: MoveKind) -> Option<MoveCandidate> {
    match kind {
        MoveKind::Relocate => find_relocate(view),
        MoveKind::Swap => find_swap(view),
        MoveKind::TwoOpt => find_two_opt(view),
        MoveKind::Replace => find_replace(view),
    }
}

/// Applies `mv` to `solution` and returns the arcs it removed.
pub fn apply(instance: &ProblemInstance, solution: &mut Solution, mv: &Move) -> Vec<(usize, usize)> {
    match *mv {
        Move::Relocate {
            from_route,
            from_pos,
            to_route,
            to_pos,
        } => relocate::apply_relocate(instance, solution, from_route, from_pos, to_route, to_pos),
        Move::Swap {
            route1,
            pos1,
            route2,
            pos2,
        } => swap::apply_swap(instance, solution, route1, pos1, route2, pos2),
        Move::TwoOpt {
            route1,
            pos1,
            route2,
            pos2,
        } => two_opt::apply_two_opt(instance, solution, route1, pos1, route2, pos2),
        Move::Replace { route, pos, node } => {
            replace::apply_replace(instance, solution, route, pos, node)
        }
    }
}

impl MoveCandidate {
    /// Arcs the move would remove from `solution` followed by the arcs it
    /// would add, found by applying it to a copy.
    pub fn touched_arcs(&self, instance: &ProblemInstance, solution: &Solution) -> Vec<(usize, usize)> {
        let mut trial = solution.clone();
        let mut touched = apply(instance, &mut trial, &self.mv);
        let before: HashSet<(usize, usize)> = solution.arcs().collect();
        touched.extend(trial.arcs().filter(|arc| !before.contains(arc)));
        touched
    }
}
