//! Move descriptors and the shared candidate filter.

use crate::guidance::{ArcPenalties, PromiseTable};
use crate::model::ProblemInstance;
use crate::solution::{NodeLocator, Solution};

/// Deltas whose magnitude is at or below this are treated as zero.
pub(crate) const DELTA_EPS: f64 = 1e-9;

/// The four neighborhoods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MoveKind {
    Relocate,
    Swap,
    TwoOpt,
    Replace,
}

impl MoveKind {
    pub const ALL: [MoveKind; 4] = [
        MoveKind::Replace,
        MoveKind::Relocate,
        MoveKind::Swap,
        MoveKind::TwoOpt,
    ];
}

/// A concrete move on the current solution.
///
/// Positions index `Route::nodes`, so customers sit at `1..len - 1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Move {
    /// Move the customer at `(from_route, from_pos)` to sit right after
    /// `to_pos` of `to_route`, positions taken before the move.
    Relocate {
        from_route: usize,
        from_pos: usize,
        to_route: usize,
        to_pos: usize,
    },
    /// Exchange two customers. `(route1, pos1)` precedes `(route2, pos2)`.
    Swap {
        route1: usize,
        pos1: usize,
        route2: usize,
        pos2: usize,
    },
    /// Within one route: reverse `nodes[pos1 + 1..=pos2]`. Across routes:
    /// exchange the tails after `pos1` of `route1` and after `pos2` of
    /// `route2`.
    TwoOpt {
        route1: usize,
        pos1: usize,
        route2: usize,
        pos2: usize,
    },
    /// Put the unrouted `node` of the same family in place of the customer
    /// at `(route, pos)`.
    Replace {
        route: usize,
        pos: usize,
        node: usize,
    },
}

impl Move {
    pub fn kind(&self) -> MoveKind {
        match self {
            Move::Relocate { .. } => MoveKind::Relocate,
            Move::Swap { .. } => MoveKind::Swap,
            Move::TwoOpt { .. } => MoveKind::TwoOpt,
            Move::Replace { .. } => MoveKind::Replace,
        }
    }
}

/// A move with its true and penalized cost change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveCandidate {
    pub mv: Move,
    /// Change in true solution cost.
    pub delta: f64,
    /// Change in penalized cost; equals `delta` under plain scoring.
    pub penalized_delta: f64,
}

impl MoveCandidate {
    pub fn is_improving(&self) -> bool {
        self.delta < -DELTA_EPS
    }
}

/// How candidates are ranked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scoring {
    /// Lowest true delta wins.
    Plain,
    /// Truly improving candidates first, then lowest penalized delta.
    Guided,
}

impl Scoring {
    /// Whether `candidate` should replace `incumbent`.
    pub fn prefers(self, candidate: &MoveCandidate, incumbent: &MoveCandidate) -> bool {
        match self {
            Scoring::Plain => candidate.delta < incumbent.delta,
            Scoring::Guided => match (candidate.is_improving(), incumbent.is_improving()) {
                (true, false) => true,
                (false, true) => false,
                (true, true) => candidate.delta < incumbent.delta,
                (false, false) => candidate.penalized_delta < incumbent.penalized_delta,
            },
        }
    }
}

/// Read-only state a finder scans.
#[derive(Clone, Copy)]
pub struct SearchView<'a> {
    pub instance: &'a ProblemInstance,
    pub solution: &'a Solution,
    pub locator: &'a NodeLocator,
    pub promises: &'a PromiseTable,
    pub penalties: &'a ArcPenalties,
    pub scoring: Scoring,
}

impl<'a> SearchView<'a> {
    /// Offers a candidate adding `added` and removing `removed`.
    #[inline]
    pub(crate) fn offer(
        &self,
        best: &mut Option<MoveCandidate>,
        mv: Move,
        delta: f64,
        added: &[(usize, usize)],
        removed: &[(usize, usize)],
    ) {
        self.offer_with(best, mv, delta, added, || {
            self.penalties.penalized_delta(self.instance, added, removed)
        });
    }

    /// Like [`SearchView::offer`], with the penalized delta supplied lazily.
    ///
    /// Only `checked` arcs are tested against the promise table.
    pub(crate) fn offer_with<F>(
        &self,
        best: &mut Option<MoveCandidate>,
        mv: Move,
        delta: f64,
        checked: &[(usize, usize)],
        penalized: F,
    ) where
        F: FnOnce() -> f64,
    {
        let penalized_delta = match self.scoring {
            Scoring::Plain => {
                if delta.abs() <= DELTA_EPS {
                    return;
                }
                delta
            }
            Scoring::Guided => {
                let p = penalized();
                if delta.abs() <= DELTA_EPS && p >= -DELTA_EPS {
                    return;
                }
                p
            }
        };

        if !self.promises.allows_all(checked, self.solution.cost + delta) {
            return;
        }

        let candidate = MoveCandidate {
            mv,
            delta,
            penalized_delta,
        };
        match best {
            Some(current) if !self.scoring.prefers(&candidate, current) => {}
            _ => *best = Some(candidate),
        }
    }
}
