//! Relocate: move one customer to another slot.
//!
//! Removing `B` from `A-B-C` and inserting it into `F-G`:
//!
//! ```text
//! delta = c(A,C) + c(F,B) + c(B,G) - c(A,B) - c(B,C) - c(F,G)
//! ```

use super::types::{Move, MoveCandidate, SearchView};
use crate::model::ProblemInstance;
use crate::solution::Solution;

/// Best relocate candidate over every origin and target slot.
pub fn find_relocate(view: &SearchView<'_>) -> Option<MoveCandidate> {
    let inst = view.instance;
    let routes = &view.solution.routes;
    let mut best = None;

    for (r1, origin) in routes.iter().enumerate() {
        let n1 = &origin.nodes;
        for p1 in 1..n1.len() - 1 {
            let (a, b, c) = (n1[p1 - 1], n1[p1], n1[p1 + 1]);
            let demand = inst.demand(b);
            let removal = inst.cost(a, c) - inst.cost(a, b) - inst.cost(b, c);

            for (r2, target) in routes.iter().enumerate() {
                if r1 != r2 && !target.fits(demand) {
                    continue;
                }
                let n2 = &target.nodes;
                for t in 0..n2.len() - 1 {
                    if r1 == r2 && (t == p1 || t + 1 == p1) {
                        continue;
                    }
                    let (f, g) = (n2[t], n2[t + 1]);
                    let delta = removal + inst.cost(f, b) + inst.cost(b, g) - inst.cost(f, g);
                    let mv = Move::Relocate {
                        from_route: r1,
                        from_pos: p1,
                        to_route: r2,
                        to_pos: t,
                    };
                    view.offer(
                        &mut best,
                        mv,
                        delta,
                        &[(a, c), (f, b), (b, g)],
                        &[(a, b), (b, c), (f, g)],
                    );
                }
            }
        }
    }
    best
}

/// Applies a relocate and returns the arcs it removed.
pub(crate) fn apply_relocate(
    instance: &ProblemInstance,
    solution: &mut Solution,
    from_route: usize,
    from_pos: usize,
    to_route: usize,
    to_pos: usize,
) -> Vec<(usize, usize)> {
    let origin = &solution.routes[from_route].nodes;
    let target = &solution.routes[to_route].nodes;
    let removed = vec![
        (origin[from_pos - 1], origin[from_pos]),
        (origin[from_pos], origin[from_pos + 1]),
        (target[to_pos], target[to_pos + 1]),
    ];

    let same = from_route == to_route;
    let route_cost = |sol: &Solution| {
        if same {
            sol.routes[from_route].cost
        } else {
            sol.routes[from_route].cost + sol.routes[to_route].cost
        }
    };

    let before = route_cost(solution);
    let node = solution.routes[from_route].remove(instance, from_pos);
    let slot = if same && to_pos > from_pos {
        to_pos - 1
    } else {
        to_pos
    };
    solution.routes[to_route].insert(instance, slot, node);
    let after = route_cost(solution);
    solution.cost += after - before;
    removed
}
