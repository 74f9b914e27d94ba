//! Replace: substitute a routed customer by an unrouted family member.

use super::types::{Move, MoveCandidate, SearchView};
use crate::model::ProblemInstance;
use crate::solution::Solution;

/// Best replacement over every routed customer and unrouted sibling.
pub fn find_replace(view: &SearchView<'_>) -> Option<MoveCandidate> {
    let inst = view.instance;
    let mut best = None;

    for (r, route) in view.solution.routes.iter().enumerate() {
        let n = &route.nodes;
        for p in 1..n.len() - 1 {
            let (a, b, c) = (n[p - 1], n[p], n[p + 1]);
            let Some(family) = inst.family_of(b) else {
                continue;
            };
            let removal = inst.cost(a, b) + inst.cost(b, c);
            let demand = inst.demand(b);

            for &m in &inst.families()[family].members {
                if m == b || view.locator.is_routed(m) {
                    continue;
                }
                let dm = inst.demand(m);
                if (dm - demand).abs() > f64::EPSILON && !route.fits(dm - demand) {
                    continue;
                }
                let delta = inst.cost(a, m) + inst.cost(m, c) - removal;
                let mv = Move::Replace {
                    route: r,
                    pos: p,
                    node: m,
                };
                view.offer(&mut best, mv, delta, &[(a, m), (m, c)], &[(a, b), (b, c)]);
            }
        }
    }
    best
}

/// Applies a replacement and returns the arcs it removed.
pub(crate) fn apply_replace(
    instance: &ProblemInstance,
    solution: &mut Solution,
    route: usize,
    pos: usize,
    node: usize,
) -> Vec<(usize, usize)> {
    let rt = &mut solution.routes[route];
    let (a, b, c) = (rt.nodes[pos - 1], rt.nodes[pos], rt.nodes[pos + 1]);
    let delta = instance.cost(a, node) + instance.cost(node, c)
        - instance.cost(a, b)
        - instance.cost(b, c);
    rt.nodes[pos] = node;
    rt.cost += delta;
    rt.load += instance.demand(node) - instance.demand(b);
    solution.cost += delta;
    vec![(a, b), (b, c)]
}
