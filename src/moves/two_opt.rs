//! 2-opt: segment reversal within a route, tail exchange across routes.

use super::types::{Move, MoveCandidate, Scoring, SearchView};
use crate::model::ProblemInstance;
use crate::solution::{Solution, LOAD_TOLERANCE};

/// Best 2-opt candidate, intra- and inter-route.
pub fn find_two_opt(view: &SearchView<'_>) -> Option<MoveCandidate> {
    let mut best = None;
    for r in 0..view.solution.routes.len() {
        scan_intra(view, r, &mut best);
    }
    for r1 in 0..view.solution.routes.len() {
        for r2 in r1 + 1..view.solution.routes.len() {
            scan_inter(view, r1, r2, &mut best);
        }
    }
    best
}

/// Reversal of `nodes[i + 1..=j]`, with running sums over the internal arcs.
///
/// Both new boundary arcs and every reversed internal arc must keep their
/// promise; the internal ones are tracked as a running minimum threshold.
fn scan_intra(view: &SearchView<'_>, r: usize, best: &mut Option<MoveCandidate>) {
    let inst = view.instance;
    let pen = view.penalties;
    let guided = view.scoring == Scoring::Guided;
    let n = &view.solution.routes[r].nodes;
    let last = n.len() - 1;
    if last < 3 {
        return;
    }

    for i in 0..last - 2 {
        let (a, b) = (n[i], n[i + 1]);
        // forward / reversed cost of the arcs strictly inside the segment
        let (mut fwd, mut rev) = (0.0, 0.0);
        let (mut pfwd, mut prev) = (0.0, 0.0);
        let mut reversed_floor = f64::INFINITY;

        for j in i + 1..last {
            if j > i + 1 {
                let (u, v) = (n[j - 1], n[j]);
                fwd += inst.cost(u, v);
                rev += inst.cost(v, u);
                reversed_floor = reversed_floor.min(view.promises.get(v, u));
                if guided {
                    pfwd += pen.penalized_cost(inst, u, v);
                    prev += pen.penalized_cost(inst, v, u);
                }
            }
            if j < i + 2 || (i == 0 && j == last - 1) {
                continue;
            }
            let (c, d) = (n[j], n[j + 1]);
            let delta = inst.cost(a, c) + inst.cost(b, d) + rev
                - inst.cost(a, b)
                - inst.cost(c, d)
                - fwd;
            if view.solution.cost + delta >= reversed_floor {
                continue;
            }
            let mv = Move::TwoOpt {
                route1: r,
                pos1: i,
                route2: r,
                pos2: j,
            };
            view.offer_with(best, mv, delta, &[(a, c), (b, d)], || {
                pen.penalized_cost(inst, a, c) + pen.penalized_cost(inst, b, d) + prev
                    - pen.penalized_cost(inst, a, b)
                    - pen.penalized_cost(inst, c, d)
                    - pfwd
            });
        }
    }
}

/// Exchange of the tails after `i` in `r1` and after `j` in `r2`.
fn scan_inter(view: &SearchView<'_>, r1: usize, r2: usize, best: &mut Option<MoveCandidate>) {
    let inst = view.instance;
    let route1 = &view.solution.routes[r1];
    let route2 = &view.solution.routes[r2];
    let (n1, n2) = (&route1.nodes, &route2.nodes);
    let prefix1 = route1.prefix_loads(inst);
    let prefix2 = route2.prefix_loads(inst);
    let cap = route1.capacity;

    for i in 0..n1.len() - 1 {
        for j in 0..n2.len() - 1 {
            if (i == 0 && j == 0) || (i == n1.len() - 2 && j == n2.len() - 2) {
                continue;
            }
            let load1 = prefix1[i] + (route2.load - prefix2[j]);
            let load2 = prefix2[j] + (route1.load - prefix1[i]);
            if load1 > cap + LOAD_TOLERANCE || load2 > cap + LOAD_TOLERANCE {
                continue;
            }
            let (a, b) = (n1[i], n1[i + 1]);
            let (c, d) = (n2[j], n2[j + 1]);
            let delta = inst.cost(a, d) + inst.cost(c, b) - inst.cost(a, b) - inst.cost(c, d);
            let mv = Move::TwoOpt {
                route1: r1,
                pos1: i,
                route2: r2,
                pos2: j,
            };
            view.offer(best, mv, delta, &[(a, d), (c, b)], &[(a, b), (c, d)]);
        }
    }
}

/// Applies a 2-opt and returns the arcs it removed.
pub(crate) fn apply_two_opt(
    instance: &ProblemInstance,
    solution: &mut Solution,
    route1: usize,
    pos1: usize,
    route2: usize,
    pos2: usize,
) -> Vec<(usize, usize)> {
    if route1 == route2 {
        let route = &mut solution.routes[route1];
        let removed: Vec<(usize, usize)> = (pos1..=pos2)
            .map(|k| (route.nodes[k], route.nodes[k + 1]))
            .collect();
        let before = route.cost;
        route.nodes[pos1 + 1..=pos2].reverse();
        route.cost = instance.path_cost(&route.nodes);
        solution.cost += route.cost - before;
        return removed;
    }

    let removed = {
        let n1 = &solution.routes[route1].nodes;
        let n2 = &solution.routes[route2].nodes;
        vec![(n1[pos1], n1[pos1 + 1]), (n2[pos2], n2[pos2 + 1])]
    };
    let before = solution.routes[route1].cost + solution.routes[route2].cost;

    let tail1 = solution.routes[route1].nodes.split_off(pos1 + 1);
    let tail2 = solution.routes[route2].nodes.split_off(pos2 + 1);
    solution.routes[route1].nodes.extend(tail2);
    solution.routes[route2].nodes.extend(tail1);
    solution.routes[route1].recompute(instance);
    solution.routes[route2].recompute(instance);

    solution.cost += solution.routes[route1].cost + solution.routes[route2].cost - before;
    removed
}
