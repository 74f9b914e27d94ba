//! Swap: exchange two customers.

use super::types::{Move, MoveCandidate, SearchView};
use crate::model::ProblemInstance;
use crate::solution::{Solution, LOAD_TOLERANCE};

/// Best swap candidate over every ordered pair of customers.
pub fn find_swap(view: &SearchView<'_>) -> Option<MoveCandidate> {
    let inst = view.instance;
    let routes = &view.solution.routes;
    let mut best = None;

    for (r1, route1) in routes.iter().enumerate() {
        let n1 = &route1.nodes;
        for p1 in 1..n1.len() - 1 {
            let (a1, b1, c1) = (n1[p1 - 1], n1[p1], n1[p1 + 1]);
            let d1 = inst.demand(b1);

            for (r2, route2) in routes.iter().enumerate().skip(r1) {
                let n2 = &route2.nodes;
                let start = if r1 == r2 { p1 + 1 } else { 1 };
                for p2 in start..n2.len() - 1 {
                    let (a2, b2, c2) = (n2[p2 - 1], n2[p2], n2[p2 + 1]);
                    let mv = Move::Swap {
                        route1: r1,
                        pos1: p1,
                        route2: r2,
                        pos2: p2,
                    };

                    if r1 == r2 && p2 == p1 + 1 {
                        // a1 - b1 - b2 - c2  becomes  a1 - b2 - b1 - c2
                        let delta = inst.cost(a1, b2) + inst.cost(b2, b1) + inst.cost(b1, c2)
                            - inst.cost(a1, b1)
                            - inst.cost(b1, b2)
                            - inst.cost(b2, c2);
                        view.offer(
                            &mut best,
                            mv,
                            delta,
                            &[(a1, b2), (b2, b1), (b1, c2)],
                            &[(a1, b1), (b1, b2), (b2, c2)],
                        );
                        continue;
                    }

                    if r1 != r2 {
                        let d2 = inst.demand(b2);
                        if route1.load - d1 + d2 > route1.capacity + LOAD_TOLERANCE
                            || route2.load - d2 + d1 > route2.capacity + LOAD_TOLERANCE
                        {
                            continue;
                        }
                    }

                    let delta = inst.cost(a1, b2) + inst.cost(b2, c1) + inst.cost(a2, b1)
                        + inst.cost(b1, c2)
                        - inst.cost(a1, b1)
                        - inst.cost(b1, c1)
                        - inst.cost(a2, b2)
                        - inst.cost(b2, c2);
                    view.offer(
                        &mut best,
                        mv,
                        delta,
                        &[(a1, b2), (b2, c1), (a2, b1), (b1, c2)],
                        &[(a1, b1), (b1, c1), (a2, b2), (b2, c2)],
                    );
                }
            }
        }
    }
    best
}

/// Applies a swap and returns the arcs it removed.
pub(crate) fn apply_swap(
    instance: &ProblemInstance,
    solution: &mut Solution,
    route1: usize,
    pos1: usize,
    route2: usize,
    pos2: usize,
) -> Vec<(usize, usize)> {
    let n1 = &solution.routes[route1].nodes;
    let n2 = &solution.routes[route2].nodes;
    let (a1, b1, c1) = (n1[pos1 - 1], n1[pos1], n1[pos1 + 1]);
    let (a2, b2, c2) = (n2[pos2 - 1], n2[pos2], n2[pos2 + 1]);

    if route1 == route2 && pos2 == pos1 + 1 {
        let route = &mut solution.routes[route1];
        let delta = instance.cost(a1, b2) + instance.cost(b2, b1) + instance.cost(b1, c2)
            - instance.cost(a1, b1)
            - instance.cost(b1, b2)
            - instance.cost(b2, c2);
        route.nodes.swap(pos1, pos2);
        route.cost += delta;
        solution.cost += delta;
        return vec![(a1, b1), (b1, b2), (b2, c2)];
    }

    let side1 = instance.cost(a1, b2) + instance.cost(b2, c1)
        - instance.cost(a1, b1)
        - instance.cost(b1, c1);
    let side2 = instance.cost(a2, b1) + instance.cost(b1, c2)
        - instance.cost(a2, b2)
        - instance.cost(b2, c2);

    if route1 == route2 {
        let route = &mut solution.routes[route1];
        route.nodes.swap(pos1, pos2);
        route.cost += side1 + side2;
    } else {
        let (d1, d2) = (instance.demand(b1), instance.demand(b2));
        let first = &mut solution.routes[route1];
        first.nodes[pos1] = b2;
        first.cost += side1;
        first.load += d2 - d1;
        let second = &mut solution.routes[route2];
        second.nodes[pos2] = b1;
        second.cost += side2;
        second.load += d1 - d2;
    }
    solution.cost += side1 + side2;
    vec![(a1, b1), (b1, c1), (a2, b2), (b2, c2)]
}
