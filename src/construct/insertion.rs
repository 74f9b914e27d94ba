//! Best-insertion and best-fit route construction.

use crate::model::ProblemInstance;
use crate::solution::{Provenance, Solution, LOAD_TOLERANCE};
use log::debug;
use std::cmp::Ordering;

/// Routes `selection`, returning the solution and the customers left out.
///
/// Tries [`best_insertion`] first and falls back to [`best_fit`] when that
/// leaves customers unserved.
pub fn construct(
    instance: &ProblemInstance,
    selection: &[usize],
    origin: Provenance,
) -> (Solution, Vec<usize>) {
    let (solution, unserved) = best_insertion(instance, selection, origin);
    if unserved.is_empty() {
        return (solution, unserved);
    }
    debug!(
        "best insertion left {} customers unserved, retrying with best fit",
        unserved.len()
    );
    best_fit(instance, selection, origin)
}

/// Round-robin cheapest insertion.
///
/// Each pass lets every route, in order, take the selected customer with the
/// cheapest capacity-feasible insertion. Stops when everything is routed or a
/// full pass inserts nothing.
pub fn best_insertion(
    instance: &ProblemInstance,
    selection: &[usize],
    origin: Provenance,
) -> (Solution, Vec<usize>) {
    let mut solution = Solution::empty(instance, origin);
    let mut pending: Vec<usize> = selection.to_vec();

    while !pending.is_empty() {
        let mut progress = false;
        for route in solution.routes.iter_mut() {
            let mut best: Option<(usize, usize, f64)> = None;
            for (i, &node) in pending.iter().enumerate() {
                if !route.fits(instance.demand(node)) {
                    continue;
                }
                let (pos, delta) = route.best_insertion(instance, node);
                if best.is_none_or(|(_, _, d)| delta < d) {
                    best = Some((i, pos, delta));
                }
            }
            if let Some((i, pos, _)) = best {
                let node = pending.swap_remove(i);
                route.insert(instance, pos, node);
                progress = true;
                if pending.is_empty() {
                    break;
                }
            }
        }
        if !progress {
            break;
        }
    }

    finish(instance, solution, pending)
}

/// Best-fit bin packing by decreasing demand.
///
/// Each customer goes to the route it leaves with the least spare capacity,
/// at that route's cheapest position.
pub fn best_fit(
    instance: &ProblemInstance,
    selection: &[usize],
    origin: Provenance,
) -> (Solution, Vec<usize>) {
    let mut order: Vec<usize> = selection.to_vec();
    order.sort_by(|&a, &b| {
        instance
            .demand(b)
            .partial_cmp(&instance.demand(a))
            .unwrap_or(Ordering::Equal)
            .then(a.cmp(&b))
    });

    let mut solution = Solution::empty(instance, origin);
    let mut unserved = Vec::new();
    for node in order {
        let demand = instance.demand(node);
        let target = solution
            .routes
            .iter()
            .enumerate()
            .filter(|(_, r)| r.fits(demand))
            .min_by(|(_, a), (_, b)| {
                let slack_a = a.capacity - a.load - demand;
                let slack_b = b.capacity - b.load - demand;
                slack_a.partial_cmp(&slack_b).unwrap_or(Ordering::Equal)
            })
            .map(|(r, _)| r);
        match target {
            Some(r) => {
                let route = &mut solution.routes[r];
                let (pos, _) = route.best_insertion(instance, node);
                route.insert(instance, pos, node);
            }
            None => unserved.push(node),
        }
    }

    finish(instance, solution, unserved)
}

fn finish(
    instance: &ProblemInstance,
    mut solution: Solution,
    mut unserved: Vec<usize>,
) -> (Solution, Vec<usize>) {
    debug_assert!(solution
        .routes
        .iter()
        .all(|r| r.load <= r.capacity + LOAD_TOLERANCE));
    unserved.sort_unstable();
    solution.update_cost();
    solution.refresh_feasibility(instance);
    (solution, unserved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{fixtures, Family};

    #[test]
    fn test_best_insertion_routes_everything() {
        let inst = fixtures::six_customers();
        let selection: Vec<usize> = (1..=6).collect();
        let (sol, unserved) = best_insertion(&inst, &selection, Provenance::Construction);
        assert!(unserved.is_empty());
        assert!(sol.feasible);
        assert_eq!(sol.num_customers(), 6);
        assert!((sol.cost - sol.recomputed_cost(&inst)).abs() < 1e-9);
        for route in &sol.routes {
            assert!(route.load <= inst.capacity() + 1e-9);
        }
    }

    #[test]
    fn test_best_insertion_reports_leftovers() {
        // total demand 12 against 2 × 5 capacity
        let points = [(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (3.0, 0.0), (4.0, 0.0)];
        let inst = ProblemInstance::from_points(
            &points,
            0,
            vec![Family::new(vec![1, 2, 3, 4], 4, 3.0)],
            5.0,
            2,
        )
        .unwrap();
        let (sol, unserved) = construct(&inst, &[1, 2, 3, 4], Provenance::Construction);
        assert_eq!(unserved.len(), 2);
        assert_eq!(sol.num_customers(), 2);
        assert!(!sol.feasible);
    }

    #[test]
    fn test_best_fit_packs_where_insertion_fails() {
        // demands 2,2,3,3 against 2 × 5; insertion groups by proximity and
        // strands a 3, best fit pairs each 3 with a 2
        let points = [(0.0, 0.0), (1.0, 0.0), (1.1, 0.0), (-1.0, 0.0), (-1.1, 0.0)];
        let inst = ProblemInstance::from_points(
            &points,
            0,
            vec![
                Family::new(vec![1, 2], 2, 2.0),
                Family::new(vec![3, 4], 2, 3.0),
            ],
            5.0,
            2,
        )
        .unwrap();
        let (_, stranded) = best_insertion(&inst, &[1, 2, 3, 4], Provenance::Construction);
        assert_eq!(stranded, vec![4]);

        let (sol, unserved) = best_fit(&inst, &[1, 2, 3, 4], Provenance::Construction);
        assert!(unserved.is_empty(), "unserved: {:?}", unserved);
        assert!(sol.feasible);
        for route in &sol.routes {
            assert!((route.load - 5.0).abs() < 1e-10, "load {}", route.load);
        }

        let (sol, unserved) = construct(&inst, &[1, 2, 3, 4], Provenance::Construction);
        assert!(unserved.is_empty());
        assert!(sol.feasible);
    }

    #[test]
    fn test_empty_selection() {
        let inst = fixtures::six_customers();
        let (sol, unserved) = construct(&inst, &[], Provenance::Random);
        assert!(unserved.is_empty());
        assert_eq!(sol.routes.len(), 2);
        assert_eq!(sol.origin, Provenance::Random);
        assert!(sol.cost.abs() < 1e-12);
    }
}
