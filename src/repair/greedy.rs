//! Greedy repair heuristics.

use super::types::{RepairContext, Repairer};
use crate::model::ProblemInstance;
use crate::moves::DELTA_EPS;
use crate::solution::{Provenance, Solution};
use log::trace;
use std::cmp::Ordering;

/// Cheapest-insertion restore and saving-ranked substitution.
///
/// # Examples
///
/// ```
/// use u_fcvrp::model::{Family, ProblemInstance};
/// use u_fcvrp::repair::{GreedyRepair, RepairContext, Repairer};
/// use u_fcvrp::solution::{NodeStats, Provenance, Solution};
///
/// let points = [(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (5.0, 5.0)];
/// let inst = ProblemInstance::from_points(
///     &points, 0, vec![Family::new(vec![1, 2, 3], 2, 1.0)], 5.0, 1,
/// ).unwrap();
/// let partial = Solution::from_sequences(&inst, &[vec![1]], Provenance::AdaptiveMemory);
///
/// let stats = NodeStats::new(inst.num_nodes());
/// let ctx = RepairContext { deadline: None, node_stats: &stats, times_removed_penalty: 0.1 };
/// let restored = GreedyRepair.restore(&inst, &partial, &ctx);
/// assert!(restored.feasible);
/// assert_eq!(restored.num_customers(), 2);
/// assert!((restored.cost - 4.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedyRepair;

impl GreedyRepair {
    /// Visits per family in `solution`.
    fn visits(instance: &ProblemInstance, solution: &Solution) -> Vec<usize> {
        let mut visits = vec![0usize; instance.families().len()];
        for c in solution.customers() {
            if let Some(f) = instance.family_of(c) {
                visits[f] += 1;
            }
        }
        visits
    }

    /// Cheapest feasible insertion of any unrouted member of a deficit family.
    fn cheapest_fill(
        instance: &ProblemInstance,
        solution: &Solution,
        routed: &[bool],
        visits: &[usize],
    ) -> Option<(usize, usize, usize)> {
        let mut best: Option<(usize, usize, usize, f64)> = None;
        for (f, family) in instance.families().iter().enumerate() {
            if visits[f] >= family.required {
                continue;
            }
            for &node in family.members.iter().filter(|&&n| !routed[n]) {
                for (r, route) in solution.routes.iter().enumerate() {
                    if !route.fits(family.demand) {
                        continue;
                    }
                    let (pos, delta) = route.best_insertion(instance, node);
                    if best.is_none_or(|(.., d)| delta < d) {
                        best = Some((node, r, pos, delta));
                    }
                }
            }
        }
        best.map(|(node, r, pos, _)| (node, r, pos))
    }
}

/// A same-family exchange at one route position.
#[derive(Debug, Clone, Copy)]
struct Substitution {
    route: usize,
    pos: usize,
    incoming: usize,
    delta: f64,
    score: f64,
}

impl Repairer for GreedyRepair {
    fn name(&self) -> &str {
        "greedy"
    }

    /// Repeatedly inserts the unrouted deficit-family member with the
    /// globally cheapest capacity-feasible insertion.
    fn restore(
        &self,
        instance: &ProblemInstance,
        partial: &Solution,
        ctx: &RepairContext<'_>,
    ) -> Solution {
        let mut solution = partial.clone();
        let mut routed = vec![false; instance.num_nodes()];
        for c in solution.customers() {
            routed[c] = true;
        }
        let mut visits = Self::visits(instance, &solution);

        while !ctx.expired() {
            let Some((node, r, pos)) = Self::cheapest_fill(instance, &solution, &routed, &visits)
            else {
                break;
            };
            solution.routes[r].insert(instance, pos, node);
            routed[node] = true;
            if let Some(f) = instance.family_of(node) {
                visits[f] += 1;
            }
        }

        solution.update_cost();
        solution.refresh_feasibility(instance);
        trace!(
            "restore: {} -> {} customers, feasible {}",
            partial.num_customers(),
            solution.num_customers(),
            solution.feasible
        );
        solution
    }

    /// Ranks every capacity-feasible exchange by
    /// `added - removed / (1 + penalty · times_removed)` and applies the
    /// negative ones, most negative first, never touching a position or
    /// its neighbours twice.
    fn substitute(
        &self,
        instance: &ProblemInstance,
        solution: &Solution,
        max_removals: usize,
        ctx: &RepairContext<'_>,
    ) -> Solution {
        let mut result = solution.clone();
        result.origin = Provenance::Substitution;

        let mut routed = vec![false; instance.num_nodes()];
        for c in solution.customers() {
            routed[c] = true;
        }

        let mut candidates = Vec::new();
        for (r, route) in solution.routes.iter().enumerate() {
            for pos in 1..route.nodes.len() - 1 {
                let (prev, out, next) = (route.nodes[pos - 1], route.nodes[pos], route.nodes[pos + 1]);
                let Some(f) = instance.family_of(out) else {
                    continue;
                };
                let removed = instance.cost(prev, out) + instance.cost(out, next);
                let discount = 1.0
                    + ctx.times_removed_penalty * ctx.node_stats.times_removed(out) as f64;
                for &incoming in instance.families()[f].members.iter().filter(|&&n| !routed[n]) {
                    let extra = instance.demand(incoming) - instance.demand(out);
                    if !route.fits(extra) {
                        continue;
                    }
                    let added = instance.cost(prev, incoming) + instance.cost(incoming, next);
                    let score = added - removed / discount;
                    if score < -DELTA_EPS {
                        candidates.push(Substitution {
                            route: r,
                            pos,
                            incoming,
                            delta: added - removed,
                            score,
                        });
                    }
                }
            }
        }
        candidates.sort_by(|a, b| a.score.partial_cmp(&b.score).unwrap_or(Ordering::Equal));

        let mut touched: Vec<Vec<bool>> = solution
            .routes
            .iter()
            .map(|r| vec![false; r.nodes.len()])
            .collect();
        let mut applied = 0;
        for cand in candidates {
            if applied >= max_removals || ctx.expired() {
                break;
            }
            let marks = &touched[cand.route];
            if routed[cand.incoming] || marks[cand.pos - 1] || marks[cand.pos] || marks[cand.pos + 1] {
                continue;
            }
            let route = &mut result.routes[cand.route];
            let out = route.nodes[cand.pos];
            let extra = instance.demand(cand.incoming) - instance.demand(out);
            if !route.fits(extra) {
                continue;
            }
            route.nodes[cand.pos] = cand.incoming;
            route.cost += cand.delta;
            route.load += extra;
            routed[cand.incoming] = true;
            routed[out] = false;
            touched[cand.route][cand.pos] = true;
            applied += 1;
        }

        result.update_cost();
        result.refresh_feasibility(instance);
        trace!(
            "substitute: {} exchanges, cost {:.3} -> {:.3}",
            applied,
            solution.cost,
            result.cost
        );
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{fixtures, Family};
    use crate::solution::NodeStats;
    use std::time::Instant;

    fn ctx(stats: &NodeStats) -> RepairContext<'_> {
        RepairContext {
            deadline: None,
            node_stats: stats,
            times_removed_penalty: 0.1,
        }
    }

    #[test]
    fn test_restore_completes_partial() {
        let inst = fixtures::surplus();
        let stats = NodeStats::new(inst.num_nodes());
        let partial = Solution::from_sequences(&inst, &[vec![1, 2], vec![], vec![]], Provenance::AdaptiveMemory);

        let restored = GreedyRepair.restore(&inst, &partial, &ctx(&stats));
        assert!(restored.feasible, "report: {}", restored.check(&inst));
        assert_eq!(restored.num_customers(), inst.required_visits());
        assert!(restored.customer_set().contains(&1));
        assert!(restored.customer_set().contains(&2));
        assert!((restored.cost - restored.recomputed_cost(&inst)).abs() < 1e-9);
    }

    #[test]
    fn test_restore_stops_at_deadline() {
        let inst = fixtures::surplus();
        let stats = NodeStats::new(inst.num_nodes());
        let partial = Solution::empty(&inst, Provenance::AdaptiveMemory);
        let expired = RepairContext {
            deadline: Some(Instant::now()),
            ..ctx(&stats)
        };
        let restored = GreedyRepair.restore(&inst, &partial, &expired);
        assert_eq!(restored.num_customers(), 0);
        assert!(!restored.feasible);
    }

    #[test]
    fn test_restore_reports_capacity_dead_end() {
        // one vehicle of capacity 3, two required customers of demand 2
        let points = [(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)];
        let inst = ProblemInstance::from_points(
            &points,
            0,
            vec![Family::new(vec![1, 2], 2, 2.0)],
            3.0,
            1,
        )
        .unwrap();
        let stats = NodeStats::new(inst.num_nodes());
        let partial = Solution::empty(&inst, Provenance::AdaptiveMemory);
        let restored = GreedyRepair.restore(&inst, &partial, &ctx(&stats));
        assert_eq!(restored.num_customers(), 1);
        assert!(!restored.feasible);
    }

    #[test]
    fn test_substitute_swaps_in_closer_member() {
        // family {1, 2}, one required; 2 sits next to the depot
        let points = [(0.0, 0.0), (10.0, 0.0), (1.0, 0.0)];
        let inst = ProblemInstance::from_points(
            &points,
            0,
            vec![Family::new(vec![1, 2], 1, 1.0)],
            5.0,
            1,
        )
        .unwrap();
        let stats = NodeStats::new(inst.num_nodes());
        let sol = Solution::from_sequences(&inst, &[vec![1]], Provenance::LocalSearch);
        assert!(sol.feasible);

        let out = GreedyRepair.substitute(&inst, &sol, 1, &ctx(&stats));
        assert_eq!(out.route_sequences(), vec![vec![0, 2, 0]]);
        assert!(out.feasible);
        assert_eq!(out.origin, Provenance::Substitution);
        assert!((out.cost - 2.0).abs() < 1e-9, "got {}", out.cost);
    }

    #[test]
    fn test_substitute_respects_removal_budget() {
        let inst = fixtures::surplus();
        let stats = NodeStats::new(inst.num_nodes());
        // far-away members of every family
        let sol = Solution::from_sequences(
            &inst,
            &[vec![10, 11], vec![12, 9], vec![7, 8]],
            Provenance::LocalSearch,
        );
        assert!(sol.feasible);

        let none = GreedyRepair.substitute(&inst, &sol, 0, &ctx(&stats));
        assert_eq!(none.route_sequences(), sol.route_sequences());

        let one = GreedyRepair.substitute(&inst, &sol, 1, &ctx(&stats));
        let changed = sol
            .customers()
            .filter(|c| !one.customer_set().contains(c))
            .count();
        assert_eq!(changed, 1);
        assert!(one.feasible);
        assert!(one.cost < sol.cost);

        let many = GreedyRepair.substitute(&inst, &sol, 6, &ctx(&stats));
        assert!(many.feasible);
        assert!(many.cost <= one.cost + 1e-9);
        assert!((many.cost - many.recomputed_cost(&inst)).abs() < 1e-9);
    }

    #[test]
    fn test_substitute_discounts_frequently_removed_nodes() {
        let points = [(0.0, 0.0), (10.0, 0.0), (9.0, 0.0)];
        let inst = ProblemInstance::from_points(
            &points,
            0,
            vec![Family::new(vec![1, 2], 1, 1.0)],
            5.0,
            1,
        )
        .unwrap();
        let sol = Solution::from_sequences(&inst, &[vec![1]], Provenance::LocalSearch);

        // saving of 2 is plain improving
        let fresh = NodeStats::new(inst.num_nodes());
        let out = GreedyRepair.substitute(&inst, &sol, 1, &ctx(&fresh));
        assert_eq!(out.route_sequences(), vec![vec![0, 2, 0]]);

        // node 1 removed many times: 18 - 20 / (1 + 0.1 · 20) > 0
        let mut worn = NodeStats::new(inst.num_nodes());
        let without = Solution::from_sequences(&inst, &[vec![2]], Provenance::LocalSearch);
        for _ in 0..20 {
            worn.record_transition(&sol, &without);
        }
        let out = GreedyRepair.substitute(&inst, &sol, 1, &ctx(&worn));
        assert_eq!(out.route_sequences(), sol.route_sequences());
    }
}
