//! Full multi-route solution.

use super::feasibility::FeasibilityReport;
use super::route::{Route, LOAD_TOLERANCE};
use crate::model::ProblemInstance;
use std::collections::HashSet;

/// How a solution was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Provenance {
    /// Constructive heuristic on a customer selection.
    Construction,
    /// Improved by the local search engine.
    LocalSearch,
    /// Rebuilt from adaptive-memory chains and restored.
    AdaptiveMemory,
    /// Produced by the substitution repair.
    Substitution,
    /// Constructed from a perturbed customer selection.
    Perturbation,
    /// Constructed from a random customer selection.
    Random,
}

/// A set of routes, one per vehicle.
///
/// `cost` is kept in sync with the routes by [`Solution::update_cost`];
/// `feasible` is only meaningful after [`Solution::refresh_feasibility`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Solution {
    pub routes: Vec<Route>,
    pub cost: f64,
    pub feasible: bool,
    pub origin: Provenance,
}

impl Solution {
    /// One empty route per vehicle.
    pub fn empty(instance: &ProblemInstance, origin: Provenance) -> Self {
        Self {
            routes: (0..instance.vehicles())
                .map(|_| Route::empty(instance))
                .collect(),
            cost: 0.0,
            feasible: false,
            origin,
        }
    }

    /// Builds a solution from customer sequences, padding with empty routes.
    pub fn from_sequences(
        instance: &ProblemInstance,
        sequences: &[Vec<usize>],
        origin: Provenance,
    ) -> Self {
        let mut routes: Vec<Route> = sequences
            .iter()
            .map(|seq| Route::from_customers(instance, seq))
            .collect();
        while routes.len() < instance.vehicles() {
            routes.push(Route::empty(instance));
        }
        let mut sol = Self {
            routes,
            cost: 0.0,
            feasible: false,
            origin,
        };
        sol.update_cost();
        sol.refresh_feasibility(instance);
        sol
    }

    /// Sums the stored route costs.
    pub fn update_cost(&mut self) {
        self.cost = self.routes.iter().map(|r| r.cost).sum();
    }

    /// Cost computed from scratch over the node sequences.
    pub fn recomputed_cost(&self, instance: &ProblemInstance) -> f64 {
        self.routes
            .iter()
            .map(|r| instance.path_cost(&r.nodes))
            .sum()
    }

    /// Rebuilds every route's cost and load, then the total.
    pub fn recompute(&mut self, instance: &ProblemInstance) {
        for route in &mut self.routes {
            route.recompute(instance);
        }
        self.update_cost();
    }

    /// Every routed customer.
    pub fn customers(&self) -> impl Iterator<Item = usize> + '_ {
        self.routes.iter().flat_map(|r| r.customers().iter().copied())
    }

    pub fn num_customers(&self) -> usize {
        self.routes.iter().map(|r| r.num_customers()).sum()
    }

    pub fn customer_set(&self) -> HashSet<usize> {
        self.customers().collect()
    }

    /// Every arc travelled, route by route.
    pub fn arcs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.routes
            .iter()
            .flat_map(|r| r.nodes.windows(2).map(|w| (w[0], w[1])))
    }

    /// Full node sequences, depots included.
    pub fn route_sequences(&self) -> Vec<Vec<usize>> {
        self.routes.iter().map(|r| r.nodes.clone()).collect()
    }

    /// Checks quotas, capacity, uniqueness, framing and vehicle count.
    pub fn check(&self, instance: &ProblemInstance) -> FeasibilityReport {
        let mut report = FeasibilityReport::default();
        let depot = instance.depot();

        if self.routes.len() != instance.vehicles() {
            report.route_count = Some((self.routes.len(), instance.vehicles()));
        }

        let mut visited = vec![0usize; instance.families().len()];
        let mut seen = vec![false; instance.num_nodes()];

        for (r, route) in self.routes.iter().enumerate() {
            let framed = route.nodes.len() >= 2
                && route.nodes[0] == depot
                && route.nodes[route.nodes.len() - 1] == depot;
            if !framed {
                report.malformed_routes.push(r);
                continue;
            }
            let mut load = 0.0;
            for &node in route.customers() {
                match instance.family_of(node) {
                    Some(f) => visited[f] += 1,
                    None => {
                        report.malformed_routes.push(r);
                        continue;
                    }
                }
                if seen[node] {
                    report.duplicate_customers.push(node);
                }
                seen[node] = true;
                load += instance.demand(node);
            }
            if load > instance.capacity() + LOAD_TOLERANCE {
                report.overloaded_routes.push(r);
            }
        }

        for (f, family) in instance.families().iter().enumerate() {
            if visited[f] != family.required {
                report
                    .quota_violations
                    .push((f, visited[f], family.required));
            }
        }

        report
    }

    /// Re-evaluates and stores feasibility.
    pub fn refresh_feasibility(&mut self, instance: &ProblemInstance) -> bool {
        self.feasible = self.check(instance).is_feasible();
        self.feasible
    }
}

impl ProblemInstance {
    /// Whether `solution` satisfies every F-CVRP constraint.
    pub fn is_feasible(&self, solution: &Solution) -> bool {
        solution.check(self).is_feasible()
    }
}
