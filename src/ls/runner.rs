//! Local search execution loop.

use super::config::{LocalSearchConfig, MoveWeights};
use crate::guidance::{ArcPenalties, PromiseTable};
use crate::model::ProblemInstance;
use crate::moves::{self, Move, MoveCandidate, MoveKind, Scoring, SearchView};
use crate::solution::{NodeLocator, Solution};
use log::{debug, trace};
use rand::Rng;
use std::time::Instant;

/// Result of one local search invocation.
#[derive(Debug, Clone)]
pub struct LocalSearchResult {
    /// Best solution seen with every customer served, or the final
    /// solution if that never happened.
    pub best: Solution,

    /// Cost of `best`.
    pub best_cost: f64,

    /// Iterations performed.
    pub iterations: usize,

    /// Moves applied, improving or not.
    pub moves_applied: usize,

    /// Times a guided step stalled and arcs were penalized.
    pub penalizations: usize,

    /// Times the promise table was cleared.
    pub promise_resets: usize,

    /// Customers still waiting for a route.
    pub unserved: Vec<usize>,

    /// Whether the deadline cut the search short.
    pub timed_out: bool,
}

/// Mutable search state for one invocation.
struct SearchState<'a> {
    instance: &'a ProblemInstance,
    current: Solution,
    locator: NodeLocator,
    promises: PromiseTable,
    penalties: ArcPenalties,
    unserved: Vec<usize>,
    moves_applied: usize,
    penalizations: usize,
}

impl<'a> SearchState<'a> {
    fn view(&self, scoring: Scoring) -> SearchView<'_> {
        SearchView {
            instance: self.instance,
            solution: &self.current,
            locator: &self.locator,
            promises: &self.promises,
            penalties: &self.penalties,
            scoring,
        }
    }

    /// Inserts one smallest-demand unserved customer into a least-loaded
    /// route at its cheapest position, if it fits.
    fn insert_unserved(&mut self) {
        if self.unserved.is_empty() {
            return;
        }
        let inst = self.instance;
        let Some((r, _)) = self
            .current
            .routes
            .iter()
            .enumerate()
            .min_by(|a, b| a.1.load.total_cmp(&b.1.load))
        else {
            return;
        };
        let Some((idx, &node)) = self
            .unserved
            .iter()
            .enumerate()
            .min_by(|a, b| inst.demand(*a.1).total_cmp(&inst.demand(*b.1)))
        else {
            return;
        };
        let route = &mut self.current.routes[r];
        if !route.fits(inst.demand(node)) {
            return;
        }
        let (pos, delta) = route.best_insertion(inst, node);
        route.insert(inst, pos, node);
        self.current.cost += delta;
        self.unserved.swap_remove(idx);
        self.locator.refresh_route(&self.current, r);
    }

    fn apply(&mut self, candidate: &MoveCandidate) {
        // A replace can route a customer that was waiting; the one it
        // displaces takes its place in the queue.
        if let Move::Replace { route, pos, node } = candidate.mv {
            if let Some(i) = self.unserved.iter().position(|&u| u == node) {
                self.unserved[i] = self.current.routes[route].nodes[pos];
            }
        }

        let removed = moves::apply(self.instance, &mut self.current, &candidate.mv);
        self.promises.set_all(&removed, self.current.cost);

        self.locator.rebuild(&self.current);
        self.moves_applied += 1;

        debug_assert!(
            {
                let fresh = self.current.recomputed_cost(self.instance);
                (fresh - self.current.cost).abs() <= 1e-6 * fresh.abs().max(1.0)
            },
            "incremental cost drifted from recomputed cost"
        );
    }

    /// Promises every arc a rejected guided candidate touches at the cost
    /// it would have reached.
    fn reject(&mut self, candidate: &MoveCandidate) {
        let arcs = candidate.touched_arcs(self.instance, &self.current);
        self.promises
            .set_all(&arcs, self.current.cost + candidate.delta);
    }

    fn penalize(&mut self, fraction: f64) {
        self.penalties
            .penalize(self.instance, &self.current, fraction);
        self.penalizations += 1;
    }
}

/// Runs the promise-guided local search.
pub struct LocalSearchRunner;

impl LocalSearchRunner {
    /// Improves `initial`, first routing the customers in `unserved`.
    ///
    /// # Arguments
    /// * `instance` - Problem instance
    /// * `initial` - Starting solution
    /// * `unserved` - Selected customers that are not yet routed
    /// * `config` - Search configuration
    /// * `rng` - Random number generator
    pub fn run<R: Rng>(
        instance: &ProblemInstance,
        initial: Solution,
        unserved: Vec<usize>,
        config: &LocalSearchConfig,
        rng: &mut R,
    ) -> LocalSearchResult {
        Self::run_until(instance, initial, unserved, config, rng, None)
    }

    /// Like [`LocalSearchRunner::run`], stopping at `deadline` if given.
    pub fn run_until<R: Rng>(
        instance: &ProblemInstance,
        initial: Solution,
        unserved: Vec<usize>,
        config: &LocalSearchConfig,
        rng: &mut R,
        deadline: Option<Instant>,
    ) -> LocalSearchResult {
        config.validate().expect("invalid LocalSearchConfig");

        let n = instance.num_nodes();
        let weights: MoveWeights = config.move_weights(instance);
        let ceiling = config.non_improving_ceiling(instance);
        let cap = config.iteration_cap(instance);
        let reset_every = rng.random_range(config.promise_reset_min..config.promise_reset_max);

        let mut state = SearchState {
            instance,
            locator: NodeLocator::from_solution(&initial, n),
            current: initial,
            promises: PromiseTable::new(n),
            penalties: ArcPenalties::new(n, config.arc_penalty),
            unserved,
            moves_applied: 0,
            penalizations: 0,
        };

        let mut best: Option<Solution> = if state.unserved.is_empty() {
            Some(state.current.clone())
        } else {
            None
        };
        let mut non_improving = 0usize;
        let mut promise_resets = 0usize;
        let mut iterations = 0usize;
        let mut timed_out = false;

        while iterations < cap {
            if let Some(limit) = deadline {
                if Instant::now() >= limit {
                    timed_out = true;
                    break;
                }
            }

            state.insert_unserved();

            let kind: MoveKind = weights.sample(rng);
            let guided = rng.random_bool(config.guided_chance);
            let scoring = if guided { Scoring::Guided } else { Scoring::Plain };
            let candidate = moves::find_best(&state.view(scoring), kind);

            match (candidate, guided) {
                (Some(c), false) => state.apply(&c),
                (Some(c), true) if c.is_improving() || c.penalized_delta < 0.0 => state.apply(&c),
                (Some(c), true) => {
                    state.reject(&c);
                    state.penalize(config.penalty_fraction);
                }
                (None, true) => state.penalize(config.penalty_fraction),
                (None, false) => {}
            }

            iterations += 1;
            if iterations % reset_every == 0 {
                state.promises.reset();
                promise_resets += 1;
            }

            let improved = state.unserved.is_empty()
                && best
                    .as_ref()
                    .is_none_or(|b| state.current.cost < b.cost - moves::DELTA_EPS);
            if improved {
                best = Some(state.current.clone());
                state.promises.reset();
                promise_resets += 1;
                non_improving = 0;
            } else {
                non_improving += 1;
            }

            if non_improving > ceiling && state.unserved.is_empty() {
                break;
            }
        }

        trace!(
            "local search: {} iterations, {} moves, {} penalizations, {} unserved",
            iterations,
            state.moves_applied,
            state.penalizations,
            state.unserved.len()
        );

        let mut best = best.unwrap_or_else(|| state.current.clone());
        best.refresh_feasibility(instance);
        debug!(
            "local search finished at cost {:.3} (feasible: {})",
            best.cost, best.feasible
        );

        LocalSearchResult {
            best_cost: best.cost,
            best,
            iterations,
            moves_applied: state.moves_applied,
            penalizations: state.penalizations,
            promise_resets,
            unserved: state.unserved,
            timed_out,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::construct::{construct, CustomerSelector, DefaultSelector};
    use crate::model::{fixtures, Family};
    use crate::solution::Provenance;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn small_config() -> LocalSearchConfig {
        LocalSearchConfig::default()
            .with_max_non_improving(200)
            .with_iteration_cap_factor(5)
    }

    fn state_for(inst: &ProblemInstance, solution: Solution) -> SearchState<'_> {
        SearchState {
            instance: inst,
            locator: NodeLocator::from_solution(&solution, inst.num_nodes()),
            current: solution,
            promises: PromiseTable::new(inst.num_nodes()),
            penalties: ArcPenalties::new(inst.num_nodes(), 0.225),
            unserved: Vec::new(),
            moves_applied: 0,
            penalizations: 0,
        }
    }

    #[test]
    fn test_six_customer_scenario() {
        let inst = fixtures::six_customers();
        let selection = DefaultSelector::default().initial_selection(&inst);
        let (initial, unserved) = construct(&inst, &selection, Provenance::Construction);
        assert!(unserved.is_empty());
        assert!(initial.feasible, "report: {}", initial.check(&inst));
        let non_empty = initial.routes.iter().filter(|r| !r.is_empty()).count();
        assert_eq!(non_empty, 2);
        let load: f64 = initial.routes.iter().map(|r| r.load).sum();
        assert!((load - 15.0).abs() < 1e-9);

        let mut rng = StdRng::seed_from_u64(42);
        let result = LocalSearchRunner::run(&inst, initial.clone(), unserved, &small_config(), &mut rng);
        assert!(result.best.feasible);
        assert!(
            result.best_cost <= initial.cost + 1e-9,
            "local search raised the constructed cost: {} > {}",
            result.best_cost,
            initial.cost
        );
        assert!((result.best.cost - result.best.recomputed_cost(&inst)).abs() < 1e-6);
    }

    #[test]
    fn test_rejected_guided_candidate_is_not_offered_again() {
        let inst = fixtures::six_customers();
        let optimum = Solution::from_sequences(
            &inst,
            &[vec![1, 2, 3], vec![4, 5, 6]],
            Provenance::Construction,
        );
        let mut state = state_for(&inst, optimum);
        let rejected = moves::find_best(&state.view(Scoring::Guided), MoveKind::Relocate)
            .expect("relocate candidate");
        assert!(!rejected.is_improving());
        assert!(rejected.penalized_delta >= 0.0);

        state.reject(&rejected);
        let arcs = rejected.touched_arcs(&inst, &state.current);
        let reached = state.current.cost + rejected.delta;
        assert!(!state.promises.allows_all(&arcs, reached));

        let again = moves::find_best(&state.view(Scoring::Guided), MoveKind::Relocate);
        assert!(again.is_none_or(|c| c.mv != rejected.mv));
    }

    #[test]
    fn test_descent_from_crossed_routes() {
        let inst = fixtures::six_customers();
        let initial = Solution::from_sequences(
            &inst,
            &[vec![4, 1, 6], vec![2, 5, 3]],
            Provenance::Construction,
        );
        let mut rng = StdRng::seed_from_u64(42);
        let result = LocalSearchRunner::run(&inst, initial.clone(), Vec::new(), &small_config(), &mut rng);

        assert!(result.best.feasible);
        assert!(
            result.best_cost <= initial.cost + 1e-9,
            "local search made things worse: {} > {}",
            result.best_cost,
            initial.cost
        );
        let non_empty = result.best.routes.iter().filter(|r| !r.is_empty()).count();
        assert_eq!(non_empty, 2);
        let load: f64 = result.best.routes.iter().map(|r| r.load).sum();
        assert!((load - 15.0).abs() < 1e-9);
        assert!((result.best.cost - result.best.recomputed_cost(&inst)).abs() < 1e-6);
    }

    #[test]
    fn test_finds_axis_split() {
        let inst = fixtures::six_customers();
        let initial = Solution::from_sequences(
            &inst,
            &[vec![4, 1, 6], vec![2, 5, 3]],
            Provenance::Construction,
        );
        let config = small_config().with_max_non_improving(500);
        let mut rng = StdRng::seed_from_u64(1);
        let result = LocalSearchRunner::run(&inst, initial, Vec::new(), &config, &mut rng);
        // one route per axis: 2 * (3 + 3)
        assert!(
            result.best_cost <= 12.0 + 1e-6,
            "expected cost 12, got {}",
            result.best_cost
        );
    }

    #[test]
    fn test_unserved_customers_get_routed() {
        let inst = fixtures::six_customers();
        let initial = Solution::from_sequences(
            &inst,
            &[vec![1, 2], vec![4, 5]],
            Provenance::Construction,
        );
        assert!(!initial.feasible);
        let mut rng = StdRng::seed_from_u64(3);
        let result = LocalSearchRunner::run(&inst, initial, vec![3, 6], &small_config(), &mut rng);
        assert!(result.unserved.is_empty(), "left {:?}", result.unserved);
        assert!(result.best.feasible);
        assert_eq!(result.best.num_customers(), 6);
    }

    #[test]
    fn test_unservable_customer_hits_cap() {
        // three customers of demand 4, capacity 5: the third never fits
        let points = [(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (1.0, 1.0)];
        let families = vec![Family::new(vec![1, 2, 3], 3, 4.0)];
        let inst = ProblemInstance::from_points(&points, 0, families, 5.0, 2).unwrap();
        let initial = Solution::from_sequences(&inst, &[vec![1], vec![2]], Provenance::Construction);
        let config = LocalSearchConfig::default()
            .with_max_non_improving(50)
            .with_iteration_cap_factor(4);
        let mut rng = StdRng::seed_from_u64(5);
        let result = LocalSearchRunner::run(&inst, initial, vec![3], &config, &mut rng);
        assert_eq!(result.iterations, 200);
        assert_eq!(result.unserved.len(), 1);
        assert!(!result.best.feasible);
    }

    #[test]
    fn test_replace_moves_on_surplus_instance() {
        let inst = fixtures::surplus();
        let initial = Solution::from_sequences(
            &inst,
            &[vec![10, 11], vec![12, 7], vec![8, 9]],
            Provenance::Construction,
        );
        assert!(initial.feasible);
        let config = small_config().with_replace_weight(1.0);
        let mut rng = StdRng::seed_from_u64(11);
        let result = LocalSearchRunner::run(&inst, initial.clone(), Vec::new(), &config, &mut rng);
        assert!(result.best.feasible);
        assert!(result.best_cost < initial.cost);
        assert!(result.moves_applied > 0);
    }

    #[test]
    fn test_guided_penalizes_at_local_optimum() {
        let inst = fixtures::six_customers();
        let initial = Solution::from_sequences(
            &inst,
            &[vec![1, 2, 3], vec![4, 5, 6]],
            Provenance::Construction,
        );
        let config = small_config().with_guided_chance(1.0);
        let mut rng = StdRng::seed_from_u64(9);
        let result = LocalSearchRunner::run(&inst, initial.clone(), Vec::new(), &config, &mut rng);
        assert!(result.penalizations > 0);
        assert!(result.best_cost <= initial.cost + 1e-9);
    }

    #[test]
    fn test_deadline_stops_search() {
        let inst = fixtures::six_customers();
        let initial = Solution::from_sequences(
            &inst,
            &[vec![4, 1, 6], vec![2, 5, 3]],
            Provenance::Construction,
        );
        let mut rng = StdRng::seed_from_u64(2);
        let result = LocalSearchRunner::run_until(
            &inst,
            initial.clone(),
            Vec::new(),
            &small_config(),
            &mut rng,
            Some(Instant::now()),
        );
        assert!(result.timed_out);
        assert_eq!(result.iterations, 0);
        assert!((result.best_cost - initial.cost).abs() < 1e-9);
    }
}
