//! Solver round loop.

use super::config::SolverConfig;
use crate::construct::{construct, CustomerSelector, DefaultSelector};
use crate::ls::LocalSearchRunner;
use crate::memory::AdaptiveMemory;
use crate::model::ProblemInstance;
use crate::moves::DELTA_EPS;
use crate::repair::{GreedyRepair, RepairContext, Repairer};
use crate::solution::{NodeStats, Provenance, Solution};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Result of a solver run.
#[derive(Debug, Clone)]
pub struct SolverResult {
    /// Best feasible solution found, if any.
    pub best: Option<Solution>,

    /// Cost of `best`, or infinity.
    pub best_cost: f64,

    /// Local search rounds completed.
    pub rounds: usize,

    /// Rounds that improved the incumbent.
    pub improvements: usize,

    /// Wall-clock time spent.
    pub elapsed: Duration,

    /// Whether cancelled externally.
    pub cancelled: bool,

    /// Whether the time budget ended the run.
    pub timed_out: bool,

    /// Incumbent cost after every round that had one.
    pub cost_history: Vec<f64>,

    /// How the starting solution of each round was produced.
    pub origin_counts: HashMap<Provenance, usize>,
}

impl SolverResult {
    /// Whether a feasible solution was found.
    pub fn is_solved(&self) -> bool {
        self.best.is_some()
    }
}

/// Executes the F-CVRP solver.
///
/// Each round improves a starting solution with local search, offers the
/// result to the adaptive memory and derives the next starting solution
/// from a restored partial solution or a substitution, falling back to a
/// perturbed or random customer selection when both are infeasible.
///
/// # Examples
///
/// ```
/// use u_fcvrp::model::{Family, ProblemInstance};
/// use u_fcvrp::solver::{SolverConfig, SolverRunner};
///
/// let points = [(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (0.0, 1.0), (0.0, 2.0)];
/// let families = vec![
///     Family::new(vec![1, 2], 1, 1.0),
///     Family::new(vec![3, 4], 2, 1.0),
/// ];
/// let inst = ProblemInstance::from_points(&points, 0, families, 5.0, 2).unwrap();
///
/// let result = SolverRunner::run(&inst, &SolverConfig::default().with_seed(7));
/// let best = result.best.unwrap();
/// assert!(inst.is_feasible(&best));
/// assert_eq!(best.num_customers(), 3);
/// ```
pub struct SolverRunner;

impl SolverRunner {
    /// Runs the solver with the default selector and repairer.
    pub fn run(instance: &ProblemInstance, config: &SolverConfig) -> SolverResult {
        Self::run_with_cancel(instance, config, None)
    }

    /// Runs with an optional cancellation token.
    pub fn run_with_cancel(
        instance: &ProblemInstance,
        config: &SolverConfig,
        cancel: Option<Arc<AtomicBool>>,
    ) -> SolverResult {
        Self::run_with(
            instance,
            &DefaultSelector::default(),
            &GreedyRepair,
            config,
            cancel,
        )
    }

    /// Runs with caller-supplied selection and repair policies.
    pub fn run_with<S, P>(
        instance: &ProblemInstance,
        selector: &S,
        repairer: &P,
        config: &SolverConfig,
        cancel: Option<Arc<AtomicBool>>,
    ) -> SolverResult
    where
        S: CustomerSelector,
        P: Repairer,
    {
        config.validate().expect("invalid SolverConfig");

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::seed_from_u64(rand::random()),
        };

        let start = Instant::now();
        let deadline = config
            .time_limit_ms
            .map(|ms| start + Duration::from_millis(ms));
        let ceiling = config.resolved_restart_ceiling(instance);

        let mut round = RoundState {
            instance,
            selector,
            repairer,
            config,
            deadline,
            stats: NodeStats::new(instance.num_nodes()),
            memory: AdaptiveMemory::new(instance, &config.memory),
            max_removals: instance
                .num_customers()
                .saturating_sub(instance.required_visits()),
        };

        debug!(
            "solver start: {} nodes, {} families, {} vehicles, selector {}, repairer {}",
            instance.num_nodes(),
            instance.families().len(),
            instance.vehicles(),
            selector.name(),
            repairer.name()
        );

        let selection = selector.initial_selection(instance);
        let (mut current, mut unserved) = construct(instance, &selection, Provenance::Construction);

        let mut best: Option<Solution> = None;
        let mut origin_counts: HashMap<Provenance, usize> = HashMap::new();
        let mut cost_history = Vec::new();
        let mut rounds = 0usize;
        let mut improvements = 0usize;
        let mut non_improving = 0usize;
        let mut cancelled = false;
        let mut timed_out = false;

        loop {
            if let Some(ref flag) = cancel {
                if flag.load(Ordering::Relaxed) {
                    cancelled = true;
                    break;
                }
            }
            if deadline.is_some_and(|d| Instant::now() >= d) {
                timed_out = true;
                break;
            }
            if config.max_rounds.is_some_and(|m| rounds >= m) {
                break;
            }

            *origin_counts.entry(current.origin).or_insert(0) += 1;
            let ls = LocalSearchRunner::run_until(
                instance,
                current,
                unserved,
                &config.local_search,
                &mut rng,
                deadline,
            );
            rounds += 1;
            let round_best = ls.best;

            if round_best.feasible {
                round.stats.record_best(&round_best);
                let improved = best
                    .as_ref()
                    .is_none_or(|b| round_best.cost < b.cost - DELTA_EPS);
                if improved {
                    info!(
                        "round {}: new best {:.3} from {:?}",
                        rounds, round_best.cost, round_best.origin
                    );
                    best = Some(round_best.clone());
                    improvements += 1;
                    non_improving = 0;
                } else {
                    non_improving += 1;
                }
            } else {
                non_improving += 1;
            }
            if let Some(b) = &best {
                cost_history.push(b.cost);
            }

            if ls.timed_out {
                timed_out = true;
                break;
            }
            if non_improving > ceiling {
                debug!("no improvement for {} rounds, stopping", non_improving);
                break;
            }

            (current, unserved) = round.next_start(&round_best, best.as_ref(), &mut rng);
        }

        let elapsed = start.elapsed();
        match &best {
            Some(b) => info!(
                "solver finished: cost {:.3} after {} rounds in {:?}",
                b.cost, rounds, elapsed
            ),
            None => warn!(
                "solver finished without a feasible solution after {} rounds",
                rounds
            ),
        }

        SolverResult {
            best_cost: best.as_ref().map_or(f64::INFINITY, |b| b.cost),
            best,
            rounds,
            improvements,
            elapsed,
            cancelled,
            timed_out,
            cost_history,
            origin_counts,
        }
    }
}

/// Collaborators and long-lived state of one run.
struct RoundState<'a, S, P> {
    instance: &'a ProblemInstance,
    selector: &'a S,
    repairer: &'a P,
    config: &'a SolverConfig,
    deadline: Option<Instant>,
    stats: NodeStats,
    memory: AdaptiveMemory,
    max_removals: usize,
}

impl<S: CustomerSelector, P: Repairer> RoundState<'_, S, P> {
    /// Starting solution and unserved customers for the next round.
    fn next_start<R: Rng>(
        &mut self,
        round_best: &Solution,
        incumbent: Option<&Solution>,
        rng: &mut R,
    ) -> (Solution, Vec<usize>) {
        let instance = self.instance;
        self.memory.update_members(instance, round_best);

        let ctx = RepairContext {
            deadline: Some(self.config.repair.deadline(self.deadline)),
            node_stats: &self.stats,
            times_removed_penalty: self.config.repair.times_removed_penalty,
        };

        let candidate = if rng.random_bool(self.config.adaptive_memory_chance) {
            let partial = self.memory.construct_partial(instance, round_best, rng);
            let restored = self.repairer.restore(instance, &partial, &ctx);
            if restored.feasible {
                restored
            } else {
                debug!("restore left the partial solution infeasible, substituting instead");
                self.repairer
                    .substitute(instance, round_best, self.max_removals, &ctx)
            }
        } else {
            self.repairer
                .substitute(instance, round_best, self.max_removals, &ctx)
        };
        self.stats.record_transition(round_best, &candidate);

        if candidate.feasible {
            return (candidate, Vec::new());
        }

        if let Some(incumbent) = incumbent {
            let (removed, inserted) = self.selector.perturb(instance, incumbent, &self.stats, rng);
            let removed: HashSet<usize> = removed.into_iter().collect();
            let selection: Vec<usize> = incumbent
                .customers()
                .filter(|c| !removed.contains(c))
                .chain(inserted)
                .collect();
            let (perturbed, unserved) = construct(instance, &selection, Provenance::Perturbation);
            if perturbed.feasible {
                warn!("repair failed, restarting from a perturbed incumbent");
                return (perturbed, unserved);
            }
        }

        warn!("repair failed, restarting from a random selection");
        let selection = self.selector.random_selection(instance, rng);
        construct(instance, &selection, Provenance::Random)
    }
}

/// Solves independent instances, seeding run `i` with `seed + i`.
///
/// Runs in parallel with rayon when the `parallel` feature is enabled.
pub fn solve_many(instances: &[ProblemInstance], config: &SolverConfig) -> Vec<SolverResult> {
    run_all(instances, |i, inst| {
        let mut c = config.clone();
        c.seed = config.seed.map(|s| s.wrapping_add(i as u64));
        SolverRunner::run(inst, &c)
    })
}

#[cfg(feature = "parallel")]
fn run_all<F>(instances: &[ProblemInstance], solve: F) -> Vec<SolverResult>
where
    F: Fn(usize, &ProblemInstance) -> SolverResult + Sync + Send,
{
    use rayon::prelude::*;
    instances
        .par_iter()
        .enumerate()
        .map(|(i, inst)| solve(i, inst))
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn run_all<F>(instances: &[ProblemInstance], solve: F) -> Vec<SolverResult>
where
    F: Fn(usize, &ProblemInstance) -> SolverResult,
{
    instances
        .iter()
        .enumerate()
        .map(|(i, inst)| solve(i, inst))
        .collect()
}
