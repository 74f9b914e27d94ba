//! Customer selection policies.
//!
//! A selection picks exactly `required` members of every family. The
//! construction heuristics then route whatever was selected.

use crate::model::ProblemInstance;
use crate::solution::{NodeStats, Solution};
use rand::seq::{IndexedRandom, SliceRandom};
use rand::Rng;
use std::cmp::Ordering;

/// Chooses which customers to visit.
///
/// Implementations decide the initial selection, random restarts, and how
/// an incumbent's selection is perturbed when the search stalls.
pub trait CustomerSelector: Send + Sync {
    /// Returns a human-readable name for this policy.
    fn name(&self) -> &str;

    /// Deterministic starting selection.
    fn initial_selection(&self, instance: &ProblemInstance) -> Vec<usize>;

    /// Uniformly random selection meeting every quota.
    fn random_selection<R: Rng>(&self, instance: &ProblemInstance, rng: &mut R) -> Vec<usize>;

    /// Picks customers to drop from `solution` and replacements to add.
    ///
    /// Both lists hold the same number of members of each family, so
    /// `routed - removed + inserted` still meets every quota.
    fn perturb<R: Rng>(
        &self,
        instance: &ProblemInstance,
        solution: &Solution,
        stats: &NodeStats,
        rng: &mut R,
    ) -> (Vec<usize>, Vec<usize>);
}

/// Selection by outgoing cost, with usage-guided perturbation.
///
/// # Examples
///
/// ```
/// use u_fcvrp::construct::{CustomerSelector, DefaultSelector};
/// use u_fcvrp::model::{Family, ProblemInstance};
///
/// let points = [(0.0, 0.0), (1.0, 0.0), (9.0, 0.0), (0.0, 2.0)];
/// let inst = ProblemInstance::from_points(
///     &points, 0, vec![Family::new(vec![1, 2, 3], 2, 1.0)], 5.0, 1,
/// ).unwrap();
///
/// let selection = DefaultSelector::default().initial_selection(&inst);
/// assert_eq!(selection, vec![1, 3]);
/// ```
#[derive(Debug, Clone)]
pub struct DefaultSelector {
    /// Share of a family's routed members swapped out by [`perturb`].
    ///
    /// [`perturb`]: CustomerSelector::perturb
    pub perturb_fraction: f64,
}

impl Default for DefaultSelector {
    fn default() -> Self {
        Self {
            perturb_fraction: 0.5,
        }
    }
}

impl DefaultSelector {
    pub fn new(perturb_fraction: f64) -> Self {
        Self { perturb_fraction }
    }
}

impl CustomerSelector for DefaultSelector {
    fn name(&self) -> &str {
        "outgoing-cost"
    }

    /// The `required` members of each family with the lowest total
    /// outgoing cost.
    fn initial_selection(&self, instance: &ProblemInstance) -> Vec<usize> {
        let mut selection = Vec::with_capacity(instance.required_visits());
        for family in instance.families() {
            let mut members = family.members.clone();
            members.sort_by(|&a, &b| {
                instance
                    .outgoing_cost(a)
                    .partial_cmp(&instance.outgoing_cost(b))
                    .unwrap_or(Ordering::Equal)
                    .then(a.cmp(&b))
            });
            selection.extend_from_slice(&members[..family.required]);
        }
        selection.sort_unstable();
        selection
    }

    fn random_selection<R: Rng>(&self, instance: &ProblemInstance, rng: &mut R) -> Vec<usize> {
        let mut selection = Vec::with_capacity(instance.required_visits());
        for family in instance.families() {
            let picked = family.members.choose_multiple(rng, family.required);
            selection.extend(picked.copied());
        }
        selection.sort_unstable();
        selection
    }

    /// Per family, swaps out a random `perturb_fraction` of the routed
    /// members (at least one, never more than there are unrouted members)
    /// for the unrouted members most often seen in best solutions.
    fn perturb<R: Rng>(
        &self,
        instance: &ProblemInstance,
        solution: &Solution,
        stats: &NodeStats,
        rng: &mut R,
    ) -> (Vec<usize>, Vec<usize>) {
        let routed = solution.customer_set();
        let mut removed = Vec::new();
        let mut inserted = Vec::new();

        for family in instance.families() {
            let (mut inside, mut outside): (Vec<usize>, Vec<usize>) =
                family.members.iter().copied().partition(|n| routed.contains(n));
            if inside.is_empty() || outside.is_empty() {
                continue;
            }
            let share = (inside.len() as f64 * self.perturb_fraction).ceil() as usize;
            let k = share.clamp(1, inside.len()).min(outside.len());

            inside.shuffle(rng);
            removed.extend_from_slice(&inside[..k]);

            outside.sort_by(|&a, &b| {
                stats
                    .times_in_best(b)
                    .cmp(&stats.times_in_best(a))
                    .then(a.cmp(&b))
            });
            inserted.extend_from_slice(&outside[..k]);
        }

        (removed, inserted)
    }
}
