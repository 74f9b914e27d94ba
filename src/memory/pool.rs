//! Pool of elite routes and the chains mined from them.

use super::chain::{Chain, ChainId};
use super::config::MemoryConfig;
use crate::model::ProblemInstance;
use crate::solution::{Provenance, Solution};
use log::{debug, warn};
use rand::Rng;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// A route stored in the pool.
#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    pub id: ChainId,
    /// Full node sequence, depots included.
    pub nodes: Vec<usize>,
    /// Cost of the solution the route came from.
    pub sol_cost: f64,
    chains: Vec<ChainId>,
}

impl Member {
    /// Chains this member contributed to the pool.
    pub fn chains(&self) -> &[ChainId] {
        &self.chains
    }
}

/// Adaptive memory over routes of feasible solutions.
///
/// Holds at most `pool_size` member routes. Every contiguous fragment of a
/// member with at least `min_chain_len` nodes is a [`Chain`], and a chain's
/// `freq` equals the number of members that contain it.
///
/// # Examples
///
/// ```
/// use u_fcvrp::memory::{AdaptiveMemory, MemoryConfig};
/// use u_fcvrp::model::{Family, ProblemInstance};
/// use u_fcvrp::solution::{Provenance, Solution};
///
/// let points = [(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)];
/// let inst = ProblemInstance::from_points(
///     &points, 0, vec![Family::new(vec![1, 2], 2, 1.0)], 5.0, 1,
/// ).unwrap();
/// let sol = Solution::from_sequences(&inst, &[vec![1, 2]], Provenance::Construction);
///
/// let mut memory = AdaptiveMemory::new(&inst, &MemoryConfig::default());
/// assert_eq!(memory.update_members(&inst, &sol), 1);
/// assert_eq!(memory.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct AdaptiveMemory {
    pool_size: usize,
    min_chain_len: usize,
    min_fraction: f64,
    max_fraction: f64,
    members: Vec<Member>,
    chains: BTreeMap<ChainId, Chain>,
}

impl AdaptiveMemory {
    /// # Panics
    ///
    /// Panics if `config` is invalid.
    pub fn new(instance: &ProblemInstance, config: &MemoryConfig) -> Self {
        config.validate().expect("invalid MemoryConfig");
        Self {
            pool_size: config.resolved_pool_size(instance),
            min_chain_len: config.min_chain_len,
            min_fraction: config.min_chain_fraction,
            max_fraction: config.max_chain_fraction,
            members: Vec::new(),
            chains: BTreeMap::new(),
        }
    }

    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn chain_count(&self) -> usize {
        self.chains.len()
    }

    pub fn chain(&self, id: ChainId) -> Option<&Chain> {
        self.chains.get(&id)
    }

    pub fn chains(&self) -> impl Iterator<Item = &Chain> {
        self.chains.values()
    }

    /// Offers the routes of `solution` to the pool.
    ///
    /// Infeasible solutions are ignored. A feasible one is admitted when the
    /// pool has room or when it beats the worst member; each of its
    /// non-empty routes then replaces the worst member strictly costlier
    /// than the solution. Routes already in the pool are skipped.
    ///
    /// Returns the number of members added.
    pub fn update_members(&mut self, instance: &ProblemInstance, solution: &Solution) -> usize {
        if !solution.feasible {
            return 0;
        }
        let admitted = self.members.len() < self.pool_size
            || self
                .worst_member()
                .is_some_and(|w| solution.cost < self.members[w].sol_cost);
        if !admitted {
            return 0;
        }

        let mut added = 0;
        for route in solution.routes.iter().filter(|r| !r.is_empty()) {
            let id = ChainId::of(&route.nodes);
            if self.members.iter().any(|m| m.id == id) {
                continue;
            }
            if self.members.len() >= self.pool_size {
                match self.worst_member() {
                    Some(w) if self.members[w].sol_cost > solution.cost => self.evict(w),
                    _ => break,
                }
            }
            let chains = self.add_chains(instance, &route.nodes, solution.cost);
            self.members.push(Member {
                id,
                nodes: route.nodes.clone(),
                sol_cost: solution.cost,
                chains,
            });
            added += 1;
        }

        if added > 0 {
            debug!(
                "adaptive memory: +{} routes from cost {:.3}, {} members, {} chains",
                added,
                solution.cost,
                self.members.len(),
                self.chains.len()
            );
        }
        added
    }

    /// Builds a partial solution from pool chains, shaped after `reference`.
    ///
    /// For each reference route a target length is drawn from
    /// `[⌈min_fraction·len⌉, ⌈max_fraction·len⌉)`. The chosen chain is the
    /// one no longer than the target with the highest
    /// `freq - times_extracted`, then the lowest mean arc cost, then the
    /// most nodes, that reuses no customer and overfills no family.
    /// Remaining ties are broken randomly through `rng`.
    ///
    /// The result is padded to one route per vehicle and is never marked
    /// feasible.
    pub fn construct_partial<R: Rng>(
        &mut self,
        instance: &ProblemInstance,
        reference: &Solution,
        rng: &mut R,
    ) -> Solution {
        let depot = instance.depot();
        let mut used = vec![false; instance.num_nodes()];
        let mut visits = vec![0usize; instance.families().len()];
        let mut sequences = Vec::with_capacity(instance.vehicles());
        let mut chain_cost = 0.0;

        for route in reference.routes.iter().take(instance.vehicles()) {
            let target = self.target_length(route.len(), rng);
            let Some(id) = self.select_chain(instance, target, &used, &visits, rng) else {
                continue;
            };
            let Some(chain) = self.chains.get_mut(&id) else {
                continue;
            };
            chain.times_extracted += 1;
            chain_cost += chain.total_cost;
            let customers: Vec<usize> = chain.customers(depot).collect();
            for &c in &customers {
                used[c] = true;
                if let Some(f) = instance.family_of(c) {
                    visits[f] += 1;
                }
            }
            sequences.push(customers);
        }

        let mut partial = Solution::from_sequences(instance, &sequences, Provenance::AdaptiveMemory);
        partial.feasible = false;
        debug!(
            "partial solution from {} chains: chain cost {:.3}, routed cost {:.3}",
            sequences.len(),
            chain_cost,
            partial.cost
        );
        partial
    }

    fn target_length<R: Rng>(&self, route_len: usize, rng: &mut R) -> usize {
        let lo = (self.min_fraction * route_len as f64).ceil() as usize;
        let hi = (self.max_fraction * route_len as f64).ceil() as usize;
        let drawn = if hi > lo { rng.random_range(lo..hi) } else { lo };
        drawn.max(self.min_chain_len)
    }

    fn select_chain<R: Rng>(
        &self,
        instance: &ProblemInstance,
        max_len: usize,
        used: &[bool],
        visits: &[usize],
        rng: &mut R,
    ) -> Option<ChainId> {
        let mut candidates: Vec<(&Chain, u64)> = self
            .chains
            .values()
            .filter(|c| c.nodes.len() <= max_len)
            .map(|c| (c, rng.random::<u64>()))
            .collect();
        candidates.sort_by(|(a, ka), (b, kb)| {
            b.score()
                .cmp(&a.score())
                .then_with(|| a.adj_cost.partial_cmp(&b.adj_cost).unwrap_or(Ordering::Equal))
                .then_with(|| b.nodes.len().cmp(&a.nodes.len()))
                .then_with(|| ka.cmp(kb))
        });
        candidates
            .into_iter()
            .find(|(c, _)| Self::fits(instance, c, used, visits))
            .map(|(c, _)| c.id)
    }

    fn fits(instance: &ProblemInstance, chain: &Chain, used: &[bool], visits: &[usize]) -> bool {
        let families = instance.families();
        let mut extra = vec![0usize; families.len()];
        for c in chain.customers(instance.depot()) {
            if used[c] {
                return false;
            }
            if let Some(f) = instance.family_of(c) {
                extra[f] += 1;
                if visits[f] + extra[f] > families[f].required {
                    return false;
                }
            }
        }
        true
    }

    fn worst_member(&self) -> Option<usize> {
        self.members
            .iter()
            .enumerate()
            .max_by(|(ia, a), (ib, b)| {
                a.sol_cost
                    .partial_cmp(&b.sol_cost)
                    .unwrap_or(Ordering::Equal)
                    // older members lose ties
                    .then_with(|| ib.cmp(ia))
            })
            .map(|(i, _)| i)
    }

    fn evict(&mut self, index: usize) {
        let member = self.members.remove(index);
        for id in &member.chains {
            if let Some(chain) = self.chains.get_mut(id) {
                chain.freq = chain.freq.saturating_sub(1);
                if chain.freq == 0 {
                    self.chains.remove(id);
                }
            }
        }
    }

    fn add_chains(&mut self, instance: &ProblemInstance, nodes: &[usize], sol_cost: f64) -> Vec<ChainId> {
        let mut ids = Vec::new();
        let len = nodes.len();
        for start in 0..len {
            for end in (start + self.min_chain_len)..=len {
                let fragment = &nodes[start..end];
                let id = ChainId::of(fragment);
                match self.chains.get_mut(&id) {
                    Some(chain) if chain.nodes == fragment => {
                        chain.freq += 1;
                        chain.sol_cost = chain.sol_cost.min(sol_cost);
                    }
                    Some(_) => {
                        warn!("chain id collision on {:?}, fragment skipped", fragment);
                        continue;
                    }
                    None => {
                        self.chains
                            .insert(id, Chain::new(instance, fragment.to_vec(), sol_cost));
                    }
                }
                ids.push(id);
            }
        }
        ids
    }
}
