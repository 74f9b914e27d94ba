//! Route fragments kept by the adaptive memory.

use crate::model::ProblemInstance;

/// Order-sensitive identity of a node sequence.
///
/// `17`, then `hash · 31 + id` for every node, with wrapping arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChainId(pub u64);

impl ChainId {
    pub fn of(nodes: &[usize]) -> Self {
        let hash = nodes
            .iter()
            .fold(17u64, |h, &n| h.wrapping_mul(31).wrapping_add(n as u64));
        ChainId(hash)
    }
}

/// A contiguous fragment of some historical route.
#[derive(Debug, Clone, PartialEq)]
pub struct Chain {
    pub id: ChainId,
    /// Nodes in route order; may begin or end at the depot.
    pub nodes: Vec<usize>,
    /// Lowest cost of any solution this fragment was mined from.
    pub sol_cost: f64,
    /// Number of pool members containing the fragment.
    pub freq: u32,
    /// Times the fragment seeded a partial solution.
    pub times_extracted: u32,
    /// Mean cost per internal arc.
    pub adj_cost: f64,
    /// Sum of internal arc costs.
    pub total_cost: f64,
    /// Total demand of the customers.
    pub demand: f64,
}

impl Chain {
    pub fn new(instance: &ProblemInstance, nodes: Vec<usize>, sol_cost: f64) -> Self {
        let total_cost = instance.path_cost(&nodes);
        let arcs = nodes.len().saturating_sub(1).max(1);
        Self {
            id: ChainId::of(&nodes),
            demand: nodes.iter().map(|&n| instance.demand(n)).sum(),
            adj_cost: total_cost / arcs as f64,
            total_cost,
            nodes,
            sol_cost,
            freq: 1,
            times_extracted: 0,
        }
    }

    /// Frequency not yet consumed by extraction.
    pub fn score(&self) -> i64 {
        self.freq as i64 - self.times_extracted as i64
    }

    /// Nodes other than the depot.
    pub fn customers(&self, depot: usize) -> impl Iterator<Item = usize> + '_ {
        self.nodes.iter().copied().filter(move |&n| n != depot)
    }
}
