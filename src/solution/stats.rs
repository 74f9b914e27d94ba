//! Per-node usage counters for a single solver run.

use super::types::Solution;
use std::collections::HashSet;

/// How often each node was removed, inserted, or part of a best solution.
///
/// Owned by the solver and handed to the repair and selection policies;
/// the instance itself stays immutable.
#[derive(Debug, Clone, Default)]
pub struct NodeStats {
    times_removed: Vec<u32>,
    times_inserted: Vec<u32>,
    times_in_best: Vec<u32>,
}

impl NodeStats {
    pub fn new(num_nodes: usize) -> Self {
        Self {
            times_removed: vec![0; num_nodes],
            times_inserted: vec![0; num_nodes],
            times_in_best: vec![0; num_nodes],
        }
    }

    pub fn times_removed(&self, node: usize) -> u32 {
        self.times_removed[node]
    }

    pub fn times_inserted(&self, node: usize) -> u32 {
        self.times_inserted[node]
    }

    pub fn times_in_best(&self, node: usize) -> u32 {
        self.times_in_best[node]
    }

    /// Counts customers that left or entered between two solutions.
    pub fn record_transition(&mut self, before: &Solution, after: &Solution) {
        let old: HashSet<usize> = before.customer_set();
        let new: HashSet<usize> = after.customer_set();
        for &n in old.difference(&new) {
            self.times_removed[n] += 1;
        }
        for &n in new.difference(&old) {
            self.times_inserted[n] += 1;
        }
    }

    /// Credits every customer of a best solution.
    pub fn record_best(&mut self, best: &Solution) {
        for n in best.customers() {
            self.times_in_best[n] += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures;
    use crate::solution::Provenance;

    #[test]
    fn test_record_transition() {
        let inst = fixtures::surplus();
        let a = Solution::from_sequences(&inst, &[vec![1, 2], vec![3]], Provenance::Construction);
        let b = Solution::from_sequences(&inst, &[vec![1, 5], vec![3]], Provenance::Substitution);
        let mut stats = NodeStats::new(inst.num_nodes());
        stats.record_transition(&a, &b);
        assert_eq!(stats.times_removed(2), 1);
        assert_eq!(stats.times_inserted(5), 1);
        assert_eq!(stats.times_removed(1), 0);
        assert_eq!(stats.times_inserted(1), 0);
    }

    #[test]
    fn test_record_best() {
        let inst = fixtures::surplus();
        let a = Solution::from_sequences(&inst, &[vec![1, 2]], Provenance::Construction);
        let mut stats = NodeStats::new(inst.num_nodes());
        stats.record_best(&a);
        stats.record_best(&a);
        assert_eq!(stats.times_in_best(1), 2);
        assert_eq!(stats.times_in_best(3), 0);
    }
}
