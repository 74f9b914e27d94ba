//! Guided-local-search arc penalties.
//!
//! Penalized costs are never stored: the true cost matrix stays the single
//! source of truth and `(1 + λ·count) · cost` is evaluated on demand.

use crate::model::ProblemInstance;
use crate::solution::Solution;

/// Per-arc penalty counters with weight `lambda`.
#[derive(Debug, Clone, PartialEq)]
pub struct ArcPenalties {
    counts: Vec<u32>,
    num_nodes: usize,
    lambda: f64,
}

impl ArcPenalties {
    pub fn new(num_nodes: usize, lambda: f64) -> Self {
        Self {
            counts: vec![0; num_nodes * num_nodes],
            num_nodes,
            lambda,
        }
    }

    #[inline]
    pub fn count(&self, from: usize, to: usize) -> u32 {
        self.counts[from * self.num_nodes + to]
    }

    pub fn lambda(&self) -> f64 {
        self.lambda
    }

    /// Penalized cost of arc `(from, to)`.
    #[inline]
    pub fn penalized_cost(&self, instance: &ProblemInstance, from: usize, to: usize) -> f64 {
        (1.0 + self.lambda * self.count(from, to) as f64) * instance.cost(from, to)
    }

    /// Penalized delta of a move that adds `added` and removes `removed`.
    pub fn penalized_delta(
        &self,
        instance: &ProblemInstance,
        added: &[(usize, usize)],
        removed: &[(usize, usize)],
    ) -> f64 {
        let add: f64 = added
            .iter()
            .map(|&(u, v)| self.penalized_cost(instance, u, v))
            .sum();
        let rem: f64 = removed
            .iter()
            .map(|&(u, v)| self.penalized_cost(instance, u, v))
            .sum();
        add - rem
    }

    /// Penalizes the highest-utility arcs of `solution`.
    ///
    /// Utility is `cost / (1 + count)`. The top `ceil(fraction · arcs)` arcs
    /// (at least one) get their count incremented; ties keep route order.
    /// Returns the penalized arcs.
    pub fn penalize(
        &mut self,
        instance: &ProblemInstance,
        solution: &Solution,
        fraction: f64,
    ) -> Vec<(usize, usize)> {
        let mut ranked: Vec<((usize, usize), f64)> = solution
            .arcs()
            .filter(|&(u, v)| u != v)
            .map(|(u, v)| ((u, v), instance.cost(u, v) / (1.0 + self.count(u, v) as f64)))
            .collect();
        if ranked.is_empty() {
            return Vec::new();
        }
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        let take = ((ranked.len() as f64 * fraction).ceil() as usize).clamp(1, ranked.len());
        let chosen: Vec<(usize, usize)> = ranked.into_iter().take(take).map(|(a, _)| a).collect();
        for &(u, v) in &chosen {
            let idx = u * self.num_nodes + v;
            self.counts[idx] = self.counts[idx].saturating_add(1);
        }
        chosen
    }

    pub fn reset(&mut self) {
        self.counts.fill(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures;
    use crate::solution::Provenance;

    #[test]
    fn test_penalized_cost_formula() {
        let inst = fixtures::six_customers();
        let mut pen = ArcPenalties::new(inst.num_nodes(), 0.5);
        let base = inst.cost(0, 3);
        assert!((pen.penalized_cost(&inst, 0, 3) - base).abs() < 1e-10);

        let sol = Solution::from_sequences(&inst, &[vec![3]], Provenance::Construction);
        pen.penalize(&inst, &sol, 0.01);
        assert_eq!(pen.count(0, 3), 1);
        assert!((pen.penalized_cost(&inst, 0, 3) - 1.5 * base).abs() < 1e-10);
    }

    #[test]
    fn test_penalize_picks_costliest_arcs() {
        let inst = fixtures::six_customers();
        let mut pen = ArcPenalties::new(inst.num_nodes(), 0.225);
        // arcs: 0-1 (1), 1-3 (2), 3-0 (3), 0-6 (3), 6-4 (2), 4-0 (1)
        let sol = Solution::from_sequences(&inst, &[vec![1, 3], vec![6, 4]], Provenance::Construction);
        let chosen = pen.penalize(&inst, &sol, 0.3);
        assert_eq!(chosen.len(), 2, "ceil(6 * 0.3) = 2");
        assert!(chosen.contains(&(3, 0)));
        assert!(chosen.contains(&(0, 6)));

        // After one penalty, 3-0 utility is 1.5, so the 2.0 arcs outrank it.
        let chosen = pen.penalize(&inst, &sol, 0.01);
        assert_eq!(chosen.len(), 1);
        assert!(chosen[0] == (1, 3) || chosen[0] == (6, 4), "got {:?}", chosen);
    }

    #[test]
    fn test_penalized_delta_and_reset() {
        let inst = fixtures::six_customers();
        let mut pen = ArcPenalties::new(inst.num_nodes(), 1.0);
        let sol = Solution::from_sequences(&inst, &[vec![3]], Provenance::Construction);
        pen.penalize(&inst, &sol, 1.0);
        let d = pen.penalized_delta(&inst, &[(0, 1)], &[(0, 3)]);
        assert!((d - (1.0 - 6.0)).abs() < 1e-10, "got {d}");
        pen.reset();
        assert_eq!(pen.count(0, 3), 0);
    }

    #[test]
    fn test_penalize_empty_solution() {
        let inst = fixtures::six_customers();
        let mut pen = ArcPenalties::new(inst.num_nodes(), 0.2);
        let sol = Solution::empty(&inst, Provenance::Construction);
        assert!(pen.penalize(&inst, &sol, 0.5).is_empty());
    }
}
