//! Node position lookup.

use super::types::Solution;

/// Maps each routed customer to its `(route, position)`.
///
/// The locator borrows nothing; callers rebuild it after a structural
/// change, or refresh only the routes a move touched.
#[derive(Debug, Clone)]
pub struct NodeLocator {
    slots: Vec<Option<(usize, usize)>>,
}

impl NodeLocator {
    pub fn new(num_nodes: usize) -> Self {
        Self {
            slots: vec![None; num_nodes],
        }
    }

    pub fn from_solution(solution: &Solution, num_nodes: usize) -> Self {
        let mut locator = Self::new(num_nodes);
        locator.rebuild(solution);
        locator
    }

    /// Clears and re-indexes every route.
    pub fn rebuild(&mut self, solution: &Solution) {
        self.slots.iter_mut().for_each(|s| *s = None);
        for r in 0..solution.routes.len() {
            self.refresh_route(solution, r);
        }
    }

    /// Re-indexes the customers of route `r`.
    ///
    /// Customers that left the route must be cleared with
    /// [`NodeLocator::clear`] or a full rebuild.
    pub fn refresh_route(&mut self, solution: &Solution, r: usize) {
        let nodes = &solution.routes[r].nodes;
        for (pos, &node) in nodes.iter().enumerate().take(nodes.len() - 1).skip(1) {
            self.slots[node] = Some((r, pos));
        }
    }

    pub fn clear(&mut self, node: usize) {
        self.slots[node] = None;
    }

    #[inline]
    pub fn locate(&self, node: usize) -> Option<(usize, usize)> {
        self.slots[node]
    }

    #[inline]
    pub fn is_routed(&self, node: usize) -> bool {
        self.slots[node].is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures;
    use crate::solution::Provenance;

    #[test]
    fn test_locate_after_build() {
        let inst = fixtures::six_customers();
        let sol = Solution::from_sequences(&inst, &[vec![3, 1], vec![5]], Provenance::Construction);
        let loc = NodeLocator::from_solution(&sol, inst.num_nodes());
        assert_eq!(loc.locate(3), Some((0, 1)));
        assert_eq!(loc.locate(1), Some((0, 2)));
        assert_eq!(loc.locate(5), Some((1, 1)));
        assert!(!loc.is_routed(2));
        assert!(!loc.is_routed(0), "depot is never located");
    }

    #[test]
    fn test_rebuild_clears_stale_entries() {
        let inst = fixtures::six_customers();
        let mut sol = Solution::from_sequences(&inst, &[vec![1, 2]], Provenance::Construction);
        let mut loc = NodeLocator::from_solution(&sol, inst.num_nodes());
        sol.routes[0].remove(&inst, 1);
        loc.rebuild(&sol);
        assert!(!loc.is_routed(1));
        assert_eq!(loc.locate(2), Some((0, 1)));
    }
}
