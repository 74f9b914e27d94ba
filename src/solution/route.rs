//! A single vehicle route.

use crate::model::ProblemInstance;

/// Slack allowed when comparing loads against capacity.
pub(crate) const LOAD_TOLERANCE: f64 = 1e-9;

/// An ordered node sequence that starts and ends at the depot.
///
/// `cost` and `load` are maintained incrementally by the move operators;
/// [`Route::recompute`] rebuilds them from the sequence.
///
/// # Examples
///
/// ```
/// use u_fcvrp::model::{Family, ProblemInstance};
/// use u_fcvrp::solution::Route;
///
/// let points = [(0.0, 0.0), (3.0, 0.0), (3.0, 4.0)];
/// let fams = vec![Family::new(vec![1, 2], 2, 1.0)];
/// let inst = ProblemInstance::from_points(&points, 0, fams, 5.0, 1).unwrap();
///
/// let route = Route::from_customers(&inst, &[1, 2]);
/// assert_eq!(route.nodes, vec![0, 1, 2, 0]);
/// assert!((route.cost - 12.0).abs() < 1e-10);
/// assert!((route.load - 2.0).abs() < 1e-10);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Route {
    /// Node sequence including the depot at both ends.
    pub nodes: Vec<usize>,
    /// Travel cost of the sequence.
    pub cost: f64,
    /// Total demand of the customers.
    pub load: f64,
    /// Vehicle capacity.
    pub capacity: f64,
}

impl Route {
    /// Depot-to-depot route with no customers.
    pub fn empty(instance: &ProblemInstance) -> Self {
        Self::from_customers(instance, &[])
    }

    /// Builds a depot-framed route visiting `customers` in order.
    pub fn from_customers(instance: &ProblemInstance, customers: &[usize]) -> Self {
        let depot = instance.depot();
        let mut nodes = Vec::with_capacity(customers.len() + 2);
        nodes.push(depot);
        nodes.extend_from_slice(customers);
        nodes.push(depot);
        let mut route = Self {
            nodes,
            cost: 0.0,
            load: 0.0,
            capacity: instance.capacity(),
        };
        route.recompute(instance);
        route
    }

    /// Rebuilds `cost` and `load` from the node sequence.
    pub fn recompute(&mut self, instance: &ProblemInstance) {
        self.cost = instance.path_cost(&self.nodes);
        self.load = self.nodes.iter().map(|&n| instance.demand(n)).sum();
    }

    /// Customers between the two depot visits.
    pub fn customers(&self) -> &[usize] {
        &self.nodes[1..self.nodes.len() - 1]
    }

    pub fn num_customers(&self) -> usize {
        self.nodes.len() - 2
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 2
    }

    /// Number of positions including both depot visits.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether `extra` more demand fits.
    pub fn fits(&self, extra: f64) -> bool {
        self.load + extra <= self.capacity + LOAD_TOLERANCE
    }

    /// `prefix[i]` is the load of `nodes[0..=i]`.
    pub fn prefix_loads(&self, instance: &ProblemInstance) -> Vec<f64> {
        let mut acc = 0.0;
        self.nodes
            .iter()
            .map(|&n| {
                acc += instance.demand(n);
                acc
            })
            .collect()
    }

    /// Cost change of inserting `node` between positions `pos` and `pos + 1`.
    pub fn insertion_delta(&self, instance: &ProblemInstance, pos: usize, node: usize) -> f64 {
        let a = self.nodes[pos];
        let b = self.nodes[pos + 1];
        instance.cost(a, node) + instance.cost(node, b) - instance.cost(a, b)
    }

    /// Cheapest insertion slot for `node`, ignoring capacity.
    pub fn best_insertion(&self, instance: &ProblemInstance, node: usize) -> (usize, f64) {
        let mut best = (0, f64::INFINITY);
        for pos in 0..self.nodes.len() - 1 {
            let delta = self.insertion_delta(instance, pos, node);
            if delta < best.1 {
                best = (pos, delta);
            }
        }
        best
    }

    /// Inserts `node` after position `pos`, updating cost and load.
    pub fn insert(&mut self, instance: &ProblemInstance, pos: usize, node: usize) {
        self.cost += self.insertion_delta(instance, pos, node);
        self.load += instance.demand(node);
        self.nodes.insert(pos + 1, node);
    }

    /// Removes the customer at `pos`, updating cost and load.
    pub fn remove(&mut self, instance: &ProblemInstance, pos: usize) -> usize {
        let a = self.nodes[pos - 1];
        let b = self.nodes[pos];
        let c = self.nodes[pos + 1];
        self.cost += instance.cost(a, c) - instance.cost(a, b) - instance.cost(b, c);
        self.load -= instance.demand(b);
        self.nodes.remove(pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures;

    #[test]
    fn test_empty_route() {
        let inst = fixtures::six_customers();
        let route = Route::empty(&inst);
        assert!(route.is_empty());
        assert_eq!(route.nodes, vec![0, 0]);
        assert_eq!(route.num_customers(), 0);
        assert!(route.cost.abs() < 1e-10);
        assert!(route.customers().is_empty());
    }

    #[test]
    fn test_insert_remove_incremental() {
        let inst = fixtures::six_customers();
        let mut route = Route::from_customers(&inst, &[1, 2]);
        route.insert(&inst, 2, 3);
        assert_eq!(route.nodes, vec![0, 1, 2, 3, 0]);
        assert!((route.cost - inst.path_cost(&route.nodes)).abs() < 1e-10);
        assert!((route.load - 6.0).abs() < 1e-10);

        let removed = route.remove(&inst, 1);
        assert_eq!(removed, 1);
        assert!((route.cost - inst.path_cost(&route.nodes)).abs() < 1e-10);
        assert!((route.load - 4.0).abs() < 1e-10);
    }

    #[test]
    fn test_best_insertion_and_fits() {
        let inst = fixtures::six_customers();
        let route = Route::from_customers(&inst, &[1, 3]);
        let (pos, delta) = route.best_insertion(&inst, 2);
        assert_eq!(pos, 1, "2 belongs between 1 and 3");
        assert!(delta.abs() < 1e-10, "collinear insertion is free, got {delta}");
        assert!(route.fits(6.0));
        assert!(!route.fits(6.5));
    }

    #[test]
    fn test_prefix_loads() {
        let inst = fixtures::six_customers();
        let route = Route::from_customers(&inst, &[1, 4]);
        let prefix = route.prefix_loads(&inst);
        assert_eq!(prefix.len(), 4);
        assert!((prefix[1] - 2.0).abs() < 1e-10);
        assert!((prefix[3] - 5.0).abs() < 1e-10);
    }
}
