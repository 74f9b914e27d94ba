//! Immutable F-CVRP instance.

use super::error::ModelError;

/// A group of interchangeable customers.
///
/// Exactly `required` members of the family must be visited; every member
/// carries the family's `demand`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Family {
    /// Member node ids.
    pub members: Vec<usize>,
    /// Number of members that must be visited.
    pub required: usize,
    /// Demand of each member.
    pub demand: f64,
}

impl Family {
    pub fn new(members: Vec<usize>, required: usize, demand: f64) -> Self {
        Self {
            members,
            required,
            demand,
        }
    }
}

/// A validated F-CVRP instance.
///
/// Nodes are dense indices `0..num_nodes()`. One of them is the depot, every
/// other node belongs to exactly one family. Costs are stored row-major.
///
/// # Examples
///
/// ```
/// use u_fcvrp::model::{Family, ProblemInstance};
///
/// let points = [(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (-1.0, 0.0)];
/// let families = vec![Family::new(vec![1, 2], 1, 2.0), Family::new(vec![3], 1, 1.0)];
/// let instance = ProblemInstance::from_points(&points, 0, families, 10.0, 1).unwrap();
///
/// assert_eq!(instance.num_customers(), 3);
/// assert_eq!(instance.required_visits(), 2);
/// assert!((instance.cost(0, 1) - 1.0).abs() < 1e-10);
/// ```
#[derive(Debug, Clone)]
pub struct ProblemInstance {
    num_nodes: usize,
    depot: usize,
    capacity: f64,
    vehicles: usize,
    families: Vec<Family>,
    costs: Vec<f64>,
    demands: Vec<f64>,
    family_of: Vec<Option<usize>>,
    customers: Vec<usize>,
    required_visits: usize,
}

impl ProblemInstance {
    /// Builds an instance from a full cost matrix.
    pub fn new(
        cost_matrix: Vec<Vec<f64>>,
        depot: usize,
        families: Vec<Family>,
        capacity: f64,
        vehicles: usize,
    ) -> Result<Self, ModelError> {
        let n = cost_matrix.len();
        let mut costs = Vec::with_capacity(n * n);
        for (row, values) in cost_matrix.iter().enumerate() {
            if values.len() != n {
                return Err(ModelError::NonSquareMatrix {
                    rows: n,
                    row,
                    len: values.len(),
                });
            }
            for (col, &c) in values.iter().enumerate() {
                if !c.is_finite() || c < 0.0 {
                    return Err(ModelError::InvalidCost {
                        from: row,
                        to: col,
                        cost: c,
                    });
                }
            }
            costs.extend_from_slice(values);
        }
        Self::from_flat(n, costs, depot, families, capacity, vehicles)
    }

    /// Builds an instance with Euclidean costs between 2D points.
    pub fn from_points(
        points: &[(f64, f64)],
        depot: usize,
        families: Vec<Family>,
        capacity: f64,
        vehicles: usize,
    ) -> Result<Self, ModelError> {
        let n = points.len();
        let mut costs = vec![0.0; n * n];
        for (i, &(xi, yi)) in points.iter().enumerate() {
            for (j, &(xj, yj)) in points.iter().enumerate() {
                costs[i * n + j] = ((xi - xj).powi(2) + (yi - yj).powi(2)).sqrt();
            }
        }
        Self::from_flat(n, costs, depot, families, capacity, vehicles)
    }

    fn from_flat(
        n: usize,
        costs: Vec<f64>,
        depot: usize,
        families: Vec<Family>,
        capacity: f64,
        vehicles: usize,
    ) -> Result<Self, ModelError> {
        if depot >= n {
            return Err(ModelError::DepotOutOfRange { depot, nodes: n });
        }
        if capacity <= 0.0 || !capacity.is_finite() {
            return Err(ModelError::InvalidCapacity(capacity));
        }
        if vehicles == 0 {
            return Err(ModelError::NoVehicles);
        }

        let mut family_of: Vec<Option<usize>> = vec![None; n];
        let mut demands = vec![0.0; n];
        let mut required_visits = 0;

        for (fid, family) in families.iter().enumerate() {
            if family.members.is_empty() {
                return Err(ModelError::EmptyFamily { family: fid });
            }
            if !family.demand.is_finite() || family.demand < 0.0 {
                return Err(ModelError::InvalidDemand {
                    family: fid,
                    demand: family.demand,
                });
            }
            if family.required > family.members.len() {
                return Err(ModelError::QuotaExceedsMembers {
                    family: fid,
                    required: family.required,
                    members: family.members.len(),
                });
            }
            for &node in &family.members {
                if node >= n || node == depot {
                    return Err(ModelError::InvalidMember { family: fid, node });
                }
                if let Some(first) = family_of[node] {
                    return Err(ModelError::SharedNode {
                        node,
                        first,
                        second: fid,
                    });
                }
                family_of[node] = Some(fid);
                demands[node] = family.demand;
            }
            required_visits += family.required;
        }

        if let Some(node) = (0..n).find(|&i| i != depot && family_of[i].is_none()) {
            return Err(ModelError::Orphan { node });
        }

        let customers = (0..n).filter(|&i| i != depot).collect();

        Ok(Self {
            num_nodes: n,
            depot,
            capacity,
            vehicles,
            families,
            costs,
            demands,
            family_of,
            customers,
            required_visits,
        })
    }

    pub fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    pub fn depot(&self) -> usize {
        self.depot
    }

    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    pub fn vehicles(&self) -> usize {
        self.vehicles
    }

    pub fn families(&self) -> &[Family] {
        &self.families
    }

    /// All non-depot nodes in ascending order.
    pub fn customers(&self) -> &[usize] {
        &self.customers
    }

    pub fn num_customers(&self) -> usize {
        self.customers.len()
    }

    /// Sum of all family quotas.
    pub fn required_visits(&self) -> usize {
        self.required_visits
    }

    /// Travel cost of arc `(from, to)`.
    #[inline]
    pub fn cost(&self, from: usize, to: usize) -> f64 {
        self.costs[from * self.num_nodes + to]
    }

    #[inline]
    pub fn demand(&self, node: usize) -> f64 {
        self.demands[node]
    }

    /// Family of `node`, `None` for the depot.
    #[inline]
    pub fn family_of(&self, node: usize) -> Option<usize> {
        self.family_of[node]
    }

    /// Total cost of all arcs leaving `node`.
    pub fn outgoing_cost(&self, node: usize) -> f64 {
        let row = node * self.num_nodes;
        self.costs[row..row + self.num_nodes].iter().sum()
    }

    /// Cost of walking `nodes` in order.
    pub fn path_cost(&self, nodes: &[usize]) -> f64 {
        nodes.windows(2).map(|w| self.cost(w[0], w[1])).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Vec<(f64, f64)> {
        vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]
    }

    #[test]
    fn test_from_points_costs() {
        let families = vec![Family::new(vec![1, 2, 3], 2, 1.0)];
        let inst = ProblemInstance::from_points(&square(), 0, families, 5.0, 1).unwrap();
        assert_eq!(inst.num_nodes(), 4);
        assert!((inst.cost(0, 2) - 2f64.sqrt()).abs() < 1e-10);
        assert!((inst.cost(2, 0) - inst.cost(0, 2)).abs() < 1e-10);
        assert_eq!(inst.customers(), &[1, 2, 3]);
        assert_eq!(inst.required_visits(), 2);
        assert_eq!(inst.family_of(0), None);
        assert_eq!(inst.family_of(3), Some(0));
        assert!((inst.demand(2) - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_non_square_matrix() {
        let m = vec![vec![0.0, 1.0], vec![1.0]];
        let err = ProblemInstance::new(m, 0, vec![Family::new(vec![1], 1, 1.0)], 5.0, 1);
        assert!(matches!(err, Err(ModelError::NonSquareMatrix { row: 1, .. })));
    }

    #[test]
    fn test_negative_cost_rejected() {
        let m = vec![vec![0.0, -1.0], vec![1.0, 0.0]];
        let err = ProblemInstance::new(m, 0, vec![Family::new(vec![1], 1, 1.0)], 5.0, 1);
        assert!(matches!(err, Err(ModelError::InvalidCost { from: 0, to: 1, .. })));
    }

    #[test]
    fn test_orphan_node_rejected() {
        let families = vec![Family::new(vec![1, 2], 1, 1.0)];
        let err = ProblemInstance::from_points(&square(), 0, families, 5.0, 1);
        assert_eq!(err.unwrap_err(), ModelError::Orphan { node: 3 });
    }

    #[test]
    fn test_shared_node_rejected() {
        let families = vec![
            Family::new(vec![1, 2], 1, 1.0),
            Family::new(vec![2, 3], 1, 1.0),
        ];
        let err = ProblemInstance::from_points(&square(), 0, families, 5.0, 1);
        assert_eq!(
            err.unwrap_err(),
            ModelError::SharedNode {
                node: 2,
                first: 0,
                second: 1
            }
        );
    }

    #[test]
    fn test_quota_and_depot_checks() {
        let families = vec![Family::new(vec![1, 2, 3], 4, 1.0)];
        assert!(matches!(
            ProblemInstance::from_points(&square(), 0, families, 5.0, 1),
            Err(ModelError::QuotaExceedsMembers { .. })
        ));

        let families = vec![Family::new(vec![0, 1, 2, 3], 1, 1.0)];
        assert!(matches!(
            ProblemInstance::from_points(&square(), 0, families, 5.0, 1),
            Err(ModelError::InvalidMember { node: 0, .. })
        ));

        let families = vec![Family::new(vec![1, 2, 3], 1, 1.0)];
        assert!(matches!(
            ProblemInstance::from_points(&square(), 9, families, 5.0, 1),
            Err(ModelError::DepotOutOfRange { depot: 9, .. })
        ));
    }

    #[test]
    fn test_capacity_and_vehicles_checks() {
        let fam = || vec![Family::new(vec![1, 2, 3], 1, 1.0)];
        assert_eq!(
            ProblemInstance::from_points(&square(), 0, fam(), 0.0, 1).unwrap_err(),
            ModelError::InvalidCapacity(0.0)
        );
        assert_eq!(
            ProblemInstance::from_points(&square(), 0, fam(), 5.0, 0).unwrap_err(),
            ModelError::NoVehicles
        );
    }

    #[test]
    fn test_path_and_outgoing_cost() {
        let families = vec![Family::new(vec![1, 2, 3], 3, 1.0)];
        let inst = ProblemInstance::from_points(&square(), 0, families, 5.0, 1).unwrap();
        assert!((inst.path_cost(&[0, 1, 2, 3, 0]) - 4.0).abs() < 1e-10);
        let expected = 1.0 + 2f64.sqrt() + 1.0;
        assert!((inst.outgoing_cost(0) - expected).abs() < 1e-10);
    }
}
