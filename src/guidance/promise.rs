//! Arc-level promise thresholds.

#[inline(always)]
fn flatten_index(from: usize, to: usize, num_nodes: usize) -> usize {
    from * num_nodes + to
}

/// Dense `n × n` table of solution-cost thresholds.
///
/// After a move removes arc `(u, v)` from a solution of cost `c`, the
/// promise on `(u, v)` becomes `c`. A later move that would re-add `(u, v)`
/// is only worth considering if it reaches a cost strictly below `c`.
/// Unset entries are `+∞` and never prune.
///
/// # Examples
///
/// ```
/// use u_fcvrp::guidance::PromiseTable;
///
/// let mut promises = PromiseTable::new(4);
/// assert!(promises.allows(1, 2, 100.0));
///
/// promises.set(1, 2, 90.0);
/// assert!(promises.allows(1, 2, 89.0));
/// assert!(!promises.allows(1, 2, 90.0));
///
/// promises.reset();
/// assert!(promises.allows(1, 2, 1e12));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PromiseTable {
    data: Vec<f64>,
    num_nodes: usize,
}

impl PromiseTable {
    pub fn new(num_nodes: usize) -> Self {
        Self {
            data: vec![f64::INFINITY; num_nodes * num_nodes],
            num_nodes,
        }
    }

    /// Threshold on arc `(from, to)`.
    #[inline]
    pub fn get(&self, from: usize, to: usize) -> f64 {
        self.data[flatten_index(from, to, self.num_nodes)]
    }

    /// Whether re-adding `(from, to)` at `new_cost` keeps the promise.
    #[inline]
    pub fn allows(&self, from: usize, to: usize, new_cost: f64) -> bool {
        new_cost < self.get(from, to)
    }

    /// Whether every arc in `arcs` allows `new_cost`.
    pub fn allows_all(&self, arcs: &[(usize, usize)], new_cost: f64) -> bool {
        arcs.iter().all(|&(u, v)| self.allows(u, v, new_cost))
    }

    #[inline]
    pub fn set(&mut self, from: usize, to: usize, cost: f64) {
        self.data[flatten_index(from, to, self.num_nodes)] = cost;
    }

    pub fn set_all(&mut self, arcs: &[(usize, usize)], cost: f64) {
        for &(u, v) in arcs {
            self.set(u, v, cost);
        }
    }

    /// Forgets every promise.
    pub fn reset(&mut self) {
        self.data.fill(f64::INFINITY);
    }

    pub fn num_nodes(&self) -> usize {
        self.num_nodes
    }
}
