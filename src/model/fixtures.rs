//! Shared test instances.

use super::{Family, ProblemInstance};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Depot plus six customers in two families of three, all required.
///
/// Demands are 2 and 3, capacity 10, two vehicles.
pub fn six_customers() -> ProblemInstance {
    let points = [
        (0.0, 0.0),
        (1.0, 0.0),
        (2.0, 0.0),
        (3.0, 0.0),
        (0.0, 1.0),
        (0.0, 2.0),
        (0.0, 3.0),
    ];
    let families = vec![
        Family::new(vec![1, 2, 3], 3, 2.0),
        Family::new(vec![4, 5, 6], 3, 3.0),
    ];
    ProblemInstance::from_points(&points, 0, families, 10.0, 2).unwrap()
}

/// Depot plus twelve customers in three families of four, two required each.
pub fn surplus() -> ProblemInstance {
    let points = [
        (0.0, 0.0),
        (2.0, 1.0),
        (4.0, 2.0),
        (-3.0, 1.0),
        (5.0, -2.0),
        (1.0, 4.0),
        (-2.0, 5.0),
        (3.0, 6.0),
        (-4.0, -3.0),
        (0.0, -5.0),
        (6.0, 3.0),
        (-6.0, 2.0),
        (2.0, -4.0),
    ];
    let families = vec![
        Family::new(vec![1, 4, 7, 10], 2, 1.0),
        Family::new(vec![2, 5, 8, 11], 2, 2.0),
        Family::new(vec![3, 6, 9, 12], 2, 3.0),
    ];
    ProblemInstance::from_points(&points, 0, families, 8.0, 3).unwrap()
}

/// Random Euclidean instance with a capacity that leaves slack.
pub fn random(seed: u64, num_families: usize, members: usize, vehicles: usize) -> ProblemInstance {
    let mut rng = StdRng::seed_from_u64(seed);
    let n = 1 + num_families * members;
    let points: Vec<(f64, f64)> = (0..n)
        .map(|_| (rng.random_range(0.0..100.0), rng.random_range(0.0..100.0)))
        .collect();

    let mut families = Vec::with_capacity(num_families);
    let mut required_demand = 0.0;
    let mut max_demand: f64 = 0.0;
    for f in 0..num_families {
        let nodes: Vec<usize> = (0..members).map(|m| 1 + f * members + m).collect();
        let required = rng.random_range(1..=members);
        let demand = rng.random_range(1..=5) as f64;
        required_demand += demand * required as f64;
        max_demand = max_demand.max(demand);
        families.push(Family::new(nodes, required, demand));
    }

    let capacity = (required_demand * 1.5 / vehicles as f64).ceil().max(max_demand * 2.0);
    ProblemInstance::from_points(&points, 0, families, capacity, vehicles).unwrap()
}
