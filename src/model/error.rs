//! Instance validation errors.

/// Reasons a [`ProblemInstance`](super::ProblemInstance) cannot be built.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelError {
    /// The cost matrix is not `n × n`.
    NonSquareMatrix { rows: usize, row: usize, len: usize },
    /// The depot index does not name a node.
    DepotOutOfRange { depot: usize, nodes: usize },
    /// A family has no members.
    EmptyFamily { family: usize },
    /// A family lists a node that does not exist or is the depot.
    InvalidMember { family: usize, node: usize },
    /// A node is listed by two families.
    SharedNode { node: usize, first: usize, second: usize },
    /// A non-depot node belongs to no family.
    Orphan { node: usize },
    /// A family requires more visits than it has members.
    QuotaExceedsMembers {
        family: usize,
        required: usize,
        members: usize,
    },
    /// Demand is negative or not finite.
    InvalidDemand { family: usize, demand: f64 },
    /// Capacity is not strictly positive.
    InvalidCapacity(f64),
    /// At least one vehicle is needed.
    NoVehicles,
    /// An arc cost is negative or not finite.
    InvalidCost { from: usize, to: usize, cost: f64 },
}

impl std::fmt::Display for ModelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelError::NonSquareMatrix { rows, row, len } => write!(
                f,
                "cost matrix must be square: row {} has {} entries, expected {}",
                row, len, rows
            ),
            ModelError::DepotOutOfRange { depot, nodes } => {
                write!(f, "depot {} out of range for {} nodes", depot, nodes)
            }
            ModelError::EmptyFamily { family } => write!(f, "family {} has no members", family),
            ModelError::InvalidMember { family, node } => {
                write!(f, "family {} lists invalid node {}", family, node)
            }
            ModelError::SharedNode {
                node,
                first,
                second,
            } => write!(
                f,
                "node {} belongs to families {} and {}",
                node, first, second
            ),
            ModelError::Orphan { node } => write!(f, "node {} belongs to no family", node),
            ModelError::QuotaExceedsMembers {
                family,
                required,
                members,
            } => write!(
                f,
                "family {} requires {} visits but has {} members",
                family, required, members
            ),
            ModelError::InvalidDemand { family, demand } => {
                write!(f, "family {} has invalid demand {}", family, demand)
            }
            ModelError::InvalidCapacity(c) => write!(f, "capacity must be positive, got {}", c),
            ModelError::NoVehicles => write!(f, "at least one vehicle is required"),
            ModelError::InvalidCost { from, to, cost } => {
                write!(f, "invalid cost {} on arc ({}, {})", cost, from, to)
            }
        }
    }
}

impl std::error::Error for ModelError {}
