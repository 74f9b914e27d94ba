//! Constraint diagnostics.

/// Constraint violations found in a solution.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeasibilityReport {
    /// `(family, visited, required)` for every family off quota.
    pub quota_violations: Vec<(usize, usize, usize)>,
    /// Routes whose load exceeds capacity.
    pub overloaded_routes: Vec<usize>,
    /// Customers visited more than once.
    pub duplicate_customers: Vec<usize>,
    /// Routes not framed by the depot, or with the depot inside.
    pub malformed_routes: Vec<usize>,
    /// `(actual, expected)` when the route count differs from the fleet size.
    pub route_count: Option<(usize, usize)>,
}

impl FeasibilityReport {
    pub fn is_feasible(&self) -> bool {
        self.quota_violations.is_empty()
            && self.overloaded_routes.is_empty()
            && self.duplicate_customers.is_empty()
            && self.malformed_routes.is_empty()
            && self.route_count.is_none()
    }
}

impl std::fmt::Display for FeasibilityReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_feasible() {
            return write!(f, "feasible");
        }
        let mut parts = Vec::new();
        for &(family, visited, required) in &self.quota_violations {
            parts.push(format!(
                "family {family} visited {visited}/{required}"
            ));
        }
        for r in &self.overloaded_routes {
            parts.push(format!("route {r} over capacity"));
        }
        for c in &self.duplicate_customers {
            parts.push(format!("customer {c} repeated"));
        }
        for r in &self.malformed_routes {
            parts.push(format!("route {r} malformed"));
        }
        if let Some((actual, expected)) = self.route_count {
            parts.push(format!("{actual} routes, expected {expected}"));
        }
        write!(f, "{}", parts.join("; "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_feasible() {
        let report = FeasibilityReport::default();
        assert!(report.is_feasible());
        assert_eq!(report.to_string(), "feasible");
    }

    #[test]
    fn test_display_lists_violations() {
        let report = FeasibilityReport {
            quota_violations: vec![(1, 2, 3)],
            route_count: Some((4, 3)),
            ..Default::default()
        };
        assert!(!report.is_feasible());
        assert_eq!(
            report.to_string(),
            "family 1 visited 2/3; 4 routes, expected 3"
        );
    }
}
