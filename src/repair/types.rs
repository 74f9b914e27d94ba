//! Repair contract and configuration.

use crate::model::ProblemInstance;
use crate::solution::{NodeStats, Solution};
use std::time::{Duration, Instant};

/// Read-only state handed to a [`Repairer`] for one call.
#[derive(Debug, Clone, Copy)]
pub struct RepairContext<'a> {
    /// Hard stop for the call, if any.
    pub deadline: Option<Instant>,

    /// Usage counters of the current solver run.
    pub node_stats: &'a NodeStats,

    /// Discount on the saving of removing a node, per previous removal.
    pub times_removed_penalty: f64,
}

impl RepairContext<'_> {
    /// Whether the deadline has passed.
    pub fn expired(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }
}

/// Completes or reshapes solutions between local search rounds.
///
/// Both operations may return a copy of their input when they find
/// nothing to do or run out of time. Callers check feasibility on the
/// result.
pub trait Repairer: Send + Sync {
    /// Returns a human-readable name for this repairer.
    fn name(&self) -> &str;

    /// Fills the quota gaps of a partial solution.
    ///
    /// The customers already routed in `partial` stay routed.
    fn restore(
        &self,
        instance: &ProblemInstance,
        partial: &Solution,
        ctx: &RepairContext<'_>,
    ) -> Solution;

    /// Exchanges up to `max_removals` routed customers for unrouted
    /// members of the same families.
    fn substitute(
        &self,
        instance: &ProblemInstance,
        solution: &Solution,
        max_removals: usize,
        ctx: &RepairContext<'_>,
    ) -> Solution;
}

/// Configuration for repair calls made by the solver.
///
/// # Examples
///
/// ```
/// use u_fcvrp::repair::RepairConfig;
///
/// let config = RepairConfig::default()
///     .with_time_limit_ms(250)
///     .with_times_removed_penalty(0.2);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RepairConfig {
    /// Time budget per repair call in milliseconds.
    pub time_limit_ms: u64,

    /// See [`RepairContext::times_removed_penalty`].
    pub times_removed_penalty: f64,
}

impl Default for RepairConfig {
    fn default() -> Self {
        Self {
            time_limit_ms: 1000,
            times_removed_penalty: 0.1,
        }
    }
}

impl RepairConfig {
    pub fn with_time_limit_ms(mut self, ms: u64) -> Self {
        self.time_limit_ms = ms;
        self
    }

    pub fn with_times_removed_penalty(mut self, penalty: f64) -> Self {
        self.times_removed_penalty = penalty;
        self
    }

    /// Deadline for a call starting now, capped by `outer`.
    pub fn deadline(&self, outer: Option<Instant>) -> Instant {
        let own = Instant::now() + Duration::from_millis(self.time_limit_ms);
        match outer {
            Some(limit) => own.min(limit),
            None => own,
        }
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.time_limit_ms == 0 {
            return Err("time_limit_ms must be positive".into());
        }
        if self.times_removed_penalty < 0.0 || !self.times_removed_penalty.is_finite() {
            return Err(format!(
                "times_removed_penalty must be >= 0, got {}",
                self.times_removed_penalty
            ));
        }
        Ok(())
    }
}
