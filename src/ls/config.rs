//! Local search configuration.

use crate::model::ProblemInstance;
use crate::moves::MoveKind;
use rand::Rng;

/// Categorical probabilities of the four neighborhoods.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MoveWeights {
    pub replace: f64,
    pub relocate: f64,
    pub swap: f64,
    pub two_opt: f64,
}

impl MoveWeights {
    /// Instance-derived weights.
    ///
    /// Replace gets `(1 - required / nodes) · replace_weight`, so it fades
    /// out when nearly every customer must be visited. Relocate and swap
    /// each take a third of the rest and 2-opt takes what remains.
    pub fn for_instance(instance: &ProblemInstance, replace_weight: f64) -> Self {
        let slack = 1.0 - instance.required_visits() as f64 / instance.num_nodes() as f64;
        let replace = (slack * replace_weight).clamp(0.0, 1.0);
        let relocate = 0.33 * (1.0 - replace);
        let swap = 0.33 * (1.0 - replace);
        Self {
            replace,
            relocate,
            swap,
            two_opt: (1.0 - replace - relocate - swap).max(0.0),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        let all = [self.replace, self.relocate, self.swap, self.two_opt];
        if all.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(format!("move weights must be non-negative, got {:?}", self));
        }
        let total: f64 = all.iter().sum();
        if (total - 1.0).abs() > 1e-6 {
            return Err(format!("move weights must sum to 1, got {}", total));
        }
        Ok(())
    }

    /// Draws a neighborhood.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> MoveKind {
        let roll: f64 = rng.random_range(0.0..1.0);
        if roll < self.replace {
            MoveKind::Replace
        } else if roll < self.replace + self.relocate {
            MoveKind::Relocate
        } else if roll < self.replace + self.relocate + self.swap {
            MoveKind::Swap
        } else {
            MoveKind::TwoOpt
        }
    }
}

/// Configuration for the promise-guided local search.
///
/// # Termination
///
/// The search stops once `max_non_improving` consecutive iterations fail to
/// improve the best solution and no customer is left unserved. A hard cap
/// of `iteration_cap_factor × max_non_improving` iterations bounds runs
/// where unserved customers never fit.
///
/// # Examples
///
/// ```
/// use u_fcvrp::ls::LocalSearchConfig;
///
/// let config = LocalSearchConfig::default()
///     .with_max_non_improving(500)
///     .with_guided_chance(0.25)
///     .with_arc_penalty(0.3);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LocalSearchConfig {
    /// Non-improving iterations before stopping. `None` means `2 · nodes²`.
    pub max_non_improving: Option<usize>,

    /// Multiplier on `max_non_improving` for the absolute iteration cap.
    pub iteration_cap_factor: usize,

    /// Lower bound (inclusive) of the promise reset period, drawn once per
    /// invocation.
    pub promise_reset_min: usize,

    /// Upper bound (exclusive) of the promise reset period.
    pub promise_reset_max: usize,

    /// Probability that an iteration ranks candidates by penalized cost.
    pub guided_chance: f64,

    /// Penalty weight λ in `(1 + λ·count) · cost`.
    pub arc_penalty: f64,

    /// Fraction of the solution's arcs penalized when a guided step stalls.
    pub penalty_fraction: f64,

    /// Scale of the replace probability.
    pub replace_weight: f64,

    /// Explicit neighborhood probabilities; derived from the instance if `None`.
    pub weights: Option<MoveWeights>,
}

impl Default for LocalSearchConfig {
    fn default() -> Self {
        Self {
            max_non_improving: None,
            iteration_cap_factor: 20,
            promise_reset_min: 75,
            promise_reset_max: 150,
            guided_chance: 0.33,
            arc_penalty: 0.225,
            penalty_fraction: 0.03,
            replace_weight: 0.5,
            weights: None,
        }
    }
}

impl LocalSearchConfig {
    pub fn with_max_non_improving(mut self, n: usize) -> Self {
        self.max_non_improving = Some(n);
        self
    }

    pub fn with_iteration_cap_factor(mut self, factor: usize) -> Self {
        self.iteration_cap_factor = factor;
        self
    }

    pub fn with_promise_reset(mut self, min: usize, max: usize) -> Self {
        self.promise_reset_min = min;
        self.promise_reset_max = max;
        self
    }

    pub fn with_guided_chance(mut self, p: f64) -> Self {
        self.guided_chance = p;
        self
    }

    pub fn with_arc_penalty(mut self, lambda: f64) -> Self {
        self.arc_penalty = lambda;
        self
    }

    pub fn with_penalty_fraction(mut self, fraction: f64) -> Self {
        self.penalty_fraction = fraction;
        self
    }

    pub fn with_replace_weight(mut self, w: f64) -> Self {
        self.replace_weight = w;
        self
    }

    pub fn with_weights(mut self, weights: MoveWeights) -> Self {
        self.weights = Some(weights);
        self
    }

    /// Non-improvement ceiling for `instance`.
    pub fn non_improving_ceiling(&self, instance: &ProblemInstance) -> usize {
        self.max_non_improving.unwrap_or_else(|| {
            let n = instance.num_nodes();
            2 * n * n
        })
    }

    /// Absolute iteration cap for `instance`.
    pub fn iteration_cap(&self, instance: &ProblemInstance) -> usize {
        let ceiling = self.non_improving_ceiling(instance);
        ceiling
            .saturating_mul(self.iteration_cap_factor)
            .max(ceiling.saturating_add(1))
    }

    /// Neighborhood probabilities for `instance`.
    pub fn move_weights(&self, instance: &ProblemInstance) -> MoveWeights {
        self.weights
            .unwrap_or_else(|| MoveWeights::for_instance(instance, self.replace_weight))
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_non_improving == Some(0) {
            return Err("max_non_improving must be positive".into());
        }
        if self.iteration_cap_factor == 0 {
            return Err("iteration_cap_factor must be positive".into());
        }
        if self.promise_reset_min == 0 || self.promise_reset_min >= self.promise_reset_max {
            return Err(format!(
                "promise reset range must satisfy 0 < min < max, got [{}, {})",
                self.promise_reset_min, self.promise_reset_max
            ));
        }
        if !(0.0..=1.0).contains(&self.guided_chance) {
            return Err(format!(
                "guided_chance must be in [0, 1], got {}",
                self.guided_chance
            ));
        }
        if self.arc_penalty < 0.0 || !self.arc_penalty.is_finite() {
            return Err(format!("arc_penalty must be >= 0, got {}", self.arc_penalty));
        }
        if self.penalty_fraction <= 0.0 || self.penalty_fraction > 1.0 {
            return Err(format!(
                "penalty_fraction must be in (0, 1], got {}",
                self.penalty_fraction
            ));
        }
        if !(0.0..=1.0).contains(&self.replace_weight) {
            return Err(format!(
                "replace_weight must be in [0, 1], got {}",
                self.replace_weight
            ));
        }
        if let Some(w) = &self.weights {
            w.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_default_config() {
        let config = LocalSearchConfig::default();
        assert_eq!(config.max_non_improving, None);
        assert_eq!(config.promise_reset_min, 75);
        assert_eq!(config.promise_reset_max, 150);
        assert!((config.guided_chance - 0.33).abs() < 1e-10);
        assert!((config.arc_penalty - 0.225).abs() < 1e-10);
        assert!((config.penalty_fraction - 0.03).abs() < 1e-10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_instance_defaults() {
        let inst = fixtures::surplus();
        let config = LocalSearchConfig::default();
        assert_eq!(config.non_improving_ceiling(&inst), 2 * 13 * 13);
        assert_eq!(config.iteration_cap(&inst), 2 * 13 * 13 * 20);

        let w = config.move_weights(&inst);
        let expected_replace = (1.0 - 6.0 / 13.0) * 0.5;
        assert!((w.replace - expected_replace).abs() < 1e-10);
        assert!((w.relocate - w.swap).abs() < 1e-10);
        assert!(w.validate().is_ok());
    }

    #[test]
    fn test_all_required_disables_replace() {
        let inst = fixtures::six_customers();
        let w = MoveWeights::for_instance(&inst, 0.5);
        // 6 of 7 nodes required: replace keeps a small share
        assert!((w.replace - (1.0 / 7.0) * 0.5).abs() < 1e-10);
    }

    #[test]
    fn test_sample_respects_zero_weights() {
        let w = MoveWeights {
            replace: 0.0,
            relocate: 0.0,
            swap: 1.0,
            two_opt: 0.0,
        };
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            assert_eq!(w.sample(&mut rng), MoveKind::Swap);
        }
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(LocalSearchConfig::default()
            .with_max_non_improving(0)
            .validate()
            .is_err());
        assert!(LocalSearchConfig::default()
            .with_promise_reset(10, 10)
            .validate()
            .is_err());
        assert!(LocalSearchConfig::default()
            .with_guided_chance(1.5)
            .validate()
            .is_err());
        assert!(LocalSearchConfig::default()
            .with_penalty_fraction(0.0)
            .validate()
            .is_err());
        let bad = MoveWeights {
            replace: 0.5,
            relocate: 0.5,
            swap: 0.5,
            two_opt: 0.0,
        };
        assert!(LocalSearchConfig::default()
            .with_weights(bad)
            .validate()
            .is_err());
    }

    #[test]
    fn test_builder_chain() {
        let config = LocalSearchConfig::default()
            .with_max_non_improving(300)
            .with_iteration_cap_factor(5)
            .with_promise_reset(10, 20)
            .with_guided_chance(0.5)
            .with_arc_penalty(0.1)
            .with_penalty_fraction(0.1)
            .with_replace_weight(0.2);
        assert_eq!(config.max_non_improving, Some(300));
        assert_eq!(config.iteration_cap_factor, 5);
        assert_eq!((config.promise_reset_min, config.promise_reset_max), (10, 20));
        assert!((config.replace_weight - 0.2).abs() < 1e-10);
        assert!(config.validate().is_ok());
    }
}
