//! Solver configuration.

use crate::ls::LocalSearchConfig;
use crate::memory::MemoryConfig;
use crate::model::ProblemInstance;
use crate::repair::RepairConfig;

/// Configuration for the full F-CVRP solver.
///
/// # Termination
///
/// The round loop stops when more than `restart_ceiling` consecutive rounds
/// fail to improve the incumbent, when `max_rounds` is reached, when the wall-clock
/// budget runs out, or when cancelled.
///
/// # Examples
///
/// ```
/// use u_fcvrp::ls::LocalSearchConfig;
/// use u_fcvrp::solver::SolverConfig;
///
/// let config = SolverConfig::default()
///     .with_local_search(LocalSearchConfig::default().with_max_non_improving(1000))
///     .with_restart_ceiling(10)
///     .with_time_limit_ms(5_000)
///     .with_seed(42);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SolverConfig {
    /// Local search run every round.
    pub local_search: LocalSearchConfig,

    /// Adaptive memory pool.
    pub memory: MemoryConfig,

    /// Budget and penalty handed to the repairer.
    pub repair: RepairConfig,

    /// Probability that a round restarts from an adaptive-memory partial
    /// solution rather than a substitution of the round's best.
    pub adaptive_memory_chance: f64,

    /// Non-improving rounds tolerated; one more stops the run. `None` means
    /// `max(1, nodes / 2)`.
    pub restart_ceiling: Option<usize>,

    /// Hard cap on rounds.
    pub max_rounds: Option<usize>,

    /// Wall-clock budget in milliseconds.
    pub time_limit_ms: Option<u64>,

    /// Random seed for reproducibility.
    pub seed: Option<u64>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            local_search: LocalSearchConfig::default(),
            memory: MemoryConfig::default(),
            repair: RepairConfig::default(),
            adaptive_memory_chance: 0.8,
            restart_ceiling: None,
            max_rounds: None,
            time_limit_ms: None,
            seed: None,
        }
    }
}

impl SolverConfig {
    pub fn with_local_search(mut self, config: LocalSearchConfig) -> Self {
        self.local_search = config;
        self
    }

    pub fn with_memory(mut self, config: MemoryConfig) -> Self {
        self.memory = config;
        self
    }

    pub fn with_repair(mut self, config: RepairConfig) -> Self {
        self.repair = config;
        self
    }

    pub fn with_adaptive_memory_chance(mut self, p: f64) -> Self {
        self.adaptive_memory_chance = p;
        self
    }

    pub fn with_restart_ceiling(mut self, n: usize) -> Self {
        self.restart_ceiling = Some(n);
        self
    }

    pub fn with_max_rounds(mut self, n: usize) -> Self {
        self.max_rounds = Some(n);
        self
    }

    pub fn with_time_limit_ms(mut self, ms: u64) -> Self {
        self.time_limit_ms = Some(ms);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Non-improving round ceiling for `instance`.
    pub fn resolved_restart_ceiling(&self, instance: &ProblemInstance) -> usize {
        self.restart_ceiling
            .unwrap_or_else(|| (instance.num_nodes() / 2).max(1))
    }

    /// Validates the configuration and every nested one.
    pub fn validate(&self) -> Result<(), String> {
        self.local_search.validate()?;
        self.memory.validate()?;
        self.repair.validate()?;
        if !(0.0..=1.0).contains(&self.adaptive_memory_chance) {
            return Err(format!(
                "adaptive_memory_chance must be in [0, 1], got {}",
                self.adaptive_memory_chance
            ));
        }
        if self.restart_ceiling == Some(0) {
            return Err("restart_ceiling must be positive".into());
        }
        if self.max_rounds == Some(0) {
            return Err("max_rounds must be positive".into());
        }
        if self.time_limit_ms == Some(0) {
            return Err("time_limit_ms must be positive".into());
        }
        Ok(())
    }
}
