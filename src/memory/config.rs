//! Adaptive memory configuration.

use crate::model::ProblemInstance;

/// Configuration for the adaptive memory pool.
///
/// # Examples
///
/// ```
/// use u_fcvrp::memory::MemoryConfig;
///
/// let config = MemoryConfig::default()
///     .with_pool_size(20)
///     .with_chain_fractions(0.3, 0.6);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MemoryConfig {
    /// Maximum number of member routes. `None` means `5 · vehicles`.
    pub pool_size: Option<usize>,

    /// Lower bound of the target chain length, as a fraction of the
    /// reference route length.
    pub min_chain_fraction: f64,

    /// Upper bound (exclusive) of the target chain length fraction.
    pub max_chain_fraction: f64,

    /// Shortest chain mined or extracted, depots included.
    pub min_chain_len: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            pool_size: None,
            min_chain_fraction: 0.4,
            max_chain_fraction: 0.7,
            min_chain_len: 3,
        }
    }
}

impl MemoryConfig {
    pub fn with_pool_size(mut self, n: usize) -> Self {
        self.pool_size = Some(n);
        self
    }

    pub fn with_chain_fractions(mut self, min: f64, max: f64) -> Self {
        self.min_chain_fraction = min;
        self.max_chain_fraction = max;
        self
    }

    pub fn with_min_chain_len(mut self, n: usize) -> Self {
        self.min_chain_len = n;
        self
    }

    /// Pool size for `instance`.
    pub fn resolved_pool_size(&self, instance: &ProblemInstance) -> usize {
        self.pool_size.unwrap_or(5 * instance.vehicles())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.pool_size == Some(0) {
            return Err("pool_size must be positive".into());
        }
        if self.min_chain_fraction <= 0.0 || self.max_chain_fraction > 1.0 {
            return Err(format!(
                "chain fractions must lie in (0, 1], got [{}, {})",
                self.min_chain_fraction, self.max_chain_fraction
            ));
        }
        if self.min_chain_fraction > self.max_chain_fraction {
            return Err("min_chain_fraction must be <= max_chain_fraction".into());
        }
        if self.min_chain_len < 2 {
            return Err(format!(
                "min_chain_len must be at least 2, got {}",
                self.min_chain_len
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures;

    #[test]
    fn test_default_config() {
        let config = MemoryConfig::default();
        assert_eq!(config.pool_size, None);
        assert!((config.min_chain_fraction - 0.4).abs() < 1e-10);
        assert!((config.max_chain_fraction - 0.7).abs() < 1e-10);
        assert_eq!(config.min_chain_len, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_pool_size_defaults_to_five_per_vehicle() {
        let inst = fixtures::surplus();
        assert_eq!(MemoryConfig::default().resolved_pool_size(&inst), 15);
        assert_eq!(
            MemoryConfig::default()
                .with_pool_size(4)
                .resolved_pool_size(&inst),
            4
        );
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(MemoryConfig::default().with_pool_size(0).validate().is_err());
        assert!(MemoryConfig::default()
            .with_chain_fractions(0.8, 0.5)
            .validate()
            .is_err());
        assert!(MemoryConfig::default()
            .with_chain_fractions(0.0, 0.5)
            .validate()
            .is_err());
        assert!(MemoryConfig::default()
            .with_min_chain_len(1)
            .validate()
            .is_err());
    }
}
