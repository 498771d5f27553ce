use serde::{Deserialize, Serialize};

use crate::error::{PoolError, PoolResult};

/// Sizing of the dispatch pool.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Number of concurrent workers.
    pub workers: usize,
    /// Capacity of the request queue.
    pub queue_capacity: usize,
    /// Capacity of the result stream.
    pub result_capacity: usize,
}

impl PoolConfig {
    /// `n` workers with a `2n` request queue and a `10n` result stream.
    pub fn for_workers(n: usize) -> Self {
        Self {
            workers: n,
            queue_capacity: n.saturating_mul(2),
            result_capacity: n.saturating_mul(10),
        }
    }

    pub fn validate(&self) -> PoolResult<()> {
        if self.workers == 0 {
            return Err(PoolError::InvalidConfig("workers must be at least 1".into()));
        }
        if self.queue_capacity == 0 || self.result_capacity == 0 {
            return Err(PoolError::InvalidConfig(
                "queue and result capacities must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self::for_workers(1000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = PoolConfig::default();
        assert_eq!(c.workers, 1000);
        assert_eq!(c.queue_capacity, 2000);
        assert_eq!(c.result_capacity, 10_000);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn zero_sizes_are_rejected() {
        assert!(PoolConfig::for_workers(0).validate().is_err());
        let c = PoolConfig {
            result_capacity: 0,
            ..PoolConfig::for_workers(2)
        };
        assert!(matches!(c.validate(), Err(PoolError::InvalidConfig(_))));
    }
}
