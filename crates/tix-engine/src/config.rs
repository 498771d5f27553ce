use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Tunables for the allocation engine.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Upper bound, in microseconds, of a random pause taken before each
    /// allocation. Emulates client network latency in load simulations.
    /// `0` disables it.
    pub latency_jitter_us: u64,
}

impl EngineConfig {
    pub fn with_latency_jitter(max: Duration) -> Self {
        Self {
            latency_jitter_us: u64::try_from(max.as_micros()).unwrap_or(u64::MAX),
        }
    }

    pub(crate) fn jitter_bound(&self) -> Option<u64> {
        (self.latency_jitter_us > 0).then_some(self.latency_jitter_us)
    }
}
