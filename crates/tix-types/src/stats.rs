use serde::{Deserialize, Serialize};

/// Point-in-time ledger aggregates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub total: u64,
    pub booked: u64,
    pub available: u64,
}

impl Stats {
    /// Build a snapshot from the two ledger counters.
    pub fn from_counters(total: u64, available: u64) -> Self {
        Self {
            total,
            booked: total.saturating_sub(available),
            available,
        }
    }

    pub fn is_sold_out(&self) -> bool {
        self.available == 0
    }
}
