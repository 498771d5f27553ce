use tix_types::Stats;

use crate::ledger::TicketLedger;

impl TicketLedger {
    /// Read-only snapshot: `total`, `total - available`, `available`.
    pub fn stats(&self) -> Stats {
        Stats::from_counters(self.total(), self.available())
    }
}
