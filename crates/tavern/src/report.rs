use crate::ResourceSnapshot;

/// What one worker did over a run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WorkerStats {
    pub id: usize,
    /// Completed work cycles.
    pub successes: u64,
    /// Claim attempts, successful or not.
    pub tries: u64,
    /// Times the worker parked on the venue's release signal.
    pub waits: u64,
}

impl WorkerStats {
    pub const fn new(id: usize) -> Self {
        Self {
            id,
            successes: 0,
            tries: 0,
            waits: 0,
        }
    }
}

/// Sums over a whole run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Totals {
    pub workers: usize,
    pub resources: usize,
    pub successes: u64,
    pub tries: u64,
    pub waits: u64,
    pub uses: u64,
    pub locks: u64,
}

/// Statistics collected once every worker has exited.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunReport {
    /// Per-worker counters, ordered by worker id.
    pub workers: Vec<WorkerStats>,
    /// Per-resource counters, ordered by resource id.
    pub resources: Vec<ResourceSnapshot>,
    /// Resource uses accounted for by one success.
    pub uses_per_success: u64,
}

impl RunReport {
    pub fn totals(&self) -> Totals {
        let mut totals = Totals {
            workers: self.workers.len(),
            resources: self.resources.len(),
            ..Totals::default()
        };
        for worker in &self.workers {
            totals.successes += worker.successes;
            totals.tries += worker.tries;
            totals.waits += worker.waits;
        }
        for resource in &self.resources {
            totals.uses += resource.use_count;
            totals.locks += resource.lock_count;
        }
        totals
    }

    /// Whether every success is accounted for by exactly
    /// [`uses_per_success`](Self::uses_per_success) resource uses.
    pub fn is_conserved(&self) -> bool {
        let totals = self.totals();
        self.uses_per_success.checked_mul(totals.successes) == Some(totals.uses)
    }
}
