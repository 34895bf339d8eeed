use crate::{
    ClaimStatus, Coordinator, Pacing, RandSource, ReleaseSignal, Sleeper, Venue,
    WorkerStats,
};
use core::fmt;
use std::sync::Arc;

/// Where a worker is in its life cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WorkerState {
    Idle,
    /// Counted as live, waiting for the start gate.
    Registered,
    /// Checking for stop, then attempting (or waiting for) a claim.
    Acquiring,
    /// Holding a full claim.
    Working,
    /// Returning the claim and resting.
    Releasing,
    Exiting,
    Done,
}

/// One simulated participant: a drinker at a [`ResourcePool`], a car at a
/// [`Station`].
///
/// A worker owns its random source and its counters outright; the only state
/// it shares is the venue and the pool's [`Coordinator`].
///
/// [`ResourcePool`]: crate::ResourcePool
/// [`Station`]: crate::Station
pub struct Worker<V, R, S> {
    id: usize,
    venue: Arc<V>,
    coordinator: Arc<Coordinator>,
    rng: R,
    sleeper: S,
    pacing: Pacing,
    cycle_limit: Option<u64>,
    state: WorkerState,
    stats: WorkerStats,
}

impl<V, R, S> Worker<V, R, S>
where
    V: Venue,
    R: RandSource<u64>,
    S: Sleeper,
{
    pub fn new(
        id: usize,
        venue: Arc<V>,
        coordinator: Arc<Coordinator>,
        rng: R,
        sleeper: S,
    ) -> Self {
        Self {
            id,
            venue,
            coordinator,
            rng,
            sleeper,
            pacing: Pacing::default(),
            cycle_limit: None,
            state: WorkerState::Idle,
            stats: WorkerStats::new(id),
        }
    }

    #[must_use]
    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    /// Makes the worker leave on its own after `limit` successes.
    #[must_use]
    pub fn with_cycle_limit(mut self, limit: Option<u64>) -> Self {
        self.cycle_limit = limit;
        self
    }

    pub const fn id(&self) -> usize {
        self.id
    }

    pub const fn state(&self) -> WorkerState {
        self.state
    }

    pub const fn stats(&self) -> WorkerStats {
        self.stats
    }

    /// Runs the worker to completion on the calling thread.
    ///
    /// Registers with the coordinator, waits for the start gate, then cycles
    /// until a stop is requested or the cycle limit is reached. The worker is
    /// deregistered on the way out even if it panics.
    pub fn run(mut self) -> WorkerStats {
        let venue = Arc::clone(&self.venue);
        let coordinator = Arc::clone(&self.coordinator);

        #[cfg(feature = "tracing")]
        tracing::debug!("{} {} starting", V::WORKER_NAME, self.id);

        self.transition(WorkerState::Registered);
        coordinator.register();
        let shift = Shift {
            coordinator: &coordinator,
            signal: venue.signal(),
        };

        loop {
            self.transition(WorkerState::Acquiring);
            if self.should_exit() {
                break;
            }

            self.stats.tries += 1;
            match venue.try_claim(&mut self.rng) {
                ClaimStatus::Ready { claim } => self.work(&venue, claim),
                ClaimStatus::Pending { since } => {
                    if coordinator.is_stopped() {
                        break;
                    }
                    self.suspend(venue.signal(), since);
                }
            }
        }

        self.transition(WorkerState::Exiting);
        drop(shift);
        self.transition(WorkerState::Done);

        #[cfg(feature = "tracing")]
        tracing::debug!(
            successes = self.stats.successes,
            tries = self.stats.tries,
            waits = self.stats.waits,
            "{} {} done",
            V::WORKER_NAME,
            self.id
        );
        self.stats
    }

    fn should_exit(&self) -> bool {
        self.coordinator.is_stopped()
            || self
                .cycle_limit
                .is_some_and(|limit| self.stats.successes >= limit)
    }

    fn work(&mut self, venue: &V, claim: V::Claim<'_>) {
        self.transition(WorkerState::Working);
        let busy = self.pacing.work_for(&mut self.rng);
        self.sleeper.sleep(busy);
        self.stats.successes += 1;

        self.transition(WorkerState::Releasing);
        venue.release(claim);

        for pause in self.pacing.breaks_after(self.stats.successes, &mut self.rng) {
            #[cfg(feature = "tracing")]
            tracing::trace!(worker = self.id, ?pause, "resting");
            self.sleeper.sleep(pause);
        }
    }

    fn suspend(&mut self, signal: &ReleaseSignal, since: u64) {
        self.stats.waits += 1;
        let _wake = signal.wait_for_release(since);

        #[cfg(feature = "tracing")]
        tracing::trace!(worker = self.id, wake = ?_wake, "woken");
    }

    fn transition(&mut self, next: WorkerState) {
        #[cfg(feature = "tracing")]
        tracing::trace!(worker = self.id, from = ?self.state, to = ?next);
        self.state = next;
    }
}

impl<V, R, S> fmt::Debug for Worker<V, R, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Worker")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("stats", &self.stats)
            .finish()
    }
}

/// Deregisters a worker when it leaves, however it leaves.
struct Shift<'a> {
    coordinator: &'a Coordinator,
    signal: &'a ReleaseSignal,
}

impl Drop for Shift<'_> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            // Peers may be parked on an epoch this worker would have bumped.
            self.signal.notify_release();
        }
        self.coordinator.deregister();
    }
}
