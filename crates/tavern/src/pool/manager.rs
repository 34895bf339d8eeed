//! Thread-per-worker pool driving a [`Venue`].
//!
//! The controlling thread walks the pool through a fixed sequence:
//!
//! 1. [`WorkerPool::spawn`] starts the worker threads, which register and
//!    park at the start gate.
//! 2. [`WorkerPool::await_all_registered`] waits until all of them are there.
//! 3. [`WorkerPool::open_start_gate`] lets them go.
//! 4. [`WorkerPool::request_stop`] asks them to finish their current cycle
//!    and leave.
//! 5. [`WorkerPool::collect_statistics`] waits for the last one and joins
//!    every thread.
//!
//! [`WorkerPool::run_until`] and [`WorkerPool::run_for`] do all of the above
//! in one call.

use crate::{
    ConfigError, Coordinator, Error, Result, RunReport, Sleeper, ThreadSleeper, Venue, Worker,
    WorkerSettings, WorkerStats,
};
use core::{fmt, time::Duration};
use std::{
    sync::Arc,
    thread::{self, JoinHandle},
};

/// A set of worker threads contending over one shared venue.
///
/// Dropping a pool that still has running workers requests a stop, so no
/// thread is left parked at the start gate. The threads are detached in that
/// case and their statistics are lost.
pub struct WorkerPool<V: Venue + 'static, S = ThreadSleeper> {
    venue: Arc<V>,
    coordinator: Arc<Coordinator>,
    settings: WorkerSettings,
    sleeper: S,
    handles: Vec<JoinHandle<WorkerStats>>,
}

impl<V: Venue + 'static> WorkerPool<V> {
    /// Creates a pool whose workers sleep on the OS thread.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if `settings` fail validation.
    pub fn new(venue: V, settings: WorkerSettings) -> Result<Self, ConfigError> {
        Self::with_sleeper(venue, settings, ThreadSleeper)
    }
}

impl<V, S> WorkerPool<V, S>
where
    V: Venue + 'static,
    S: Sleeper + Clone + Send + 'static,
{
    /// Creates a pool whose workers sleep through `sleeper`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if `settings` fail validation.
    pub fn with_sleeper(
        venue: V,
        settings: WorkerSettings,
        sleeper: S,
    ) -> Result<Self, ConfigError> {
        settings.validate()?;
        Ok(Self {
            venue: Arc::new(venue),
            coordinator: Arc::new(Coordinator::new()),
            settings,
            sleeper,
            handles: Vec::new(),
        })
    }

    pub fn venue(&self) -> &V {
        &self.venue
    }

    pub fn coordinator(&self) -> &Coordinator {
        &self.coordinator
    }

    /// Number of workers spawned so far.
    pub fn workers(&self) -> usize {
        self.handles.len()
    }

    /// Starts `count` more workers, each on its own named thread.
    ///
    /// Returns as soon as the threads exist; they may not have registered
    /// yet. Worker ids continue from the previous call.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Spawn`] if the OS refuses a thread. Workers already
    /// started are asked to stop.
    pub fn spawn(&mut self, count: usize) -> Result<()> {
        self.handles.reserve(count);
        for _ in 0..count {
            let id = self.handles.len();
            let worker = Worker::new(
                id,
                Arc::clone(&self.venue),
                Arc::clone(&self.coordinator),
                self.settings.seeding.source_for(id),
                self.sleeper.clone(),
            )
            .with_pacing(self.settings.pacing)
            .with_cycle_limit(self.settings.cycle_limit);

            let handle = thread::Builder::new()
                .name(format!("{}-{id}", V::WORKER_NAME))
                .spawn(move || worker.run());

            match handle {
                Ok(handle) => self.handles.push(handle),
                Err(source) => {
                    #[cfg(feature = "tracing")]
                    tracing::error!("Failed to spawn {} {id}: {source}", V::WORKER_NAME);
                    self.request_stop();
                    return Err(Error::Spawn { id, source });
                }
            }
        }
        Ok(())
    }

    /// Blocks until every spawned worker has registered.
    pub fn await_all_registered(&self) {
        #[cfg(feature = "tracing")]
        tracing::debug!("Waiting for {} {}s to register", self.workers(), V::WORKER_NAME);
        self.coordinator.await_registered(self.handles.len());
    }

    pub fn open_start_gate(&self) {
        #[cfg(feature = "tracing")]
        tracing::info!("Starting {} {}s", self.workers(), V::WORKER_NAME);
        self.coordinator.open_start_gate();
    }

    /// Asks every worker to leave after its current cycle and wakes any that
    /// are parked on the venue.
    pub fn request_stop(&self) {
        #[cfg(feature = "tracing")]
        tracing::info!("Stopping {}s", V::WORKER_NAME);
        self.coordinator.request_stop();
        self.venue.signal().interrupt();
    }

    /// Blocks until every registered worker has left.
    ///
    /// Unless every worker has a cycle limit this only returns after
    /// [`request_stop`](Self::request_stop).
    pub fn await_all_exited(&self) {
        self.coordinator.await_all_exited();
        #[cfg(feature = "tracing")]
        tracing::debug!("All {}s have left", V::WORKER_NAME);
    }

    /// Waits for every worker to leave, joins their threads and snapshots
    /// the venue.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WorkerPanicked`] for the first worker whose thread
    /// panicked.
    pub fn collect_statistics(mut self) -> Result<RunReport> {
        self.await_all_exited();

        let handles = core::mem::take(&mut self.handles);
        let mut workers = Vec::with_capacity(handles.len());
        for (id, handle) in handles.into_iter().enumerate() {
            let stats = handle.join().map_err(|_| Error::WorkerPanicked { id })?;
            workers.push(stats);
        }

        Ok(RunReport {
            workers,
            resources: self.venue.snapshot(),
            uses_per_success: V::USES_PER_CLAIM,
        })
    }

    /// Runs `workers` workers from start to finish.
    ///
    /// `until` is called once the gate is open and should return when the
    /// run is to end; it is handed the coordinator so it can, for instance,
    /// wait for cycle-limited workers to leave on their own.
    ///
    /// # Errors
    ///
    /// Propagates [`spawn`](Self::spawn) and
    /// [`collect_statistics`](Self::collect_statistics) failures.
    pub fn run_until<F>(mut self, workers: usize, until: F) -> Result<RunReport>
    where
        F: FnOnce(&Coordinator),
    {
        self.spawn(workers)?;
        self.await_all_registered();
        self.open_start_gate();
        until(&self.coordinator);
        self.request_stop();
        self.collect_statistics()
    }

    /// Runs `workers` workers for roughly `duration` of wall-clock time.
    ///
    /// # Errors
    ///
    /// See [`run_until`](Self::run_until).
    pub fn run_for(self, workers: usize, duration: Duration) -> Result<RunReport> {
        self.run_until(workers, |_| thread::sleep(duration))
    }
}

impl<V: Venue + 'static, S> Drop for WorkerPool<V, S> {
    fn drop(&mut self) {
        if !self.handles.is_empty() {
            self.coordinator.request_stop();
            self.venue.signal().interrupt();
        }
    }
}

impl<V: Venue + fmt::Debug + 'static, S> fmt::Debug for WorkerPool<V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkerPool")
            .field("venue", &self.venue)
            .field("coordinator", &self.coordinator)
            .field("settings", &self.settings)
            .field("workers", &self.handles.len())
            .finish()
    }
}
