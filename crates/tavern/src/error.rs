//! Error types for building and running a simulation.
//!
//! Only configuration and thread-lifecycle failures are errors. A pairing
//! attempt that finds nothing free is ordinary control flow (see
//! [`ClaimStatus::Pending`]), and broken lock discipline is a bug caught by
//! debug assertions rather than reported here.
//!
//! [`ClaimStatus::Pending`]: crate::ClaimStatus::Pending

/// A result type defaulting to this crate's [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// A configuration was rejected before any worker started.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// The venue would hold no resources at all.
    #[error("at least one resource is required")]
    NoResources,

    /// A pacing scale was negative, infinite or NaN.
    #[error("pacing scale must be a finite, non-negative number (got {scale})")]
    InvalidScale { scale: f64 },
}

/// All errors a simulation run can produce.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The configuration was invalid; no worker was started.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// The OS refused to spawn a worker thread.
    #[error("failed to spawn worker {id}: {source}")]
    Spawn {
        id: usize,
        #[source]
        source: std::io::Error,
    },

    /// A worker thread panicked, so its counters are lost.
    #[error("worker {id} panicked")]
    WorkerPanicked { id: usize },
}
