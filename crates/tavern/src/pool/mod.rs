//! Workers and the pool that runs them.
//!
//! ## Structure
//!
//! - `coordinator` - [`Coordinator`], start gate, live count and stop flag.
//! - `worker` - [`Worker`], the per-thread acquire/work/release loop.
//! - `manager` - [`WorkerPool`], spawning, stopping and joining workers.

mod coordinator;
mod manager;
#[cfg(test)]
mod tests;
mod worker;

pub use coordinator::*;
pub use manager::*;
pub use worker::*;
