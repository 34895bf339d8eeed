//! Venues: the things workers contend over.
//!
//! A venue owns a fixed set of [`Resource`]s and a [`ReleaseSignal`]. Workers
//! ask it for a claim without ever blocking while they hold part of one; when
//! nothing suitable is free they get [`ClaimStatus::Pending`] back and park on
//! the signal until somebody releases.
//!
//! ## Structure
//!
//! - `pairs` - [`ResourcePool`], one bottle and one opener per claim.
//! - `station` - [`Station`], one pump per claim.
//! - `signal` - [`ReleaseSignal`], the shared wake condition.

mod pairs;
mod signal;
mod station;

pub use pairs::*;
pub use signal::*;
pub use station::*;

use crate::{RandSource, Resource, ResourceSnapshot};
use core::fmt;

/// Represents the result of asking a venue for a claim.
///
/// This allows non-blocking acquisition loops: a worker either gets
/// everything it needs at once, or nothing at all.
#[derive(Debug)]
pub enum ClaimStatus<C> {
    /// Everything the worker needs is held and ready to use.
    Ready {
        /// The held resources. Hand them back with [`Venue::release`].
        claim: C,
    },
    /// Nothing suitable was free and nothing is held.
    ///
    /// Wait with [`ReleaseSignal::wait_for_release`] passing `since` before
    /// trying again.
    Pending {
        /// The last release epoch this attempt has already accounted for.
        since: u64,
    },
}

/// A set of held resources that together make one unit of work possible.
pub trait Claim: fmt::Debug {
    /// How many resources the claim holds.
    fn held(&self) -> usize;
}

/// A pool of exclusive resources that workers claim, use and release.
///
/// Implementations must never block while holding a partial claim: either
/// [`Venue::try_claim`] returns everything, or it has already let go of
/// whatever it picked up.
pub trait Venue: Send + Sync {
    type Claim<'a>: Claim
    where
        Self: 'a;

    /// How many resource uses one released claim accounts for.
    const USES_PER_CLAIM: u64;

    /// What the venue's workers are called, as used in thread names and logs.
    const WORKER_NAME: &'static str;

    /// Attempts to claim the resources for one unit of work.
    ///
    /// `rng` is the calling worker's own random source.
    fn try_claim<R: RandSource<u64>>(&self, rng: &mut R) -> ClaimStatus<Self::Claim<'_>>;

    /// Marks every resource in `claim` as used, frees them and wakes waiters.
    fn release(&self, claim: Self::Claim<'_>);

    /// The signal broadcast on every release.
    fn signal(&self) -> &ReleaseSignal;

    /// Every resource in the venue, in index order.
    fn resources(&self) -> &[Resource];

    /// Counters of every resource. Only meaningful once nobody holds any.
    fn snapshot(&self) -> Vec<ResourceSnapshot> {
        self.resources().iter().map(Resource::snapshot).collect()
    }
}
