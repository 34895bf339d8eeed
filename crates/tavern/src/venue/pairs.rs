use crate::{
    Category, Claim, ClaimStatus, ConfigError, Hold, RandSource, ReleaseSignal, Resource, Venue,
};
use core::fmt;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// The result of [`ResourcePool::try_acquire_pair`].
pub type PairStatus<'a> = ClaimStatus<Pair<'a>>;

/// A fixed pool of bottles and openers contended for by drinkers.
///
/// Resources are laid out bottles first, then openers, and never change
/// after construction. Each one is locked independently; the pool-wide
/// [`ReleaseSignal`] exists only so that drinkers who found nothing can sleep
/// until something is given back.
///
/// ## Deadlock avoidance
///
/// A drinker may block while taking its *first* resource, but never while
/// holding one. The second resource is only ever taken with a non-blocking
/// attempt; if every candidate is busy the first is dropped again. Since
/// nobody waits while holding, a cycle of holders waiting on each other
/// cannot form.
pub struct ResourcePool {
    resources: Vec<Resource>,
    bottles: usize,
    signal: ReleaseSignal,
}

impl ResourcePool {
    /// Creates a pool of `bottles` bottles followed by `openers` openers.
    ///
    /// A pool holding only one category is accepted, but no pairing can ever
    /// succeed in it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoResources`] if the pool would be empty.
    pub fn new(bottles: usize, openers: usize) -> Result<Self, ConfigError> {
        let total = bottles
            .checked_add(openers)
            .filter(|&total| total > 0)
            .ok_or(ConfigError::NoResources)?;

        let resources = (0..total)
            .map(|id| {
                let category = if id < bottles {
                    Category::Bottle
                } else {
                    Category::Opener
                };
                Resource::new(id, category)
            })
            .collect();

        Ok(Self {
            resources,
            bottles,
            signal: ReleaseSignal::new(),
        })
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    pub const fn bottles(&self) -> usize {
        self.bottles
    }

    pub fn openers(&self) -> usize {
        self.resources.len() - self.bottles
    }

    /// Attempts to take one bottle and one opener.
    ///
    /// Picks a resource uniformly at random and waits for it, then scans the
    /// pool once in index order for the first free resource of the other
    /// category. If the scan comes up empty the first resource is given back
    /// (and the give-back published on the release signal) before returning
    /// [`ClaimStatus::Pending`].
    ///
    /// Every successful lock, including a first pick that is later given
    /// back, is counted in that resource's `lock_count`.
    ///
    /// # Example
    /// ```
    /// use tavern::{ClaimStatus, ResourcePool, SeededRandom};
    ///
    /// let pool = ResourcePool::new(1, 1).unwrap();
    /// let mut rng = SeededRandom::new(0);
    ///
    /// match pool.try_acquire_pair(&mut rng) {
    ///     ClaimStatus::Ready { claim } => pool.release(claim),
    ///     ClaimStatus::Pending { .. } => unreachable!("nobody else is drinking"),
    /// }
    /// ```
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip_all))]
    pub fn try_acquire_pair<R: RandSource<u64>>(&self, rng: &mut R) -> PairStatus<'_> {
        let since = self.signal.epoch();

        let pick = (rng.rand() % self.resources.len() as u64) as usize;
        let first = self.resources[pick].lock();
        let wanted = first.resource().category().map(Category::complement);
        debug_assert!(wanted.is_some(), "pair pools only hold categorized resources");

        let second = self
            .resources
            .iter()
            .filter(|candidate| candidate.category() == wanted)
            .find_map(Resource::try_lock);

        match second {
            Some(second) => ClaimStatus::Ready {
                claim: Pair::new(first, second),
            },
            None => {
                #[cfg(feature = "tracing")]
                tracing::trace!(resource = pick, "no complement free, giving back");
                drop(first);
                self.signal.notify_release();
                // Our own give-back is one of the releases since `since`.
                ClaimStatus::Pending {
                    since: since.wrapping_add(1),
                }
            }
        }
    }

    /// Marks both resources as used, frees them and wakes every waiter.
    pub fn release(&self, pair: Pair<'_>) {
        let Pair {
            mut bottle,
            mut opener,
        } = pair;
        bottle.mark_used();
        opener.mark_used();
        drop(bottle);
        drop(opener);
        self.signal.notify_release();
    }
}

impl Venue for ResourcePool {
    type Claim<'a> = Pair<'a>;

    const USES_PER_CLAIM: u64 = 2;

    const WORKER_NAME: &'static str = "drinker";

    fn try_claim<R: RandSource<u64>>(&self, rng: &mut R) -> PairStatus<'_> {
        self.try_acquire_pair(rng)
    }

    fn release(&self, claim: Pair<'_>) {
        self.release(claim);
    }

    fn signal(&self) -> &ReleaseSignal {
        &self.signal
    }

    fn resources(&self) -> &[Resource] {
        &self.resources
    }
}

impl fmt::Debug for ResourcePool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourcePool")
            .field("bottles", &self.bottles())
            .field("openers", &self.openers())
            .field("signal", &self.signal)
            .finish()
    }
}

/// One bottle and one opener, both held exclusively.
///
/// Dropping a pair frees both resources without counting a use or waking
/// anyone; return it through [`ResourcePool::release`] instead.
pub struct Pair<'a> {
    bottle: Hold<'a>,
    opener: Hold<'a>,
}

impl<'a> Pair<'a> {
    fn new(first: Hold<'a>, second: Hold<'a>) -> Self {
        debug_assert_ne!(
            first.resource().category(),
            second.resource().category(),
            "a pair needs one resource of each category"
        );
        if first.resource().category() == Some(Category::Bottle) {
            Self {
                bottle: first,
                opener: second,
            }
        } else {
            Self {
                bottle: second,
                opener: first,
            }
        }
    }

    pub const fn bottle(&self) -> &'a Resource {
        self.bottle.resource()
    }

    pub const fn opener(&self) -> &'a Resource {
        self.opener.resource()
    }
}

impl Claim for Pair<'_> {
    fn held(&self) -> usize {
        2
    }
}

impl fmt::Debug for Pair<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pair")
            .field("bottle", &self.bottle().id())
            .field("opener", &self.opener().id())
            .finish()
    }
}
