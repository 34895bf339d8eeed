use crate::{Mutex, MutexGuard};
use core::fmt;

/// The two kinds of resource a pairing needs one of each.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Bottle,
    Opener,
}

impl Category {
    /// The category a holder of `self` still needs.
    pub const fn complement(self) -> Self {
        match self {
            Self::Bottle => Self::Opener,
            Self::Opener => Self::Bottle,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bottle => "bottle",
            Self::Opener => "opener",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Counters protected by a resource's own lock. Only the current holder
/// writes them.
#[derive(Debug, Default)]
pub(crate) struct Counters {
    pub(crate) lock_count: u64,
    pub(crate) use_count: u64,
}

/// One mutually-exclusive slot in a venue.
///
/// The lock state and the usage counters share a single mutex: holding the
/// guard is what it means to hold the resource, so no second lock is needed
/// to keep the counters consistent.
pub struct Resource {
    id: usize,
    category: Option<Category>,
    #[cfg(feature = "cache-padded")]
    slot: crossbeam_utils::CachePadded<Mutex<Counters>>,
    #[cfg(not(feature = "cache-padded"))]
    slot: Mutex<Counters>,
}

impl Resource {
    /// Creates a free resource of the given category with zeroed counters.
    pub fn new(id: usize, category: Category) -> Self {
        Self::with_category(id, Some(category))
    }

    /// Creates a resource that belongs to no category, such as a pump in a
    /// [`Station`].
    ///
    /// [`Station`]: crate::Station
    pub fn uncategorized(id: usize) -> Self {
        Self::with_category(id, None)
    }

    fn with_category(id: usize, category: Option<Category>) -> Self {
        Self {
            id,
            category,
            #[cfg(feature = "cache-padded")]
            slot: crossbeam_utils::CachePadded::new(Mutex::new(Counters::default())),
            #[cfg(not(feature = "cache-padded"))]
            slot: Mutex::new(Counters::default()),
        }
    }

    pub const fn id(&self) -> usize {
        self.id
    }

    pub const fn category(&self) -> Option<Category> {
        self.category
    }

    /// Whether some holder currently has this resource locked.
    ///
    /// Only a hint: the answer may be stale by the time it is read.
    pub fn is_held(&self) -> bool {
        self.slot.is_locked()
    }

    /// Blocks until the resource is free, then takes it.
    pub(crate) fn lock(&self) -> Hold<'_> {
        self.hold(self.slot.lock())
    }

    /// Takes the resource only if nobody holds it right now.
    pub(crate) fn try_lock(&self) -> Option<Hold<'_>> {
        self.slot.try_lock().map(|counters| self.hold(counters))
    }

    fn hold<'a>(&'a self, mut counters: MutexGuard<'a, Counters>) -> Hold<'a> {
        counters.lock_count += 1;
        Hold {
            resource: self,
            counters,
        }
    }

    /// Reads the counters.
    ///
    /// Blocks while the resource is held, so call it once workers are gone.
    pub fn snapshot(&self) -> ResourceSnapshot {
        let counters = self.slot.lock();
        ResourceSnapshot {
            id: self.id,
            category: self.category,
            lock_count: counters.lock_count,
            use_count: counters.use_count,
        }
    }
}

impl fmt::Debug for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource")
            .field("id", &self.id)
            .field("category", &self.category)
            .field("held", &self.is_held())
            .finish()
    }
}

/// Exclusive access to one [`Resource`]. Dropping it frees the resource.
pub struct Hold<'a> {
    resource: &'a Resource,
    counters: MutexGuard<'a, Counters>,
}

impl<'a> Hold<'a> {
    pub const fn resource(&self) -> &'a Resource {
        self.resource
    }

    pub(crate) fn mark_used(&mut self) {
        self.counters.use_count += 1;
    }
}

impl fmt::Debug for Hold<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Hold").field(&self.resource.id).finish()
    }
}

/// Read-only counters of one resource, taken after a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResourceSnapshot {
    pub id: usize,
    /// `None` for uncategorized resources such as station pumps.
    pub category: Option<Category>,
    /// Successful exclusive acquisitions, including ones given back after a
    /// failed pairing.
    pub lock_count: u64,
    /// Completed work cycles that included this resource.
    pub use_count: u64,
}
