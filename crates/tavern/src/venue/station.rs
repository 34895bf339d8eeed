use crate::{Claim, ClaimStatus, ConfigError, Hold, RandSource, ReleaseSignal, Resource, Venue};
use core::fmt;

/// A row of interchangeable pumps shared by cars.
///
/// Each car needs a single pump, so there is nothing to pair and nothing to
/// deadlock on; the interesting part is waiting without spinning when every
/// pump is busy. Pumps are tried in index order, so low-numbered pumps see
/// more traffic.
pub struct Station {
    pumps: Vec<Resource>,
    signal: ReleaseSignal,
}

impl Station {
    /// # Errors
    ///
    /// Returns [`ConfigError::NoResources`] if `pumps` is zero.
    pub fn new(pumps: usize) -> Result<Self, ConfigError> {
        if pumps == 0 {
            return Err(ConfigError::NoResources);
        }
        Ok(Self {
            pumps: (0..pumps).map(Resource::uncategorized).collect(),
            signal: ReleaseSignal::new(),
        })
    }

    pub fn pumps(&self) -> usize {
        self.pumps.len()
    }

    /// Takes the first free pump without blocking.
    pub fn try_fill_up(&self) -> ClaimStatus<Fill<'_>> {
        let since = self.signal.epoch();
        match self.pumps.iter().find_map(Resource::try_lock) {
            Some(pump) => ClaimStatus::Ready {
                claim: Fill { pump },
            },
            None => ClaimStatus::Pending { since },
        }
    }

    /// Counts the fill-up against the pump, frees it and wakes every waiter.
    pub fn release(&self, fill: Fill<'_>) {
        let Fill { mut pump } = fill;
        pump.mark_used();
        drop(pump);
        self.signal.notify_release();
    }
}

impl Venue for Station {
    type Claim<'a> = Fill<'a>;

    const USES_PER_CLAIM: u64 = 1;

    const WORKER_NAME: &'static str = "car";

    fn try_claim<R: RandSource<u64>>(&self, _rng: &mut R) -> ClaimStatus<Fill<'_>> {
        self.try_fill_up()
    }

    fn release(&self, claim: Fill<'_>) {
        self.release(claim);
    }

    fn signal(&self) -> &ReleaseSignal {
        &self.signal
    }

    fn resources(&self) -> &[Resource] {
        &self.pumps
    }
}

impl fmt::Debug for Station {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Station")
            .field("pumps", &self.pumps.len())
            .field("signal", &self.signal)
            .finish()
    }
}

/// A pump held by one car.
pub struct Fill<'a> {
    pump: Hold<'a>,
}

impl<'a> Fill<'a> {
    pub const fn pump(&self) -> &'a Resource {
        self.pump.resource()
    }
}

impl Claim for Fill<'_> {
    fn held(&self) -> usize {
        1
    }
}

impl fmt::Debug for Fill<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Fill").field(&self.pump().id()).finish()
    }
}
