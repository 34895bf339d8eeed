use crate::{
    ConfigError, Coordinator, Pacing, ResourcePool, Result, RunReport, Seeding, Station,
    WorkerPool,
};
use core::time::Duration;

/// How every worker in a pool behaves.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct WorkerSettings {
    pub pacing: Pacing,
    pub seeding: Seeding,
    /// Successes after which a worker leaves on its own. `None` runs until
    /// stopped.
    pub cycle_limit: Option<u64>,
}

impl WorkerSettings {
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidScale`] for an unusable pacing scale.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.pacing.validate()
    }
}

/// What the workers contend over.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Layout {
    /// A [`ResourcePool`]: drinkers need one bottle and one opener each.
    Pairs { bottles: usize, openers: usize },
    /// A [`Station`]: cars need one pump each.
    Station { pumps: usize },
}

impl Layout {
    /// Total number of resources, if it fits in a `usize`.
    pub fn resources(&self) -> Option<usize> {
        match *self {
            Self::Pairs { bottles, openers } => bottles.checked_add(openers),
            Self::Station { pumps } => Some(pumps),
        }
    }
}

/// A complete, runnable simulation.
///
/// # Example
/// ```
/// use core::time::Duration;
/// use tavern::{Layout, Pacing, SimulationConfig, WorkerSettings};
///
/// let config = SimulationConfig {
///     workers: 4,
///     layout: Layout::Pairs { bottles: 2, openers: 2 },
///     settings: WorkerSettings {
///         pacing: Pacing::flat_out(),
///         cycle_limit: Some(25),
///         ..WorkerSettings::default()
///     },
/// };
///
/// let report = config.run_until(|coordinator| coordinator.await_all_exited()).unwrap();
/// assert_eq!(report.totals().successes, 100);
/// assert!(report.is_conserved());
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimulationConfig {
    pub workers: usize,
    pub layout: Layout,
    pub settings: WorkerSettings,
}

impl SimulationConfig {
    /// Checks everything that can be checked without starting a thread.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoResources`] for an empty layout and
    /// [`ConfigError::InvalidScale`] for an unusable pacing scale.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.layout.resources() {
            Some(total) if total > 0 => {}
            _ => return Err(ConfigError::NoResources),
        }
        self.settings.validate()
    }

    /// Builds the venue and runs the simulation; see
    /// [`WorkerPool::run_until`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`](crate::Error::Config) before any thread is
    /// started if the configuration is invalid, otherwise whatever the run
    /// itself fails with.
    pub fn run_until<F>(self, until: F) -> Result<RunReport>
    where
        F: FnOnce(&Coordinator),
    {
        self.validate()?;
        match self.layout {
            Layout::Pairs { bottles, openers } => {
                let pool = ResourcePool::new(bottles, openers)?;
                WorkerPool::new(pool, self.settings)?.run_until(self.workers, until)
            }
            Layout::Station { pumps } => {
                let station = Station::new(pumps)?;
                WorkerPool::new(station, self.settings)?.run_until(self.workers, until)
            }
        }
    }

    /// Runs the simulation for roughly `duration`.
    ///
    /// # Errors
    ///
    /// See [`run_until`](Self::run_until).
    pub fn run_for(self, duration: Duration) -> Result<RunReport> {
        self.run_until(|_| std::thread::sleep(duration))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(layout: Layout, scale: f64) -> SimulationConfig {
        SimulationConfig {
            workers: 1,
            layout,
            settings: WorkerSettings {
                pacing: Pacing::scaled(scale),
                ..WorkerSettings::default()
            },
        }
    }

    #[test]
    fn empty_layouts_are_rejected() {
        for layout in [
            Layout::Pairs {
                bottles: 0,
                openers: 0,
            },
            Layout::Pairs {
                bottles: usize::MAX,
                openers: 1,
            },
            Layout::Station { pumps: 0 },
        ] {
            assert_eq!(
                config(layout, 1.0).validate(),
                Err(ConfigError::NoResources),
                "{layout:?}"
            );
        }
    }

    #[test]
    fn single_category_layout_is_accepted() {
        let layout = Layout::Pairs {
            bottles: 1,
            openers: 0,
        };
        assert_eq!(config(layout, 1.0).validate(), Ok(()));
    }

    #[test]
    fn bad_scale_is_rejected_before_running() {
        let layout = Layout::Station { pumps: 1 };
        let err = config(layout, -1.0)
            .run_until(|_| unreachable!("no run may start"))
            .unwrap_err();
        assert!(matches!(
            err,
            crate::Error::Config(ConfigError::InvalidScale { .. })
        ));
    }
}
