use anyhow::bail;
use clap::{Parser, Subcommand};
use core::time::Duration;
use tavern::{Coordinator, Layout, Pacing, Seeding, SimulationConfig, WorkerSettings};

/// Command-line arguments for the `tavern-sim` binary.
///
/// Every option can also come from the environment (or a `.env` file), which
/// is convenient for repeating the same run with different crowd sizes.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "tavern-sim",
    version,
    about = "Simulates worker threads contending for exclusive resources"
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub scenario: Scenario,

    /// Stop after this many seconds instead of waiting for Enter.
    ///
    /// Environment variable: `TAVERN_SECONDS`
    #[arg(long, global = true, env = "TAVERN_SECONDS")]
    pub seconds: Option<f64>,

    /// Base seed for every worker's random source. Omit for a fresh run
    /// each time.
    ///
    /// Environment variable: `TAVERN_SEED`
    #[arg(long, global = true, env = "TAVERN_SEED")]
    pub seed: Option<u64>,

    /// Multiplier for every work and break duration. `0` runs flat out.
    ///
    /// Environment variable: `TAVERN_SCALE`
    #[arg(long, global = true, env = "TAVERN_SCALE", default_value_t = 1.0)]
    pub scale: f64,

    /// Successes after which each worker leaves on its own.
    ///
    /// Without `--seconds` the run ends once every worker has left.
    ///
    /// Environment variable: `TAVERN_CYCLES`
    #[arg(long, global = true, env = "TAVERN_CYCLES")]
    pub cycles: Option<u64>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Scenario {
    /// Drinkers each need one bottle and one opener per drink.
    Drink {
        /// Number of drinkers.
        drinkers: usize,
        /// Number of bottles.
        bottles: usize,
        /// Number of openers.
        openers: usize,
    },
    /// Cars each need one pump per fill-up.
    Station {
        /// Number of cars.
        cars: usize,
        /// Number of pumps.
        pumps: usize,
    },
}

/// When the controlling thread ends the run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StopWhen {
    /// When a line is read from stdin.
    Enter,
    After(Duration),
    /// When every cycle-limited worker has left.
    CyclesDone,
}

impl StopWhen {
    pub fn wait(self, coordinator: &Coordinator) {
        match self {
            Self::Enter => {
                println!("Press Enter to stop");
                let mut line = String::new();
                if let Err(err) = std::io::stdin().read_line(&mut line) {
                    tracing::warn!("Could not read stdin, stopping now: {err}");
                }
            }
            Self::After(duration) => std::thread::sleep(duration),
            Self::CyclesDone => coordinator.await_all_exited(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunConfig {
    pub simulation: SimulationConfig,
    pub stop: StopWhen,
}

impl TryFrom<CliArgs> for RunConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        let (workers, layout) = match args.scenario {
            Scenario::Drink {
                drinkers,
                bottles,
                openers,
            } => (drinkers, Layout::Pairs { bottles, openers }),
            Scenario::Station { cars, pumps } => (cars, Layout::Station { pumps }),
        };

        if args.cycles == Some(0) {
            bail!("TAVERN_CYCLES must be greater than 0");
        }

        let stop = match (args.seconds, args.cycles) {
            (Some(seconds), _) => match Duration::try_from_secs_f64(seconds) {
                Ok(duration) => StopWhen::After(duration),
                Err(_) => bail!("TAVERN_SECONDS ({seconds}) must be a non-negative number"),
            },
            (None, Some(_)) => StopWhen::CyclesDone,
            (None, None) => StopWhen::Enter,
        };

        let simulation = SimulationConfig {
            workers,
            layout,
            settings: WorkerSettings {
                pacing: Pacing::scaled(args.scale),
                seeding: args.seed.map_or(Seeding::Entropy, Seeding::Fixed),
                cycle_limit: args.cycles,
            },
        };
        simulation.validate()?;

        Ok(Self { simulation, stop })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> anyhow::Result<RunConfig> {
        let argv = std::iter::once("tavern-sim").chain(args.iter().copied());
        RunConfig::try_from(CliArgs::try_parse_from(argv)?)
    }

    #[test]
    fn drink_maps_to_a_pair_layout() {
        let config = parse(&["drink", "4", "2", "3", "--seed", "9"]).unwrap();
        assert_eq!(config.simulation.workers, 4);
        assert_eq!(
            config.simulation.layout,
            Layout::Pairs {
                bottles: 2,
                openers: 3
            }
        );
        assert_eq!(config.simulation.settings.seeding, Seeding::Fixed(9));
        assert_eq!(config.stop, StopWhen::Enter);
    }

    #[test]
    fn stop_condition_follows_the_options() {
        let timed = parse(&["--seconds", "1.5", "station", "3", "1"]).unwrap();
        assert_eq!(timed.stop, StopWhen::After(Duration::from_millis(1_500)));

        let counted = parse(&["station", "3", "1", "--cycles", "10"]).unwrap();
        assert_eq!(counted.stop, StopWhen::CyclesDone);
        assert_eq!(counted.simulation.settings.cycle_limit, Some(10));
    }

    #[test]
    fn invalid_runs_are_rejected() {
        assert!(parse(&["drink", "4", "0", "0"]).is_err());
        assert!(parse(&["station", "2", "0"]).is_err());
        assert!(parse(&["station", "2", "1", "--scale=-1"]).is_err());
        assert!(parse(&["station", "2", "1", "--seconds=-3"]).is_err());
        assert!(parse(&["station", "2", "1", "--cycles", "0"]).is_err());
        assert!(parse(&["drink", "-1", "1", "1"]).is_err());
    }
}
