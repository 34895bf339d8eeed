use core::fmt;
use tavern::{Layout, RunReport};

/// How a scenario names its participants in the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Vocabulary {
    pub worker: &'static str,
    pub workers: &'static str,
    pub did: &'static str,
    pub successes: &'static str,
    /// Label for resources without a category.
    pub resource: &'static str,
}

impl Vocabulary {
    pub const DRINKING: Self = Self {
        worker: "Drinker",
        workers: "Drinkers",
        did: "Drank",
        successes: "Drinks",
        resource: "resource",
    };

    pub const STATION: Self = Self {
        worker: "Car",
        workers: "Cars",
        did: "Filled",
        successes: "Fill-ups",
        resource: "pump",
    };

    pub const fn for_layout(layout: &Layout) -> Self {
        match layout {
            Layout::Pairs { .. } => Self::DRINKING,
            Layout::Station { .. } => Self::STATION,
        }
    }
}

/// The end-of-run report: worker lines and totals, resource lines and
/// totals, then the conservation check.
pub struct Summary<'a> {
    pub report: &'a RunReport,
    pub words: Vocabulary,
}

impl fmt::Display for Summary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let words = self.words;
        let totals = self.report.totals();

        writeln!(f, "*********{}**********", words.workers)?;
        for worker in &self.report.workers {
            writeln!(
                f,
                "{} {}, {} {}, {} tries, {} waits",
                words.worker, worker.id, words.did, worker.successes, worker.tries, worker.waits
            )?;
        }
        writeln!(
            f,
            "Total {} {}, {} {}, Resource tries {}\n\n",
            words.workers, totals.workers, words.successes, totals.successes, totals.tries
        )?;

        writeln!(f, "*********Resource Results **********")?;
        for resource in &self.report.resources {
            let kind = resource
                .category
                .map_or(words.resource, |category| category.as_str());
            writeln!(
                f,
                "Resource {} - type:{} , locked {}, used {}",
                resource.id, kind, resource.lock_count, resource.use_count
            )?;
        }
        writeln!(
            f,
            "Total Resources = {}, {} use count, {} locked count\n\n",
            totals.resources, totals.uses, totals.locks
        )?;

        let verdict = if self.report.is_conserved() {
            "ok"
        } else {
            "MISMATCH"
        };
        writeln!(
            f,
            "Conservation: {} uses = {} x {} {} ({verdict})",
            totals.uses,
            self.report.uses_per_success,
            totals.successes,
            words.successes.to_lowercase()
        )
    }
}
