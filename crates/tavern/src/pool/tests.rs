use crate::{
    Coordinator, Jitter, Mutex, Pacing, ResourcePool, RunReport, Seeding, Sleeper, Station,
    ThreadRandom, Venue, Worker, WorkerPool, WorkerSettings, WorkerState,
};
use core::time::Duration;
use std::sync::Arc;

#[derive(Clone, Copy)]
struct NoSleep;

impl Sleeper for NoSleep {
    fn sleep(&self, _: Duration) {}
}

#[derive(Clone, Default)]
struct RecordingSleeper(Arc<Mutex<Vec<Duration>>>);

impl Sleeper for RecordingSleeper {
    fn sleep(&self, dur: Duration) {
        self.0.lock().push(dur);
    }
}

#[derive(Clone, Copy)]
struct PanickingSleeper;

impl Sleeper for PanickingSleeper {
    fn sleep(&self, _: Duration) {
        panic!("worker blew up mid-cycle");
    }
}

fn limited(cycles: u64) -> WorkerSettings {
    WorkerSettings {
        pacing: Pacing::flat_out(),
        cycle_limit: Some(cycles),
        ..WorkerSettings::default()
    }
}

/// Runs `workers` workers until each has `cycles` successes.
fn run_to_limit<V: Venue + 'static>(venue: V, workers: usize, cycles: u64) -> RunReport {
    WorkerPool::with_sleeper(venue, limited(cycles), NoSleep)
        .unwrap()
        .run_until(workers, Coordinator::await_all_exited)
        .unwrap()
}

fn assert_accounted(report: &RunReport) {
    let totals = report.totals();
    assert!(report.is_conserved(), "{totals:?}");
    assert!(totals.locks >= totals.uses, "{totals:?}");
    assert!(totals.tries >= totals.successes, "{totals:?}");
    for (id, worker) in report.workers.iter().enumerate() {
        assert_eq!(worker.id, id);
    }
}

#[test]
fn pool_conserves_uses() {
    let report = run_to_limit(ResourcePool::new(2, 2).unwrap(), 4, 200);
    assert_accounted(&report);
    assert_eq!(report.totals().successes, 800);
    assert_eq!(report.totals().uses, 1_600);
    assert!(report.workers.iter().all(|w| w.successes == 200));
}

#[test]
fn station_conserves_uses() {
    let report = run_to_limit(Station::new(2).unwrap(), 6, 200);
    assert_accounted(&report);
    assert_eq!(report.totals().uses, report.totals().successes);
    assert_eq!(report.totals().successes, 1_200);
}

#[test]
fn crowded_pool_never_deadlocks() {
    let report = run_to_limit(ResourcePool::new(3, 3).unwrap(), 50, 5_000);
    assert_accounted(&report);
    assert_eq!(report.totals().successes, 50 * 5_000);
}

#[test]
fn timed_run_stops_every_worker() {
    let settings = WorkerSettings {
        pacing: Pacing::scaled(0.05),
        ..WorkerSettings::default()
    };
    let report = WorkerPool::new(ResourcePool::new(2, 2).unwrap(), settings)
        .unwrap()
        .run_for(4, Duration::from_millis(200))
        .unwrap();
    assert_accounted(&report);
    assert_eq!(report.workers.len(), 4);
    assert!(report.totals().successes > 0);
}

#[test]
fn single_category_pool_shuts_down_cleanly() {
    let pool = WorkerPool::with_sleeper(
        ResourcePool::new(1, 0).unwrap(),
        WorkerSettings::default(),
        NoSleep,
    )
    .unwrap();
    let report = pool.run_for(3, Duration::from_millis(50)).unwrap();
    let totals = report.totals();
    assert_eq!(totals.successes, 0);
    assert_eq!(totals.uses, 0);
    assert_eq!(totals.workers, 3);
    assert!(totals.locks > 0, "workers kept picking the lone bottle");
}

#[test]
fn stop_before_start_runs_nothing() {
    let mut pool =
        WorkerPool::with_sleeper(Station::new(1).unwrap(), WorkerSettings::default(), NoSleep)
            .unwrap();
    pool.spawn(3).unwrap();
    pool.await_all_registered();
    assert_eq!(pool.coordinator().live(), 3);

    pool.request_stop();
    let report = pool.collect_statistics().unwrap();
    assert_eq!(report.totals().tries, 0);
    assert_eq!(report.totals().locks, 0);
}

#[test]
fn tenth_success_sleeps_both_breaks() {
    let sleeper = RecordingSleeper::default();
    let settings = WorkerSettings {
        pacing: Pacing {
            work: Jitter::new(1, 0),
            short_break: Jitter::new(5, 0),
            long_break: Jitter::new(7, 0),
            scale: 1.0,
        },
        seeding: Seeding::Fixed(1),
        cycle_limit: Some(10),
    };
    WorkerPool::with_sleeper(Station::new(1).unwrap(), settings, sleeper.clone())
        .unwrap()
        .run_until(1, Coordinator::await_all_exited)
        .unwrap();

    let ms = Duration::from_millis;
    let mut expected = Vec::new();
    for n in 1..=10 {
        expected.push(ms(1));
        if n % 5 == 0 {
            expected.push(ms(5));
        }
        if n % 10 == 0 {
            expected.push(ms(7));
        }
    }
    assert_eq!(*sleeper.0.lock(), expected);
}

#[test]
fn lone_worker_replays_under_a_fixed_seed() {
    let run = || {
        let settings = WorkerSettings {
            seeding: Seeding::Fixed(42),
            ..limited(50)
        };
        WorkerPool::with_sleeper(ResourcePool::new(3, 2).unwrap(), settings, NoSleep)
            .unwrap()
            .run_until(1, Coordinator::await_all_exited)
            .unwrap()
    };
    let first = run();
    let second = run();
    assert_eq!(first.resources, second.resources);
    assert_eq!(first.workers, second.workers);
    assert_eq!(first.workers[0].tries, 50, "a lone drinker never misses");
}

#[test]
fn panicking_worker_is_reported() {
    let err = WorkerPool::with_sleeper(
        Station::new(1).unwrap(),
        WorkerSettings::default(),
        PanickingSleeper,
    )
    .unwrap()
    .run_until(1, Coordinator::await_all_exited)
    .unwrap_err();
    assert!(matches!(err, crate::Error::WorkerPanicked { id: 0 }));
}

#[test]
fn worker_runs_on_the_calling_thread() {
    let venue = Arc::new(ResourcePool::new(1, 1).unwrap());
    let coordinator = Arc::new(Coordinator::new());
    coordinator.open_start_gate();

    let worker = Worker::new(
        7,
        Arc::clone(&venue),
        Arc::clone(&coordinator),
        ThreadRandom,
        NoSleep,
    )
    .with_pacing(Pacing::flat_out())
    .with_cycle_limit(Some(5));
    assert_eq!(worker.state(), WorkerState::Idle);

    let stats = worker.run();
    assert_eq!(stats.id, 7);
    assert_eq!((stats.successes, stats.tries, stats.waits), (5, 5, 0));
    assert_eq!(coordinator.live(), 0);
    assert!(venue.snapshot().iter().all(|r| r.use_count == 5));
}

#[test]
fn huge_pacing_scale_does_not_kill_workers() {
    let settings = WorkerSettings {
        pacing: Pacing::scaled(1e30),
        cycle_limit: Some(1),
        ..WorkerSettings::default()
    };
    let sleeper = RecordingSleeper::default();
    let report = WorkerPool::with_sleeper(
        ResourcePool::new(1, 1).unwrap(),
        settings,
        sleeper.clone(),
    )
    .unwrap()
    .run_until(1, Coordinator::await_all_exited)
    .unwrap();
    assert_eq!(report.totals().successes, 1);
    assert_eq!(*sleeper.0.lock(), vec![Duration::MAX]);
}
