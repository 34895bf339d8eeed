//! How long workers hold their claims and how long they rest afterwards.
//!
//! Durations are drawn from each worker's own [`RandSource`], never from a
//! shared generator, and slept through a [`Sleeper`] so tests can run the
//! full state machine without wall-clock delays.

use crate::{ConfigError, RandSource};
use core::time::Duration;

/// Every this many successes a worker takes a short break.
pub const SHORT_BREAK_EVERY: u64 = 5;

/// Every this many successes a worker takes a long break.
///
/// This is a multiple of [`SHORT_BREAK_EVERY`], so on those cycles both
/// breaks are taken back to back.
pub const LONG_BREAK_EVERY: u64 = 10;

/// A trait for putting the current worker to sleep.
///
/// This abstraction allows you to plug in a real thread sleep, or a mocked
/// sleeper in tests that records the requested durations.
///
/// # Example
///
/// ```
/// use core::time::Duration;
/// use tavern::Sleeper;
///
/// struct NoSleep;
/// impl Sleeper for NoSleep {
///     fn sleep(&self, _: Duration) {}
/// }
///
/// NoSleep.sleep(Duration::from_secs(60));
/// ```
pub trait Sleeper {
    /// Blocks the calling worker for roughly `dur`.
    fn sleep(&self, dur: Duration);
}

/// Sleeps the OS thread via [`std::thread::sleep`].
#[derive(Default, Clone, Copy, Debug)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, dur: Duration) {
        if !dur.is_zero() {
            std::thread::sleep(dur);
        }
    }
}

/// A duration of `base_ms` plus a uniformly drawn `0..spread_ms` extra.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Jitter {
    pub base_ms: u64,
    pub spread_ms: u64,
}

impl Jitter {
    pub const fn new(base_ms: u64, spread_ms: u64) -> Self {
        Self { base_ms, spread_ms }
    }

    /// Draws one duration from `rng`. Saturates at `u64::MAX` milliseconds.
    pub fn sample<R: RandSource<u64>>(&self, rng: &mut R) -> Duration {
        let extra = if self.spread_ms == 0 {
            0
        } else {
            rng.rand() % self.spread_ms
        };
        Duration::from_millis(self.base_ms.saturating_add(extra))
    }
}

/// The timing profile of a single work cycle.
///
/// The defaults are the drinking game's: drink for 20–39 ms, rest 40–49 ms
/// after every 5th drink and 60–69 ms after every 10th.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pacing {
    /// How long a claim is held.
    pub work: Jitter,
    /// Rest after every [`SHORT_BREAK_EVERY`] successes.
    pub short_break: Jitter,
    /// Rest after every [`LONG_BREAK_EVERY`] successes.
    pub long_break: Jitter,
    /// Multiplier applied to every drawn duration; `0.0` runs flat out.
    pub scale: f64,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            work: Jitter::new(20, 20),
            short_break: Jitter::new(40, 10),
            long_break: Jitter::new(60, 10),
            scale: 1.0,
        }
    }
}

impl Pacing {
    /// The default profile with every duration multiplied by `scale`.
    pub fn scaled(scale: f64) -> Self {
        Self {
            scale,
            ..Self::default()
        }
    }

    /// A profile that never sleeps. Handy for stress tests and benches.
    pub fn flat_out() -> Self {
        Self::scaled(0.0)
    }

    /// Rejects scales that cannot produce a duration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidScale`] if `scale` is negative, infinite
    /// or NaN.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scale.is_finite() && self.scale >= 0.0 {
            Ok(())
        } else {
            Err(ConfigError::InvalidScale { scale: self.scale })
        }
    }

    pub fn work_for<R: RandSource<u64>>(&self, rng: &mut R) -> Duration {
        self.apply(self.work.sample(rng))
    }

    /// Breaks owed after the `successes`-th completed cycle, in the order
    /// they are slept.
    ///
    /// Multiples of [`LONG_BREAK_EVERY`] get both the short and the long
    /// break.
    pub fn breaks_after<R: RandSource<u64>>(
        &self,
        successes: u64,
        rng: &mut R,
    ) -> impl Iterator<Item = Duration> + use<R> {
        let short = (successes % SHORT_BREAK_EVERY == 0)
            .then(|| self.apply(self.short_break.sample(rng)));
        let long = (successes % LONG_BREAK_EVERY == 0)
            .then(|| self.apply(self.long_break.sample(rng)));
        short.into_iter().chain(long)
    }

    /// Scales `dur`, saturating at [`Duration::MAX`] when the product does
    /// not fit.
    fn apply(&self, dur: Duration) -> Duration {
        if self.scale == 1.0 {
            dur
        } else {
            Duration::try_from_secs_f64(dur.as_secs_f64() * self.scale).unwrap_or(Duration::MAX)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(u64);
    impl RandSource<u64> for Fixed {
        fn rand(&mut self) -> u64 {
            self.0
        }
    }

    #[test]
    fn jitter_stays_within_spread() {
        let jitter = Jitter::new(20, 20);
        assert_eq!(jitter.sample(&mut Fixed(0)), Duration::from_millis(20));
        assert_eq!(jitter.sample(&mut Fixed(19)), Duration::from_millis(39));
        assert_eq!(jitter.sample(&mut Fixed(20)), Duration::from_millis(20));
    }

    #[test]
    fn zero_spread_is_constant() {
        let jitter = Jitter::new(7, 0);
        assert_eq!(jitter.sample(&mut Fixed(u64::MAX)), Duration::from_millis(7));
    }

    #[test]
    fn no_breaks_off_the_fifth() {
        let pacing = Pacing::default();
        for n in [1, 2, 3, 4, 6, 9, 11] {
            let breaks = pacing.breaks_after(n, &mut Fixed(0)).count();
            assert_eq!(breaks, 0, "cycle {n}");
        }
    }

    #[test]
    fn fifth_success_takes_only_the_short_break() {
        let pacing = Pacing::default();
        let breaks: Vec<_> = pacing.breaks_after(5, &mut Fixed(0)).collect();
        assert_eq!(breaks, vec![Duration::from_millis(40)]);
    }

    // The drinking game compounds both breaks on multiples of ten.
    #[test]
    fn tenth_success_compounds_both_breaks() {
        let pacing = Pacing::default();
        let breaks: Vec<_> = pacing.breaks_after(10, &mut Fixed(0)).collect();
        assert_eq!(breaks, vec![Duration::from_millis(40), Duration::from_millis(60)]);
        let breaks: Vec<_> = pacing.breaks_after(30, &mut Fixed(3)).collect();
        assert_eq!(breaks, vec![Duration::from_millis(43), Duration::from_millis(63)]);
    }

    #[test]
    fn scale_multiplies_every_duration() {
        let pacing = Pacing::scaled(0.5);
        assert_eq!(pacing.work_for(&mut Fixed(0)), Duration::from_millis(10));
        let breaks: Vec<_> = pacing.breaks_after(10, &mut Fixed(0)).collect();
        assert_eq!(breaks, vec![Duration::from_millis(20), Duration::from_millis(30)]);
        assert_eq!(Pacing::flat_out().work_for(&mut Fixed(5)), Duration::ZERO);
    }

    #[test]
    fn huge_scales_saturate() {
        let pacing = Pacing::scaled(1e30);
        assert!(pacing.validate().is_ok());
        assert_eq!(pacing.work_for(&mut Fixed(0)), Duration::MAX);
        let breaks: Vec<_> = pacing.breaks_after(10, &mut Fixed(0)).collect();
        assert_eq!(breaks, vec![Duration::MAX, Duration::MAX]);
        assert_eq!(Pacing::scaled(f64::MAX).work_for(&mut Fixed(0)), Duration::MAX);
    }

    #[test]
    fn huge_base_saturates() {
        let jitter = Jitter::new(u64::MAX, 10);
        assert_eq!(
            jitter.sample(&mut Fixed(9)),
            Duration::from_millis(u64::MAX)
        );
    }

    #[test]
    fn rejects_unusable_scales() {
        assert!(Pacing::scaled(0.0).validate().is_ok());
        assert!(Pacing::scaled(2.5).validate().is_ok());
        for scale in [-1.0, f64::NAN, f64::INFINITY] {
            let err = Pacing::scaled(scale).validate().unwrap_err();
            assert!(matches!(err, ConfigError::InvalidScale { .. }));
        }
    }
}
