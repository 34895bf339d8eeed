use crate::Mutex;
use parking_lot::Condvar;

#[cfg(feature = "tracing")]
use tracing::instrument;

#[derive(Debug, Default)]
struct SignalState {
    epoch: u64,
    interrupted: bool,
}

/// Why a waiter came back from [`ReleaseSignal::wait_for_release`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wake {
    /// Something was released since the waiter's last attempt.
    Released,
    /// The signal was interrupted; the waiter should check why.
    Interrupted,
}

/// The wake condition shared by everyone waiting on a venue.
///
/// Each release bumps an epoch under the signal's own lock and broadcasts.
/// Waiters compare against the epoch they saw before their last attempt, so a
/// release that lands between a failed attempt and the wait is never missed.
///
/// The lock here only guards the epoch and the interrupt flag. It is never
/// held while a resource is being locked.
#[derive(Debug, Default)]
pub struct ReleaseSignal {
    state: Mutex<SignalState>,
    changed: Condvar,
}

impl ReleaseSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of releases published so far.
    pub fn epoch(&self) -> u64 {
        self.state.lock().epoch
    }

    /// Publishes a release and wakes every waiter.
    pub fn notify_release(&self) {
        {
            let mut state = self.state.lock();
            state.epoch = state.epoch.wrapping_add(1);
        }
        self.changed.notify_all();
    }

    /// Blocks until the epoch moves past `since` or the signal is
    /// interrupted. Returns immediately if either already happened.
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn wait_for_release(&self, since: u64) -> Wake {
        let mut state = self.state.lock();
        self.changed
            .wait_while(&mut state, |state| !state.interrupted && state.epoch == since);
        if state.interrupted {
            Wake::Interrupted
        } else {
            Wake::Released
        }
    }

    /// Wakes every waiter and makes all later waits return at once.
    ///
    /// There is no way back; a venue is interrupted once, at shutdown.
    pub fn interrupt(&self) {
        self.state.lock().interrupted = true;
        self.changed.notify_all();
    }

    pub fn is_interrupted(&self) -> bool {
        self.state.lock().interrupted
    }
}
