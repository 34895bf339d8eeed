use crate::Mutex;
use parking_lot::Condvar;

#[derive(Debug, Default)]
struct GateState {
    /// Workers between registration and exit.
    live: usize,
    /// Workers that have ever registered. Never decreases.
    registered: usize,
    open: bool,
    stopped: bool,
}

/// The start gate, live-worker count and stop flag of a worker pool.
///
/// All three live behind one lock so that every wait re-checks its predicate
/// atomically with respect to the change it is waiting for. The gate and the
/// stop flag each flip exactly once and never flip back.
#[derive(Debug, Default)]
pub struct Coordinator {
    state: Mutex<GateState>,
    live_changed: Condvar,
    gate_changed: Condvar,
}

impl Coordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts the calling worker as live, then blocks until the start gate
    /// opens.
    ///
    /// A stop requested before the gate opens also lets the worker through,
    /// so it can see the stop and leave.
    pub fn register(&self) {
        let mut state = self.state.lock();
        state.live += 1;
        state.registered += 1;
        self.live_changed.notify_all();
        self.gate_changed
            .wait_while(&mut state, |state| !state.open && !state.stopped);
    }

    /// Counts the calling worker as gone.
    pub fn deregister(&self) {
        let mut state = self.state.lock();
        debug_assert!(state.live > 0, "deregister without a matching register");
        state.live -= 1;
        self.live_changed.notify_all();
    }

    /// Blocks until `expected` workers have registered.
    pub fn await_registered(&self, expected: usize) {
        let mut state = self.state.lock();
        self.live_changed
            .wait_while(&mut state, |state| state.registered < expected);
    }

    /// Blocks until every registered worker has deregistered.
    pub fn await_all_exited(&self) {
        let mut state = self.state.lock();
        self.live_changed.wait_while(&mut state, |state| state.live > 0);
    }

    /// Lets every registered worker start. Later registrations pass straight
    /// through.
    pub fn open_start_gate(&self) {
        self.state.lock().open = true;
        self.gate_changed.notify_all();
    }

    /// Raises the stop flag. Workers see it between cycles.
    ///
    /// This only wakes workers waiting at the start gate; workers parked on a
    /// venue must be woken through the venue's signal as well.
    pub fn request_stop(&self) {
        self.state.lock().stopped = true;
        self.gate_changed.notify_all();
    }

    pub fn is_stopped(&self) -> bool {
        self.state.lock().stopped
    }

    pub fn is_open(&self) -> bool {
        self.state.lock().open
    }

    pub fn live(&self) -> usize {
        self.state.lock().live
    }
}
