//! A small recurring-timer abstraction shared by the eviction engine and the
//! notifier. Both need the same shape: run a callback every N seconds,
//! never overlap two runs, and let the interval be reconfigured (including
//! disabled) so that the change takes effect on or before the timer's next
//! wait -- not after one more stale tick.
//!
//! A `Condvar` paired with the interval's mutex is what gives us "on or
//! before the next tick": reconfiguring signals the condvar, so a thread
//! parked on the old interval wakes immediately and re-evaluates rather
//! than sleeping out the rest of a now-stale wait.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

/// Interval in whole seconds. `0` means "disabled".
#[derive(Clone)]
struct IntervalState {
    seconds: u64,
}

/// A cancellable, reconfigurable recurring background timer.
///
/// Ticks never overlap: the callback runs on the timer's own thread, and
/// the next wait only begins once the callback returns.
pub(crate) struct RecurringTimer {
    state: Arc<(Mutex<IntervalState>, Condvar)>,
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl RecurringTimer {
    /// Spawns the timer thread. `initial_seconds` of `0` starts disabled.
    /// `on_tick` runs on the timer's background thread with no locks of the
    /// caller's held.
    pub(crate) fn spawn<F>(initial_seconds: u64, mut on_tick: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        let state = Arc::new((Mutex::new(IntervalState { seconds: initial_seconds }), Condvar::new()));
        let stop = Arc::new(AtomicBool::new(false));

        let thread_state = state.clone();
        let thread_stop = stop.clone();
        let handle = std::thread::spawn(move || {
            let (lock, cvar) = &*thread_state;
            loop {
                let seconds = {
                    let guard = lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
                    guard.seconds
                };
                if thread_stop.load(Ordering::SeqCst) {
                    return;
                }
                if seconds == 0 {
                    // Disabled: wait to be woken by a reconfiguration or stop.
                    let guard = lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
                    let _ = cvar.wait(guard).unwrap_or_else(|poisoned| poisoned.into_inner());
                    continue;
                }
                let guard = lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
                let (_, timeout) = cvar
                    .wait_timeout(guard, Duration::from_secs(seconds))
                    .unwrap_or_else(|poisoned| poisoned.into_inner());
                if thread_stop.load(Ordering::SeqCst) {
                    return;
                }
                if timeout.timed_out() {
                    on_tick();
                }
                // If not timed out, we were woken by a reconfiguration or
                // stop signal; loop around to re-read the interval.
            }
        });

        RecurringTimer { state, stop, handle: Some(handle) }
    }

    /// Reconfigures the interval. `seconds == 0` disables the timer and
    /// cancels any pending wait; this takes effect immediately, waking the
    /// timer thread rather than letting a stale wait run out.
    pub(crate) fn set_interval(&self, seconds: u64) {
        let (lock, cvar) = &*self.state;
        let mut guard = lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        guard.seconds = seconds;
        drop(guard);
        cvar.notify_all();
    }
}

impl Drop for RecurringTimer {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        let (_, cvar) = &*self.state;
        cvar.notify_all();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
