//! Cancellable once-per-interval task.
//!
//! Whoever flips a timer into its running state owns exactly one `Ticker`
//! and must cancel it on every transition out of running. Cancelling aborts
//! the task before returning, and dropping the ticker cancels it too, so a
//! torn-down owner can never leave a callback mutating state.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Handle to at most one periodic task.
#[derive(Debug, Default)]
pub struct Ticker {
    handle: Option<JoinHandle<()>>,
}

impl Ticker {
    /// A ticker with no task scheduled.
    pub fn idle() -> Self {
        Self::default()
    }

    /// Schedule `on_tick` every `period`, first firing one period from now.
    ///
    /// Any task already scheduled by this ticker is cancelled first.
    /// Must be called from within a tokio runtime.
    pub fn start<F>(&mut self, period: Duration, mut on_tick: F)
    where
        F: FnMut() + Send + 'static,
    {
        self.cancel();
        let first = tokio::time::Instant::now() + period;
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(first, period);
            // Recomputation is timestamp-based, so bursts of catch-up ticks
            // after a stall carry no information.
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                on_tick();
            }
        });
        self.handle = Some(handle);
    }

    /// Stop scheduling further ticks.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            tracing::trace!("ticker cancelled");
        }
    }

    pub fn is_active(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Start or cancel so that a task exists exactly when `running` is true.
    pub fn sync<F>(&mut self, running: bool, period: Duration, on_tick: F)
    where
        F: FnMut() + Send + 'static,
    {
        match (running, self.is_active()) {
            (true, false) => self.start(period, on_tick),
            (false, true) => self.cancel(),
            _ => {}
        }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.cancel();
    }
}
