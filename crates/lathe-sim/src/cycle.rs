use lathe_core::{Lathe, RandomSource};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::debug;

/// Drives the autonomous production cycle.
///
/// Exactly one tick task exists while the device is enabled; the console
/// loop calls [`reconcile`](CycleDriver::reconcile) after every dispatched
/// command to keep that equivalence. Must run inside a `LocalSet`.
pub struct CycleDriver {
    interval: Duration,
    task: Option<JoinHandle<()>>,
}

impl CycleDriver {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            task: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.task.is_some()
    }

    /// Start or cancel the tick task so its presence matches the
    /// device's enabled flag.
    pub fn reconcile<R: RandomSource + 'static>(&mut self, device: &Rc<RefCell<Lathe<R>>>) {
        match (device.borrow().enabled(), self.task.is_some()) {
            (true, false) => self.start(Rc::clone(device)),
            (false, true) => self.stop(),
            _ => {}
        }
    }

    fn start<R: RandomSource + 'static>(&mut self, device: Rc<RefCell<Lathe<R>>>) {
        let period = self.interval;
        debug!(period_ms = period.as_millis() as u64, "production cycle started");

        self.task = Some(tokio::task::spawn_local(async move {
            // Re-enabling starts a fresh interval: the first tick lands
            // one full period later.
            let mut ticker = time::interval_at(time::Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                device.borrow_mut().cycle_tick();
            }
        }));
    }

    /// Cancels the pending tick. A tick that already started on this
    /// scheduler has run to completion before we could be called.
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            debug!("production cycle stopped");
        }
    }
}

impl Drop for CycleDriver {
    fn drop(&mut self) {
        self.stop();
    }
}
