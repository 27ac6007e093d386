//! Timer primitives for the polling loops.
//!
//! Everything here spawns onto the current `LocalSet`, so the synchronizers
//! can hold `Rc` state. Under `#[tokio::test(start_paused = true)]` the tokio
//! clock doubles as a fake clock and the timers become deterministic.

use std::future::Future;
use std::time::Duration;
use tokio::task::{spawn_local, JoinHandle};
use tokio::time::{interval_at, sleep, Instant, MissedTickBehavior};

/// Periodic trigger that starts one detached job per period.
///
/// A job that is still running when the next period elapses is not waited
/// for; both run and whichever finishes last wins. Cancelling (or dropping)
/// the task stops future firings but leaves already-started jobs alone.
pub struct RepeatingTask {
    handle: JoinHandle<()>,
}

impl RepeatingTask {
    /// First firing happens one full `period` after the call.
    pub fn start<F, Fut>(period: Duration, mut job: F) -> Self
    where
        F: FnMut() -> Fut + 'static,
        Fut: Future<Output = ()> + 'static,
    {
        let handle = spawn_local(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                spawn_local(job());
            }
        });
        Self { handle }
    }

    pub fn cancel(&self) {
        self.handle.abort();
    }

    #[cfg(test)]
    pub fn is_cancelled(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for RepeatingTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Run `job` once after `delay`. Dropping the handle does not cancel it.
pub fn schedule_once<Fut>(delay: Duration, job: Fut) -> JoinHandle<()>
where
    Fut: Future<Output = ()> + 'static,
{
    spawn_local(async move {
        sleep(delay).await;
        job.await;
    })
}
